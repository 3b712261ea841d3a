/// Maps an arbitrary name onto the character set accepted for resource names.
///
/// Sanitizing is owned by the deployment tooling; the assembler only consumes
/// it, e.g. when deriving the notification topic name from the bucket name.
pub trait NameSanitizer: Send + Sync {
    fn sanitize(&self, name: &str) -> String;
}

impl<F> NameSanitizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn sanitize(&self, name: &str) -> String {
        self(name)
    }
}
