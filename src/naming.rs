use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TrailError;
use crate::traits::NameSanitizer;

/// Characters outside the resource-name alphabet.
static DISALLOWED_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("static name pattern must compile"));

/// Account ids are exactly twelve digits.
static ACCOUNT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{12}$").expect("static account pattern must compile"));

/// Default sanitizer: every character outside `[A-Za-z0-9_-]` becomes `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterSanitizer;

impl NameSanitizer for CharacterSanitizer {
    fn sanitize(&self, name: &str) -> String {
        DISALLOWED_NAME_CHARS.replace_all(name, "-").into_owned()
    }
}

/// Check that `value` looks like an account id, naming `field` on failure.
pub fn validate_account_id(field: &str, value: &str) -> Result<(), TrailError> {
    if value.is_empty() {
        return Err(TrailError::missing(field));
    }
    if !ACCOUNT_ID.is_match(value) {
        return Err(TrailError::InvalidIdentifier {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
