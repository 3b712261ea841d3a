//! ARN and ARN-glob construction.

/// The `arn:aws:s3:::` prefix with no bucket, which matches every bucket and object.
pub const ALL_OBJECTS_ARN: &str = "arn:aws:s3:::";

pub fn bucket_arn(bucket_name: &str) -> String {
    format!("{ALL_OBJECTS_ARN}{bucket_name}")
}

/// Every object in the bucket.
pub fn bucket_objects_arn(bucket_name: &str) -> String {
    format!("{ALL_OBJECTS_ARN}{bucket_name}/*")
}

/// Log objects a given account delivers into the bucket.
pub fn delivery_prefix_arn(bucket_name: &str, account_id: &str) -> String {
    format!("{ALL_OBJECTS_ARN}{bucket_name}/AWSLogs/{account_id}/*")
}

/// Any trail in any region owned by the account.
pub fn trail_pattern(account_id: &str) -> String {
    format!("arn:aws:cloudtrail:*:{account_id}:trail/*")
}

pub fn topic_arn(region: &str, account_id: &str, topic_name: &str) -> String {
    format!("arn:aws:sns:{region}:{account_id}:{topic_name}")
}

/// Log stream wildcard inside a log group; the trail expects this form.
pub fn log_group_streams_arn(log_group_arn: &str) -> String {
    if log_group_arn.ends_with(":*") {
        log_group_arn.to_string()
    } else {
        format!("{log_group_arn}:*")
    }
}
