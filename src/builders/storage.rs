use itertools::Itertools;
use tracing::debug;

use crate::arn::{bucket_arn, bucket_objects_arn, delivery_prefix_arn};
use crate::error::TrailError;
use crate::types::{
    Condition, ConditionOperator, PolicyDocument, PolicyStatement, Principal, TRAIL_SERVICE,
};

pub const SID_ACL_CHECK: &str = "AWSCloudTrailAclCheck";
pub const SID_TRAIL_WRITE: &str = "AWSCloudTrailWrite";
pub const SID_DENY_INSECURE_TRANSPORT: &str = "DenyInsecureTransport";

/// Canned ACL the trail service must send with every delivered object.
pub const BUCKET_OWNER_FULL_CONTROL: &str = "bucket-owner-full-control";

/// Build the bucket policy for the trail bucket.
///
/// `cross_account_ids` are the accounts whose trails deliver into the bucket;
/// each yields exactly one `AWSLogs/<account>/*` write pattern. An empty list
/// is rejected: a write grant that matches no object is never what was meant.
///
/// The insecure-transport deny is present in every document.
pub fn build_storage_policy<S: AsRef<str>>(
    bucket_name: &str,
    cross_account_ids: &[S],
) -> Result<PolicyDocument, TrailError> {
    if bucket_name.is_empty() {
        return Err(TrailError::missing("bucket_name"));
    }

    let accounts: Vec<&str> = cross_account_ids.iter().map(AsRef::<str>::as_ref).collect();
    let write_patterns: Vec<String> = accounts
        .into_iter()
        .unique()
        .map(|account| delivery_prefix_arn(bucket_name, account))
        .collect();
    if write_patterns.is_empty() {
        return Err(TrailError::empty_expansion(
            "cross_account_ids",
            "object write grant needs at least one delivering account",
        ));
    }

    let doc = PolicyDocument::from_statements([
        PolicyStatement::allow(SID_ACL_CHECK, Principal::service(TRAIL_SERVICE))
            .with_action("s3:GetBucketAcl")
            .with_resource(bucket_arn(bucket_name)),
        PolicyStatement::allow(SID_TRAIL_WRITE, Principal::service(TRAIL_SERVICE))
            .with_action("s3:PutObject")
            .with_resources(write_patterns)
            .with_condition(Condition::new(
                ConditionOperator::StringEquals,
                "s3:x-amz-acl",
                [BUCKET_OWNER_FULL_CONTROL],
            )?)?,
        PolicyStatement::deny(SID_DENY_INSECURE_TRANSPORT, Principal::any())
            .with_action("s3:*")
            .with_resources([bucket_arn(bucket_name), bucket_objects_arn(bucket_name)])
            .with_condition(Condition::new(
                ConditionOperator::Bool,
                "aws:SecureTransport",
                ["false"],
            )?)?,
    ])?;

    debug!(
        event = "Policy",
        phase = "Storage",
        bucket = bucket_name,
        accounts = cross_account_ids.len(),
        statements = doc.len()
    );
    Ok(doc)
}
