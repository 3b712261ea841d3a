use itertools::Itertools;
use tracing::debug;

use crate::error::TrailError;
use crate::types::{
    Condition, ConditionOperator, PolicyDocument, PolicyStatement, Principal, TRAIL_SERVICE,
};

pub const SID_TRAIL_PUBLISH: &str = "AWSCloudTrailSNSPolicy";
pub const SOURCE_ACCOUNT_KEY: &str = "aws:SourceAccount";

/// Build the topic policy letting the trail service publish.
///
/// A `topic_arn` of `None` means notifications are off: no document is
/// produced, and asking for cross-account publishing is a conflict.
///
/// The source-account condition is appended only when `allow_cross_account`
/// is set; otherwise the publish statement carries no condition at all.
pub fn build_notification_policy<S: AsRef<str>>(
    topic_arn: Option<&str>,
    allow_cross_account: bool,
    cross_account_ids: &[S],
) -> Result<Option<PolicyDocument>, TrailError> {
    let Some(topic_arn) = topic_arn else {
        if allow_cross_account {
            return Err(TrailError::conflict(
                "allow_cross_account_notification",
                "cross-account publishing requested but notifications are disabled",
            ));
        }
        debug!(event = "Policy", phase = "Notification", enabled = false);
        return Ok(None);
    };

    let source_accounts = if allow_cross_account {
        if cross_account_ids.is_empty() {
            return Err(TrailError::empty_expansion(
                "cross_account_ids",
                "cross-account publishing requested without any accounts",
            ));
        }
        Some(Condition::new(
            ConditionOperator::StringEquals,
            SOURCE_ACCOUNT_KEY,
            cross_account_ids
                .iter()
                .map(AsRef::<str>::as_ref)
                .unique()
                .map(str::to_string),
        )?)
    } else {
        None
    };

    let publish = PolicyStatement::allow(SID_TRAIL_PUBLISH, Principal::service(TRAIL_SERVICE))
        .with_action("sns:Publish")
        .with_resource(topic_arn)
        .with_optional_condition(source_accounts)?;
    let doc = PolicyDocument::from_statements([publish])?;

    debug!(
        event = "Policy",
        phase = "Notification",
        enabled = true,
        cross_account = allow_cross_account,
        topic = topic_arn
    );
    Ok(Some(doc))
}
