//! Pipeline configuration and the identity facts supplied by the environment.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::TrailError;

/// Bounds accepted by the key service for the pending-deletion window.
pub const KEY_DELETION_WINDOW_DAYS: (u32, u32) = (7, 30);

/// Which object-level data events the trail records.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CaptureMode {
    #[default]
    None,
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl CaptureMode {
    /// The trail `read_write_type`, or `None` when no data events are captured.
    pub fn read_write_type(&self) -> Option<&'static str> {
        match self {
            CaptureMode::None => None,
            CaptureMode::ReadOnly => Some("ReadOnly"),
            CaptureMode::WriteOnly => Some("WriteOnly"),
            CaptureMode::ReadWrite => Some("All"),
        }
    }
}

/// An existing log group the trail mirrors events into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogGroupRef {
    pub arn: String,
    /// Role the trail assumes to write into the log group.
    pub role_arn: String,
}

/// Input for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    pub cluster_name: String,
    pub bucket_name: String,
    /// Bucket receiving access logs for the trail bucket.
    pub logging_bucket: String,
    /// Overrides the account resolved from the caller's credentials.
    #[serde(default)]
    pub primary_account_id: Option<String>,
    /// Accounts other than the primary one allowed to deliver into the bucket.
    #[serde(default)]
    pub cross_account_ids: Vec<String>,
    #[serde(default)]
    pub send_to_notification_topic: bool,
    #[serde(default)]
    pub allow_cross_account_notification: bool,
    #[serde(default = "default_global_trail")]
    pub global_trail: bool,
    #[serde(default)]
    pub capture_mode: CaptureMode,
    #[serde(default)]
    pub log_group: Option<LogGroupRef>,
    #[serde(default = "default_key_deletion_window_days")]
    pub key_deletion_window_days: u32,
    #[serde(default = "default_noncurrent_version_expiration_days")]
    pub noncurrent_version_expiration_days: u32,
}

fn default_global_trail() -> bool {
    true
}

fn default_key_deletion_window_days() -> u32 {
    KEY_DELETION_WINDOW_DAYS.1
}

fn default_noncurrent_version_expiration_days() -> u32 {
    365
}

impl Configuration {
    /// A configuration with every optional setting at its default.
    pub fn new(
        cluster_name: impl Into<String>,
        bucket_name: impl Into<String>,
        logging_bucket: impl Into<String>,
    ) -> Self {
        Configuration {
            cluster_name: cluster_name.into(),
            bucket_name: bucket_name.into(),
            logging_bucket: logging_bucket.into(),
            primary_account_id: None,
            cross_account_ids: Vec::new(),
            send_to_notification_topic: false,
            allow_cross_account_notification: false,
            global_trail: default_global_trail(),
            capture_mode: CaptureMode::default(),
            log_group: None,
            key_deletion_window_days: default_key_deletion_window_days(),
            noncurrent_version_expiration_days: default_noncurrent_version_expiration_days(),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, TrailError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Facts about the caller, resolved outside this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityFacts {
    pub primary_account_id: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub caller_is_root: bool,
}

impl IdentityFacts {
    pub fn new(primary_account_id: impl Into<String>, region: impl Into<String>) -> Self {
        IdentityFacts {
            primary_account_id: Some(primary_account_id.into()),
            region: Some(region.into()),
            caller_is_root: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use yare::parameterized;

    #[parameterized(
        none = { "none", CaptureMode::None, None },
        read_only = { "read-only", CaptureMode::ReadOnly, Some("ReadOnly") },
        write_only = { "write-only", CaptureMode::WriteOnly, Some("WriteOnly") },
        read_write = { "read-write", CaptureMode::ReadWrite, Some("All") },
    )]
    fn test_capture_mode(literal: &str, mode: CaptureMode, read_write_type: Option<&str>) {
        assert_eq!(CaptureMode::from_str(literal).unwrap(), mode);
        assert_eq!(mode.to_string(), literal);
        assert_eq!(mode.read_write_type(), read_write_type);
        let parsed: CaptureMode = serde_json::from_value(serde_json::json!(literal)).unwrap();
        assert_eq!(parsed, mode);
    }

    #[test]
    fn test_configuration_defaults_from_json() {
        let config = Configuration::from_json_str(
            r#"{"cluster_name": "prod", "bucket_name": "my-trail", "logging_bucket": "my-logs"}"#,
        )
        .unwrap();
        assert_eq!(config, Configuration::new("prod", "my-trail", "my-logs"));
        assert!(config.global_trail);
        assert_eq!(config.capture_mode, CaptureMode::None);
        assert_eq!(config.key_deletion_window_days, 30);
        assert_eq!(config.noncurrent_version_expiration_days, 365);
    }

    #[test]
    fn test_configuration_full_json() {
        let config = Configuration::from_json_str(
            r#"{
                "cluster_name": "prod",
                "bucket_name": "my-trail",
                "logging_bucket": "my-logs",
                "primary_account_id": "111111111111",
                "cross_account_ids": ["222222222222"],
                "send_to_notification_topic": true,
                "allow_cross_account_notification": true,
                "global_trail": false,
                "capture_mode": "write-only",
                "log_group": {
                    "arn": "arn:aws:logs:eu-west-1:111111111111:log-group:trail",
                    "role_arn": "arn:aws:iam::111111111111:role/trail"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.capture_mode, CaptureMode::WriteOnly);
        assert!(!config.global_trail);
        assert_eq!(config.cross_account_ids, vec!["222222222222".to_string()]);
        assert!(config.log_group.is_some());
    }

    #[test]
    fn test_configuration_rejects_unknown_fields() {
        let result = Configuration::from_json_str(
            r#"{"cluster_name": "a", "bucket_name": "b", "logging_bucket": "c", "sns": true}"#,
        );
        assert!(matches!(result, Err(TrailError::InvalidFormat(_))));
    }

    #[test]
    fn test_configuration_rejects_unknown_capture_mode() {
        let result = Configuration::from_json_str(
            r#"{"cluster_name": "a", "bucket_name": "b", "logging_bucket": "c",
                "capture_mode": "all"}"#,
        );
        assert!(matches!(result, Err(TrailError::InvalidFormat(_))));
    }
}
