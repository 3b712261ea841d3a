use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::arn::{ALL_OBJECTS_ARN, log_group_streams_arn, topic_arn, trail_pattern};
use crate::builders::{build_key_policy, build_notification_policy, build_storage_policy};
use crate::config::{CaptureMode, Configuration, IdentityFacts, KEY_DELETION_WINDOW_DAYS};
use crate::error::TrailError;
use crate::graph::ResourceGraph;
use crate::naming::{CharacterSanitizer, validate_account_id};
use crate::traits::NameSanitizer;
use crate::types::{AttrValue, OptionalResource, ResourceKind, ResourceNode};

/// Logical name shared by every node the assembler emits.
pub const RESOURCE_NAME: &str = "audit";

const NOTIFICATIONS_OFF: &str = "send_to_notification_topic is off";

/// Facts resolved from a configuration before any node is built.
#[derive(Debug)]
struct Resolved<'a> {
    account_id: &'a str,
    /// Primary account first, then the trusted accounts, without repeats.
    delivery_accounts: Vec<&'a str>,
    /// Set only when notifications are on.
    topic: Option<TopicFacts>,
}

#[derive(Debug)]
struct TopicFacts {
    name: String,
    arn: String,
}

/// Turns a configuration into the resource graph for one provisioning run.
///
/// The assembler holds no per-run state and can be shared between threads.
#[derive(Clone)]
pub struct PipelineAssembler {
    sanitizer: Arc<dyn NameSanitizer>,
}

impl Default for PipelineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineAssembler {
    pub fn new() -> Self {
        PipelineAssembler {
            sanitizer: Arc::new(CharacterSanitizer),
        }
    }

    pub fn with_sanitizer(sanitizer: Arc<dyn NameSanitizer>) -> Self {
        PipelineAssembler { sanitizer }
    }

    /// Build and validate the graph. Nothing is returned unless the whole
    /// graph resolves.
    pub fn assemble(
        &self,
        config: &Configuration,
        identity: &IdentityFacts,
    ) -> Result<ResourceGraph, TrailError> {
        let resolved = self.resolve(config, identity)?;
        debug!(
            event = "Assemble",
            phase = "Resolved",
            cluster = config.cluster_name,
            account = resolved.account_id,
            delivery_accounts = resolved.delivery_accounts.len(),
            notifications = resolved.topic.is_some(),
            capture_mode = config.capture_mode.to_string()
        );

        let mut graph = ResourceGraph::new();

        let key = self.key(config, &resolved)?;
        let alias = self.alias(config, &key);
        let bucket = self.bucket(config, &resolved, &key)?;
        let public_access = public_access_block(&bucket);
        let (topic, topic_policy) = self.topic(config, &resolved)?;
        let trail = self.trail(config, &key, &bucket, &topic, &topic_policy);

        graph.insert(key)?;
        graph.insert(alias)?;
        graph.insert(bucket)?;
        graph.insert(public_access)?;
        graph.insert_optional(topic)?;
        graph.insert_optional(topic_policy)?;
        graph.insert(trail)?;

        graph.validate()?;

        info!(
            event = "Assemble",
            phase = "Complete",
            cluster = config.cluster_name,
            resources = graph.len(),
            pruned = graph.pruned().len()
        );
        Ok(graph)
    }

    fn resolve<'a>(
        &self,
        config: &'a Configuration,
        identity: &'a IdentityFacts,
    ) -> Result<Resolved<'a>, TrailError> {
        let account_id = config
            .primary_account_id
            .as_deref()
            .or(identity.primary_account_id.as_deref())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| TrailError::missing("primary_account_id"))?;
        validate_account_id("primary_account_id", account_id)?;
        for id in &config.cross_account_ids {
            validate_account_id("cross_account_ids", id)?;
        }

        if config.cluster_name.is_empty() {
            return Err(TrailError::missing("cluster_name"));
        }
        if config.bucket_name.is_empty() {
            return Err(TrailError::missing("bucket_name"));
        }
        if config.logging_bucket.is_empty() {
            return Err(TrailError::missing("logging_bucket"));
        }
        if config.logging_bucket == config.bucket_name {
            return Err(TrailError::conflict(
                "logging_bucket",
                "access logs for the trail bucket cannot be written into the trail bucket",
            ));
        }

        if config.allow_cross_account_notification {
            if !config.send_to_notification_topic {
                return Err(TrailError::conflict(
                    "allow_cross_account_notification",
                    "cross-account notification requires send_to_notification_topic",
                ));
            }
            if config.cross_account_ids.is_empty() {
                return Err(TrailError::empty_expansion(
                    "cross_account_ids",
                    "cross-account notification requested without trusted accounts",
                ));
            }
        }

        let (min, max) = KEY_DELETION_WINDOW_DAYS;
        if !(min..=max).contains(&config.key_deletion_window_days) {
            return Err(TrailError::OutOfRange {
                field: "key_deletion_window_days".to_string(),
                value: config.key_deletion_window_days,
                min,
                max,
            });
        }
        if config.noncurrent_version_expiration_days == 0 {
            return Err(TrailError::OutOfRange {
                field: "noncurrent_version_expiration_days".to_string(),
                value: 0,
                min: 1,
                max: u32::MAX,
            });
        }

        let topic = if config.send_to_notification_topic {
            let region = identity
                .region
                .as_deref()
                .filter(|r| !r.is_empty())
                .ok_or_else(|| TrailError::missing("region"))?;
            let name = self.sanitizer.sanitize(&config.bucket_name);
            Some(TopicFacts {
                arn: topic_arn(region, account_id, &name),
                name,
            })
        } else {
            None
        };

        if identity.caller_is_root {
            warn!(
                event = "Assemble",
                phase = "Identity",
                account = account_id,
                "provisioning with root account credentials"
            );
        }

        let delivery_accounts = std::iter::once(account_id)
            .chain(config.cross_account_ids.iter().map(String::as_str))
            .unique()
            .collect();

        Ok(Resolved {
            account_id,
            delivery_accounts,
            topic,
        })
    }

    fn key(
        &self,
        config: &Configuration,
        resolved: &Resolved<'_>,
    ) -> Result<ResourceNode, TrailError> {
        let policy = build_key_policy(resolved.account_id, &trail_pattern(resolved.account_id))?;
        Ok(ResourceNode::new(ResourceKind::AwsKmsKey, RESOURCE_NAME)
            .with_attr(
                "description",
                AttrValue::String(format!(
                    "Audit trail encryption key for {}",
                    config.cluster_name
                )),
            )
            .with_attr(
                "deletion_window_in_days",
                AttrValue::Long(i64::from(config.key_deletion_window_days)),
            )
            .with_attr("enable_key_rotation", AttrValue::Bool(true))
            .with_attr("policy", AttrValue::Policy(policy)))
    }

    fn alias(&self, config: &Configuration, key: &ResourceNode) -> ResourceNode {
        let name = format!(
            "alias/{}-cloudtrail",
            self.sanitizer.sanitize(&config.cluster_name)
        );
        ResourceNode::new(ResourceKind::AwsKmsAlias, RESOURCE_NAME)
            .with_attr("name", AttrValue::String(name))
            .with_attr("target_key_id", key.reference("key_id"))
    }

    fn bucket(
        &self,
        config: &Configuration,
        resolved: &Resolved<'_>,
        key: &ResourceNode,
    ) -> Result<ResourceNode, TrailError> {
        let policy = build_storage_policy(&config.bucket_name, &resolved.delivery_accounts)?;
        Ok(ResourceNode::new(ResourceKind::AwsS3Bucket, RESOURCE_NAME)
            .with_attr("bucket", AttrValue::string(&config.bucket_name))
            .with_attr("force_destroy", AttrValue::Bool(false))
            .with_attr(
                "versioning",
                AttrValue::block([("enabled", AttrValue::Bool(true))]),
            )
            .with_attr(
                "logging",
                AttrValue::block([
                    ("target_bucket", AttrValue::string(&config.logging_bucket)),
                    (
                        "target_prefix",
                        AttrValue::String(format!("{}/", config.bucket_name)),
                    ),
                ]),
            )
            .with_attr(
                "lifecycle_rule",
                AttrValue::block([
                    ("id", AttrValue::string("expire-noncurrent-versions")),
                    ("enabled", AttrValue::Bool(true)),
                    (
                        "noncurrent_version_expiration_days",
                        AttrValue::Long(i64::from(config.noncurrent_version_expiration_days)),
                    ),
                ]),
            )
            .with_attr(
                "server_side_encryption",
                AttrValue::block([
                    ("sse_algorithm", AttrValue::string("aws:kms")),
                    ("kms_master_key_id", key.reference("arn")),
                ]),
            )
            .with_attr("policy", AttrValue::Policy(policy)))
    }

    /// The topic and its policy, present or absent together.
    fn topic(
        &self,
        config: &Configuration,
        resolved: &Resolved<'_>,
    ) -> Result<(OptionalResource, OptionalResource), TrailError> {
        let topic_facts = resolved.topic.as_ref();
        let policy = build_notification_policy(
            topic_facts.map(|t| t.arn.as_str()),
            config.allow_cross_account_notification,
            &resolved.delivery_accounts,
        )?;

        let topic = OptionalResource::when(
            topic_facts,
            ResourceKind::AwsSnsTopic,
            RESOURCE_NAME,
            NOTIFICATIONS_OFF,
            |facts| {
                ResourceNode::new(ResourceKind::AwsSnsTopic, RESOURCE_NAME)
                    .with_attr("name", AttrValue::string(&facts.name))
            },
        );
        let topic_policy = OptionalResource::when(
            topic.node().zip(policy),
            ResourceKind::AwsSnsTopicPolicy,
            RESOURCE_NAME,
            NOTIFICATIONS_OFF,
            |(topic, policy)| {
                ResourceNode::new(ResourceKind::AwsSnsTopicPolicy, RESOURCE_NAME)
                    .with_attr("arn", topic.reference("arn"))
                    .with_attr("policy", AttrValue::Policy(policy))
            },
        );

        if !topic.is_present() {
            info!(
                event = "Assemble",
                phase = "Prune",
                resources = "aws_sns_topic,aws_sns_topic_policy",
                reason = NOTIFICATIONS_OFF
            );
        }
        Ok((topic, topic_policy))
    }

    fn trail(
        &self,
        config: &Configuration,
        key: &ResourceNode,
        bucket: &ResourceNode,
        topic: &OptionalResource,
        topic_policy: &OptionalResource,
    ) -> ResourceNode {
        let mut trail = ResourceNode::new(ResourceKind::AwsCloudtrail, RESOURCE_NAME)
            .with_attr(
                "name",
                AttrValue::String(self.sanitizer.sanitize(&config.cluster_name)),
            )
            .with_attr("s3_bucket_name", bucket.reference("id"))
            .with_attr("kms_key_id", key.reference("arn"))
            .with_attr("is_multi_region_trail", AttrValue::Bool(config.global_trail))
            .with_attr("include_global_service_events", AttrValue::Bool(true))
            .with_attr("enable_log_file_validation", AttrValue::Bool(true));

        // The trail can only be created once the topic lets it publish.
        if let (Some(topic), Some(policy)) = (topic.node(), topic_policy.node()) {
            trail = trail
                .with_attr("sns_topic_name", topic.reference("name"))
                .with_dependency(policy.address());
        }

        if let Some(log_group) = &config.log_group {
            trail = trail
                .with_attr(
                    "cloud_watch_logs_group_arn",
                    AttrValue::String(log_group_streams_arn(&log_group.arn)),
                )
                .with_attr(
                    "cloud_watch_logs_role_arn",
                    AttrValue::string(&log_group.role_arn),
                );
        }

        if let Some(selector) = event_selector(config.capture_mode) {
            trail = trail.with_attr("event_selector", selector);
        }
        trail
    }
}

fn public_access_block(bucket: &ResourceNode) -> ResourceNode {
    ResourceNode::new(ResourceKind::AwsS3BucketPublicAccessBlock, RESOURCE_NAME)
        .with_attr("bucket", bucket.reference("id"))
        .with_attr("block_public_acls", AttrValue::Bool(true))
        .with_attr("block_public_policy", AttrValue::Bool(true))
        .with_attr("ignore_public_acls", AttrValue::Bool(true))
        .with_attr("restrict_public_buckets", AttrValue::Bool(true))
}

/// Data-event capture clause, or `None` when nothing is captured.
///
/// Object scope is every bucket in the account; callers narrow it later if needed.
fn event_selector(mode: CaptureMode) -> Option<AttrValue> {
    let read_write_type = mode.read_write_type()?;
    Some(AttrValue::block([
        ("read_write_type", AttrValue::string(read_write_type)),
        ("include_management_events", AttrValue::Bool(true)),
        (
            "data_resource",
            AttrValue::block([
                ("type", AttrValue::string("AWS::S3::Object")),
                ("values", AttrValue::list_of_strings([ALL_OBJECTS_ARN])),
            ]),
        ),
    ]))
}
