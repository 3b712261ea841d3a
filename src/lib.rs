//! Desired-state builder for an audit-trail delivery pipeline.
//!
//! Given a [`Configuration`] and the caller's [`IdentityFacts`], the
//! [`PipelineAssembler`] decides which resources exist, composes the key,
//! bucket and topic policies, and returns a validated [`ResourceGraph`].
//!
//! ```rust
//! use audit_trail_core::{Configuration, IdentityFacts, PipelineAssembler};
//!
//! let mut config = Configuration::new("prod", "my-trail", "my-logs");
//! config.send_to_notification_topic = true;
//! let identity = IdentityFacts::new("111111111111", "eu-west-1");
//!
//! let graph = PipelineAssembler::new().assemble(&config, &identity).unwrap();
//! assert!(graph.contains("aws_sns_topic.audit"));
//! assert!(graph.dangling_references().is_empty());
//! ```
pub use assembler::{PipelineAssembler, RESOURCE_NAME};
pub use builders::{build_key_policy, build_notification_policy, build_storage_policy};
pub use config::{CaptureMode, Configuration, IdentityFacts, LogGroupRef};
pub use error::TrailError;
pub use graph::ResourceGraph;
pub use naming::CharacterSanitizer;
pub use traits::NameSanitizer;
pub use types::{
    AttrValue, Condition, ConditionOperator, Effect, OptionalResource, PolicyDocument,
    PolicyStatement, Principal, PrincipalKind, ResourceKind, ResourceNode, ResourceRef,
};

pub mod arn;
mod assembler;
pub mod builders;
mod config;
mod error;
mod graph;
mod naming;
mod traits;
pub mod types;
