//! Data model for policy documents and resource nodes.
//!
//! Rendered forms:
//! - Principal: `{"AWS": [...]}` or `{"Service": [...]}`; "any" is `{"AWS": ["*"]}`
//! - Condition: grouped as `{ "<Operator>": { "<key>": [values] } }`
//! - Resource address: `<kind>.<name>`, e.g. `aws_kms_key.audit`
//! - Reference: `<address>.<attribute>`, e.g. `aws_kms_key.audit.arn`

mod attr_value;
mod condition;
mod document;
mod effect;
mod principal;
mod resource;
mod statement;

pub use attr_value::AttrValue;
pub use condition::{Condition, ConditionOperator};
pub use document::{POLICY_VERSION, PolicyDocument};
pub use effect::Effect;
pub use principal::{Principal, PrincipalKind, TRAIL_SERVICE};
pub use resource::{OptionalResource, ResourceKind, ResourceNode, ResourceRef};
pub use statement::PolicyStatement;
