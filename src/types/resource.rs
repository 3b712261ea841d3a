//! Resource nodes of the pipeline graph.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

use super::attr_value::AttrValue;

/// Resource types the pipeline can emit, named as the provisioning engine knows them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
    StrumDisplay,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    AwsKmsKey,
    AwsKmsAlias,
    AwsS3Bucket,
    AwsS3BucketPublicAccessBlock,
    AwsCloudtrail,
    AwsSnsTopic,
    AwsSnsTopicPolicy,
}

impl ResourceKind {
    /// Address of the resource with the given logical name, e.g. `aws_kms_key.audit`.
    pub fn address(&self, name: &str) -> String {
        format!("{}.{}", self.as_ref(), name)
    }
}

/// A reference to an attribute of another node, e.g. `aws_kms_key.audit.arn`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    resource: String,
    attribute: String,
}

impl ResourceRef {
    pub fn new(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        ResourceRef {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl Display for ResourceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.resource, self.attribute)
    }
}

/// A single resource description.
///
/// References held in attributes are recorded as dependencies when the
/// attribute is set, so `depends_on` always covers every reference.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct ResourceNode {
    address: String,
    kind: ResourceKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, AttrValue>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    depends_on: BTreeSet<String>,
}

impl Display for ResourceNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.address)
    }
}

impl ResourceNode {
    pub fn new(kind: ResourceKind, name: &str) -> Self {
        ResourceNode {
            address: kind.address(name),
            kind,
            attributes: BTreeMap::new(),
            depends_on: BTreeSet::new(),
        }
    }

    /// Set an attribute, returning the updated node.
    pub fn with_attr(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: AttrValue) {
        for r in value.references() {
            self.depends_on.insert(r.resource().to_string());
        }
        self.attributes.insert(key.into(), value);
    }

    /// Add an ordering dependency that no attribute expresses.
    pub fn with_dependency(mut self, address: impl Into<String>) -> Self {
        self.depends_on.insert(address.into());
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    pub fn depends_on(&self) -> &BTreeSet<String> {
        &self.depends_on
    }

    /// A reference to one of this node's attributes.
    pub fn reference(&self, attribute: &str) -> AttrValue {
        AttrValue::Ref(ResourceRef::new(self.address.clone(), attribute))
    }
}

/// A node that exists only when its configuration predicate holds.
///
/// Absence is a typed variant rather than an empty node, so the graph can
/// tell a pruned resource apart from one that was never declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionalResource {
    Present(ResourceNode),
    Absent {
        address: String,
        reason: &'static str,
    },
}

impl OptionalResource {
    /// `Present(build(value))` when `value` is set, otherwise `Absent` at the
    /// address `kind.name`.
    pub fn when<T, F>(
        value: Option<T>,
        kind: ResourceKind,
        name: &str,
        reason: &'static str,
        build: F,
    ) -> Self
    where
        F: FnOnce(T) -> ResourceNode,
    {
        match value {
            Some(value) => OptionalResource::Present(build(value)),
            None => OptionalResource::Absent {
                address: kind.address(name),
                reason,
            },
        }
    }

    pub fn address(&self) -> &str {
        match self {
            OptionalResource::Present(node) => node.address(),
            OptionalResource::Absent { address, .. } => address,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, OptionalResource::Present(_))
    }

    pub fn node(&self) -> Option<&ResourceNode> {
        match self {
            OptionalResource::Present(node) => Some(node),
            OptionalResource::Absent { .. } => None,
        }
    }
}
