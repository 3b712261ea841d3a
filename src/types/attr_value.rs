//! Attribute values for resource nodes.

use std::collections::BTreeMap;

use serde::Serialize;

use super::document::PolicyDocument;
use super::resource::ResourceRef;

/// Attribute values that can be attached to a resource node.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "value")]
pub enum AttrValue {
    String(String),
    Bool(bool),
    Long(i64),
    List(Vec<AttrValue>),
    /// A nested configuration block, e.g. a lifecycle rule.
    Block(BTreeMap<String, AttrValue>),
    /// An attribute of another node, resolved by the provisioning engine.
    Ref(ResourceRef),
    Policy(PolicyDocument),
}

impl AttrValue {
    pub fn string(s: impl Into<String>) -> Self {
        AttrValue::String(s.into())
    }

    pub fn list_of_strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttrValue::List(items.into_iter().map(|s| AttrValue::String(s.into())).collect())
    }

    pub fn block<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, AttrValue)>,
        K: Into<String>,
    {
        AttrValue::Block(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_policy(&self) -> Option<&PolicyDocument> {
        match self {
            AttrValue::Policy(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_ref_target(&self) -> Option<&ResourceRef> {
        match self {
            AttrValue::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// Every reference held by this value, including inside lists and blocks.
    pub fn references(&self) -> Vec<&ResourceRef> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a ResourceRef>) {
        match self {
            AttrValue::Ref(r) => out.push(r),
            AttrValue::List(xs) => xs.iter().for_each(|x| x.collect_references(out)),
            AttrValue::Block(b) => b.values().for_each(|x| x.collect_references(out)),
            AttrValue::String(_)
            | AttrValue::Bool(_)
            | AttrValue::Long(_)
            | AttrValue::Policy(_) => {}
        }
    }
}
