//! Policy statements.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::condition::Condition;
use super::effect::Effect;
use super::principal::Principal;
use crate::error::TrailError;

/// One statement of a policy document.
///
/// Conditions are ANDed. A statement without conditions is unconditional.
/// At most one condition exists per operator and key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyStatement {
    sid: String,
    effect: Effect,
    principal: Principal,
    actions: Vec<String>,
    resources: BTreeSet<String>,
    conditions: Vec<Condition>,
}

impl PolicyStatement {
    pub fn new(sid: impl Into<String>, effect: Effect, principal: Principal) -> Self {
        PolicyStatement {
            sid: sid.into(),
            effect,
            principal,
            actions: Vec::new(),
            resources: BTreeSet::new(),
            conditions: Vec::new(),
        }
    }

    pub fn allow(sid: impl Into<String>, principal: Principal) -> Self {
        PolicyStatement::new(sid, Effect::Allow, principal)
    }

    pub fn deny(sid: impl Into<String>, principal: Principal) -> Self {
        PolicyStatement::new(sid, Effect::Deny, principal)
    }

    /// Append an action. Order is kept and repeats are ignored.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        let action = action.into();
        if !self.actions.contains(&action) {
            self.actions.push(action);
        }
        self
    }

    pub fn with_actions<I, S>(self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        actions.into_iter().fold(self, |s, a| s.with_action(a))
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.insert(resource.into());
        self
    }

    pub fn with_resources<I, S>(self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        resources.into_iter().fold(self, |s, r| s.with_resource(r))
    }

    /// Append a condition.
    ///
    /// IAM reads the values under one operator and key as alternatives, so a
    /// second clause on the same pair cannot be expressed and is rejected.
    pub fn with_condition(mut self, condition: Condition) -> Result<Self, TrailError> {
        let collides = self
            .conditions
            .iter()
            .any(|c| c.operator() == condition.operator() && c.key() == condition.key());
        if collides {
            return Err(TrailError::DuplicateCondition {
                sid: self.sid,
                operator: condition.operator().to_string(),
                key: condition.key().to_string(),
            });
        }
        self.conditions.push(condition);
        Ok(self)
    }

    /// Append the condition only when one is given.
    pub fn with_optional_condition(self, condition: Option<Condition>) -> Result<Self, TrailError> {
        match condition {
            Some(condition) => self.with_condition(condition),
            None => Ok(self),
        }
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn resources(&self) -> &BTreeSet<String> {
        &self.resources
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Conditions grouped the way IAM expects them: operator, then key.
    fn condition_block(&self) -> BTreeMap<&str, BTreeMap<&str, &[String]>> {
        let mut block: BTreeMap<&str, BTreeMap<&str, &[String]>> = BTreeMap::new();
        for cond in &self.conditions {
            let op: &'static str = cond.operator().into();
            block.entry(op).or_default().insert(cond.key(), cond.values());
        }
        block
    }
}

impl Display for PolicyStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}: {} {} [{}] on [{}]",
            self.sid,
            self.effect,
            self.principal,
            self.actions.iter().join(", "),
            self.resources.iter().join(", ")
        )?;
        if self.is_conditional() {
            write!(f, " when {}", self.conditions.iter().join(" && "))?;
        }
        Ok(())
    }
}

impl Serialize for PolicyStatement {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries = if self.is_conditional() { 6 } else { 5 };
        let mut map = ser.serialize_map(Some(entries))?;
        map.serialize_entry("Sid", &self.sid)?;
        map.serialize_entry("Effect", &self.effect)?;
        map.serialize_entry("Principal", &self.principal)?;
        map.serialize_entry("Action", &self.actions)?;
        map.serialize_entry("Resource", &self.resources)?;
        if self.is_conditional() {
            map.serialize_entry("Condition", &self.condition_block())?;
        }
        map.end()
    }
}
