//! Policy documents: ordered statements with unique statement ids.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::TrailError;

use super::effect::Effect;
use super::statement::PolicyStatement;

/// IAM policy language version emitted in every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// An ordered set of statements.
///
/// Evaluation does not depend on statement order, but the order is fixed by
/// construction so that rendered documents are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PolicyDocument {
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement, rejecting a statement id that is already in use.
    pub fn push(&mut self, statement: PolicyStatement) -> Result<(), TrailError> {
        if self.statement(statement.sid()).is_some() {
            return Err(TrailError::DuplicateStatementId {
                sid: statement.sid().to_string(),
            });
        }
        self.statements.push(statement);
        Ok(())
    }

    /// Build a document from statements in order.
    pub fn from_statements<I>(statements: I) -> Result<Self, TrailError>
    where
        I: IntoIterator<Item = PolicyStatement>,
    {
        let mut doc = PolicyDocument::new();
        for statement in statements {
            doc.push(statement)?;
        }
        Ok(doc)
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn statement(&self, sid: &str) -> Option<&PolicyStatement> {
        self.statements.iter().find(|s| s.sid() == sid)
    }

    pub fn sids(&self) -> Vec<&str> {
        self.statements.iter().map(PolicyStatement::sid).collect()
    }

    /// Statements with the given effect, in document order.
    pub fn with_effect(&self, effect: Effect) -> impl Iterator<Item = &PolicyStatement> {
        self.statements.iter().filter(move |s| s.effect() == effect)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Display for PolicyDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl Serialize for PolicyDocument {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = ser.serialize_struct("PolicyDocument", 2)?;
        s.serialize_field("Version", POLICY_VERSION)?;
        s.serialize_field("Statement", &self.statements)?;
        s.end()
    }
}
