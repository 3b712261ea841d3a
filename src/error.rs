use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TrailError {
    #[error("configuration conflict on `{field}`: {reason}")]
    ConfigurationConflict { field: String, reason: String },

    #[error("missing required identity fact `{field}`")]
    MissingRequiredIdentity { field: String },

    #[error("empty expansion set for `{field}`: {reason}")]
    EmptyExpansionSet { field: String, reason: String },

    #[error("invalid identifier in `{field}`: '{value}'")]
    InvalidIdentifier { field: String, value: String },

    #[error("`{field}` is {value}, expected {min}..={max}")]
    OutOfRange {
        field: String,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("duplicate statement id `{sid}` in policy document")]
    DuplicateStatementId { sid: String },

    #[error("statement `{sid}` already has a `{operator}` condition on `{key}`")]
    DuplicateCondition {
        sid: String,
        operator: String,
        key: String,
    },

    #[error("resource `{address}` is already present in the graph")]
    DuplicateResource { address: String },

    #[error("resource `{from}` references unknown resource `{to}`")]
    DanglingReference { from: String, to: String },

    #[error("dependency cycle involving `{address}`")]
    DependencyCycle { address: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl TrailError {
    pub(crate) fn conflict(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TrailError::ConfigurationConflict {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        TrailError::MissingRequiredIdentity {
            field: field.into(),
        }
    }

    pub(crate) fn empty_expansion(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TrailError::EmptyExpansionSet {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The configuration or graph field the error points at, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            TrailError::ConfigurationConflict { field, .. }
            | TrailError::MissingRequiredIdentity { field }
            | TrailError::EmptyExpansionSet { field, .. }
            | TrailError::InvalidIdentifier { field, .. }
            | TrailError::OutOfRange { field, .. } => Some(field),
            TrailError::DuplicateStatementId { sid }
            | TrailError::DuplicateCondition { sid, .. } => Some(sid),
            TrailError::DuplicateResource { address }
            | TrailError::DependencyCycle { address } => Some(address),
            TrailError::DanglingReference { from, .. } => Some(from),
            TrailError::InvalidFormat(_) => None,
        }
    }
}

impl From<serde_json::Error> for TrailError {
    fn from(err: serde_json::Error) -> Self {
        TrailError::InvalidFormat(err.to_string())
    }
}
