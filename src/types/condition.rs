//! Condition clauses attached to policy statements.

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::Serialize;
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumString, IntoStaticStr};

use crate::error::TrailError;

/// IAM condition operators used by the pipeline policies.
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
    AsRefStr,
    IntoStaticStr,
    StrumDisplay,
    EnumString,
)]
pub enum ConditionOperator {
    StringEquals,
    StringNotEquals,
    StringLike,
    Bool,
    ArnEquals,
    ArnLike,
}

/// A single `operator(key, values)` test.
///
/// Values are never empty: a clause that would test against nothing is not
/// emitted at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Condition {
    operator: ConditionOperator,
    key: String,
    values: Vec<String>,
}

impl Condition {
    pub fn new<I, S>(
        operator: ConditionOperator,
        key: impl Into<String>,
        values: I,
    ) -> Result<Self, TrailError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(TrailError::empty_expansion(
                key,
                format!("{operator} condition requires at least one value"),
            ));
        }
        Ok(Condition {
            operator,
            key,
            values,
        })
    }

    pub fn operator(&self) -> ConditionOperator {
        self.operator
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}({} in [{}])",
            self.operator,
            self.key,
            self.values.iter().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[test]
    fn test_condition_rejects_empty_values() {
        let result = Condition::new(
            ConditionOperator::StringEquals,
            "aws:SourceAccount",
            Vec::<String>::new(),
        );
        match result {
            Err(TrailError::EmptyExpansionSet { field, .. }) => {
                assert_eq!(field, "aws:SourceAccount")
            }
            other => panic!("Expected EmptyExpansionSet, got {other:?}"),
        }
    }

    #[test]
    fn test_condition_preserves_value_order() {
        let cond = Condition::new(ConditionOperator::StringEquals, "k", ["b", "a"]).unwrap();
        assert_eq!(cond.values(), &["b".to_string(), "a".to_string()]);
        assert_eq!(cond.to_string(), "StringEquals(k in [b, a])");
    }

    #[parameterized(
        string_equals = { "StringEquals", ConditionOperator::StringEquals },
        string_like = { "StringLike", ConditionOperator::StringLike },
        bool_op = { "Bool", ConditionOperator::Bool },
        arn_like = { "ArnLike", ConditionOperator::ArnLike },
    )]
    fn test_operator_round_trips_through_str(literal: &str, expected: ConditionOperator) {
        let parsed: ConditionOperator = literal.parse().unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.as_ref(), literal);
    }
}
