//! Statement principals.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use strum_macros::{AsRefStr, Display as StrumDisplay};

/// Service principal for the audit logging service.
pub const TRAIL_SERVICE: &str = "cloudtrail.amazonaws.com";

/// The kind of identity a principal names, rendered as the IAM principal key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr, StrumDisplay)]
pub enum PrincipalKind {
    #[strum(serialize = "AWS")]
    Account,
    #[strum(serialize = "Service")]
    Service,
}

/// Who a statement applies to.
///
/// "Any principal" is an account principal whose single identifier is `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    kind: PrincipalKind,
    identifiers: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(kind: PrincipalKind, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Principal {
            kind,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }

    /// The root identity of an account, e.g. `arn:aws:iam::111111111111:root`.
    pub fn account_root(account_id: &str) -> Self {
        Principal::new(
            PrincipalKind::Account,
            [format!("arn:aws:iam::{account_id}:root")],
        )
    }

    pub fn service(service: &str) -> Self {
        Principal::new(PrincipalKind::Service, [service])
    }

    pub fn any() -> Self {
        Principal::new(PrincipalKind::Account, ["*"])
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }

    pub fn identifiers(&self) -> &BTreeSet<String> {
        &self.identifiers
    }

    pub fn is_any(&self) -> bool {
        self.kind == PrincipalKind::Account && self.identifiers.contains("*")
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}[{}]", self.kind, self.identifiers.iter().join(","))
    }
}

impl Serialize for Principal {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = ser.serialize_map(Some(1))?;
        map.serialize_entry(self.kind.as_ref(), &self.identifiers)?;
        map.end()
    }
}
