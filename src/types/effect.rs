//! Statement effects.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Whether a statement grants or refuses the listed actions.
///
/// An explicit `Deny` overrides any `Allow`, including grants made outside the
/// document that carries it.
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
    Display,
    EnumString,
)]
pub enum Effect {
    Allow,
    Deny,
}
