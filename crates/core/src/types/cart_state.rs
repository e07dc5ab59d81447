//! Cart lifecycle state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a cart state from its wire form.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid cart state: {0}")]
pub struct CartStateError(pub String);

/// Lifecycle state of a shopping cart.
///
/// A cart is created `Active` and accepts line mutations only while active.
/// `Converted` (checked out) and `Abandoned` are terminal: once a cart
/// leaves `Active` it is no longer the user's active cart, so the next cart
/// access creates a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    /// The single cart per user currently accepting mutations.
    #[default]
    Active,
    /// The cart went through checkout. Terminal.
    Converted,
    /// The user explicitly abandoned the cart. Terminal.
    Abandoned,
}

impl CartState {
    /// Whether this state accepts no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Converted | Self::Abandoned)
    }

    /// The snake_case wire form, matching the database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Converted => "converted",
            Self::Abandoned => "abandoned",
        }
    }
}

impl std::fmt::Display for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CartState {
    type Err = CartStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "converted" => Ok(Self::Converted),
            "abandoned" => Ok(Self::Abandoned),
            other => Err(CartStateError(other.to_owned())),
        }
    }
}
