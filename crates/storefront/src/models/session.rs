//! Session-related types.
//!
//! The session holds only a token naming the shopper's cart; the cart itself
//! lives in the in-memory [`CartRegistry`](crate::services::CartRegistry).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Random identifier of one shopper's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartToken(Uuid);

impl CartToken {
    /// Generate a new random token.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CartToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CartToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Session keys.
pub mod keys {
    /// Key for the shopper's cart token.
    pub const CART_TOKEN: &str = "cart_token";
}
