//! Business logic services for storefront.
//!
//! # Services
//!
//! - `carts` - In-memory, session-bound cart registry and checkout flow

pub mod carts;

pub use carts::{CartRegistry, MAX_CARTS, SharedCart};
