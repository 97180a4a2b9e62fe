//! Domain models for storefront.

pub mod session;

pub use session::{CartToken, keys as session_keys};
