//! Core value types for Cell Block Merch.
//!
//! This module provides type-safe wrappers for catalog identifiers and prices.

pub mod id;
pub mod price;

pub use id::{ProductId, VariantId};
pub use price::{CurrencyCode, CurrencyError, Price, PriceError};
