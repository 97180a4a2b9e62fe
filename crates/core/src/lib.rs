//! Cell Block Merch Core - Storefront domain library.
//!
//! This crate holds the logic of the storefront that does not talk to the
//! network:
//!
//! - [`types`] - Newtype wrappers for Shopify IDs and decimal prices
//! - [`catalog`] - Read-only product and variant records
//! - [`cart`] - The cart state container and its checkout state machine
//! - [`variant`] - Variant selection for the product detail page
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no HTTP clients, no async. The storefront binary owns one [`cart::Cart`]
//! per browsing session and drives the checkout request itself, feeding the
//! result back through [`cart::Cart::finish_checkout`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;
pub mod variant;

pub use cart::{
    Cart, CartChange, CartError, CheckoutLine, CheckoutOutcome, CheckoutRequest, CheckoutState,
    LineItem, ProductRef,
};
pub use catalog::{Image, PriceRange, Product, ProductOption, SelectedOption, Variant};
pub use types::*;
pub use variant::{Selection, VariantSelector};
