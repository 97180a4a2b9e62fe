//! Type conversion functions for Shopify Storefront API responses.

pub mod checkout;
pub mod products;

pub use checkout::{convert_cart_create, convert_checkout_lines};
pub use products::{convert_product, convert_product_connection};
