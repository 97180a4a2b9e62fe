//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (hero + collection grid)
//! GET  /health                    - Health check
//!
//! # Products
//! GET  /products/:handle          - Product detail (?variant= restores selection)
//! GET  /products/:handle/options  - Purchase panel fragment (HTMX)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                      - Cart drawer contents
//! GET  /cart/count                - Cart count badge
//! POST /cart/add                  - Add to cart (toast, triggers cart-updated)
//! POST /cart/update               - Update quantity (drawer, triggers cart-updated)
//! POST /cart/remove               - Remove item (drawer, triggers cart-updated)
//! POST /cart/clear                - Empty the cart (drawer, triggers cart-updated)
//!
//! # Checkout (rate limited)
//! POST /checkout                  - Create Shopify checkout, redirect there
//! ```

pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::StorefrontConfig;
use crate::middleware::checkout_rate_limiter;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{handle}", get(products::show))
        .route("/{handle}/options", get(products::options))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::drawer))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the checkout router. Every call creates a cart on Shopify, so it
/// is rate limited per client IP.
pub fn checkout_routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route("/checkout", post(cart::checkout))
        .route_layer(checkout_rate_limiter(config.trust_proxy_headers))
}

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout redirect
        .merge(checkout_routes(config))
}
