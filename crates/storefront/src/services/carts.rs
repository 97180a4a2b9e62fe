//! Session-bound cart registry.
//!
//! Every browsing session owns one [`Cart`], named by the [`CartToken`] kept
//! in its session. Carts live only in memory and are dropped after the same
//! idle period as the session.
//!
//! Each operation locks one cart for a single synchronous mutation. The lock
//! is never held while waiting on Shopify: checkout is split into
//! `begin_checkout` (locked), the network call (unlocked) and
//! `finish_checkout` (locked again).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cellblock_core::{Cart, CheckoutLine, CheckoutOutcome};
use chrono::Utc;
use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::CartToken;
use crate::shopify::ShopifyError;

/// Upper bound on concurrently live carts.
pub const MAX_CARTS: u64 = 100_000;

/// A cart shared between the requests of one session.
pub type SharedCart = Arc<Mutex<Cart>>;

/// In-memory carts keyed by session cart token.
#[derive(Clone)]
pub struct CartRegistry {
    carts: Cache<CartToken, SharedCart>,
}

impl CartRegistry {
    /// Create a registry whose carts expire after `idle` without access.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            carts: Cache::builder()
                .max_capacity(MAX_CARTS)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// A copy of the cart for rendering. Unknown or missing tokens read as
    /// an empty cart without creating one.
    pub async fn snapshot(&self, token: Option<CartToken>) -> Cart {
        match token {
            Some(token) => match self.carts.get(&token).await {
                Some(cart) => cart.lock().await.clone(),
                None => Cart::new(),
            },
            None => Cart::new(),
        }
    }

    /// Run one mutation against the cart for `token`, creating it if needed.
    pub async fn update<R>(&self, token: CartToken, f: impl FnOnce(&mut Cart) -> R) -> R {
        let cart = self
            .carts
            .get_with(token, async { Arc::new(Mutex::new(Cart::new())) })
            .await;
        let mut guard = cart.lock().await;
        f(&mut guard)
    }

    /// Obtain a checkout URL for the cart behind `token`.
    ///
    /// A URL already issued for the current items is returned as is.
    /// Otherwise `create` is called with the cart's lines; its result is
    /// recorded on the cart and handed back to the caller. The URL is
    /// returned even if the items changed while the request was in flight
    /// (the cart then does not keep it).
    ///
    /// # Errors
    ///
    /// - `AppError::Cart(EmptyCart)` if the cart has no items
    /// - `AppError::Cart(CheckoutInProgress)` if another checkout is pending
    /// - `AppError::Shopify` if `create` fails
    pub async fn checkout<F, Fut>(&self, token: Option<CartToken>, create: F) -> Result<String>
    where
        F: FnOnce(Vec<CheckoutLine>) -> Fut,
        Fut: Future<Output = std::result::Result<String, ShopifyError>>,
    {
        let cart = match token {
            Some(token) => self.carts.get(&token).await,
            None => None,
        };
        // A session without a cart is an empty cart.
        let cart = cart.unwrap_or_default();

        let request = {
            let mut guard = cart.lock().await;
            if let Some(url) = guard.checkout_url() {
                debug!("Reusing checkout URL for unchanged cart");
                return Ok(url.to_string());
            }
            guard.begin_checkout(Utc::now())?
        };

        let result = create(request.lines.clone()).await;

        let outcome = match &result {
            Ok(checkout_url) => CheckoutOutcome::Created {
                checkout_url: checkout_url.clone(),
            },
            Err(e) => CheckoutOutcome::Failed {
                reason: e.to_string(),
            },
        };

        let recorded = cart.lock().await.finish_checkout(&request, outcome);
        if !recorded {
            warn!("Checkout finished after being superseded; result not recorded");
        }

        Ok(result?)
    }
}
