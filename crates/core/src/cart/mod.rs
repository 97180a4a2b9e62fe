//! The shopper's cart: line items plus checkout lifecycle.
//!
//! [`Cart`] is the single source of truth for what the shopper has selected.
//! It is mutated only through its methods, each of which reports a
//! [`CartChange`] so the caller can notify views (the storefront maps any
//! real change to a `cart-updated` HTMX event).
//!
//! ## Invariants
//! - Items are unique by `variant_id` (adding the same variant increases quantity)
//! - Stored quantities are always >= 1 (updating to 0 or below removes the item)
//! - A `Ready` checkout URL always describes the current items; any item
//!   mutation drops it
//!
//! ## Currency
//! Totals are grouped by currency. Shopify carts are single-currency in
//! practice, but nothing here enforces it, so [`Cart::total_price`] only
//! answers when exactly one currency is present and [`Cart::subtotals`]
//! reports each currency separately.

mod checkout;
mod line_item;

pub use checkout::{
    CheckoutLine, CheckoutOutcome, CheckoutState, PENDING_CHECKOUT_TIMEOUT_SECS,
};
pub use line_item::{LineItem, ProductRef};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, VariantId};

/// Errors from cart operations that can be refused.
///
/// Item mutations never fail; only starting a checkout can.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Checkout requested for a cart with no items.
    #[error("cannot check out an empty cart")]
    EmptyCart,
    /// A checkout request for this cart is already outstanding.
    #[error("a checkout is already in progress")]
    CheckoutInProgress,
}

/// What a mutation did to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was appended.
    Added {
        /// Variant of the new line.
        variant_id: VariantId,
        /// Its quantity.
        quantity: u32,
    },
    /// An existing line's quantity changed.
    QuantityChanged {
        /// Variant of the line.
        variant_id: VariantId,
        /// The new quantity.
        quantity: u32,
    },
    /// A line was removed.
    Removed {
        /// Variant of the removed line.
        variant_id: VariantId,
    },
    /// Every line was removed.
    Cleared,
    /// Nothing happened (absent variant, zero quantity, same value).
    Unchanged,
}

impl CartChange {
    /// Whether views need to re-render.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// A started checkout: the lines to send and the token to finish it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Snapshot of the cart's lines.
    pub lines: Vec<CheckoutLine>,
    /// Start time; identifies this request when it finishes.
    pub started_at: DateTime<Utc>,
}

/// The cart state container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<LineItem>,
    checkout: CheckoutState,
    /// Bumped on every item mutation.
    revision: u64,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Line items in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up the line for a variant.
    #[must_use]
    pub fn item(&self, variant_id: &VariantId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.variant_id == variant_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Current checkout state.
    #[must_use]
    pub const fn checkout_state(&self) -> &CheckoutState {
        &self.checkout
    }

    /// Whether a checkout request is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.checkout, CheckoutState::Pending { .. })
    }

    /// The checkout URL, once one has been created for the current items.
    #[must_use]
    pub fn checkout_url(&self) -> Option<&str> {
        match &self.checkout {
            CheckoutState::Ready { checkout_url } => Some(checkout_url),
            CheckoutState::Idle | CheckoutState::Pending { .. } => None,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add an item, merging with an existing line for the same variant.
    ///
    /// Always succeeds. An item with quantity 0 is ignored.
    pub fn add_item(&mut self, item: LineItem) -> CartChange {
        if item.quantity == 0 {
            return CartChange::Unchanged;
        }

        let change = if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.variant_id == item.variant_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            CartChange::QuantityChanged {
                variant_id: existing.variant_id.clone(),
                quantity: existing.quantity,
            }
        } else {
            let change = CartChange::Added {
                variant_id: item.variant_id.clone(),
                quantity: item.quantity,
            };
            self.items.push(item);
            change
        };

        self.touch();
        change
    }

    /// Set a line's quantity. Zero or below removes the line.
    ///
    /// No-op if the variant is not in the cart.
    pub fn update_quantity(&mut self, variant_id: &VariantId, quantity: i64) -> CartChange {
        if quantity <= 0 {
            return self.remove_item(variant_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let Some(existing) = self.items.iter_mut().find(|i| &i.variant_id == variant_id) else {
            return CartChange::Unchanged;
        };
        if existing.quantity == quantity {
            return CartChange::Unchanged;
        }

        existing.quantity = quantity;
        self.touch();
        CartChange::QuantityChanged {
            variant_id: variant_id.clone(),
            quantity,
        }
    }

    /// Remove a line. No-op if absent.
    pub fn remove_item(&mut self, variant_id: &VariantId) -> CartChange {
        let before = self.items.len();
        self.items.retain(|i| &i.variant_id != variant_id);
        if self.items.len() == before {
            return CartChange::Unchanged;
        }

        self.touch();
        CartChange::Removed {
            variant_id: variant_id.clone(),
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) -> CartChange {
        if self.items.is_empty() {
            return CartChange::Unchanged;
        }
        self.items.clear();
        self.touch();
        CartChange::Cleared
    }

    /// Record an item mutation: bump the revision and drop a stale URL.
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        if matches!(self.checkout, CheckoutState::Ready { .. }) {
            self.checkout = CheckoutState::Idle;
        }
    }

    // =========================================================================
    // Derived totals
    // =========================================================================

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// One subtotal per currency, in the order currencies first appear.
    #[must_use]
    pub fn subtotals(&self) -> Vec<Price> {
        let mut subtotals: Vec<Price> = Vec::new();
        for item in &self.items {
            let line_total = item.line_total();
            match subtotals
                .iter_mut()
                .find(|p| p.currency_code == line_total.currency_code)
            {
                Some(subtotal) => *subtotal = subtotal.saturating_add(line_total.amount),
                None => subtotals.push(line_total),
            }
        }
        subtotals
    }

    /// The cart total, when every line shares one currency.
    ///
    /// Returns `None` for an empty cart or a mixed-currency cart.
    #[must_use]
    pub fn total_price(&self) -> Option<Price> {
        let mut subtotals = self.subtotals();
        if subtotals.len() == 1 {
            subtotals.pop()
        } else {
            None
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Start a checkout: mark the cart pending and snapshot its lines.
    ///
    /// # Errors
    ///
    /// - [`CartError::EmptyCart`] if there is nothing to buy
    /// - [`CartError::CheckoutInProgress`] if a request started less than
    ///   [`PENDING_CHECKOUT_TIMEOUT_SECS`] ago is still outstanding
    pub fn begin_checkout(&mut self, now: DateTime<Utc>) -> Result<CheckoutRequest, CartError> {
        if self.items.is_empty() {
            return Err(CartError::EmptyCart);
        }
        if self.checkout.is_pending_at(now) {
            return Err(CartError::CheckoutInProgress);
        }

        self.checkout = CheckoutState::Pending {
            since: now,
            revision: self.revision,
        };

        Ok(CheckoutRequest {
            lines: self
                .items
                .iter()
                .map(|i| CheckoutLine {
                    variant_id: i.variant_id.clone(),
                    quantity: i.quantity,
                })
                .collect(),
            started_at: now,
        })
    }

    /// Record the result of a checkout request started by `begin_checkout`.
    ///
    /// A created URL is kept only if the items did not change while the
    /// request was outstanding. Returns `false` when the request is no longer
    /// the one the cart is waiting for (it was abandoned and replaced), in
    /// which case nothing is recorded.
    pub fn finish_checkout(&mut self, request: &CheckoutRequest, outcome: CheckoutOutcome) -> bool {
        let CheckoutState::Pending { since, revision } = self.checkout else {
            return false;
        };
        if since != request.started_at {
            return false;
        }

        self.checkout = match outcome {
            CheckoutOutcome::Created { checkout_url } if revision == self.revision => {
                CheckoutState::Ready { checkout_url }
            }
            CheckoutOutcome::Created { .. } | CheckoutOutcome::Failed { .. } => {
                CheckoutState::Idle
            }
        };
        true
    }
}
