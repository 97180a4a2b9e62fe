//! Checkout lifecycle of a cart.
//!
//! ```text
//!            begin_checkout()
//!   Idle ───────────────────────► Pending { since, revision }
//!    ▲                                 │
//!    │  Failed / stale Created         │ Created, items unchanged
//!    └─────────────────────────────────┤
//!    ▲                                 ▼
//!    └── any item mutation ───── Ready { checkout_url }
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::types::VariantId;

/// Seconds after which a pending checkout is treated as abandoned.
///
/// A request future that is dropped (client disconnect) never reports back,
/// so the pending flag must not gate the cart forever.
pub const PENDING_CHECKOUT_TIMEOUT_SECS: i64 = 120;

/// Where the cart is in the checkout flow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutState {
    /// No checkout requested, or the last one failed or went stale.
    #[default]
    Idle,
    /// A checkout-session request is outstanding.
    Pending {
        /// When the request started.
        since: DateTime<Utc>,
        /// Cart revision the request was built from.
        revision: u64,
    },
    /// A checkout session exists for the current items.
    Ready {
        /// Where to send the shopper to pay.
        checkout_url: String,
    },
}

impl CheckoutState {
    /// Whether a request is outstanding and still counts as live at `now`.
    #[must_use]
    pub fn is_pending_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Pending { since, .. } => {
                now.signed_duration_since(*since)
                    < TimeDelta::seconds(PENDING_CHECKOUT_TIMEOUT_SECS)
            }
            Self::Idle | Self::Ready { .. } => false,
        }
    }
}

/// A `(variant, quantity)` pair sent to the checkout API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    /// Variant (Shopify merchandise) ID.
    pub variant_id: VariantId,
    /// Quantity to purchase.
    pub quantity: u32,
}

/// Result of a checkout-session request, as recorded by the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The platform issued a checkout URL.
    Created {
        /// Redirect URL for completing payment.
        checkout_url: String,
    },
    /// The request failed; the reason is for logging only.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}
