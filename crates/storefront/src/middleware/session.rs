//! Session middleware configuration.
//!
//! Sessions are held in a bounded moka cache. They store nothing but the
//! cart token, so losing them on restart only empties carts.

use std::time::Duration;

use tower_sessions::{Expiry, SessionManagerLayer, cookie::time};
use tower_sessions_moka_store::MokaStore;

use crate::config::StorefrontConfig;
use crate::services::MAX_CARTS;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cb_session";

/// In-memory session store holding at most one session per live cart.
///
/// Records expire at their own expiry date, so idle sessions are evicted
/// rather than kept until restart.
#[must_use]
pub fn create_session_store() -> MokaStore {
    MokaStore::new(Some(MAX_CARTS))
}

/// Sliding expiry matching the cart registry's idle timeout.
fn idle_expiry(idle: Duration) -> Expiry {
    let seconds = i64::try_from(idle.as_secs()).unwrap_or(i64::MAX);
    Expiry::OnInactivity(time::Duration::seconds(seconds))
}

/// Create the session layer.
///
/// Cookie and server-side record both expire after `session_idle` without a
/// request, the same window after which the shopper's cart is dropped.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(create_session_store())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(idle_expiry(config.session_idle))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{Session, SessionStore};

    use super::*;
    use crate::models::{CartToken, session_keys};

    #[test]
    fn test_idle_expiry_is_sliding() {
        let expiry = idle_expiry(Duration::from_secs(600));
        assert!(matches!(expiry, Expiry::OnInactivity(d) if d.whole_seconds() == 600));
    }

    #[tokio::test]
    async fn test_idle_session_record_is_dropped() {
        let store = Arc::new(create_session_store());
        let session = Session::new(
            None,
            store.clone(),
            Some(idle_expiry(Duration::from_secs(1))),
        );
        session
            .insert(session_keys::CART_TOKEN, CartToken::new())
            .await
            .unwrap();
        session.save().await.unwrap();
        let id = session.id().unwrap();

        assert!(store.load(&id).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(store.load(&id).await.unwrap().is_none());
    }
}
