//! HTMX request detection.
//!
//! Handlers answer HTMX requests with fragments and `HX-*` headers, and plain
//! form posts with `303 See Other` redirects.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Header set by htmx on every request it issues.
pub const HX_REQUEST: &str = "hx-request";

/// Whether the request was issued by htmx.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(HxRequest(is_htmx): HxRequest) -> impl IntoResponse {
///     if is_htmx { "fragment" } else { "page" }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRequest(pub bool);

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get(HX_REQUEST)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        Ok(Self(is_htmx))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(header: Option<&str>) -> bool {
        let mut builder = Request::builder().uri("/cart/add");
        if let Some(value) = header {
            builder = builder.header(HX_REQUEST, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        let HxRequest(is_htmx) = HxRequest::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        is_htmx
    }

    #[tokio::test]
    async fn test_detects_htmx() {
        assert!(extract(Some("true")).await);
    }

    #[tokio::test]
    async fn test_plain_requests() {
        assert!(!extract(None).await);
        assert!(!extract(Some("false")).await);
    }
}
