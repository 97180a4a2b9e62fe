//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Request and response envelopes from `graphql_client`, HTTP via `reqwest`
//! - Shopify is the source of truth for the catalog: no local copy
//! - In-memory caching via `moka` for catalog reads (5 minute TTL)
//! - Checkout sessions are Shopify carts created with `cartCreate`; the
//!   storefront only keeps the returned `checkoutUrl`
//!
//! # Example
//!
//! ```rust,ignore
//! use cellblock_storefront::shopify::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config.shopify);
//!
//! let product = client.get_product_by_handle("solitary-tee").await?;
//! let url = client.create_checkout(&request.lines).await?;
//! ```

mod storefront;

pub use storefront::StorefrontClient;

use std::fmt;

use thiserror::Error;

/// Errors from talking to the Storefront API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// The request never got a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The response carried GraphQL errors.
    #[error("GraphQL errors: {}", join_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// The body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Neither data nor errors, or a mutation payload without its result.
    #[error("Missing data: {0}")]
    MissingData(&'static str),

    /// No product for the handle.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Throttled; seconds from `Retry-After`.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// `cartCreate` refused the lines.
    #[error("User error: {0}")]
    UserError(String),

    /// The response parsed but holds values the storefront cannot use.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Default)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Response path, dot-joined (`products.edges.0`).
    pub path: Option<String>,
    /// First source location as `(line, column)`.
    pub location: Option<(i64, i64)>,
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(e: graphql_client::Error) -> Self {
        let path = e.path.filter(|p| !p.is_empty()).map(|fragments| {
            fragments
                .iter()
                .map(|f| match f {
                    graphql_client::PathFragment::Key(key) => key.clone(),
                    graphql_client::PathFragment::Index(i) => i.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".")
        });
        let location = e
            .locations
            .and_then(|locs| locs.first().map(|l| (i64::from(l.line), i64::from(l.column))));

        Self {
            message: e.message,
            path,
            location,
        }
    }
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if !self.message.is_empty() {
            parts.push(self.message.clone());
        }
        if let Some(path) = &self.path {
            parts.push(format!("path: {path}"));
        }
        if let Some((line, column)) = self.location {
            parts.push(format!("at line {line}:{column}"));
        }

        if parts.is_empty() {
            f.write_str("(no details)")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

fn join_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
