//! Integration tests for Cell Block Merch.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cellblock-integration-tests
//! ```
//!
//! Each test starts the storefront on an ephemeral port and points it at a
//! `wiremock` server standing in for the Shopify Storefront API. Requests go
//! through a real `reqwest` client with a cookie store, so the session cookie
//! carries the cart between requests like a browser would.
//!
//! # Test Categories
//!
//! - `storefront_catalog` - Listing and product detail pages
//! - `storefront_cart` - Cart drawer, badge and checkout flow

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::time::Duration;

use cellblock_storefront::{
    app,
    config::{ShopifyStorefrontConfig, StorefrontConfig},
    shopify::StorefrontClient,
    state::AppState,
};
use reqwest::{Client, redirect};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Storefront API version used by the mocked endpoint.
pub const API_VERSION: &str = "2026-01";

/// Handle of the two-axis tee served by [`tee_json`].
pub const TEE_HANDLE: &str = "solitary-tee";

/// Variant IDs of the tee.
pub mod variants {
    /// M / Black, 25.00, in stock.
    pub const M_BLACK: &str = "gid://shopify/ProductVariant/11";
    /// M / White, sold out.
    pub const M_WHITE: &str = "gid://shopify/ProductVariant/12";
    /// L / Black, 27.00, in stock.
    pub const L_BLACK: &str = "gid://shopify/ProductVariant/13";
}

/// A running storefront wired to a mocked Shopify.
pub struct TestContext {
    /// Client with a cookie store; does not follow redirects.
    pub client: Client,
    /// Base URL of the running storefront.
    pub base_url: String,
    /// The mocked Storefront API.
    pub shopify: MockServer,
}

impl TestContext {
    /// Start a storefront on an ephemeral port.
    pub async fn new() -> Self {
        let shopify = MockServer::start().await;

        let token = SecretString::from("b1f0e9c3a7d24586afc0de9b7315e2f4");
        let config = StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: Url::parse("http://127.0.0.1").unwrap(),
            shopify: ShopifyStorefrontConfig {
                store: "cell-block.myshopify.com".to_string(),
                api_version: API_VERSION.to_string(),
                storefront_private_token: token.clone(),
            },
            catalog_page_size: 20,
            session_idle: Duration::from_secs(600),
            trust_proxy_headers: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let storefront = StorefrontClient::with_endpoint(
            format!("{}/api/{API_VERSION}/graphql.json", shopify.uri()),
            token,
        );
        let router = app(AppState::with_client(config, storefront));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            client,
            base_url: format!("http://{addr}"),
            shopify,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a page.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// POST a form as htmx would.
    pub async fn htmx_post(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// POST a form as a browser without JavaScript would.
    pub async fn plain_post(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Add `quantity` of a tee variant through the HTMX endpoint.
    pub async fn add_tee(&self, variant_id: &str, quantity: u32) -> reqwest::Response {
        let quantity = quantity.to_string();
        self.htmx_post(
            "/cart/add",
            &[
                ("handle", TEE_HANDLE),
                ("variant_id", variant_id),
                ("quantity", &quantity),
            ],
        )
        .await
    }

    // =========================================================================
    // Shopify mocks
    // =========================================================================

    fn graphql(operation: &str) -> wiremock::MockBuilder {
        Mock::given(method("POST"))
            .and(path(format!("/api/{API_VERSION}/graphql.json")))
            .and(body_string_contains(operation))
    }

    /// Serve `products` for the listing query.
    pub async fn mock_products(&self, products: Vec<Value>) {
        let edges: Vec<Value> = products.into_iter().map(|p| json!({ "node": p })).collect();
        Self::graphql("GetProducts")
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "products": { "edges": edges } } })),
            )
            .mount(&self.shopify)
            .await;
    }

    /// Serve `product` (or `null`) for the by-handle query.
    pub async fn mock_product(&self, product: Value) {
        Self::graphql("GetProductByHandle")
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "product": product } })),
            )
            .mount(&self.shopify)
            .await;
    }

    /// Answer `cartCreate` with a checkout URL, expecting `times` calls.
    pub async fn mock_checkout(&self, checkout_url: &str, times: u64) {
        Self::graphql("CreateCart")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "cartCreate": {
                    "cart": { "id": "gid://shopify/Cart/c1", "checkoutUrl": checkout_url },
                    "userErrors": []
                } }
            })))
            .expect(times)
            .mount(&self.shopify)
            .await;
    }

    /// Answer `cartCreate` with a user error.
    pub async fn mock_checkout_rejected(&self, message: &str) {
        Self::graphql("CreateCart")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "cartCreate": {
                    "cart": null,
                    "userErrors": [ { "field": ["lines"], "message": message, "code": "INVALID" } ]
                } }
            })))
            .mount(&self.shopify)
            .await;
    }
}

/// Storefront API JSON for a Size × Color tee.
///
/// M / White is sold out and L / White does not exist.
#[must_use]
pub fn tee_json() -> Value {
    let variant = |id: &str, size: &str, color: &str, amount: &str, available: bool| {
        json!({ "node": {
            "id": id,
            "title": format!("{size} / {color}"),
            "availableForSale": available,
            "price": { "amount": amount, "currencyCode": "USD" },
            "selectedOptions": [
                { "name": "Size", "value": size },
                { "name": "Color", "value": color }
            ]
        } })
    };

    json!({
        "id": "gid://shopify/Product/1",
        "handle": TEE_HANDLE,
        "title": "Solitary Confinement Tee",
        "description": "Heavyweight cotton. Fits every inmate.",
        "options": [
            { "name": "Size", "optionValues": [ { "name": "M" }, { "name": "L" } ] },
            { "name": "Color", "optionValues": [ { "name": "Black" }, { "name": "White" } ] }
        ],
        "images": { "edges": [
            { "node": { "url": "https://cdn.shopify.com/s/files/tee.png", "altText": null } }
        ] },
        "priceRange": {
            "minVariantPrice": { "amount": "25.0", "currencyCode": "USD" },
            "maxVariantPrice": { "amount": "27.0", "currencyCode": "USD" }
        },
        "variants": { "edges": [
            variant(variants::M_BLACK, "M", "Black", "25.0", true),
            variant(variants::M_WHITE, "M", "White", "25.0", false),
            variant(variants::L_BLACK, "L", "Black", "27.0", true)
        ] }
    })
}

/// Storefront API JSON for a single-variant product.
#[must_use]
pub fn simple_product_json(handle: &str, title: &str, amount: &str, available: bool) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{handle}"),
        "handle": handle,
        "title": title,
        "description": "",
        "options": [ { "name": "Title", "optionValues": [ { "name": "Default Title" } ] } ],
        "images": { "edges": [] },
        "priceRange": {
            "minVariantPrice": { "amount": amount, "currencyCode": "USD" },
            "maxVariantPrice": { "amount": amount, "currencyCode": "USD" }
        },
        "variants": { "edges": [ { "node": {
            "id": format!("gid://shopify/ProductVariant/{handle}"),
            "title": "Default Title",
            "availableForSale": available,
            "price": { "amount": amount, "currencyCode": "USD" },
            "selectedOptions": [ { "name": "Title", "value": "Default Title" } ]
        } } ] }
    })
}
