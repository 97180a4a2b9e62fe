//! Catalog fixtures and a mocked router shared by the storefront's unit tests.

use std::time::Duration;

use cellblock_core::{
    Image, Price, PriceRange, Product, ProductId, ProductOption, SelectedOption, Variant,
    VariantId,
};
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::MockServer;

use crate::config::{ShopifyStorefrontConfig, StorefrontConfig};
use crate::shopify::StorefrontClient;
use crate::state::AppState;

pub const TEE_HANDLE: &str = "solitary-tee";

fn usd(amount: &str) -> Price {
    Price::parse(amount, "USD").unwrap_or_else(|e| panic!("bad fixture price: {e}"))
}

fn variant(id: &str, size: &str, color: &str, amount: &str, available: bool) -> Variant {
    Variant {
        id: VariantId::new(id),
        title: format!("{size} / {color}"),
        price: usd(amount),
        selected_options: vec![
            SelectedOption::new("Size", size),
            SelectedOption::new("Color", color),
        ],
        available_for_sale: available,
    }
}

/// Size × Color tee; M / White is sold out and L / White does not exist.
pub fn tee() -> Product {
    Product {
        id: ProductId::new("gid://shopify/Product/1"),
        handle: TEE_HANDLE.to_string(),
        title: "Solitary Confinement Tee".to_string(),
        description: "Heavyweight cotton.".to_string(),
        options: vec![
            ProductOption {
                name: "Size".to_string(),
                values: vec!["M".to_string(), "L".to_string()],
            },
            ProductOption {
                name: "Color".to_string(),
                values: vec!["Black".to_string(), "White".to_string()],
            },
        ],
        images: vec![Image {
            url: "https://cdn.shopify.com/tee.png".to_string(),
            alt_text: Some("Black tee".to_string()),
        }],
        price_range: PriceRange {
            min_variant_price: usd("25.00"),
            max_variant_price: usd("27.00"),
        },
        variants: vec![
            variant("gid://shopify/ProductVariant/11", "M", "Black", "25.00", true),
            variant("gid://shopify/ProductVariant/12", "M", "White", "25.00", false),
            variant("gid://shopify/ProductVariant/13", "L", "Black", "27.00", true),
        ],
    }
}

/// `tee()` in Storefront API wire format.
pub fn tee_json() -> serde_json::Value {
    let product = tee();
    json!({
        "id": product.id.as_str(),
        "handle": product.handle,
        "title": product.title,
        "description": product.description,
        "options": product.options.iter().map(|o| json!({
            "name": o.name,
            "optionValues": o.values.iter().map(|v| json!({ "name": v })).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
        "images": { "edges": product.images.iter().map(|i| json!({
            "node": { "url": i.url, "altText": i.alt_text }
        })).collect::<Vec<_>>() },
        "priceRange": {
            "minVariantPrice": { "amount": "25.0", "currencyCode": "USD" },
            "maxVariantPrice": { "amount": "27.0", "currencyCode": "USD" }
        },
        "variants": { "edges": product.variants.iter().map(|v| json!({ "node": {
            "id": v.id.as_str(),
            "title": v.title,
            "availableForSale": v.available_for_sale,
            "price": { "amount": v.price.amount.to_string(), "currencyCode": "USD" },
            "selectedOptions": v.selected_options.iter().map(|o| json!({
                "name": o.name, "value": o.value
            })).collect::<Vec<_>>(),
        } })).collect::<Vec<_>>() }
    })
}

/// Configuration for a local test server.
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 3000,
        base_url: Url::parse("http://localhost:3000").unwrap_or_else(|e| panic!("{e}")),
        shopify: ShopifyStorefrontConfig {
            store: "cell-block.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            storefront_private_token: SecretString::from("b1f0e9c3a7d24586afc0de9b7315e2f4"),
        },
        catalog_page_size: 20,
        session_idle: Duration::from_secs(600),
        // Router tests have no peer address; requests carry X-Forwarded-For
        trust_proxy_headers: true,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The full storefront router talking to a mocked Storefront API.
pub fn test_app(server: &MockServer) -> axum::Router {
    let config = test_config();
    let client = StorefrontClient::with_endpoint(
        format!("{}/api/2026-01/graphql.json", server.uri()),
        config.shopify.storefront_private_token.clone(),
    );
    crate::app(AppState::with_client(config, client))
}
