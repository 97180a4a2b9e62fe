//! Integration tests for the listing and product detail pages.

use cellblock_integration_tests::{TEE_HANDLE, TestContext, simple_product_json, tee_json, variants};
use reqwest::StatusCode;

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_home_renders_collection() {
    let ctx = TestContext::new().await;
    ctx.mock_products(vec![
        tee_json(),
        simple_product_json("lockdown-mug", "Lockdown Mug", "12.5", false),
    ])
    .await;

    let resp = ctx.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();

    assert!(html.contains("OFFICIAL CONTRABAND"));
    assert!(html.contains("Solitary Confinement Tee"));
    assert!(html.contains("USD 25.00"));
    assert!(html.contains("USD 12.50"));
    // Quick add uses the first variant; a sold-out first variant disables it.
    assert!(html.contains(variants::M_BLACK));
    assert!(html.contains("Out of Stock"));
}

#[tokio::test]
async fn test_home_skips_malformed_products() {
    let ctx = TestContext::new().await;
    let broken = simple_product_json("broken", "Broken Shank", "not-a-price", true);
    ctx.mock_products(vec![broken, tee_json()]).await;

    let html = ctx.get("/").await.text().await.unwrap();

    assert!(!html.contains("Broken Shank"));
    assert!(html.contains("Solitary Confinement Tee"));
}

#[tokio::test]
async fn test_home_empty_cell() {
    let ctx = TestContext::new().await;
    ctx.mock_products(Vec::new()).await;

    let html = ctx.get("/").await.text().await.unwrap();
    assert!(html.contains("No products found. The cell is empty."));
}

#[tokio::test]
async fn test_security_headers_on_pages() {
    let ctx = TestContext::new().await;
    ctx.mock_products(Vec::new()).await;

    let resp = ctx.get("/").await;
    let headers = resp.headers();

    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));
    assert!(
        headers["content-security-policy"]
            .to_str()
            .unwrap()
            .contains("https://cdn.shopify.com")
    );
}

// =============================================================================
// Product detail
// =============================================================================

#[tokio::test]
async fn test_product_page_selects_first_variant() {
    let ctx = TestContext::new().await;
    ctx.mock_product(tee_json()).await;

    let resp = ctx.get(&format!("/products/{TEE_HANDLE}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();

    assert!(html.contains("Limited Edition"));
    assert!(html.contains("USD 25.00"));
    assert!(html.contains("Lock In Cart"));
    assert!(html.contains("Back to Collection"));
    assert!(html.contains("Ships from the asylum"));
}

#[tokio::test]
async fn test_product_page_restores_sold_out_variant() {
    let ctx = TestContext::new().await;
    ctx.mock_product(tee_json()).await;

    let resp = ctx
        .client
        .get(ctx.url(&format!("/products/{TEE_HANDLE}")))
        .query(&[("variant", variants::M_WHITE)])
        .send()
        .await
        .unwrap();
    let html = resp.text().await.unwrap();

    assert!(html.contains("Out of Stock"));
    assert!(!html.contains("Lock In Cart"));
}

#[tokio::test]
async fn test_unknown_product_is_cell_not_found() {
    let ctx = TestContext::new().await;
    ctx.mock_product(serde_json::Value::Null).await;

    let resp = ctx.get("/products/great-escape").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.unwrap().contains("CELL NOT FOUND"));
}

#[tokio::test]
async fn test_option_change_swaps_panel() {
    let ctx = TestContext::new().await;
    ctx.mock_product(tee_json()).await;

    let resp = ctx
        .client
        .get(ctx.url(&format!("/products/{TEE_HANDLE}/options")))
        .header("HX-Request", "true")
        .query(&[
            ("variant", variants::M_BLACK),
            ("option", "Size"),
            ("value", "L"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let replace_url = resp.headers()["hx-replace-url"].to_str().unwrap().to_string();
    assert!(replace_url.starts_with(&format!("/products/{TEE_HANDLE}?variant=")));
    assert!(replace_url.ends_with("ProductVariant%2F13"));

    let html = resp.text().await.unwrap();
    assert!(html.contains("id=\"purchase-panel\""));
    assert!(html.contains("USD 27.00"));
}

#[tokio::test]
async fn test_option_without_variant_keeps_selection() {
    let ctx = TestContext::new().await;
    ctx.mock_product(tee_json()).await;

    // L / White does not exist; L / Black stays selected.
    let resp = ctx
        .client
        .get(ctx.url(&format!("/products/{TEE_HANDLE}/options")))
        .query(&[
            ("variant", variants::L_BLACK),
            ("option", "Color"),
            ("value", "White"),
        ])
        .send()
        .await
        .unwrap();

    assert!(resp.headers().get("hx-replace-url").is_none());
    assert!(resp.text().await.unwrap().contains("USD 27.00"));
}
