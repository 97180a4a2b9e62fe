//! Home page route handler: hero plus the contraband collection grid.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use cellblock_core::Product;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::cart::{CartView, current_cart};
use crate::state::AppState;

// =============================================================================
// Product and Image Views
// =============================================================================

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub handle: String,
    pub title: String,
    pub price: String,
    pub featured_image: Option<ImageView>,
    /// First variant, used by the "Lock In" quick add.
    pub quick_add: Option<QuickAddView>,
}

/// Quick add form data for a product card.
#[derive(Clone)]
pub struct QuickAddView {
    pub variant_id: String,
    pub available: bool,
}

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            price: product.price_range.min_variant_price.display(),
            featured_image: product.featured_image().map(|img| ImageView {
                url: img.url.clone(),
                alt: img.alt_text.clone().unwrap_or_else(|| product.title.clone()),
            }),
            quick_add: product.first_variant().map(|v| QuickAddView {
                variant_id: v.id.to_string(),
                available: v.available_for_sale,
            }),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Products for the collection grid.
    pub products: Vec<ProductCardView>,
    /// The catalog could not be reached.
    pub catalog_error: bool,
    pub cart: CartView,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let page_size = state.config().catalog_page_size;

    let (products, catalog_error) = state
        .storefront()
        .get_products(page_size)
        .await
        .map_or_else(
            |e| {
                tracing::error!("Failed to fetch products: {e}");
                (Vec::new(), true)
            },
            |products| (products.iter().map(ProductCardView::from).collect(), false),
        );

    HomeTemplate {
        products,
        catalog_error,
        cart: current_cart(&state, &session).await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::{tee, tee_json, test_app};

    async fn home_html(server: &MockServer) -> String {
        let response = test_app(server)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_card_quick_add_uses_first_variant() {
        let card = ProductCardView::from(&tee());
        let quick_add = card.quick_add.unwrap();
        assert_eq!(quick_add.variant_id, "gid://shopify/ProductVariant/11");
        assert!(quick_add.available);
        assert_eq!(card.price, "USD 25.00");
    }

    #[tokio::test]
    async fn test_home_lists_products() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("GetProducts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "products": { "edges": [ { "node": tee_json() } ] } }
            })))
            .mount(&server)
            .await;

        let html = home_html(&server).await;
        assert!(html.contains("CONTRABAND"));
        assert!(html.contains("Solitary Confinement Tee"));
        assert!(html.contains("Lock In"));
    }

    #[tokio::test]
    async fn test_home_empty_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "products": { "edges": [] } } })),
            )
            .mount(&server)
            .await;

        let html = home_html(&server).await;
        assert!(html.contains("No products found. The cell is empty."));
    }

    #[tokio::test]
    async fn test_home_catalog_error_still_renders() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let html = home_html(&server).await;
        assert!(html.contains("The commissary is closed"));
    }
}
