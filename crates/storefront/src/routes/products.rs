//! Product route handlers.
//!
//! The detail page renders a purchase panel driven by a
//! [`VariantSelector`]. Option buttons are plain links to
//! `?variant=...`, upgraded by HTMX to swap just the panel.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use cellblock_core::{Product, Selection, VariantId, VariantSelector};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use url::form_urlencoded;

use crate::error::Result;
use crate::filters;
use crate::routes::cart::{CartView, current_cart};
use crate::shopify::ShopifyError;
use crate::state::AppState;

/// Selling points listed under the purchase panel.
const FEATURES: [&str; 4] = [
    "Dark humor guaranteed",
    "Limited edition contraband",
    "Ships from the asylum",
    "No refunds (you're already committed)",
];

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub handle: String,
    pub title: String,
    pub description: String,
    pub image: Option<ImageView>,
}

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            image: product.featured_image().map(|img| ImageView {
                url: img.url.clone(),
                alt: img.alt_text.clone().unwrap_or_else(|| product.title.clone()),
            }),
        }
    }
}

/// One value button in an option row.
#[derive(Clone)]
pub struct OptionValueView {
    pub value: String,
    pub selected: bool,
    /// A variant with this combination exists.
    pub exists: bool,
    /// That variant can be bought.
    pub available: bool,
    /// Full-page link (works without JavaScript).
    pub href: String,
    /// Panel fragment URL for HTMX.
    pub hx_get: String,
}

/// One option axis (e.g. "Size") and its values.
#[derive(Clone)]
pub struct OptionAxisView {
    pub name: String,
    pub values: Vec<OptionValueView>,
}

/// Purchase panel display data: price, option rows and the add form.
#[derive(Clone)]
pub struct PurchasePanelView {
    pub handle: String,
    pub variant_id: Option<String>,
    pub price: String,
    pub axes: Vec<OptionAxisView>,
    pub can_add: bool,
    /// Return path for the add form's plain post.
    pub return_to: String,
}

impl PurchasePanelView {
    /// Render the selector's current state.
    #[must_use]
    pub fn new(selector: &VariantSelector<'_>) -> Self {
        let product = selector.product();
        let active = selector.active();
        let active_id = active.map(|v| &v.id);

        let axes = product
            .options
            .iter()
            .map(|option| OptionAxisView {
                name: option.name.clone(),
                values: option
                    .values
                    .iter()
                    .map(|value| {
                        let candidate = selector.candidate(&option.name, value);
                        OptionValueView {
                            value: value.clone(),
                            selected: selector.selected_value(&option.name) == Some(value.as_str()),
                            exists: candidate.is_some(),
                            available: candidate.is_some_and(|v| v.available_for_sale),
                            href: candidate.map_or_else(
                                || detail_href(&product.handle, active_id),
                                |v| detail_href(&product.handle, Some(&v.id)),
                            ),
                            hx_get: options_href(&product.handle, active_id, &option.name, value),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            handle: product.handle.clone(),
            variant_id: active.map(|v| v.id.to_string()),
            price: active.map_or_else(
                || product.price_range.min_variant_price.display(),
                |v| v.price.display(),
            ),
            axes,
            can_add: selector.can_add_to_cart(),
            return_to: detail_href(&product.handle, active_id),
        }
    }
}

/// `/products/{handle}?variant=...`
fn detail_href(handle: &str, variant: Option<&VariantId>) -> String {
    match variant {
        Some(id) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("variant", id.as_str())
                .finish();
            format!("/products/{handle}?{query}")
        }
        None => format!("/products/{handle}"),
    }
}

/// `/products/{handle}/options?variant=...&option=...&value=...`
fn options_href(handle: &str, variant: Option<&VariantId>, option: &str, value: &str) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(id) = variant {
        query.append_pair("variant", id.as_str());
    }
    query.append_pair("option", option).append_pair("value", value);
    format!("/products/{handle}/options?{}", query.finish())
}

/// Detail page query parameters.
#[derive(Debug, Deserialize)]
pub struct VariantQuery {
    pub variant: Option<String>,
}

/// Option change query parameters.
#[derive(Debug, Deserialize)]
pub struct OptionQuery {
    pub variant: Option<String>,
    pub option: String,
    pub value: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    pub panel: PurchasePanelView,
    pub features: &'static [&'static str],
    pub cart: CartView,
}

/// "Cell not found" page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub cart: CartView,
}

/// Purchase panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/purchase_panel.html")]
pub struct PurchasePanelTemplate {
    pub panel: PurchasePanelView,
}

/// Display product detail page.
///
/// `?variant=` restores a selection; unknown ids fall back to the first
/// variant. A missing product renders the not-found page with 404, an
/// unreachable catalog the same page with 503.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(handle): Path<String>,
    Query(query): Query<VariantQuery>,
) -> Response {
    let cart = current_cart(&state, &session).await;

    let product = match state.storefront().get_product_by_handle(&handle).await {
        Ok(product) => product,
        Err(e) => {
            let status = if matches!(e, ShopifyError::NotFound(_)) {
                StatusCode::NOT_FOUND
            } else {
                tracing::error!(error = %e, "Failed to load product");
                StatusCode::SERVICE_UNAVAILABLE
            };
            return (status, ProductNotFoundTemplate { cart }).into_response();
        }
    };

    let requested = query.variant.map(VariantId::new);
    let selector = VariantSelector::with_variant(&product, requested.as_ref());

    ProductShowTemplate {
        product: ProductView::from(&product),
        panel: PurchasePanelView::new(&selector),
        features: &FEATURES,
        cart,
    }
    .into_response()
}

/// Apply an option choice and return the refreshed purchase panel (HTMX).
///
/// When the choice selects a different variant the browser URL is replaced
/// so a reload keeps the selection. A combination that matches no variant
/// leaves the panel as it was.
#[instrument(skip(state))]
pub async fn options(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<OptionQuery>,
) -> Result<Response> {
    let product = state.storefront().get_product_by_handle(&handle).await?;

    let requested = query.variant.map(VariantId::new);
    let mut selector = VariantSelector::with_variant(&product, requested.as_ref());
    let selection = selector.select_option(&query.option, &query.value);

    let panel = PurchasePanelTemplate {
        panel: PurchasePanelView::new(&selector),
    };

    match selection {
        Selection::Selected => {
            let url = detail_href(&product.handle, selector.active().map(|v| &v.id));
            Ok((AppendHeaders([("HX-Replace-Url", url)]), panel).into_response())
        }
        Selection::Unchanged => Ok(panel.into_response()),
        Selection::NoMatch | Selection::UnknownOption => {
            tracing::debug!(?selection, "Option choice ignored");
            Ok(panel.into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::{TEE_HANDLE, tee, tee_json, test_app};

    async fn mount_product(server: &MockServer, product: serde_json::Value) {
        Mock::given(method("POST"))
            .and(body_string_contains("GetProductByHandle"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "product": product } })),
            )
            .mount(server)
            .await;
    }

    async fn get(server: &MockServer, uri: &str) -> Response {
        test_app(server)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_detail_href_encodes_variant() {
        let id = VariantId::new("gid://shopify/ProductVariant/13");
        assert_eq!(
            detail_href("solitary-tee", Some(&id)),
            "/products/solitary-tee?variant=gid%3A%2F%2Fshopify%2FProductVariant%2F13"
        );
        assert_eq!(detail_href("solitary-tee", None), "/products/solitary-tee");
    }

    #[test]
    fn test_options_href_encodes_values() {
        let href = options_href("solitary-tee", None, "Fit Type", "Slim & Tall");
        assert_eq!(
            href,
            "/products/solitary-tee/options?option=Fit+Type&value=Slim+%26+Tall"
        );
    }

    #[test]
    fn test_panel_marks_selection_and_availability() {
        let product = tee();
        let selector = VariantSelector::new(&product);
        let panel = PurchasePanelView::new(&selector);

        assert_eq!(panel.price, "USD 25.00");
        assert!(panel.can_add);

        let color = &panel.axes[1];
        assert_eq!(color.name, "Color");
        let black = &color.values[0];
        let white = &color.values[1];
        assert!(black.selected && black.available);
        assert!(!white.selected && white.exists && !white.available);
    }

    #[test]
    fn test_panel_flags_missing_combination() {
        let product = tee();
        let id = VariantId::new("gid://shopify/ProductVariant/13");
        let selector = VariantSelector::with_variant(&product, Some(&id));
        let panel = PurchasePanelView::new(&selector);

        // L / White does not exist.
        let white = &panel.axes[1].values[1];
        assert!(!white.exists);
        assert_eq!(white.href, panel.return_to);
    }

    #[tokio::test]
    async fn test_show_restores_variant_from_query() {
        let server = MockServer::start().await;
        mount_product(&server, tee_json()).await;

        let response = get(
            &server,
            "/products/solitary-tee?variant=gid%3A%2F%2Fshopify%2FProductVariant%2F12",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Solitary Confinement Tee"));
        assert!(html.contains("Out of Stock"));
        assert!(html.contains("Limited Edition"));
    }

    #[tokio::test]
    async fn test_show_missing_product_is_cell_not_found() {
        let server = MockServer::start().await;
        mount_product(&server, serde_json::Value::Null).await;

        let response = get(&server, "/products/escaped").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("CELL NOT FOUND"));
    }

    #[tokio::test]
    async fn test_show_catalog_down_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let response = get(&server, &format!("/products/{TEE_HANDLE}")).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_options_selects_and_replaces_url() {
        let server = MockServer::start().await;
        mount_product(&server, tee_json()).await;

        let response = get(
            &server,
            "/products/solitary-tee/options?variant=gid%3A%2F%2Fshopify%2FProductVariant%2F11&option=Size&value=L",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["hx-replace-url"],
            "/products/solitary-tee?variant=gid%3A%2F%2Fshopify%2FProductVariant%2F13"
        );
        assert!(body_text(response).await.contains("USD 27.00"));
    }

    #[tokio::test]
    async fn test_options_no_match_keeps_panel() {
        let server = MockServer::start().await;
        mount_product(&server, tee_json()).await;

        let response = get(
            &server,
            "/products/solitary-tee/options?variant=gid%3A%2F%2Fshopify%2FProductVariant%2F13&option=Color&value=White",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("hx-replace-url").is_none());
        assert!(response.headers().get(header::LOCATION).is_none());
        assert!(body_text(response).await.contains("USD 27.00"));
    }
}
