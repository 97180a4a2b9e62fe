//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The session holds a cart token naming the shopper's cart in the
//! [`CartRegistry`](crate::services::CartRegistry). Every mutation that
//! actually changes the cart emits the `cart-updated` event, which makes the
//! header badge and the drawer re-fetch themselves.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use cellblock_core::{Cart, CartChange, LineItem, VariantId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::HxRequest;
use crate::models::{CartToken, session_keys};
use crate::state::AppState;

/// HTMX event fired after every real cart change.
pub const CART_UPDATED: &str = "cart-updated";

/// Where plain form posts from the drawer land.
const DRAWER_FALLBACK: &str = "/#cart";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub variant_id: String,
    pub handle: String,
    pub title: String,
    pub options: String,
    pub quantity: u32,
    pub decrement_to: u32,
    pub increment_to: u32,
    pub unit_price: String,
    pub line_total: String,
    pub image: Option<ImageView>,
}

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
    /// One entry per currency in the cart.
    pub subtotals: Vec<String>,
    pub is_loading: bool,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            item_count: 0,
            subtotals: Vec::new(),
            is_loading: false,
        }
    }

    /// Drawer subheading.
    #[must_use]
    pub fn description(&self) -> String {
        match self.item_count {
            0 => "Empty cell".to_string(),
            1 => "1 contraband item".to_string(),
            n => format!("{n} contraband items"),
        }
    }

    /// Whether the checkout button is enabled.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        !self.items.is_empty() && !self.is_loading
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            item_count: cart.total_quantity(),
            subtotals: cart.subtotals().iter().map(|p| p.display()).collect(),
            is_loading: cart.is_loading(),
        }
    }
}

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            variant_id: item.variant_id.to_string(),
            handle: item.product.handle.clone(),
            title: item.product.title.clone(),
            options: item.options_label(),
            quantity: item.quantity,
            decrement_to: item.quantity.saturating_sub(1),
            increment_to: item.quantity.saturating_add(1),
            unit_price: item.unit_price.display(),
            line_total: item.line_total().display(),
            image: item.product.image.as_ref().map(|img| ImageView {
                url: img.url.clone(),
                alt: img
                    .alt_text
                    .clone()
                    .unwrap_or_else(|| item.product.title.clone()),
            }),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart token from the session.
pub(crate) async fn get_cart_token(session: &Session) -> Option<CartToken> {
    session
        .get::<CartToken>(session_keys::CART_TOKEN)
        .await
        .ok()
        .flatten()
}

/// Get the cart token, issuing one on the shopper's first cart action.
async fn get_or_create_cart_token(session: &Session) -> Result<CartToken> {
    if let Some(token) = get_cart_token(session).await {
        return Ok(token);
    }

    let token = CartToken::new();
    session.insert(session_keys::CART_TOKEN, token).await?;
    tracing::debug!(cart_token = %token, "Issued cart token");
    Ok(token)
}

/// Render the session's cart for a full page.
pub(crate) async fn current_cart(state: &AppState, session: &Session) -> CartView {
    let cart = state.carts().snapshot(get_cart_token(session).await).await;
    CartView::from(&cart)
}

/// Attach the `cart-updated` trigger when the cart actually changed.
fn with_cart_trigger(change: &CartChange, body: impl IntoResponse) -> Response {
    if change.is_change() {
        (AppendHeaders([("HX-Trigger", CART_UPDATED)]), body).into_response()
    } else {
        body.into_response()
    }
}

/// Accept only same-site paths as redirect targets.
fn local_path(path: Option<&str>) -> Option<&str> {
    path.filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.contains('\\'))
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub handle: String,
    pub variant_id: String,
    pub quantity: Option<u32>,
    /// Page to return to after a plain form post.
    pub return_to: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub variant_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub variant_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart drawer contents fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_drawer.html")]
pub struct CartDrawerTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Toast notification fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub title: String,
    pub description: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Cart drawer contents (HTMX).
#[instrument(skip(state, session))]
pub async fn drawer(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    CartDrawerTemplate {
        cart: current_cart(&state, &session).await,
    }
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = state.carts().snapshot(get_cart_token(&session).await).await;
    CartCountTemplate {
        count: cart.total_quantity(),
    }
}

/// Add item to cart.
///
/// The variant is looked up in the catalog so the line carries current
/// title, price and options. HTMX requests get a toast; plain posts are
/// redirected back to `return_to` (or the product page).
#[instrument(skip(state, session), fields(handle = %form.handle, variant_id = %form.variant_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    HxRequest(is_htmx): HxRequest,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state.storefront().get_product_by_handle(&form.handle).await?;

    let variant_id = VariantId::new(form.variant_id);
    let variant = product
        .variant(&variant_id)
        .ok_or_else(|| AppError::NotFound(format!("variant {variant_id}")))?;
    if !variant.available_for_sale {
        return Err(AppError::BadRequest(format!(
            "{} ({}) is out of stock",
            product.title, variant.title
        )));
    }

    let item = LineItem::new(&product, variant, form.quantity.unwrap_or(1));
    let token = get_or_create_cart_token(&session).await?;
    let change = state.carts().update(token, |cart| cart.add_item(item)).await;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("variant_id", variant_id.as_str())]),
    );

    if !is_htmx {
        let fallback = format!("/products/{}", product.handle);
        let target = local_path(form.return_to.as_deref()).unwrap_or(&fallback);
        return Ok(Redirect::to(target).into_response());
    }

    let toast = ToastTemplate {
        title: "Added to cart".to_string(),
        description: format!("{} locked in your cell", product.title),
    };
    Ok(with_cart_trigger(&change, toast))
}

/// Update cart item quantity. Zero or below removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    HxRequest(is_htmx): HxRequest,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let variant_id = VariantId::new(form.variant_id);
    let quantity = form.quantity;

    mutate(&state, &session, is_htmx, |cart| {
        cart.update_quantity(&variant_id, quantity)
    })
    .await
}

/// Remove item from cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    HxRequest(is_htmx): HxRequest,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let variant_id = VariantId::new(form.variant_id);

    mutate(&state, &session, is_htmx, |cart| cart.remove_item(&variant_id)).await
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    HxRequest(is_htmx): HxRequest,
) -> Response {
    mutate(&state, &session, is_htmx, Cart::clear).await
}

/// Apply a drawer mutation and answer with the refreshed drawer.
///
/// A session without a cart has nothing to update; the mutation is skipped
/// rather than creating an empty cart.
async fn mutate(
    state: &AppState,
    session: &Session,
    is_htmx: bool,
    f: impl FnOnce(&mut Cart) -> CartChange,
) -> Response {
    let (change, cart) = match get_cart_token(session).await {
        Some(token) => {
            state
                .carts()
                .update(token, |cart| {
                    let change = f(cart);
                    (change, CartView::from(&*cart))
                })
                .await
        }
        None => (CartChange::Unchanged, CartView::empty()),
    };

    tracing::debug!(?change, "Cart mutation");

    if is_htmx {
        with_cart_trigger(&change, CartDrawerTemplate { cart })
    } else {
        Redirect::to(DRAWER_FALLBACK).into_response()
    }
}

/// Create a Shopify checkout for the cart and send the shopper there.
///
/// An empty cart is refused with 400 and a concurrent checkout with 409.
/// A Shopify failure leaves the cart as it was and is reported as 502.
#[instrument(skip(state, session))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    HxRequest(is_htmx): HxRequest,
) -> Result<Response> {
    let token = get_cart_token(&session).await;
    let client = state.storefront().clone();

    let checkout_url = state
        .carts()
        .checkout(token, |lines| async move {
            client.create_checkout(&lines).await
        })
        .await?;

    add_breadcrumb("checkout", "Checkout created", None);
    tracing::info!("Redirecting shopper to checkout");

    if is_htmx {
        Ok((AppendHeaders([("HX-Redirect", checkout_url)]), "").into_response())
    } else {
        Ok(Redirect::to(&checkout_url).into_response())
    }
}
