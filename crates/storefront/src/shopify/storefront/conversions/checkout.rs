//! Checkout (cartCreate) conversion functions.

use cellblock_core::CheckoutLine;

use crate::shopify::ShopifyError;

use super::super::queries::create_cart;

pub fn convert_checkout_lines(lines: &[CheckoutLine]) -> Vec<create_cart::CartLineInput> {
    lines
        .iter()
        .map(|line| create_cart::CartLineInput {
            merchandise_id: line.variant_id.to_string(),
            quantity: i64::from(line.quantity),
        })
        .collect()
}

/// Extract the checkout URL from a `cartCreate` payload.
pub fn convert_cart_create(
    payload: Option<create_cart::CartCreatePayload>,
) -> Result<String, ShopifyError> {
    let Some(payload) = payload else {
        return Err(ShopifyError::MissingData("cartCreate returned no payload"));
    };

    if !payload.user_errors.is_empty() {
        return Err(ShopifyError::UserError(
            payload
                .user_errors
                .iter()
                .map(format_user_error)
                .collect::<Vec<_>>()
                .join("; "),
        ));
    }

    match payload.cart {
        Some(cart) if !cart.checkout_url.is_empty() => {
            tracing::debug!(cart_id = %cart.id, "Shopify cart created");
            Ok(cart.checkout_url)
        }
        _ => Err(ShopifyError::MissingData("cartCreate returned no checkout URL")),
    }
}

fn format_user_error(error: &create_cart::CartUserError) -> String {
    let mut message = error.message.clone();
    if let Some(field) = error.field.as_ref().filter(|f| !f.is_empty()) {
        message.push_str(&format!(" (field: {})", field.join(".")));
    }
    if let Some(code) = &error.code {
        message.push_str(&format!(" [{code}]"));
    }
    message
}
