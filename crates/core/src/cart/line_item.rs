//! Line items held by the cart.

use serde::{Deserialize, Serialize};

use crate::catalog::{Image, Product, SelectedOption, Variant};
use crate::types::{Price, ProductId, VariantId};

/// Snapshot of the product a line item belongs to.
///
/// Frozen at the time of adding so the drawer renders without going back to
/// the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product ID.
    pub id: ProductId,
    /// URL handle, for linking back to the detail page.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Featured image.
    pub image: Option<Image>,
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            handle: product.handle.clone(),
            title: product.title.clone(),
            image: product.featured_image().cloned(),
        }
    }
}

/// One product variant plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product this variant belongs to.
    pub product: ProductRef,
    /// Variant ID (unique within a cart).
    pub variant_id: VariantId,
    /// Variant title.
    pub variant_title: String,
    /// Price per unit at the time of adding.
    pub unit_price: Price,
    /// Quantity (at least 1 once stored in a cart).
    pub quantity: u32,
    /// Option values of the variant, in declared order.
    pub selected_options: Vec<SelectedOption>,
}

impl LineItem {
    /// Build a line item for `variant` of `product`.
    #[must_use]
    pub fn new(product: &Product, variant: &Variant, quantity: u32) -> Self {
        Self {
            product: ProductRef::from(product),
            variant_id: variant.id.clone(),
            variant_title: variant.title.clone(),
            unit_price: variant.price.clone(),
            quantity,
            selected_options: variant.selected_options.clone(),
        }
    }

    /// Unit price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    /// Option values joined for display (e.g. `M • Black`).
    #[must_use]
    pub fn options_label(&self) -> String {
        self.selected_options
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join(" • ")
    }
}
