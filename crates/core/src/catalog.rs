//! Catalog records fetched from the Shopify Storefront API.
//!
//! These are read-only: the storefront never mutates a product, it only
//! references products and variants by ID.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, VariantId};

/// Product or variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL (Shopify CDN).
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

/// Price range across a product's variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Price,
    /// Maximum price among all variants.
    pub max_variant_price: Price,
}

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Black").
    pub value: String,
}

impl SelectedOption {
    /// Create a new name/value pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Product option axis definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name (e.g., "Size").
    pub name: String,
    /// Available values in display order (e.g., `["S", "M", "L"]`).
    pub values: Vec<String>,
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title (combination of option values, or "Default Title").
    pub title: String,
    /// Current price.
    pub price: Price,
    /// Option values identifying this variant, one per axis.
    pub selected_options: Vec<SelectedOption>,
    /// Whether this variant can be purchased.
    pub available_for_sale: bool,
}

impl Variant {
    /// The value this variant has on the named option axis.
    #[must_use]
    pub fn option_value(&self, axis: &str) -> Option<&str> {
        self.selected_options
            .iter()
            .find(|o| o.name == axis)
            .map(|o| o.value.as_str())
    }
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle (slug) used for routing.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Option axes in declared order.
    pub options: Vec<ProductOption>,
    /// Product images, featured image first.
    pub images: Vec<Image>,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// Variants in declared order.
    pub variants: Vec<Variant>,
}

impl Product {
    /// The first declared variant, used for default selection and quick add.
    #[must_use]
    pub fn first_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// The featured (first) image, if any.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Hand-built catalog records shared by the core tests.

    use super::*;

    pub fn price(amount: &str) -> Price {
        Price::parse(amount, "USD").unwrap_or_else(|e| panic!("bad fixture price: {e}"))
    }

    pub fn variant(id: &str, options: &[(&str, &str)], amount: &str, available: bool) -> Variant {
        Variant {
            id: VariantId::new(id),
            title: options
                .iter()
                .map(|(_, v)| *v)
                .collect::<Vec<_>>()
                .join(" / "),
            price: price(amount),
            selected_options: options
                .iter()
                .map(|(n, v)| SelectedOption::new(*n, *v))
                .collect(),
            available_for_sale: available,
        }
    }

    /// A tee with Size × Color axes. "L / White" is deliberately missing.
    pub fn tee() -> Product {
        Product {
            id: ProductId::new("gid://shopify/Product/1"),
            handle: "solitary-tee".to_string(),
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
                alt_text: None,
            }],
            price_range: PriceRange {
                min_variant_price: price("25.00"),
                max_variant_price: price("27.00"),
            },
            variants: vec![
                variant("V-M-BLK", &[("Size", "M"), ("Color", "Black")], "25.00", true),
                variant("V-M-WHT", &[("Size", "M"), ("Color", "White")], "25.00", false),
                variant("V-L-BLK", &[("Size", "L"), ("Color", "Black")], "27.00", true),
            ],
        }
    }
}
