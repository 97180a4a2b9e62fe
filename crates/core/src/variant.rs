//! Variant selection for the product detail page.
//!
//! A product declares option axes (`Size`, `Color`) and enumerates variants,
//! each with one value per axis. [`VariantSelector`] indexes the variants by
//! the full tuple of their option values once, then answers "which variant
//! is `Size = L` with everything else kept?" with a single lookup.
//!
//! ```text
//! axes:   [Size, Color]
//! table:  (M, Black) -> 0   (M, White) -> 1   (L, Black) -> 2
//!
//! active = 0 (M, Black), select Size = L   -> (L, Black) -> 2   Selected
//! active = 2 (L, Black), select Color = White -> (L, White)     NoMatch
//! ```

use std::collections::HashMap;

use crate::catalog::{Product, Variant};
use crate::types::VariantId;

/// Outcome of choosing an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A different variant is now active.
    Selected,
    /// The choice resolved to the variant that was already active.
    Unchanged,
    /// No variant has that combination; the previous variant stays active.
    NoMatch,
    /// The product has no such option axis.
    UnknownOption,
}

/// Tracks the active variant of one product.
#[derive(Debug, Clone)]
pub struct VariantSelector<'p> {
    product: &'p Product,
    /// Option axis names in declared order.
    axes: Vec<String>,
    /// Option tuple per variant index; `None` if a variant lacks an axis.
    keys: Vec<Option<Vec<String>>>,
    /// Option tuple -> first variant index with that tuple.
    table: HashMap<Vec<String>, usize>,
    active: Option<usize>,
}

impl<'p> VariantSelector<'p> {
    /// Build the lookup table and select the first variant.
    #[must_use]
    pub fn new(product: &'p Product) -> Self {
        let axes: Vec<String> = product.options.iter().map(|o| o.name.clone()).collect();

        let keys: Vec<Option<Vec<String>>> = product
            .variants
            .iter()
            .map(|variant| {
                axes.iter()
                    .map(|axis| variant.option_value(axis).map(str::to_owned))
                    .collect()
            })
            .collect();

        let mut table = HashMap::with_capacity(keys.len());
        for (index, key) in keys.iter().enumerate() {
            if let Some(key) = key {
                table.entry(key.clone()).or_insert(index);
            }
        }

        Self {
            product,
            axes,
            keys,
            table,
            active: if product.variants.is_empty() {
                None
            } else {
                Some(0)
            },
        }
    }

    /// Build a selector with `variant_id` active, falling back to the first
    /// variant when the ID is absent or unknown.
    #[must_use]
    pub fn with_variant(product: &'p Product, variant_id: Option<&VariantId>) -> Self {
        let mut selector = Self::new(product);
        if let Some(id) = variant_id {
            selector.select_variant(id);
        }
        selector
    }

    /// Make the variant with `id` active. Returns `false` (and changes
    /// nothing) if the product has no such variant.
    pub fn select_variant(&mut self, id: &VariantId) -> bool {
        match self.product.variants.iter().position(|v| &v.id == id) {
            Some(index) => {
                self.active = Some(index);
                true
            }
            None => false,
        }
    }

    /// Choose `value` on option `axis`, keeping the other axes as they are.
    pub fn select_option(&mut self, axis: &str, value: &str) -> Selection {
        if !self.axes.iter().any(|a| a == axis) {
            return Selection::UnknownOption;
        }

        let Some(index) = self.resolve(axis, value) else {
            return Selection::NoMatch;
        };

        if self.active == Some(index) {
            Selection::Unchanged
        } else {
            self.active = Some(index);
            Selection::Selected
        }
    }

    /// The variant choosing `value` on `axis` would activate, if any.
    #[must_use]
    pub fn candidate(&self, axis: &str, value: &str) -> Option<&'p Variant> {
        self.resolve(axis, value)
            .and_then(|index| self.product.variants.get(index))
    }

    /// The active variant.
    #[must_use]
    pub fn active(&self) -> Option<&'p Variant> {
        self.active.and_then(|index| self.product.variants.get(index))
    }

    /// The active variant's value on `axis`.
    #[must_use]
    pub fn selected_value(&self, axis: &str) -> Option<&'p str> {
        self.active().and_then(|v| v.option_value(axis))
    }

    /// Whether "add to cart" should be enabled.
    #[must_use]
    pub fn can_add_to_cart(&self) -> bool {
        self.active().is_some_and(|v| v.available_for_sale)
    }

    /// The product being selected from.
    #[must_use]
    pub const fn product(&self) -> &'p Product {
        self.product
    }

    /// Look up the variant for the active tuple with `axis` replaced.
    fn resolve(&self, axis: &str, value: &str) -> Option<usize> {
        let position = self.axes.iter().position(|a| a == axis)?;

        let mut tuple = match self.active.and_then(|index| self.keys.get(index)) {
            Some(Some(key)) => key.clone(),
            // Without an addressable active variant only a single-axis
            // product can be resolved from one value.
            _ if self.axes.len() == 1 => vec![String::new()],
            _ => return None,
        };
        if let Some(slot) = tuple.get_mut(position) {
            value.clone_into(slot);
        }

        self.table.get(&tuple).copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{tee, variant};
    use crate::catalog::ProductOption;

    fn active_id(selector: &VariantSelector<'_>) -> Option<String> {
        selector.active().map(|v| v.id.to_string())
    }

    #[test]
    fn test_initial_selection_is_first_variant() {
        let product = tee();
        let selector = VariantSelector::new(&product);
        assert_eq!(active_id(&selector).as_deref(), Some("V-M-BLK"));
        assert!(selector.can_add_to_cart());
    }

    #[test]
    fn test_select_option_moves_along_one_axis() {
        let product = tee();
        let mut selector = VariantSelector::new(&product);

        assert_eq!(selector.select_option("Size", "L"), Selection::Selected);
        assert_eq!(active_id(&selector).as_deref(), Some("V-L-BLK"));
        assert_eq!(selector.selected_value("Size"), Some("L"));
        assert_eq!(selector.selected_value("Color"), Some("Black"));
    }

    #[test]
    fn test_select_same_value_is_unchanged() {
        let product = tee();
        let mut selector = VariantSelector::new(&product);
        assert_eq!(selector.select_option("Color", "Black"), Selection::Unchanged);
    }

    #[test]
    fn test_nonexistent_combination_keeps_previous_variant() {
        let product = tee();
        let mut selector = VariantSelector::new(&product);
        selector.select_option("Size", "L");

        // There is no L / White variant.
        assert_eq!(selector.select_option("Color", "White"), Selection::NoMatch);
        assert_eq!(active_id(&selector).as_deref(), Some("V-L-BLK"));
    }

    #[test]
    fn test_unknown_option_axis() {
        let product = tee();
        let mut selector = VariantSelector::new(&product);
        assert_eq!(
            selector.select_option("Material", "Denim"),
            Selection::UnknownOption
        );
        assert_eq!(active_id(&selector).as_deref(), Some("V-M-BLK"));
    }

    #[test]
    fn test_unavailable_variant_disables_add_to_cart() {
        let product = tee();
        let mut selector = VariantSelector::new(&product);
        assert_eq!(selector.select_option("Color", "White"), Selection::Selected);
        assert!(!selector.can_add_to_cart());
    }

    #[test]
    fn test_product_without_variants() {
        let mut product = tee();
        product.variants.clear();
        let mut selector = VariantSelector::new(&product);

        assert!(selector.active().is_none());
        assert!(!selector.can_add_to_cart());
        assert_eq!(selector.select_option("Size", "M"), Selection::NoMatch);
    }

    #[test]
    fn test_with_variant_restores_selection() {
        let product = tee();
        let selector = VariantSelector::with_variant(&product, Some(&VariantId::new("V-L-BLK")));
        assert_eq!(active_id(&selector).as_deref(), Some("V-L-BLK"));
    }

    #[test]
    fn test_with_unknown_variant_falls_back_to_first() {
        let product = tee();
        let selector = VariantSelector::with_variant(&product, Some(&VariantId::new("gone")));
        assert_eq!(active_id(&selector).as_deref(), Some("V-M-BLK"));
    }

    #[test]
    fn test_candidate_for_rendering_buttons() {
        let product = tee();
        let selector = VariantSelector::with_variant(&product, Some(&VariantId::new("V-L-BLK")));

        assert_eq!(
            selector.candidate("Size", "M").map(|v| v.id.as_str()),
            Some("V-M-BLK")
        );
        assert!(selector.candidate("Color", "White").is_none());
        assert!(selector.candidate("Material", "Denim").is_none());
    }

    #[test]
    fn test_duplicate_tuple_first_variant_wins() {
        let mut product = tee();
        product.variants.push(variant(
            "V-M-BLK-DUP",
            &[("Size", "M"), ("Color", "Black")],
            "99.00",
            true,
        ));
        let mut selector = VariantSelector::with_variant(&product, Some(&VariantId::new("V-L-BLK")));

        selector.select_option("Size", "M");
        assert_eq!(active_id(&selector).as_deref(), Some("V-M-BLK"));
    }

    #[test]
    fn test_single_axis_product() {
        let mut product = tee();
        product.options = vec![ProductOption {
            name: "Size".to_string(),
            values: vec!["S".to_string(), "XL".to_string()],
        }];
        product.variants = vec![
            variant("S", &[("Size", "S")], "20.00", true),
            variant("XL", &[("Size", "XL")], "22.00", true),
        ];
        let mut selector = VariantSelector::new(&product);

        assert_eq!(selector.select_option("Size", "XL"), Selection::Selected);
        assert_eq!(active_id(&selector).as_deref(), Some("XL"));
    }
}
