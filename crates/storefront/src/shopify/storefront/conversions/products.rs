//! Product type conversion functions.

use cellblock_core::{
    Image, Price, PriceRange, Product, ProductId, ProductOption, SelectedOption, Variant,
    VariantId,
};
use tracing::warn;

use crate::shopify::ShopifyError;

use super::super::queries::{
    Connection, ImageFields, MoneyFields, PriceRangeFields, ProductFields, ProductOptionFields,
    ProductVariantFields,
};

pub fn convert_product(fields: ProductFields) -> Result<Product, ShopifyError> {
    let handle = fields.handle;

    let variants = fields
        .variants
        .into_nodes()
        .map(|v| convert_variant(v, &handle))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Product {
        id: ProductId::new(fields.id),
        price_range: convert_price_range(fields.price_range, &handle)?,
        title: fields.title,
        description: fields.description,
        options: fields.options.into_iter().map(convert_option).collect(),
        images: fields.images.into_nodes().map(convert_image).collect(),
        variants,
        handle,
    })
}

/// Convert a listing page, dropping products whose data is malformed.
pub fn convert_product_connection(conn: Connection<ProductFields>) -> Vec<Product> {
    conn.into_nodes()
        .filter_map(|fields| {
            let handle = fields.handle.clone();
            convert_product(fields)
                .map_err(|e| warn!(handle = %handle, error = %e, "Skipping malformed product"))
                .ok()
        })
        .collect()
}

fn convert_money(m: MoneyFields, handle: &str) -> Result<Price, ShopifyError> {
    Price::parse(&m.amount, &m.currency_code)
        .map_err(|e| ShopifyError::InvalidData(format!("product {handle}: {e}")))
}

fn convert_price_range(r: PriceRangeFields, handle: &str) -> Result<PriceRange, ShopifyError> {
    Ok(PriceRange {
        min_variant_price: convert_money(r.min_variant_price, handle)?,
        max_variant_price: convert_money(r.max_variant_price, handle)?,
    })
}

fn convert_image(i: ImageFields) -> Image {
    Image {
        url: i.url,
        alt_text: i.alt_text.filter(|alt| !alt.is_empty()),
    }
}

fn convert_option(o: ProductOptionFields) -> ProductOption {
    ProductOption {
        name: o.name,
        values: o.option_values.into_iter().map(|v| v.name).collect(),
    }
}

fn convert_variant(v: ProductVariantFields, handle: &str) -> Result<Variant, ShopifyError> {
    Ok(Variant {
        id: VariantId::new(v.id),
        title: v.title,
        price: convert_money(v.price, handle)?,
        selected_options: v
            .selected_options
            .into_iter()
            .map(|o| SelectedOption::new(o.name, o.value))
            .collect(),
        available_for_sale: v.available_for_sale,
    })
}
