//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation implements [`graphql_client::GraphQLQuery`] by hand over a
//! query string and the serde shapes of its variables and response, so the
//! client's `execute::<Q>()` can stay generic.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

/// Selection set shared by the listing and detail queries.
macro_rules! product_fields_fragment {
    () => {
        r"
fragment MoneyFields on MoneyV2 {
  amount
  currencyCode
}

fragment ProductFields on Product {
  id
  handle
  title
  description
  options {
    name
    optionValues {
      name
    }
  }
  images(first: 10) {
    edges {
      node {
        url
        altText
      }
    }
  }
  priceRange {
    minVariantPrice {
      ...MoneyFields
    }
    maxVariantPrice {
      ...MoneyFields
    }
  }
  variants(first: 100) {
    edges {
      node {
        id
        title
        availableForSale
        price {
          ...MoneyFields
        }
        selectedOptions {
          name
          value
        }
      }
    }
  }
}
"
    };
}

/// Implement `GraphQLQuery` for an operation module.
macro_rules! operation {
    ($name:ident, $module:ident) => {
        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

// =============================================================================
// Shared wire shapes
// =============================================================================

/// A Relay connection (`edges { node }`).
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

impl<T> Connection<T> {
    /// The nodes in edge order.
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|e| e.node)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

/// `MoneyV2`: the amount is a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyFields {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFields {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOptionFields {
    pub name: String,
    pub option_values: Vec<ProductOptionValueFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductOptionValueFields {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeFields {
    pub min_variant_price: MoneyFields,
    pub max_variant_price: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOptionFields {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariantFields {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub price: MoneyFields,
    pub selected_options: Vec<SelectedOptionFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<ProductOptionFields>,
    pub images: Connection<ImageFields>,
    pub price_range: PriceRangeFields,
    pub variants: Connection<ProductVariantFields>,
}

// =============================================================================
// Product queries
// =============================================================================

pub struct GetProducts;
operation!(GetProducts, get_products);

pub mod get_products {
    use super::{Connection, Deserialize, ProductFields, Serialize};

    pub const OPERATION_NAME: &str = "GetProducts";
    pub const QUERY: &str = concat!(
        r"
query GetProducts($first: Int!) {
  products(first: $first) {
    edges {
      node {
        ...ProductFields
      }
    }
  }
}
",
        product_fields_fragment!()
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductFields>,
    }
}

pub struct GetProductByHandle;
operation!(GetProductByHandle, get_product_by_handle);

pub mod get_product_by_handle {
    use super::{Deserialize, ProductFields, Serialize};

    pub const OPERATION_NAME: &str = "GetProductByHandle";
    pub const QUERY: &str = concat!(
        r"
query GetProductByHandle($handle: String!) {
  product(handle: $handle) {
    ...ProductFields
  }
}
",
        product_fields_fragment!()
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductFields>,
    }
}

// =============================================================================
// Checkout
// =============================================================================

pub struct CreateCart;
operation!(CreateCart, create_cart);

pub mod create_cart {
    use super::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "CreateCart";
    pub const QUERY: &str = r"
mutation CreateCart($input: CartInput!) {
  cartCreate(input: $input) {
    cart {
      id
      checkoutUrl
    }
    userErrors {
      field
      message
      code
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct CartInput {
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineInput {
        pub merchandise_id: String,
        pub quantity: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<CartCreatePayload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartCreatePayload {
        pub cart: Option<CartFields>,
        #[serde(default)]
        pub user_errors: Vec<CartUserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartFields {
        pub id: String,
        pub checkout_url: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CartUserError {
        pub field: Option<Vec<String>>,
        pub message: String,
        pub code: Option<String>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_carries_operation_name() {
        let body = GetProductByHandle::build_query(get_product_by_handle::Variables {
            handle: "solitary-tee".to_string(),
        });
        assert_eq!(body.operation_name, "GetProductByHandle");
        assert!(body.query.contains("fragment ProductFields on Product"));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["handle"], "solitary-tee");
    }

    #[test]
    fn test_cart_line_input_serializes_camel_case() {
        let body = CreateCart::build_query(create_cart::Variables {
            input: create_cart::CartInput {
                lines: vec![create_cart::CartLineInput {
                    merchandise_id: "gid://shopify/ProductVariant/1".to_string(),
                    quantity: 2,
                }],
            },
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json["variables"]["input"]["lines"][0]["merchandiseId"],
            "gid://shopify/ProductVariant/1"
        );
        assert_eq!(json["operationName"], "CreateCart");
    }
}
