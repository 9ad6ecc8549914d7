//! Catalog product records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;
use super::price::Price;

/// A product as listed by the DeisiShop catalog.
///
/// Products are read-only: the storefront never edits catalog data. Fields
/// the storefront does not use (description, category, rating, ...) are kept
/// in `extra` so a product copied into the cart round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a product with no extra catalog fields.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        price: Price,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            image: image.into(),
            extra: Map::new(),
        }
    }
}

/// A cart line: a product duplicated into the cart at add time.
pub type CartItem = Product;
