//! The visitor's cart: a flat, ordered list of products.
//!
//! Lines are never merged. Adding the same product twice yields two
//! independent lines; removing by product ID drops every line with that ID.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::CartItem;

/// An ordered list of cart lines.
///
/// Serializes as a bare JSON array, which is also the persisted snapshot
/// format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append a line to the end of the cart.
    pub fn push(&mut self, item: CartItem) {
        self.items.push(item);
    }

    /// Remove every line whose product ID matches, returning how many were removed.
    pub fn remove_all(&mut self, id: &ProductId) -> usize {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        before - self.items.len()
    }

    /// Remove one line per entry of `lines`, matched by value, returning how
    /// many were removed.
    ///
    /// Lines appended since `lines` was taken are left in place.
    pub fn remove_lines(&mut self, lines: &[CartItem]) -> usize {
        let mut removed = 0;
        for line in lines {
            if let Some(pos) = self.items.iter().position(|item| item == line) {
                self.items.remove(pos);
                removed += 1;
            }
        }
        removed
    }

    /// Sum of the line prices, recomputed on every call.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(|item| item.price).sum()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize to the snapshot format (a JSON array).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a snapshot previously produced by [`Cart::to_snapshot`].
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is not a JSON array of products.
    pub fn from_snapshot(snapshot: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(snapshot)
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
