//! Cart manager: the in-memory cart mirrored to a snapshot store.
//!
//! Every mutation re-reads the stored snapshot, applies the change, and
//! writes the whole cart back under [`CART_KEY`] in one store update, so a
//! mutation never discards lines written by another request. Restoring is
//! forgiving: an absent or unreadable snapshot yields an empty cart.

use deisishop_core::{Cart, CartItem, ProductId};
use tracing::instrument;

use super::storage::{SnapshotStore, StorageError};

/// Storage key holding the JSON-serialized cart list.
pub const CART_KEY: &str = "cart";

/// Owns the visitor's cart and keeps its snapshot in sync.
#[derive(Debug)]
pub struct CartManager<S> {
    store: S,
    cart: Cart,
}

/// Parse a stored snapshot, falling back to an empty cart.
fn decode(snapshot: Option<&str>) -> Cart {
    match snapshot.map(Cart::from_snapshot) {
        Some(Ok(cart)) => cart,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Discarding malformed cart snapshot");
            Cart::new()
        }
        None => Cart::new(),
    }
}

impl<S: SnapshotStore> CartManager<S> {
    /// Restore the cart from `store`.
    ///
    /// A malformed snapshot is logged and replaced by an empty cart; it is
    /// overwritten on the next mutation.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself cannot be read.
    #[instrument(skip(store))]
    pub async fn restore(store: S) -> Result<Self, StorageError> {
        let snapshot = store.load(CART_KEY).await?;
        let cart = decode(snapshot.as_deref());

        Ok(Self { store, cart })
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Append a line and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub async fn add(&mut self, item: CartItem) -> Result<(), StorageError> {
        tracing::debug!(product_id = %item.id, "Adding to cart");
        self.modify(|cart| cart.push(item)).await
    }

    /// Remove every line with `id` and persist. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub async fn remove(&mut self, id: &ProductId) -> Result<usize, StorageError> {
        let removed = self.modify(|cart| cart.remove_all(id)).await?;
        tracing::debug!(product_id = %id, removed, "Removing from cart");
        Ok(removed)
    }

    /// Remove the given lines (one stored line per entry) and persist.
    ///
    /// Used after a purchase: lines added while it was in flight survive.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub async fn remove_lines(&mut self, lines: &[CartItem]) -> Result<usize, StorageError> {
        self.modify(|cart| cart.remove_lines(lines)).await
    }

    /// Apply `f` to the stored cart and persist it in one store update.
    async fn modify<R: Send>(
        &mut self,
        f: impl FnOnce(&mut Cart) -> R + Send,
    ) -> Result<R, StorageError> {
        let (cart, result) = self
            .store
            .update(CART_KEY, |current| {
                let mut cart = decode(current);
                let result = f(&mut cart);
                let snapshot = cart.to_snapshot()?;
                Ok((snapshot, (cart, result)))
            })
            .await?;

        self.cart = cart;
        Ok(result)
    }
}
