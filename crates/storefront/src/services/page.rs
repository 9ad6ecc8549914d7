//! The products page controller.
//!
//! Owns the page's three pieces of state (catalog, cart, status message)
//! and the checkout state machine:
//!
//! ```text
//! Idle --checkout--> Pending --ok--> Idle (cart cleared)
//!                           --err--> Idle (cart unchanged)
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use deisishop_core::{Cart, Product, ProductId};
use tracing::instrument;

use super::cart::CartManager;
use super::catalog::{CatalogSource, load_catalog};
use super::checkout::{CheckoutGuard, CheckoutOutcome, OrderBackend};
use super::message::StatusMessage;
use super::storage::{SnapshotStore, StorageError};

/// State of one activation of the products page.
#[derive(Debug)]
pub struct ProductsPage<S> {
    products: Vec<Product>,
    cart: CartManager<S>,
    message: Option<StatusMessage>,
}

impl<S: SnapshotStore> ProductsPage<S> {
    /// Activate the page: load the catalog and restore the cart concurrently.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot store cannot be read. Catalog
    /// failures are not errors; the product list is simply empty.
    #[instrument(skip_all)]
    pub async fn activate<C: CatalogSource>(catalog: &C, store: S) -> Result<Self, StorageError> {
        let (products, cart) = tokio::join!(load_catalog(catalog), CartManager::restore(store));

        Ok(Self {
            products,
            cart: cart?,
            message: None,
        })
    }

    /// Restore the cart without loading the catalog, for cart-only actions.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot store cannot be read.
    pub async fn restore(store: S) -> Result<Self, StorageError> {
        Ok(Self {
            products: Vec::new(),
            cart: CartManager::restore(store).await?,
            message: None,
        })
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.cart.cart()
    }

    #[must_use]
    pub const fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Replace the status message.
    pub fn set_message(&mut self, message: Option<StatusMessage>) {
        self.message = message;
    }

    /// Append a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn add_to_cart(&mut self, product: Product) -> Result<(), StorageError> {
        self.cart.add(product).await
    }

    /// Remove every cart line for `id`. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn remove_from_cart(&mut self, id: &ProductId) -> Result<usize, StorageError> {
        self.cart.remove(id).await
    }

    /// Submit the cart as an order.
    ///
    /// `visitor` identifies whose checkout this is for the in-flight guard.
    /// On success the submitted lines leave the cart and the confirmation
    /// expires after `message_ttl`; lines added while the purchase was in
    /// flight stay. On any failure the cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error only if removing the purchased lines cannot be persisted.
    #[instrument(skip(self, backend, guard, now, message_ttl), fields(lines = self.cart().len()))]
    pub async fn checkout<B: OrderBackend>(
        &mut self,
        backend: &B,
        guard: &CheckoutGuard,
        visitor: &str,
        now: DateTime<Utc>,
        message_ttl: Duration,
    ) -> Result<CheckoutOutcome, StorageError> {
        let outcome = if self.cart().is_empty() {
            CheckoutOutcome::EmptyCart
        } else if let Some(_token) = guard.try_begin(visitor) {
            let submitted = self.cart().items().to_vec();
            let outcome = CheckoutOutcome::from_result(backend.submit(&submitted).await);
            if outcome.is_success() {
                self.cart.remove_lines(&submitted).await?;
            }
            outcome
        } else {
            CheckoutOutcome::AlreadyPending
        };

        let text = outcome.message();
        self.message = Some(if outcome.is_success() {
            tracing::info!(message = %text, "Checkout completed");
            StatusMessage::transient(text, now, message_ttl)
        } else {
            StatusMessage::sticky(text)
        });

        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use deisishop_core::OrderId;

    use deisishop_core::Price;

    use super::*;
    use crate::deisishop::DeisishopError;
    use crate::services::cart::CART_KEY;
    use crate::services::storage::{SnapshotCache, VisitorSnapshots};

    const TTL: Duration = Duration::from_secs(5);

    /// Backend answering every submission with a fixed result.
    struct FakeBackend {
        calls: AtomicUsize,
        respond: fn() -> Result<OrderId, DeisishopError>,
    }

    impl FakeBackend {
        fn new(respond: fn() -> Result<OrderId, DeisishopError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                respond,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl OrderBackend for FakeBackend {
        async fn submit(&self, _items: &[deisishop_core::CartItem]) -> Result<OrderId, DeisishopError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.respond)()
        }
    }

    async fn store() -> VisitorSnapshots {
        SnapshotCache::new(Duration::from_secs(60))
            .for_visitor("v")
            .await
    }

    fn visible_message<S: SnapshotStore>(
        page: &ProductsPage<S>,
        now: DateTime<Utc>,
    ) -> Option<&str> {
        page.message()
            .filter(|message| message.is_visible_at(now))
            .map(|message| message.text.as_str())
    }

    fn product_x() -> Product {
        Product::new("1", "X", Price::from_cents(1000), "x.png")
    }

    async fn page_with_x(store: VisitorSnapshots) -> ProductsPage<VisitorSnapshots> {
        let mut page = ProductsPage::restore(store).await.unwrap();
        page.add_to_cart(product_x()).await.unwrap();
        page
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_sends_nothing() {
        let backend = FakeBackend::new(|| Ok(OrderId::new("1")));
        let mut page = ProductsPage::restore(store().await).await.unwrap();

        let outcome = page
            .checkout(&backend, &CheckoutGuard::new(), "v", Utc::now(), TTL)
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::EmptyCart);
        assert_eq!(backend.calls(), 0);
        assert_eq!(
            visible_message(&page, Utc::now()),
            Some("O carrinho está vazio!")
        );
    }

    #[tokio::test]
    async fn test_checkout_success_clears_cart_and_message_expires() {
        let store = store().await;
        let backend = FakeBackend::new(|| Ok(OrderId::new("42")));
        let mut page = page_with_x(store.clone()).await;
        let now = Utc::now();

        let outcome = page
            .checkout(&backend, &CheckoutGuard::new(), "v", now, TTL)
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Completed(OrderId::new("42")));
        assert!(page.cart().is_empty());
        assert_eq!(store.load(CART_KEY).await.unwrap().as_deref(), Some("[]"));

        let text = visible_message(&page, now).unwrap();
        assert!(text.contains("42"));
        assert!(
            visible_message(&page, now + chrono::Duration::seconds(4))
                .is_some()
        );
        assert_eq!(
            visible_message(&page, now + chrono::Duration::seconds(5)),
            None
        );
    }

    #[tokio::test]
    async fn test_checkout_rejected_keeps_cart() {
        let store = store().await;
        let backend = FakeBackend::new(|| {
            Err(DeisishopError::Rejected {
                status: 400,
                message: Some("stock esgotado".to_string()),
            })
        });
        let mut page = page_with_x(store.clone()).await;
        let snapshot_before = store.load(CART_KEY).await.unwrap();

        let outcome = page
            .checkout(&backend, &CheckoutGuard::new(), "v", Utc::now(), TTL)
            .await
            .unwrap();

        assert!(matches!(outcome, CheckoutOutcome::Rejected(_)));
        assert_eq!(page.cart().len(), 1);
        assert_eq!(page.cart().items()[0].id.as_str(), "1");
        assert_eq!(store.load(CART_KEY).await.unwrap(), snapshot_before);
        assert_eq!(visible_message(&page, Utc::now()), Some("stock esgotado"));
    }

    #[tokio::test]
    async fn test_checkout_rejected_without_reason_uses_generic_message() {
        let backend = FakeBackend::new(|| {
            Err(DeisishopError::Rejected {
                status: 500,
                message: None,
            })
        });
        let mut page = page_with_x(store().await).await;

        page.checkout(&backend, &CheckoutGuard::new(), "v", Utc::now(), TTL)
            .await
            .unwrap();

        assert_eq!(
            visible_message(&page, Utc::now()),
            Some("Erro ao realizar a compra.")
        );
        assert_eq!(page.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_transport_failure_keeps_cart() {
        let backend = FakeBackend::new(|| {
            Err(DeisishopError::Parse(
                serde_json::from_str::<u8>("oops").unwrap_err(),
            ))
        });
        let mut page = page_with_x(store().await).await;

        let outcome = page
            .checkout(&backend, &CheckoutGuard::new(), "v", Utc::now(), TTL)
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Unreachable);
        assert_eq!(page.cart().len(), 1);
        assert_eq!(
            visible_message(&page, Utc::now()),
            Some("Erro ao conectar com o servidor.")
        );
        // Error messages do not expire on their own.
        assert!(
            visible_message(&page, Utc::now() + chrono::Duration::hours(1))
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_checkout_while_pending_sends_nothing() {
        let backend = FakeBackend::new(|| Ok(OrderId::new("1")));
        let guard = CheckoutGuard::new();
        let _held = guard.try_begin("v").unwrap();
        let mut page = page_with_x(store().await).await;

        let outcome = page
            .checkout(&backend, &guard, "v", Utc::now(), TTL)
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::AlreadyPending);
        assert_eq!(backend.calls(), 0);
        assert_eq!(page.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_guard_released_after_checkout() {
        let backend = FakeBackend::new(|| Ok(OrderId::new("1")));
        let guard = CheckoutGuard::new();
        let mut page = page_with_x(store().await).await;

        page.checkout(&backend, &guard, "v", Utc::now(), TTL)
            .await
            .unwrap();

        assert!(!guard.is_pending("v"));
    }

    #[tokio::test]
    async fn test_total_tracks_cart() {
        let mut page = ProductsPage::restore(store().await).await.unwrap();
        page.add_to_cart(product_x()).await.unwrap();
        page.add_to_cart(product_x()).await.unwrap();
        assert_eq!(page.cart().total(), Price::from_cents(2000));

        page.remove_from_cart(&ProductId::new("1")).await.unwrap();
        assert_eq!(page.cart().total(), Price::ZERO);
    }
}
