//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::StorefrontConfig;
use crate::deisishop::DeisishopClient;
use crate::middleware::session::SESSION_EXPIRY_SECONDS;
use crate::services::{CheckoutGuard, SnapshotCache};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources such as the API client and cart snapshots.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    deisishop: DeisishopClient,
    checkout_guard: CheckoutGuard,
    carts: SnapshotCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let deisishop = DeisishopClient::new(&config.deisishop, config.catalog_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                deisishop,
                checkout_guard: CheckoutGuard::new(),
                carts: SnapshotCache::new(Duration::from_secs(
                    SESSION_EXPIRY_SECONDS.unsigned_abs(),
                )),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the DeisiShop API client.
    #[must_use]
    pub fn deisishop(&self) -> &DeisishopClient {
        &self.inner.deisishop
    }

    /// Get a reference to the checkout in-flight guard.
    #[must_use]
    pub fn checkout_guard(&self) -> &CheckoutGuard {
        &self.inner.checkout_guard
    }

    /// Get a reference to the per-visitor cart snapshots.
    #[must_use]
    pub fn carts(&self) -> &SnapshotCache {
        &self.inner.carts
    }
}
