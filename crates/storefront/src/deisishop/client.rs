//! DeisiShop HTTP client implementation.
//!
//! Caches the last catalog using `moka` so that "add to cart" can resolve a
//! product ID without refetching the whole catalog on every click.

use std::sync::Arc;
use std::time::Duration;

use deisishop_core::{CartItem, OrderId, Product, ProductId};
use moka::future::Cache;
use tracing::{debug, instrument};
use url::Url;

use super::DeisishopError;
use super::types::{BuyFailure, BuyReceipt, BuyRequest};
use crate::config::DeisishopConfig;

/// Single cache slot: the storefront only ever knows one catalog.
const CATALOG_CACHE_KEY: &str = "catalog";

/// Client for the DeisiShop catalog and purchase endpoints.
///
/// Cheap to clone; all clones share one connection pool and catalog cache.
#[derive(Clone)]
pub struct DeisishopClient {
    inner: Arc<DeisishopClientInner>,
}

struct DeisishopClientInner {
    client: reqwest::Client,
    catalog_url: Url,
    checkout_url: Url,
    catalog_cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl DeisishopClient {
    /// Create a new DeisiShop client.
    #[must_use]
    pub fn new(config: &DeisishopConfig, catalog_cache_ttl: Duration) -> Self {
        let catalog_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(catalog_cache_ttl)
            .build();

        Self {
            inner: Arc::new(DeisishopClientInner {
                client: reqwest::Client::new(),
                catalog_url: config.catalog_url.clone(),
                checkout_url: config.checkout_url.clone(),
                catalog_cache,
            }),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the full product catalog.
    ///
    /// Always goes to the network; a successful result refreshes the cache
    /// used by [`find_product`](Self::find_product).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the endpoint answers with a
    /// non-success status, or the body is not a list of products.
    #[instrument(skip(self), fields(url = %self.inner.catalog_url))]
    pub async fn get_products(&self) -> Result<Vec<Product>, DeisishopError> {
        let response = self
            .inner
            .client
            .get(self.inner.catalog_url.clone())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(DeisishopError::Status {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let products: Vec<Product> = serde_json::from_str(&response_text)?;
        debug!(count = products.len(), "Catalog loaded");

        self.inner
            .catalog_cache
            .insert(CATALOG_CACHE_KEY, Arc::new(products.clone()))
            .await;

        Ok(products)
    }

    /// Resolve a product by ID from the cached catalog.
    ///
    /// Loads the catalog once if the cache is cold or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog has to be fetched and that fails.
    #[instrument(skip(self))]
    pub async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, DeisishopError> {
        let catalog = match self.inner.catalog_cache.get(CATALOG_CACHE_KEY).await {
            Some(catalog) => catalog,
            None => Arc::new(self.get_products().await?),
        };

        Ok(catalog.iter().find(|product| &product.id == id).cloned())
    }

    // =========================================================================
    // Purchase
    // =========================================================================

    /// Submit a purchase for the given cart lines.
    ///
    /// # Errors
    ///
    /// - [`DeisishopError::Rejected`] for a non-success status with a JSON
    ///   body, carrying the server's `error` message when one is present
    /// - [`DeisishopError::Status`] for a non-success status whose body is
    ///   not JSON
    /// - [`DeisishopError::Http`] if the request could not be sent
    /// - [`DeisishopError::Parse`] if a success body has no order ID
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn buy(&self, items: &[CartItem]) -> Result<OrderId, DeisishopError> {
        let body = serde_json::to_value(BuyRequest { products: items })?;
        let (status, response_text) = self.post_buy(&body).await?;

        if !status.is_success() {
            let failure = match BuyFailure::from_body(&response_text) {
                Ok(failure) => failure,
                Err(e) => {
                    tracing::warn!(
                        status = %status,
                        error = %e,
                        "Purchase failed with a non-JSON body"
                    );
                    return Err(DeisishopError::Status {
                        status: status.as_u16(),
                        body: response_text,
                    });
                }
            };
            tracing::warn!(
                status = %status,
                message = failure.error.as_deref().unwrap_or_default(),
                "Purchase rejected"
            );
            return Err(DeisishopError::Rejected {
                status: status.as_u16(),
                message: failure.error,
            });
        }

        let receipt: BuyReceipt = match serde_json::from_str(&response_text) {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse purchase response"
                );
                return Err(DeisishopError::Parse(e));
            }
        };

        Ok(receipt.order_id)
    }

    /// Forward a purchase body verbatim and return the upstream status and body.
    ///
    /// Used by the checkout proxy, which relays whatever the backend answers.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request could not be completed.
    pub async fn post_buy(
        &self,
        body: &serde_json::Value,
    ) -> Result<(reqwest::StatusCode, String), DeisishopError> {
        let response = self
            .inner
            .client
            .post(self.inner.checkout_url.clone())
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        Ok((status, response_text))
    }
}
