//! Catalog loading.

use std::future::Future;

use deisishop_core::{Product, ProductId};

use crate::deisishop::{DeisishopClient, DeisishopError};

/// Source of catalog products.
pub trait CatalogSource: Send + Sync {
    /// Fetch the full catalog.
    fn load(&self) -> impl Future<Output = Result<Vec<Product>, DeisishopError>> + Send;

    /// Resolve one product by ID.
    fn find(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Option<Product>, DeisishopError>> + Send;
}

impl CatalogSource for DeisishopClient {
    async fn load(&self) -> Result<Vec<Product>, DeisishopError> {
        self.get_products().await
    }

    async fn find(&self, id: &ProductId) -> Result<Option<Product>, DeisishopError> {
        self.find_product(id).await
    }
}

/// Load the catalog for display.
///
/// Failures are logged and yield an empty list; the page renders without
/// products rather than failing.
pub async fn load_catalog<C: CatalogSource>(source: &C) -> Vec<Product> {
    match source.load().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load catalog");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use deisishop_core::Price;

    use super::*;

    struct StaticCatalog(Vec<Product>);

    impl CatalogSource for StaticCatalog {
        async fn load(&self) -> Result<Vec<Product>, DeisishopError> {
            Ok(self.0.clone())
        }

        async fn find(&self, id: &ProductId) -> Result<Option<Product>, DeisishopError> {
            Ok(self.0.iter().find(|p| &p.id == id).cloned())
        }
    }

    struct BrokenCatalog;

    impl CatalogSource for BrokenCatalog {
        async fn load(&self) -> Result<Vec<Product>, DeisishopError> {
            Err(DeisishopError::Status {
                status: 503,
                body: "maintenance".to_string(),
            })
        }

        async fn find(&self, _id: &ProductId) -> Result<Option<Product>, DeisishopError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_load_catalog_returns_products() {
        let catalog = StaticCatalog(vec![Product::new(
            "1",
            "X",
            Price::from_cents(1000),
            "x.png",
        )]);
        let products = load_catalog(&catalog).await;
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn test_load_catalog_failure_is_silent_and_empty() {
        let products = load_catalog(&BrokenCatalog).await;
        assert!(products.is_empty());
    }
}
