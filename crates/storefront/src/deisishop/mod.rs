//! DeisiShop API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`
//! - The catalog endpoint is the source of truth for products; nothing is
//!   stored locally beyond a short-lived cache used to resolve "add to cart"
//! - The purchase endpoint receives the full cart by value
//!
//! # Example
//!
//! ```rust,ignore
//! use deisishop_storefront::deisishop::DeisishopClient;
//!
//! let client = DeisishopClient::new(&config.deisishop, config.catalog_cache_ttl);
//!
//! let products = client.get_products().await?;
//! let order_id = client.buy(cart.items()).await?;
//! ```

mod client;
pub mod types;

pub use client::DeisishopClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the DeisiShop API.
#[derive(Debug, Error)]
pub enum DeisishopError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("HTTP {status}: {}", truncate(body))]
    Status { status: u16, body: String },

    /// Purchase endpoint refused the order.
    #[error("Purchase rejected (HTTP {status}): {}", message.as_deref().unwrap_or("(no details provided)"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}
