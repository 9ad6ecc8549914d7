//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to /produtos
//! GET  /health                 - Health check
//!
//! # Products page
//! GET  /produtos               - Catalog, cart, and status message
//! POST /produtos/cart/add      - Add product_id to cart (redirects back)
//! POST /produtos/cart/remove   - Remove every line with product_id (redirects back)
//! POST /produtos/checkout      - Submit the cart (redirects back)
//!
//! # API
//! POST /api/deisishop/buy      - Checkout proxy to the purchase backend
//! ```

pub mod api;
pub mod produtos;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::checkout_rate_limiter;
use crate::state::AppState;

/// Create the products page router (nested under `/produtos`).
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(produtos::index))
        .route("/cart/add", post(produtos::add))
        .route("/cart/remove", post(produtos::remove))
}

/// Create the routes that submit purchases.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/produtos/checkout", post(produtos::checkout))
        .route("/api/deisishop/buy", post(api::deisishop::buy))
}

/// Create all routes for the storefront.
///
/// Checkout routes are rate limited per client IP when `rate_limit` is set.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    let checkout = if rate_limit {
        checkout_routes().layer(checkout_rate_limiter())
    } else {
        checkout_routes()
    };

    Router::new()
        .route("/", get(|| async { Redirect::to(produtos::PRODUCTS_PATH) }))
        .nest("/produtos", product_routes())
        .merge(checkout)
}
