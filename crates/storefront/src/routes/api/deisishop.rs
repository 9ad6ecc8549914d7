//! DeisiShop checkout proxy.
//!
//! `POST /api/deisishop/buy` accepts `{ "products": [...] }` and relays it to
//! the purchase backend, answering with the backend's status and JSON body.
//! Errors originating here use the same `{ "error": "..." }` shape the
//! backend does; an unreachable backend or a non-JSON answer becomes a
//! `502` with the connection error message.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use crate::deisishop::{BuyRequest, BuyRequestBody};
use crate::services::message;
use crate::state::AppState;

/// Error response for API endpoints.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub error: String,
}

impl ApiError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            error: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Relay a purchase to the backend.
#[instrument(skip(state, body), fields(lines = body.products.len()))]
pub async fn buy(
    State(state): State<AppState>,
    Json(body): Json<BuyRequestBody>,
) -> Result<Response, ApiError> {
    if body.products.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, message::EMPTY_CART));
    }

    let payload = serde_json::to_value(BuyRequest {
        products: &body.products,
    })
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to encode purchase");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message::CHECKOUT_FAILED)
    })?;

    let (status, response_text) = state.deisishop().post_buy(&payload).await.map_err(|e| {
        tracing::warn!(error = %e, "Purchase backend unreachable");
        ApiError::new(StatusCode::BAD_GATEWAY, message::CONNECTION_FAILED)
    })?;

    let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);

    // A body that is not JSON is unreadable whatever the status
    match serde_json::from_str::<serde_json::Value>(&response_text) {
        Ok(value) => Ok((status, Json(value)).into_response()),
        Err(e) => {
            tracing::warn!(status = %status, error = %e, "Purchase backend sent a non-JSON body");
            Err(ApiError::new(
                StatusCode::BAD_GATEWAY,
                message::CONNECTION_FAILED,
            ))
        }
    }
}
