//! Wire types for the DeisiShop purchase endpoint.
//!
//! Catalog entries decode straight into [`deisishop_core::Product`].

use deisishop_core::{CartItem, OrderId};
use serde::{Deserialize, Serialize};

/// Request body for a purchase: the whole cart, by value.
#[derive(Debug, Serialize)]
pub struct BuyRequest<'a> {
    pub products: &'a [CartItem],
}

/// Owned form of [`BuyRequest`], as accepted by the checkout proxy.
#[derive(Debug, Deserialize)]
pub struct BuyRequestBody {
    pub products: Vec<CartItem>,
}

/// Successful purchase response.
#[derive(Debug, Clone, Deserialize)]
pub struct BuyReceipt {
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
}

/// Failed purchase response. The `error` field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuyFailure {
    pub error: Option<String>,
}

impl BuyFailure {
    /// Read a failure body.
    ///
    /// Any JSON body is a failure report; its `error` is kept when it is a
    /// non-empty string. Whitespace-only messages are kept as sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON at all.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        let error = value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_owned);

        Ok(Self { error })
    }
}
