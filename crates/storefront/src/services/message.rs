//! Status messages shown under the cart.
//!
//! A checkout confirmation expires after a fixed delay; error messages stay
//! until the next page view consumes them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use deisishop_core::OrderId;
use serde::{Deserialize, Serialize};

/// Shown when checkout is requested with nothing in the cart.
pub const EMPTY_CART: &str = "O carrinho está vazio!";

/// Shown when a second checkout is requested while one is still running.
pub const CHECKOUT_IN_PROGRESS: &str = "Já existe uma compra em curso.";

/// Shown when the purchase endpoint refuses without saying why.
pub const CHECKOUT_FAILED: &str = "Erro ao realizar a compra.";

/// Shown when the purchase endpoint cannot be reached or understood.
pub const CONNECTION_FAILED: &str = "Erro ao conectar com o servidor.";

/// Confirmation text for a completed purchase.
#[must_use]
pub fn checkout_succeeded(order_id: &OrderId) -> String {
    format!("Compra realizada com sucesso! ID da compra: {order_id}")
}

/// A user-facing status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    /// `None` for messages that never expire on their own.
    pub expires_at: Option<DateTime<Utc>>,
}

impl StatusMessage {
    /// A message that stays until replaced or consumed.
    #[must_use]
    pub fn sticky(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expires_at: None,
        }
    }

    /// A message that disappears `ttl` after `now`.
    #[must_use]
    pub fn transient(text: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            text: text.into(),
            expires_at: now.checked_add_signed(ttl),
        }
    }

    /// Whether the message should still be displayed at `now`.
    #[must_use]
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }

    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.expires_at.is_some()
    }

    /// Milliseconds left before the message expires, for client-side hiding.
    #[must_use]
    pub fn remaining_millis(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at
            .map(|expires_at| (expires_at - now).num_milliseconds().max(0))
    }
}
