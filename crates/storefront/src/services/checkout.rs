//! Checkout submission and the per-visitor in-flight guard.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use deisishop_core::{CartItem, OrderId};

use crate::deisishop::{DeisishopClient, DeisishopError};

use super::message;

/// Backend accepting purchases.
pub trait OrderBackend: Send + Sync {
    /// Submit the cart lines, returning the server-issued order ID.
    fn submit(
        &self,
        items: &[CartItem],
    ) -> impl Future<Output = Result<OrderId, DeisishopError>> + Send;
}

impl OrderBackend for DeisishopClient {
    async fn submit(&self, items: &[CartItem]) -> Result<OrderId, DeisishopError> {
        self.buy(items).await
    }
}

/// Result of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Nothing to buy; no request was sent.
    EmptyCart,
    /// Another checkout for this visitor is still running; no request was sent.
    AlreadyPending,
    /// Order placed and cart cleared.
    Completed(OrderId),
    /// Backend refused the order, optionally saying why.
    Rejected(Option<String>),
    /// Backend could not be reached or answered unintelligibly.
    Unreachable,
}

impl CheckoutOutcome {
    /// Classify a backend result.
    #[must_use]
    pub fn from_result(result: Result<OrderId, DeisishopError>) -> Self {
        match result {
            Ok(order_id) => Self::Completed(order_id),
            Err(DeisishopError::Rejected { message, .. }) => Self::Rejected(message),
            Err(e) => {
                tracing::warn!(error = %e, "Checkout failed to reach backend");
                Self::Unreachable
            }
        }
    }

    /// The user-facing text for this outcome.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::EmptyCart => message::EMPTY_CART.to_string(),
            Self::AlreadyPending => message::CHECKOUT_IN_PROGRESS.to_string(),
            Self::Completed(order_id) => message::checkout_succeeded(order_id),
            Self::Rejected(Some(reason)) => reason.clone(),
            Self::Rejected(None) => message::CHECKOUT_FAILED.to_string(),
            Self::Unreachable => message::CONNECTION_FAILED.to_string(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Tracks which visitors have a checkout in flight.
///
/// Cheap to clone; clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct CheckoutGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl CheckoutGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `visitor` as checking out.
    ///
    /// Returns `None` if a checkout is already running for them. The entry is
    /// released when the returned token is dropped.
    #[must_use]
    pub fn try_begin(&self, visitor: &str) -> Option<CheckoutToken> {
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(visitor.to_owned());

        inserted.then(|| CheckoutToken {
            guard: self.clone(),
            visitor: visitor.to_owned(),
        })
    }

    /// Whether a checkout is running for `visitor`.
    #[must_use]
    pub fn is_pending(&self, visitor: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(visitor)
    }
}

/// Held for the duration of one checkout.
#[derive(Debug)]
pub struct CheckoutToken {
    guard: CheckoutGuard,
    visitor: String,
}

impl Drop for CheckoutToken {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.visitor);
    }
}
