//! Cart recovery resolution.
//!
//! Resolving a token returns the cart snapshot for the client to repopulate
//! its live cart; it does NOT consume the token. Recovery is committed only
//! once an order is actually placed, via [`CartRecoveryResolver::complete`] -
//! so a customer can open the email link to look at their cart without
//! burning it, and checking out twice from the same link stays safe.

use serde::Serialize;
use tracing::instrument;

use nordic_aroma_core::{CurrencyCode, Email, RecoveryToken};
use rust_decimal::Decimal;

use crate::db::RepositoryError;
use crate::db::abandoned_carts::AbandonedCartStore;
use crate::models::AbandonedCartItem;

/// Errors from token resolution.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    /// The token is unknown, already used, or expired. Deliberately
    /// undifferentiated so probing clients learn nothing about which.
    #[error("invalid or expired recovery token")]
    InvalidOrExpiredToken,

    /// The store itself failed.
    #[error("store failure: {0}")]
    Store(RepositoryError),
}

/// Cart snapshot returned to the client for restoration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredCart {
    /// The live cart this snapshot was taken from
    pub cart_id: String,
    /// Email the reminder was sent to
    pub email: Email,
    /// Cart lines with price snapshots
    pub items: Vec<AbandonedCartItem>,
    /// Cart total, major units
    pub total: Decimal,
    /// Currency of the total
    pub currency: CurrencyCode,
}

/// Validates recovery tokens and returns cart snapshots.
pub struct CartRecoveryResolver<S> {
    store: S,
}

impl<S: AbandonedCartStore> CartRecoveryResolver<S> {
    /// Create a new resolver over the given store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve a token to its cart snapshot, without consuming the token.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::InvalidOrExpiredToken`] when the token does
    /// not resolve to a recoverable cart (mapped to a 404 by the HTTP
    /// surface), [`RecoveryError::Store`] on infrastructure failure (a 500).
    #[instrument(skip(self, token))]
    pub async fn recover(&self, token: &RecoveryToken) -> Result<RecoveredCart, RecoveryError> {
        let cart = match self.store.find_by_recovery_token(token).await {
            Ok(cart) => cart,
            Err(RepositoryError::NotFound) => return Err(RecoveryError::InvalidOrExpiredToken),
            Err(e) => return Err(RecoveryError::Store(e)),
        };

        tracing::info!(cart_id = %cart.cart_id, "Recovery token resolved");

        Ok(RecoveredCart {
            cart_id: cart.cart_id,
            email: cart.email,
            items: cart.items,
            total: cart.total,
            currency: cart.currency,
        })
    }

    /// Commit a recovery: called by order creation once the customer has
    /// actually checked out from the recovery link.
    ///
    /// Idempotent - a repeat checkout from the same link is a no-op and the
    /// first order id is retained.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the update fails.
    #[instrument(skip(self, token))]
    pub async fn complete(
        &self,
        token: &RecoveryToken,
        order_id: &str,
    ) -> Result<(), RepositoryError> {
        self.store.mark_recovered(token, order_id).await
    }
}
