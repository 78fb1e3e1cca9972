//! Abandoned-cart entity and creation payload.
//!
//! An [`AbandonedCart`] is written when a live cart is detected idle past the
//! abandonment threshold. It is mutated only by the reminder job (status,
//! `reminded_at`, `reminder_count`) and by recovery completion (status,
//! `recovered_at`, `recovery_order_id`), and never hard-deleted - recovered
//! and expired records stay around for analytics.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nordic_aroma_core::{AbandonedCartId, AbandonedCartStatus, CurrencyCode, Email, ProductId, RecoveryToken};

/// One line of an abandoned cart: a product reference with a price snapshot.
///
/// The price is snapshotted at abandonment time so the reminder email shows
/// what the customer actually saw, even if the catalog price moves later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbandonedCartItem {
    /// Referenced product
    pub product_id: ProductId,
    /// Quantity in the cart
    pub quantity: i32,
    /// Unit price at abandonment time, major currency units
    pub price: Decimal,
}

/// An abandoned-cart record.
///
/// The recovery token is unique, unguessable, and stable for the record's
/// lifetime; it is the only handle exposed to the customer (via the reminder
/// email link). Status transitions are monotonic - see
/// [`AbandonedCartStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbandonedCart {
    /// Internal ID
    pub id: AbandonedCartId,
    /// The live shopping cart this record was snapshotted from (external)
    pub cart_id: String,
    /// Customer ID, when the cart belonged to a signed-in customer
    pub customer_id: Option<String>,
    /// Recovery email address - recovery is email-driven, so this is required
    pub email: Email,
    /// Browser session the cart was abandoned in
    pub session_id: Option<String>,
    /// Cart lines with price snapshots
    pub items: Vec<AbandonedCartItem>,
    /// Item subtotal, major currency units
    pub subtotal: Decimal,
    /// Cart total, major currency units
    pub total: Decimal,
    /// Currency of the amounts above
    pub currency: CurrencyCode,
    /// One-time recovery handle embedded in the reminder email
    pub recovery_token: RecoveryToken,
    /// When the cart was detected abandoned
    pub abandoned_at: DateTime<Utc>,
    /// When the most recent reminder was sent
    pub reminded_at: Option<DateTime<Utc>>,
    /// When the cart was recovered
    pub recovered_at: Option<DateTime<Utc>>,
    /// Order placed through the recovery link, once recovered
    pub recovery_order_id: Option<String>,
    /// Reminders sent so far
    pub reminder_count: i32,
    /// Lifecycle status
    pub status: AbandonedCartStatus,
    /// Client IP at abandonment time (audit only)
    pub ip_address: Option<String>,
    /// Client user agent at abandonment time (audit only)
    pub user_agent: Option<String>,
}

impl AbandonedCart {
    /// Total number of units across all cart lines.
    ///
    /// Drives singular/plural wording in the reminder email.
    #[must_use]
    pub fn total_units(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }
}

/// Payload for creating a new abandoned-cart record.
///
/// The store assigns the ID, the recovery token, the `abandoned_at`
/// timestamp, and the initial status/reminder count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAbandonedCart {
    /// The live shopping cart being snapshotted
    pub cart_id: String,
    /// Customer ID, if signed in
    pub customer_id: Option<String>,
    /// Recovery email address
    pub email: Email,
    /// Browser session ID
    pub session_id: Option<String>,
    /// Cart lines with price snapshots
    pub items: Vec<AbandonedCartItem>,
    /// Item subtotal
    pub subtotal: Decimal,
    /// Cart total
    pub total: Decimal,
    /// Currency of the amounts
    pub currency: CurrencyCode,
    /// Client IP (audit only)
    pub ip_address: Option<String>,
    /// Client user agent (audit only)
    pub user_agent: Option<String>,
}

/// Generate a fresh recovery token: 32 random bytes, URL-safe base64.
///
/// 256 bits of CSPRNG output makes tokens unguessable; the URL-safe alphabet
/// lets them ride in the `/cart/recover?token=...` link without escaping.
#[must_use]
pub fn generate_recovery_token() -> RecoveryToken {
    let bytes: [u8; 32] = rand::random();
    RecoveryToken::from_trusted(URL_SAFE_NO_PAD.encode(bytes))
}
