//! Abandoned-cart repository.
//!
//! This module provides the [`AbandonedCartStore`] persistence abstraction
//! and its `PostgreSQL` implementation. Records are keyed by internal id and
//! by one-time recovery token; status transitions are enforced in the SQL
//! predicates so concurrent writers cannot resurrect a terminal record.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use nordic_aroma_core::{AbandonedCartId, AbandonedCartStatus, Email, RecoveryToken};

use super::RepositoryError;
use crate::models::abandoned_cart::{
    AbandonedCart, AbandonedCartItem, NewAbandonedCart, generate_recovery_token,
};

/// Persistence abstraction for abandoned-cart records.
///
/// The reminder job and the recovery resolver are generic over this trait so
/// they can be exercised against an in-memory store in tests.
#[allow(async_fn_in_trait)]
pub trait AbandonedCartStore {
    /// Insert a new record with status `abandoned` and reminder count 0.
    ///
    /// The store assigns the id, the recovery token, and `abandoned_at`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] on a duplicate recovery token
    /// and [`RepositoryError::Database`] on other write failures.
    async fn create(&self, new_cart: NewAbandonedCart) -> Result<AbandonedCart, RepositoryError>;

    /// Look up a record by recovery token.
    ///
    /// Only records whose token is still usable (status `abandoned` or
    /// `reminded`) are returned.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for unknown tokens and for
    /// tokens on recovered/expired records alike - callers must not be able
    /// to distinguish the two cases.
    async fn find_by_recovery_token(
        &self,
        token: &RecoveryToken,
    ) -> Result<AbandonedCart, RepositoryError>;

    /// Find carts eligible for a reminder.
    ///
    /// A cart qualifies when it is not in a terminal state, was abandoned
    /// before `abandoned_before`, has fewer than `max_reminders` reminders,
    /// and its last reminder (if any) was sent before `reminded_before`.
    /// The last clause enforces the minimum spacing between reminders.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    async fn find_for_reminder(
        &self,
        abandoned_before: DateTime<Utc>,
        reminded_before: DateTime<Utc>,
        max_reminders: i32,
    ) -> Result<Vec<AbandonedCart>, RepositoryError>;

    /// Record a delivered reminder: stamps `reminded_at`, stores the new
    /// reminder count, and moves the record to `reminded`.
    ///
    /// Succeeds (as a no-op) if the record has meanwhile reached a terminal
    /// state; overlapping job runs are last-writer-wins on the count.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the update fails.
    async fn mark_reminded(
        &self,
        id: AbandonedCartId,
        reminder_count: i32,
    ) -> Result<(), RepositoryError>;

    /// Transition a recoverable record to `recovered` and attach the order
    /// that completed the recovery.
    ///
    /// Safe to call more than once: a second call with the same token is a
    /// no-op and the first `recovery_order_id` is retained, since the
    /// customer may click the email link (and check out) repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the update fails.
    async fn mark_recovered(
        &self,
        token: &RecoveryToken,
        order_id: &str,
    ) -> Result<(), RepositoryError>;

    /// Terminal transition for carts past their maximum age, regardless of
    /// reminder count. Called by the janitor, not by the reminder job.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the update fails.
    async fn mark_expired(&self, id: AbandonedCartId) -> Result<(), RepositoryError>;
}

/// All columns of `abandoned_carts`, in the order the row mapper reads them.
const CART_COLUMNS: &str = "id, cart_id, customer_id, email, session_id, items, \
     subtotal, total, currency, recovery_token, abandoned_at, reminded_at, \
     recovered_at, recovery_order_id, reminder_count, status, ip_address, user_agent";

/// `PostgreSQL`-backed [`AbandonedCartStore`].
#[derive(Clone)]
pub struct PgAbandonedCartStore {
    pool: PgPool,
}

impl PgAbandonedCartStore {
    /// Create a new store on the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AbandonedCartStore for PgAbandonedCartStore {
    async fn create(&self, new_cart: NewAbandonedCart) -> Result<AbandonedCart, RepositoryError> {
        let token = generate_recovery_token();
        let items = serde_json::to_value(&new_cart.items).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to serialize cart items: {e}"))
        })?;

        let row = sqlx::query(&format!(
            "INSERT INTO abandoned_carts \
                 (cart_id, customer_id, email, session_id, items, subtotal, total, \
                  currency, recovery_token, abandoned_at, reminder_count, status, \
                  ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), 0, 'abandoned', $10, $11) \
             RETURNING {CART_COLUMNS}"
        ))
        .bind(&new_cart.cart_id)
        .bind(&new_cart.customer_id)
        .bind(new_cart.email.as_str())
        .bind(&new_cart.session_id)
        .bind(items)
        .bind(new_cart.subtotal)
        .bind(new_cart.total)
        .bind(new_cart.currency.code())
        .bind(token.as_str())
        .bind(&new_cart.ip_address)
        .bind(&new_cart.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("recovery token already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        cart_from_row(&row)
    }

    async fn find_by_recovery_token(
        &self,
        token: &RecoveryToken,
    ) -> Result<AbandonedCart, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {CART_COLUMNS} \
             FROM abandoned_carts \
             WHERE recovery_token = $1 \
               AND status IN ('abandoned', 'reminded')"
        ))
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => cart_from_row(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn find_for_reminder(
        &self,
        abandoned_before: DateTime<Utc>,
        reminded_before: DateTime<Utc>,
        max_reminders: i32,
    ) -> Result<Vec<AbandonedCart>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CART_COLUMNS} \
             FROM abandoned_carts \
             WHERE status IN ('abandoned', 'reminded') \
               AND abandoned_at < $1 \
               AND reminder_count < $2 \
               AND (reminded_at IS NULL OR reminded_at < $3) \
             ORDER BY abandoned_at ASC"
        ))
        .bind(abandoned_before)
        .bind(max_reminders)
        .bind(reminded_before)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(cart_from_row).collect()
    }

    async fn mark_reminded(
        &self,
        id: AbandonedCartId,
        reminder_count: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE abandoned_carts \
             SET reminded_at = NOW(), reminder_count = $2, status = 'reminded' \
             WHERE id = $1 AND status IN ('abandoned', 'reminded')",
        )
        .bind(id.as_i32())
        .bind(reminder_count)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // The cart reached a terminal state since the candidate query ran.
            tracing::debug!(cart_record_id = %id, "mark_reminded skipped terminal record");
        }

        Ok(())
    }

    async fn mark_recovered(
        &self,
        token: &RecoveryToken,
        order_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE abandoned_carts \
             SET status = 'recovered', recovered_at = NOW(), recovery_order_id = $2 \
             WHERE recovery_token = $1 AND status IN ('abandoned', 'reminded')",
        )
        .bind(token.as_str())
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Already recovered (repeat checkout from the same link) or expired.
            tracing::debug!("mark_recovered was a no-op");
        }

        Ok(())
    }

    async fn mark_expired(&self, id: AbandonedCartId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE abandoned_carts \
             SET status = 'expired' \
             WHERE id = $1 AND status IN ('abandoned', 'reminded')",
        )
        .bind(id.as_i32())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(cart_record_id = %id, "mark_expired skipped terminal record");
        }

        Ok(())
    }
}

/// Map a database row to an [`AbandonedCart`].
fn cart_from_row(row: &PgRow) -> Result<AbandonedCart, RepositoryError> {
    let email_raw: String = row.try_get("email")?;
    let email = Email::parse(&email_raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
    })?;

    let status_raw: String = row.try_get("status")?;
    let status: AbandonedCartStatus = status_raw
        .parse()
        .map_err(|e: String| RepositoryError::DataCorruption(e))?;

    let currency_raw: String = row.try_get("currency")?;
    let currency = currency_raw
        .parse()
        .map_err(|e: String| RepositoryError::DataCorruption(e))?;

    let items_raw: serde_json::Value = row.try_get("items")?;
    let items: Vec<AbandonedCartItem> = serde_json::from_value(items_raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid cart items in database: {e}"))
    })?;

    let token_raw: String = row.try_get("recovery_token")?;

    Ok(AbandonedCart {
        id: AbandonedCartId::new(row.try_get("id")?),
        cart_id: row.try_get("cart_id")?,
        customer_id: row.try_get("customer_id")?,
        email,
        session_id: row.try_get("session_id")?,
        items,
        subtotal: row.try_get("subtotal")?,
        total: row.try_get("total")?,
        currency,
        recovery_token: RecoveryToken::from_trusted(token_raw),
        abandoned_at: row.try_get("abandoned_at")?,
        reminded_at: row.try_get("reminded_at")?,
        recovered_at: row.try_get("recovered_at")?,
        recovery_order_id: row.try_get("recovery_order_id")?,
        reminder_count: row.try_get("reminder_count")?,
        status,
        ip_address: row.try_get("ip_address")?,
        user_agent: row.try_get("user_agent")?,
    })
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;

    use nordic_aroma_core::{CurrencyCode, ProductId};

    use super::testing::MemoryAbandonedCartStore;
    use super::*;

    fn new_cart(cart_id: &str) -> NewAbandonedCart {
        NewAbandonedCart {
            cart_id: cart_id.to_string(),
            customer_id: None,
            email: Email::parse("kund@example.se").unwrap(),
            session_id: Some("session-1".to_string()),
            items: vec![
                AbandonedCartItem {
                    product_id: ProductId::new(1),
                    quantity: 2,
                    price: Decimal::new(29_999, 2),
                },
                AbandonedCartItem {
                    product_id: ProductId::new(2),
                    quantity: 1,
                    price: Decimal::new(44_950, 2),
                },
            ],
            subtotal: Decimal::new(104_948, 2),
            total: Decimal::new(104_948, 2),
            currency: CurrencyCode::SEK,
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_then_find_by_token_roundtrip() {
        let store = MemoryAbandonedCartStore::new();
        let created = store.create(new_cart("cart-1")).await.unwrap();

        assert_eq!(created.status, AbandonedCartStatus::Abandoned);
        assert_eq!(created.reminder_count, 0);

        let fetched = store
            .find_by_recovery_token(&created.recovery_token)
            .await
            .unwrap();
        assert_eq!(fetched.items, created.items);
        assert_eq!(fetched.total, created.total);
        assert_eq!(fetched.email, created.email);
    }

    #[tokio::test]
    async fn test_find_by_token_hides_terminal_records() {
        let store = MemoryAbandonedCartStore::new();
        let created = store.create(new_cart("cart-1")).await.unwrap();

        store
            .mark_recovered(&created.recovery_token, "order-9")
            .await
            .unwrap();

        // Undifferentiated NotFound: same error as for a token that never existed
        assert!(matches!(
            store.find_by_recovery_token(&created.recovery_token).await,
            Err(RepositoryError::NotFound)
        ));
        let bogus = RecoveryToken::parse("never-existed").unwrap();
        assert!(matches!(
            store.find_by_recovery_token(&bogus).await,
            Err(RepositoryError::NotFound)
        ));
    }

    fn record(
        id: i32,
        cart_id: &str,
        abandoned_hours_ago: i64,
        reminded_at: Option<DateTime<Utc>>,
        reminder_count: i32,
        status: AbandonedCartStatus,
    ) -> AbandonedCart {
        AbandonedCart {
            id: AbandonedCartId::new(id),
            cart_id: cart_id.to_string(),
            customer_id: None,
            email: Email::parse("kund@example.se").unwrap(),
            session_id: None,
            items: new_cart(cart_id).items,
            subtotal: Decimal::new(104_948, 2),
            total: Decimal::new(104_948, 2),
            currency: CurrencyCode::SEK,
            recovery_token: generate_recovery_token(),
            abandoned_at: Utc::now() - Duration::hours(abandoned_hours_ago),
            reminded_at,
            recovered_at: None,
            recovery_order_id: None,
            reminder_count,
            status,
            ip_address: None,
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn test_find_for_reminder_bounds() {
        let store = MemoryAbandonedCartStore::new();
        let now = Utc::now();

        // Fresh cart: under the abandonment threshold, not eligible
        store.push(record(1, "cart-fresh", 0, None, 0, AbandonedCartStatus::Abandoned));
        // Old cart, never reminded: eligible
        store.push(record(2, "cart-old", 3, None, 0, AbandonedCartStatus::Abandoned));
        // Old cart at the reminder cap: not eligible
        store.push(record(
            3,
            "cart-capped",
            3,
            Some(now - Duration::hours(2)),
            3,
            AbandonedCartStatus::Reminded,
        ));
        // Old cart reminded minutes ago: inside the cooldown window, not eligible
        store.push(record(
            4,
            "cart-cooling",
            3,
            Some(now - Duration::minutes(5)),
            1,
            AbandonedCartStatus::Reminded,
        ));
        // Old cart reminded long ago: past the cooldown, eligible again
        store.push(record(
            5,
            "cart-due-again",
            6,
            Some(now - Duration::hours(2)),
            1,
            AbandonedCartStatus::Reminded,
        ));
        // Recovered cart: terminal, never eligible
        store.push(record(6, "cart-won", 6, None, 1, AbandonedCartStatus::Recovered));

        let eligible = store
            .find_for_reminder(now - Duration::hours(1), now - Duration::hours(1), 3)
            .await
            .unwrap();

        let ids: Vec<&str> = eligible.iter().map(|c| c.cart_id.as_str()).collect();
        assert_eq!(ids, vec!["cart-due-again", "cart-old"]);
        assert!(eligible.iter().all(|c| c.reminder_count < 3));
        assert!(eligible.iter().all(|c| !c.status.is_terminal()));
    }

    #[tokio::test]
    async fn test_mark_recovered_is_idempotent() {
        let store = MemoryAbandonedCartStore::new();
        let created = store.create(new_cart("cart-1")).await.unwrap();

        store
            .mark_recovered(&created.recovery_token, "order-first")
            .await
            .unwrap();
        // Second call with a different order id: no error, first order id wins
        store
            .mark_recovered(&created.recovery_token, "order-second")
            .await
            .unwrap();

        let cart = store.get(created.id).unwrap();
        assert_eq!(cart.status, AbandonedCartStatus::Recovered);
        assert_eq!(cart.recovery_order_id.as_deref(), Some("order-first"));
    }

    #[tokio::test]
    async fn test_mark_reminded_advances_state() {
        let store = MemoryAbandonedCartStore::new();
        let created = store.create(new_cart("cart-1")).await.unwrap();

        store.mark_reminded(created.id, 1).await.unwrap();

        let cart = store.get(created.id).unwrap();
        assert_eq!(cart.status, AbandonedCartStatus::Reminded);
        assert_eq!(cart.reminder_count, 1);
        assert!(cart.reminded_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_reminded_noop_on_terminal_record() {
        let store = MemoryAbandonedCartStore::new();
        let created = store.create(new_cart("cart-1")).await.unwrap();
        store
            .mark_recovered(&created.recovery_token, "order-1")
            .await
            .unwrap();

        // Succeeds without touching the record
        store.mark_reminded(created.id, 1).await.unwrap();

        let cart = store.get(created.id).unwrap();
        assert_eq!(cart.status, AbandonedCartStatus::Recovered);
        assert_eq!(cart.reminder_count, 0);
    }

    #[tokio::test]
    async fn test_mark_expired_is_terminal() {
        let store = MemoryAbandonedCartStore::new();
        let created = store.create(new_cart("cart-1")).await.unwrap();

        store.mark_expired(created.id).await.unwrap();

        assert!(matches!(
            store.find_by_recovery_token(&created.recovery_token).await,
            Err(RepositoryError::NotFound)
        ));
        // Expired carts never re-enter the reminder pool
        let eligible = store
            .find_for_reminder(Utc::now(), Utc::now(), i32::MAX)
            .await
            .unwrap();
        assert!(eligible.is_empty());
    }
}
