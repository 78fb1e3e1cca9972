//! Abandoned-cart reminder job.
//!
//! One invocation per scheduler trigger (the cron endpoint): query the
//! store for due carts, enrich each cart's items with product names, send
//! the recovery email, and advance the reminder state. Every failure is
//! isolated to its cart - the job always completes and reports a summary.

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::config::ReminderConfig;
use crate::db::abandoned_carts::AbandonedCartStore;
use crate::db::products::ProductLookup;
use crate::db::RepositoryError;
use crate::models::AbandonedCart;
use crate::services::email::{
    EmailError, Locale, RecoveryEmailItem, RecoveryEmailPayload, RecoveryEmailSender,
};

/// Tunables for one reminder run.
///
/// The abandonment threshold and the inter-reminder cooldown are separate
/// knobs. They default to the same hour, but a shop that reminds quickly and
/// then backs off can configure them apart.
#[derive(Debug, Clone, Copy)]
pub struct ReminderPolicy {
    /// How long a cart must have been idle to count as abandoned
    pub abandoned_after: Duration,
    /// Minimum spacing between reminders to the same cart
    pub cooldown: Duration,
    /// Reminder cap per cart
    pub max_reminders: i32,
}

impl ReminderPolicy {
    /// Build a policy from configuration.
    #[must_use]
    pub fn from_config(config: &ReminderConfig) -> Self {
        Self {
            abandoned_after: Duration::hours(config.abandoned_after_hours),
            cooldown: Duration::hours(config.cooldown_hours),
            max_reminders: config.max_reminders,
        }
    }
}

impl Default for ReminderPolicy {
    /// One hour to abandonment, one hour between reminders, three reminders.
    fn default() -> Self {
        Self {
            abandoned_after: Duration::hours(1),
            cooldown: Duration::hours(1),
            max_reminders: 3,
        }
    }
}

/// Aggregated result of one reminder run.
///
/// Per-cart failures are collected here, never thrown; the cron endpoint
/// returns this summary with a 200 even when every cart failed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRunSummary {
    /// Reminders delivered and recorded
    pub reminders_sent: u32,
    /// Carts whose reminder failed this run (eligible again next run)
    pub reminders_failed: u32,
    /// Candidates processed
    pub total_processed: u32,
    /// Per-cart error descriptions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// What went wrong for a single cart's reminder.
#[derive(Debug, thiserror::Error)]
enum ReminderSendError {
    #[error("email send failed: {0}")]
    Email(#[from] EmailError),
    #[error("store update failed: {0}")]
    Store(#[from] RepositoryError),
}

/// The reminder job.
///
/// Generic over its collaborators so it can run against in-memory doubles in
/// tests. Per-cart processing is sequential; the carts have no data
/// dependency on each other, and a failed send is simply retried on the next
/// scheduled run (bounded by the reminder cap).
pub struct AbandonedCartReminderJob<S, P, E> {
    store: S,
    products: P,
    email: E,
}

impl<S, P, E> AbandonedCartReminderJob<S, P, E>
where
    S: AbandonedCartStore,
    P: ProductLookup,
    E: RecoveryEmailSender,
{
    /// Create a new job over the given collaborators.
    #[must_use]
    pub const fn new(store: S, products: P, email: E) -> Self {
        Self {
            store,
            products,
            email,
        }
    }

    /// Execute one reminder run.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] only if the candidate query itself fails;
    /// everything after that is isolated per cart and reported in the
    /// summary.
    #[instrument(skip(self, policy))]
    pub async fn run(&self, policy: &ReminderPolicy) -> Result<ReminderRunSummary, RepositoryError> {
        let now = Utc::now();
        let candidates = self
            .store
            .find_for_reminder(
                now - policy.abandoned_after,
                now - policy.cooldown,
                policy.max_reminders,
            )
            .await?;

        let mut summary = ReminderRunSummary {
            total_processed: u32::try_from(candidates.len()).unwrap_or(u32::MAX),
            ..ReminderRunSummary::default()
        };

        if candidates.is_empty() {
            tracing::info!("No abandoned carts due for a reminder");
            return Ok(summary);
        }

        for cart in &candidates {
            match self.remind(cart).await {
                Ok(()) => summary.reminders_sent += 1,
                Err(e) => {
                    summary.reminders_failed += 1;
                    summary.errors.push(format!("cart {}: {e}", cart.cart_id));
                    tracing::warn!(
                        cart_id = %cart.cart_id,
                        error = %e,
                        "Reminder failed, cart stays eligible for the next run"
                    );
                }
            }
        }

        tracing::info!(
            sent = summary.reminders_sent,
            failed = summary.reminders_failed,
            total = summary.total_processed,
            "Abandoned-cart reminder run complete"
        );

        Ok(summary)
    }

    /// Remind one cart: enrich, send, mark. Ordered per cart.
    async fn remind(&self, cart: &AbandonedCart) -> Result<(), ReminderSendError> {
        let payload = self.build_payload(cart).await;

        // Reminder emails are fixed to the home-market locale
        self.email
            .send_cart_recovery(&cart.email, &payload, Locale::Sv)
            .await?;

        self.store
            .mark_reminded(cart.id, cart.reminder_count + 1)
            .await?;

        Ok(())
    }

    /// Resolve product names for the email. A name that cannot be resolved
    /// falls back to a synthetic label and never aborts the cart.
    async fn build_payload(&self, cart: &AbandonedCart) -> RecoveryEmailPayload {
        let mut items = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let name = match self.products.product(item.product_id).await {
                Ok(Some(product)) => product.name,
                Ok(None) => {
                    tracing::warn!(
                        product_id = %item.product_id,
                        cart_id = %cart.cart_id,
                        "Product missing while building reminder email, using fallback label"
                    );
                    format!("Product {}", item.product_id)
                }
                Err(e) => {
                    tracing::warn!(
                        product_id = %item.product_id,
                        cart_id = %cart.cart_id,
                        error = %e,
                        "Product lookup failed while building reminder email, using fallback label"
                    );
                    format!("Product {}", item.product_id)
                }
            };
            items.push(RecoveryEmailItem {
                name,
                quantity: item.quantity,
                price: item.price,
            });
        }

        RecoveryEmailPayload {
            items,
            total: cart.total,
            recovery_token: cart.recovery_token.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;

    use nordic_aroma_core::{
        AbandonedCartId, AbandonedCartStatus, CurrencyCode, Email, ProductId,
    };

    use super::*;
    use crate::db::abandoned_carts::testing::MemoryAbandonedCartStore;
    use crate::db::products::testing::MemoryProductLookup;
    use crate::models::abandoned_cart::{AbandonedCartItem, generate_recovery_token};
    use crate::models::Product;
    use crate::services::email::EmailReceipt;

    /// Sender double: records sends, fails for configured addresses.
    /// Clones share the sent log.
    #[derive(Clone, Default)]
    struct MockEmailSender {
        fail_for: Vec<String>,
        sent: Arc<Mutex<Vec<(String, RecoveryEmailPayload, Locale)>>>,
    }

    impl MockEmailSender {
        fn failing_for(addresses: &[&str]) -> Self {
            Self {
                fail_for: addresses.iter().map(ToString::to_string).collect(),
                sent: Arc::default(),
            }
        }

        fn sent(&self) -> Vec<(String, RecoveryEmailPayload, Locale)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl RecoveryEmailSender for MockEmailSender {
        async fn send_cart_recovery(
            &self,
            to: &Email,
            payload: &RecoveryEmailPayload,
            locale: Locale,
        ) -> Result<EmailReceipt, EmailError> {
            if self.fail_for.iter().any(|a| a == to.as_str()) {
                return Err(EmailError::Rejected("mailbox unavailable".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), payload.clone(), locale));
            Ok(EmailReceipt {
                message_id: Some("mock-message-id".to_string()),
            })
        }
    }

    fn cart(id: i32, cart_id: &str, email: &str, hours_ago: i64) -> AbandonedCart {
        AbandonedCart {
            id: AbandonedCartId::new(id),
            cart_id: cart_id.to_string(),
            customer_id: None,
            email: Email::parse(email).unwrap(),
            session_id: None,
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
            recovery_token: generate_recovery_token(),
            abandoned_at: Utc::now() - Duration::hours(hours_ago),
            reminded_at: None,
            recovered_at: None,
            recovery_order_id: None,
            reminder_count: 0,
            status: AbandonedCartStatus::Abandoned,
            ip_address: None,
            user_agent: None,
        }
    }

    fn products() -> MemoryProductLookup {
        MemoryProductLookup::new([
            Product {
                id: ProductId::new(1),
                name: "Lavender Oil".to_string(),
                weight_kg: Decimal::new(1, 1),
                price: Decimal::new(29_999, 2),
                currency: CurrencyCode::SEK,
            },
            Product {
                id: ProductId::new(2),
                name: "Diffuser".to_string(),
                weight_kg: Decimal::new(12, 1),
                price: Decimal::new(44_950, 2),
                currency: CurrencyCode::SEK,
            },
        ])
    }

    #[tokio::test]
    async fn test_empty_store_reports_zero() {
        let job = AbandonedCartReminderJob::new(
            MemoryAbandonedCartStore::new(),
            products(),
            MockEmailSender::default(),
        );

        let summary = job.run(&ReminderPolicy::default()).await.unwrap();
        assert_eq!(summary.reminders_sent, 0);
        assert_eq!(summary.reminders_failed, 0);
        assert_eq!(summary.total_processed, 0);
        assert!(summary.errors.is_empty());
    }

    #[tokio::test]
    async fn test_successful_run_sends_and_marks() {
        let store = MemoryAbandonedCartStore::new();
        store.push(cart(1, "cart-a", "anna@example.se", 2));

        let sender = MockEmailSender::default();
        let job = AbandonedCartReminderJob::new(store.clone(), products(), sender.clone());

        let summary = job.run(&ReminderPolicy::default()).await.unwrap();
        assert_eq!(summary.reminders_sent, 1);
        assert_eq!(summary.reminders_failed, 0);
        assert_eq!(summary.total_processed, 1);

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        let (to, payload, locale) = &sent[0];
        assert_eq!(to, "anna@example.se");
        assert_eq!(*locale, Locale::Sv);
        let names: Vec<&str> = payload.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Lavender Oil", "Diffuser"]);

        let updated = store.get(AbandonedCartId::new(1)).unwrap();
        assert_eq!(updated.status, AbandonedCartStatus::Reminded);
        assert_eq!(updated.reminder_count, 1);
        assert!(updated.reminded_at.is_some());
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        let store = MemoryAbandonedCartStore::new();
        store.push(cart(1, "cart-a", "bounce@example.se", 2));
        store.push(cart(2, "cart-b", "bo@example.se", 3));

        let sender = MockEmailSender::failing_for(&["bounce@example.se"]);
        let job = AbandonedCartReminderJob::new(store.clone(), products(), sender.clone());

        let summary = job.run(&ReminderPolicy::default()).await.unwrap();
        assert_eq!(summary.reminders_sent, 1);
        assert_eq!(summary.reminders_failed, 1);
        assert_eq!(summary.total_processed, 2);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("cart-a"));

        // Cart B advanced, cart A untouched and eligible next run
        let cart_a = store.get(AbandonedCartId::new(1)).unwrap();
        assert_eq!(cart_a.reminder_count, 0);
        assert_eq!(cart_a.status, AbandonedCartStatus::Abandoned);

        let cart_b = store.get(AbandonedCartId::new(2)).unwrap();
        assert_eq!(cart_b.reminder_count, 1);
        assert_eq!(cart_b.status, AbandonedCartStatus::Reminded);
    }

    #[tokio::test]
    async fn test_second_run_respects_cooldown() {
        let store = MemoryAbandonedCartStore::new();
        store.push(cart(1, "cart-a", "anna@example.se", 2));

        let sender = MockEmailSender::default();
        let job = AbandonedCartReminderJob::new(store.clone(), products(), sender.clone());

        let first = job.run(&ReminderPolicy::default()).await.unwrap();
        assert_eq!(first.reminders_sent, 1);

        // Immediately re-running finds nothing: the fresh reminded_at sits
        // inside the cooldown window
        let second = job.run(&ReminderPolicy::default()).await.unwrap();
        assert_eq!(second.total_processed, 0);
        assert_eq!(sender.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_gets_fallback_label() {
        let store = MemoryAbandonedCartStore::new();
        let mut orphaned = cart(1, "cart-a", "anna@example.se", 2);
        orphaned.items = vec![AbandonedCartItem {
            product_id: ProductId::new(777),
            quantity: 1,
            price: Decimal::new(9_900, 2),
        }];
        store.push(orphaned);

        let sender = MockEmailSender::default();
        let job = AbandonedCartReminderJob::new(store.clone(), products(), sender.clone());

        let summary = job.run(&ReminderPolicy::default()).await.unwrap();
        assert_eq!(summary.reminders_sent, 1);

        let sent = sender.sent();
        assert_eq!(sent[0].1.items[0].name, "Product 777");
    }

    #[tokio::test]
    async fn test_summary_serializes_camel_case() {
        let summary = ReminderRunSummary {
            reminders_sent: 1,
            reminders_failed: 1,
            total_processed: 2,
            errors: vec!["cart cart-a: boom".to_string()],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["remindersSent"], 1);
        assert_eq!(json["remindersFailed"], 1);
        assert_eq!(json["totalProcessed"], 2);
        assert!(json["errors"].is_array());

        // Errors are omitted entirely when empty
        let clean = ReminderRunSummary::default();
        let json = serde_json::to_value(&clean).unwrap();
        assert!(json.get("errors").is_none());
    }
}
