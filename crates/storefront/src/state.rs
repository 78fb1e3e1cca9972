//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::abandoned_carts::PgAbandonedCartStore;
use crate::db::products::PgProductRepository;
use crate::services::email::SmtpEmailSender;
use crate::services::recovery::CartRecoveryResolver;
use crate::services::reminder::AbandonedCartReminderJob;
use crate::shipping::{CarrierCatalog, FreeShippingPolicy, ShippingRateEngine};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateInitError {
    #[error("email transport error: {0}")]
    Email(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    shipping: ShippingRateEngine,
    products: PgProductRepository,
    carts: PgAbandonedCartStore,
    email: SmtpEmailSender,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport configuration is invalid.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateInitError> {
        let shipping = ShippingRateEngine::new(
            CarrierCatalog::swedish(),
            FreeShippingPolicy::with_threshold(config.shipping.free_shipping_threshold),
        );
        let products = PgProductRepository::new(pool.clone());
        let carts = PgAbandonedCartStore::new(pool.clone());
        let email = SmtpEmailSender::new(&config.email, config.base_url.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shipping,
                products,
                carts,
                email,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the shipping-rate engine.
    #[must_use]
    pub fn shipping(&self) -> &ShippingRateEngine {
        &self.inner.shipping
    }

    /// Get a reference to the product repository.
    #[must_use]
    pub fn products(&self) -> &PgProductRepository {
        &self.inner.products
    }

    /// Get a reference to the abandoned-cart store.
    #[must_use]
    pub fn carts(&self) -> &PgAbandonedCartStore {
        &self.inner.carts
    }

    /// Assemble a reminder job over the shared collaborators.
    #[must_use]
    pub fn reminder_job(
        &self,
    ) -> AbandonedCartReminderJob<PgAbandonedCartStore, PgProductRepository, SmtpEmailSender> {
        AbandonedCartReminderJob::new(
            self.inner.carts.clone(),
            self.inner.products.clone(),
            self.inner.email.clone(),
        )
    }

    /// Assemble a recovery resolver over the shared store.
    #[must_use]
    pub fn recovery_resolver(&self) -> CartRecoveryResolver<PgAbandonedCartStore> {
        CartRecoveryResolver::new(self.inner.carts.clone())
    }
}
