//! Product repository with read-through caching.
//!
//! Product rows change rarely but are read on every shipping quote (for
//! weights) and every reminder batch (for names), so reads go through a
//! short-TTL moka cache. Negative results are cached too - a cart referencing
//! a deleted product would otherwise hammer the table once per quote.

use std::time::Duration;

use moka::future::Cache;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use nordic_aroma_core::ProductId;

use super::RepositoryError;
use crate::models::Product;

/// How long product reads are served from cache.
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Maximum number of cached products.
const PRODUCT_CACHE_CAPACITY: u64 = 10_000;

/// Read-only product lookup, as consumed by the shipping engine (weights)
/// and the reminder job (names).
#[allow(async_fn_in_trait)]
pub trait ProductLookup {
    /// Fetch a product by ID. `Ok(None)` means the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
}

/// `PostgreSQL`-backed [`ProductLookup`] with a read-through cache.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
    cache: Cache<i32, Option<Product>>,
}

impl PgProductRepository {
    /// Create a new repository on the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();
        Self { pool, cache }
    }

    async fn fetch(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, weight_kg, price, currency \
             FROM products \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }
}

impl ProductLookup for PgProductRepository {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        if let Some(cached) = self.cache.get(&id.as_i32()).await {
            return Ok(cached);
        }

        let product = self.fetch(id).await?;
        self.cache.insert(id.as_i32(), product.clone()).await;
        Ok(product)
    }
}

/// Map a database row to a [`Product`].
fn product_from_row(row: &PgRow) -> Result<Product, RepositoryError> {
    let currency_raw: String = row.try_get("currency")?;
    let currency = currency_raw
        .parse()
        .map_err(|e: String| RepositoryError::DataCorruption(e))?;

    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        weight_kg: row.try_get("weight_kg")?,
        price: row.try_get("price")?,
        currency,
    })
}
