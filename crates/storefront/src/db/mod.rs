//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `nordic_aroma`
//!
//! ## Tables
//!
//! - `products` - Catalog products (name, shipping weight, price)
//! - `abandoned_carts` - Abandoned-cart records keyed by id and by
//!   one-time recovery token
//!
//! Repositories use the runtime sqlx query API with explicit row mapping;
//! values that fail domain validation on the way out of the database are
//! reported as [`RepositoryError::DataCorruption`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p nordic-aroma-cli -- migrate storefront
//! ```

pub mod abandoned_carts;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use abandoned_carts::{AbandonedCartStore, PgAbandonedCartStore};
pub use products::{PgProductRepository, ProductLookup};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    ///
    /// For recovery-token lookups this deliberately covers both "no such
    /// token" and "token already consumed" - callers must not be able to
    /// tell the difference.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate recovery token).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
