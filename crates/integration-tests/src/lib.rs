//! Integration tests for Nordic Aroma.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p nordic-aroma-cli -- migrate
//!
//! # Start the storefront
//! cargo run -p nordic-aroma-storefront
//!
//! # Run integration tests
//! cargo test -p nordic-aroma-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` - Base URL of the running storefront
//!   (default: `http://localhost:3000`)
//! - `STOREFRONT_DATABASE_URL` - Database the storefront is running against
//!   (tests seed abandoned carts directly)
//! - `CRON_SECRET` - Shared secret the storefront was started with

use sqlx::PgPool;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// The cron shared secret the storefront under test was started with.
#[must_use]
pub fn cron_secret() -> String {
    std::env::var("CRON_SECRET").unwrap_or_else(|_| "integration-test-secret".to_string())
}

/// Connect to the database the storefront under test is running against.
///
/// # Panics
///
/// Panics if the database URL is missing or the connection fails - these
/// tests cannot run without a database.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL must be set for integration tests");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}
