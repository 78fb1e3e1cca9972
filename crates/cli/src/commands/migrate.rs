//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded at
//! compile time; they are never run automatically on server startup.

use super::CommandError;

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns [`CommandError`] if the database is unreachable or a migration
/// fails.
pub async fn storefront() -> Result<(), CommandError> {
    tracing::info!("Connecting to storefront database...");
    let pool = super::connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}
