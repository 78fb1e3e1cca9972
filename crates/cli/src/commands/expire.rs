//! Abandoned-cart janitor.
//!
//! Moves carts past their maximum age to the terminal `expired` state,
//! regardless of reminder count. The reminder job never does this itself -
//! expiry is a scheduled maintenance concern, so it lives here.

use chrono::{Duration, Utc};

use super::CommandError;

/// Expire every recoverable cart abandoned more than `max_age_days` ago.
///
/// Returns the number of carts expired. Terminal records (recovered or
/// already expired) are never touched, so the run is idempotent.
///
/// # Errors
///
/// Returns [`CommandError`] if the database is unreachable or the update
/// fails.
pub async fn run(max_age_days: i64) -> Result<u64, CommandError> {
    let pool = super::connect().await?;
    let cutoff = Utc::now() - Duration::days(max_age_days);

    tracing::info!(%cutoff, "Expiring abandoned carts older than {max_age_days} days");

    let result = sqlx::query(
        "UPDATE abandoned_carts \
         SET status = 'expired' \
         WHERE status IN ('abandoned', 'reminded') \
           AND abandoned_at < $1",
    )
    .bind(cutoff)
    .execute(&pool)
    .await?;

    Ok(result.rows_affected())
}
