//! Cron trigger handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireCronAuth;
use crate::services::reminder::{ReminderPolicy, ReminderRunSummary};
use crate::state::AppState;

/// Run the abandoned-cart reminder job.
///
/// Always returns 200 with the run summary - even when every cart failed -
/// unless the request was unauthorized (401) or the candidate query itself
/// failed (500). The external scheduler's timeout is the backstop; the job
/// enforces none of its own.
#[instrument(skip(state, _auth))]
pub async fn run_reminders(
    _auth: RequireCronAuth,
    State(state): State<AppState>,
) -> Result<Json<ReminderRunSummary>> {
    let policy = ReminderPolicy::from_config(&state.config().reminders);
    let summary = state.reminder_job().run(&policy).await?;
    Ok(Json(summary))
}
