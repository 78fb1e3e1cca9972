//! Cart recovery handlers.
//!
//! Both the GET (email link) and POST (client JSON) forms delegate to the
//! recovery resolver. Bad tokens are a 404 with the same opaque message in
//! every case; only infrastructure failures are a 500.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use nordic_aroma_core::RecoveryToken;

use crate::error::{AppError, Result};
use crate::services::recovery::RecoveredCart;
use crate::state::AppState;

/// Query string for `GET /api/cart/recover`.
#[derive(Debug, Deserialize)]
pub struct RecoverQuery {
    pub token: String,
}

/// Request body for `POST /api/cart/recover`.
#[derive(Debug, Deserialize)]
pub struct RecoverBody {
    pub token: String,
}

/// Resolve a recovery token from the email link.
#[instrument(skip(state, query))]
pub async fn recover_get(
    State(state): State<AppState>,
    Query(query): Query<RecoverQuery>,
) -> Result<Json<RecoveredCart>> {
    resolve(&state, &query.token).await.map(Json)
}

/// Resolve a recovery token from a JSON body.
#[instrument(skip(state, body))]
pub async fn recover_post(
    State(state): State<AppState>,
    Json(body): Json<RecoverBody>,
) -> Result<Json<RecoveredCart>> {
    resolve(&state, &body.token).await.map(Json)
}

/// Shared resolution path for both verbs.
///
/// A token that does not even parse gets the same 404 as one that does not
/// resolve - malformed probes learn nothing either.
async fn resolve(state: &AppState, raw_token: &str) -> Result<RecoveredCart> {
    let token = RecoveryToken::parse(raw_token)
        .map_err(|_| AppError::NotFound("invalid or expired recovery token".to_owned()))?;

    let cart = state.recovery_resolver().recover(&token).await?;
    Ok(cart)
}
