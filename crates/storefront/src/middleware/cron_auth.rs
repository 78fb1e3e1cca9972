//! Bearer-token authentication for cron endpoints.
//!
//! Scheduled triggers (the abandoned-cart reminder run) are invoked over
//! HTTP by an external scheduler carrying a shared secret:
//!
//! ```text
//! Authorization: Bearer <CRON_SECRET>
//! ```

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;

use crate::state::AppState;

/// Extractor that requires the cron shared secret.
///
/// # Example
///
/// ```rust,ignore
/// async fn cron_handler(_auth: RequireCronAuth) -> impl IntoResponse {
///     // only reachable with a valid bearer token
/// }
/// ```
pub struct RequireCronAuth;

/// Rejection for a missing or wrong bearer token.
pub struct CronAuthRejection;

impl IntoResponse for CronAuthRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

impl FromRequestParts<AppState> for RequireCronAuth {
    type Rejection = CronAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(CronAuthRejection)?;

        if bearer != state.config().cron_secret.expose_secret() {
            tracing::warn!(path = %parts.uri.path(), "Cron request with invalid secret");
            return Err(CronAuthRejection);
        }

        Ok(Self)
    }
}
