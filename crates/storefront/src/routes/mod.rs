//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                            - Liveness check
//! GET  /health/ready                      - Readiness check (DB ping)
//!
//! # Shipping
//! POST /api/shipping/calculate            - Shipping quote for a cart
//!
//! # Cart recovery
//! GET  /api/cart/recover?token=...        - Resolve a recovery token
//! POST /api/cart/recover                  - Resolve a recovery token (JSON body)
//!
//! # Cron (bearer-token protected)
//! GET  /api/cron/abandoned-cart-reminders - Run the reminder job
//! ```

pub mod cron;
pub mod recover;
pub mod shipping;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the shipping routes router.
pub fn shipping_routes() -> Router<AppState> {
    Router::new().route("/calculate", post(shipping::calculate))
}

/// Create the cart recovery routes router.
pub fn recovery_routes() -> Router<AppState> {
    Router::new().route("/recover", get(recover::recover_get).post(recover::recover_post))
}

/// Create the cron routes router.
pub fn cron_routes() -> Router<AppState> {
    Router::new().route("/abandoned-cart-reminders", get(cron::run_reminders))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/shipping", shipping_routes())
        .nest("/api/cart", recovery_routes())
        .nest("/api/cron", cron_routes())
}
