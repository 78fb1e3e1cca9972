//! Shipping quote handler.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::shipping::{CartItem, ShippingOption};
use crate::state::AppState;

/// Request body for `POST /api/shipping/calculate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateShippingRequest {
    /// Cart lines
    pub items: Vec<CartItem>,
    /// Destination country code (e.g., "SE")
    pub country: String,
    /// Destination postal code; drives the Swedish zone adjustment
    pub postal_code: Option<String>,
    /// Order value in major currency units; drives free shipping
    pub order_value: Decimal,
}

/// Response body for `POST /api/shipping/calculate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateShippingResponse {
    /// Eligible options, cheapest first
    pub options: Vec<ShippingOption>,
    /// The option to preselect in checkout
    pub recommended: Option<ShippingOption>,
    /// Set when no carrier accepts the parcel weight
    pub no_carrier_available: bool,
    /// Resolved parcel weight
    pub total_weight_kg: Decimal,
}

/// Compute shipping options for a cart.
///
/// Over-limit parcels are a 200 with an empty option list and
/// `noCarrierAvailable: true`; the client decides how to present that.
/// Unsupported destinations are a 400.
#[instrument(skip(state, request), fields(country = %request.country))]
pub async fn calculate(
    State(state): State<AppState>,
    Json(request): Json<CalculateShippingRequest>,
) -> Result<Json<CalculateShippingResponse>> {
    let quote = state
        .shipping()
        .calculate(
            state.products(),
            &request.items,
            &request.country,
            request.postal_code.as_deref(),
            request.order_value,
        )
        .await?;

    let recommended = quote.recommended().cloned();
    Ok(Json(CalculateShippingResponse {
        recommended,
        no_carrier_available: quote.no_carrier_available,
        total_weight_kg: quote.total_weight_kg,
        options: quote.options,
    }))
}
