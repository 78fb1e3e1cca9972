//! Product model.
//!
//! Products are owned by the catalog subsystem; the shipping engine only
//! needs the weight and the reminder job only needs the name, so this model
//! stays deliberately thin.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nordic_aroma_core::{CurrencyCode, ProductId};

/// A catalog product, as read by the shipping engine and the reminder job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID
    pub id: ProductId,
    /// Display name (e.g., "Lavender Oil 30ml")
    pub name: String,
    /// Shipping weight in kilograms
    pub weight_kg: Decimal,
    /// Unit price in major currency units
    pub price: Decimal,
    /// Price currency
    pub currency: CurrencyCode,
}
