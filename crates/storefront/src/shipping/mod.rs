//! Multi-carrier shipping-rate computation for the Swedish market.
//!
//! # Modules
//!
//! - [`carriers`] - Static registry of carriers, service tiers, weight
//!   limits, and eco flags
//! - [`zones`] - Postal-code-prefix zone classification (Norrland surcharge)
//! - [`rates`] - The rate engine: country rate tables, free shipping,
//!   zone adjustment, option sorting

pub mod carriers;
pub mod rates;
pub mod zones;

pub use carriers::{Carrier, CarrierCatalog, CarrierService, ServiceKind};
pub use rates::{
    CartItem, CountryCode, FreeShippingPolicy, ShippingError, ShippingOption, ShippingQuote,
    ShippingRateEngine, ZoneAdjustment,
};
pub use zones::{PostalZone, zone_for_postal_code};
