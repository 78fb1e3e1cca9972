//! Carrier catalog: Swedish carriers, their service tiers, and weight limits.
//!
//! The catalog is a static registry assembled at process start and never
//! mutated. Each carrier exposes one or more service tiers; a tier accepts a
//! parcel when the parcel weight falls inside its `[min_weight, max_weight]`
//! bracket. Prices live in the rate tables (see [`super::rates`]), not here.

use rust_decimal::Decimal;
use serde::Serialize;

/// Service tier classification.
///
/// Free-shipping eligibility is keyed on this (a configurable set of kinds,
/// by default only `Standard`), so adding a new tier never silently changes
/// the free-shipping behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Regular delivery, the free-shipping tier.
    Standard,
    /// Premium fast delivery; never free.
    Express,
    /// Explicitly climate-profiled tier; never free.
    Eco,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Eco => "eco",
        };
        write!(f, "{s}")
    }
}

/// Immutable descriptor of one carrier service tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierService {
    /// Owning carrier code (e.g., "postnord")
    pub carrier: &'static str,
    /// Stable service code (e.g., "postnord-mypack-box"); rate tables key on this
    pub code: &'static str,
    /// Customer-facing name
    pub name: &'static str,
    /// Tier classification
    pub kind: ServiceKind,
    /// Estimated delivery time, lower bound (days)
    pub estimated_days_min: u8,
    /// Estimated delivery time, upper bound (days)
    pub estimated_days_max: u8,
    /// Minimum parcel weight accepted (kg)
    pub min_weight_kg: Decimal,
    /// Maximum parcel weight accepted (kg)
    pub max_weight_kg: Decimal,
    /// Feature tags shown in the checkout UI
    pub features: &'static [&'static str],
    /// Whether the service runs on a fossil-free or carbon-offset setup
    pub eco_friendly: bool,
}

impl CarrierService {
    /// Whether this tier accepts a parcel of the given weight.
    #[must_use]
    pub fn accepts_weight(&self, weight_kg: Decimal) -> bool {
        self.min_weight_kg <= weight_kg && weight_kg <= self.max_weight_kg
    }
}

/// A carrier and its service tiers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Carrier {
    /// Stable carrier code
    pub code: &'static str,
    /// Customer-facing name
    pub name: &'static str,
    /// Service tiers offered by this carrier
    pub services: Vec<CarrierService>,
}

impl Carrier {
    /// Whether any tier of this carrier accepts the given weight.
    #[must_use]
    pub fn accepts_weight(&self, weight_kg: Decimal) -> bool {
        self.services.iter().any(|s| s.accepts_weight(weight_kg))
    }

    /// Whether any tier of this carrier is eco-friendly.
    #[must_use]
    pub fn is_eco_friendly(&self) -> bool {
        self.services.iter().any(|s| s.eco_friendly)
    }
}

/// Static registry of carriers and service tiers.
///
/// Pure and read-only; the only failure mode is "carrier code not found".
#[derive(Debug, Clone)]
pub struct CarrierCatalog {
    carriers: Vec<Carrier>,
}

#[allow(clippy::too_many_arguments)]
fn service(
    carrier: &'static str,
    code: &'static str,
    name: &'static str,
    kind: ServiceKind,
    estimated_days: (u8, u8),
    max_weight_kg: Decimal,
    features: &'static [&'static str],
    eco_friendly: bool,
) -> CarrierService {
    CarrierService {
        carrier,
        code,
        name,
        kind,
        estimated_days_min: estimated_days.0,
        estimated_days_max: estimated_days.1,
        min_weight_kg: Decimal::ZERO,
        max_weight_kg,
        features,
        eco_friendly,
    }
}

impl CarrierCatalog {
    /// The carrier lineup for the Swedish market.
    #[must_use]
    pub fn swedish() -> Self {
        let kg = |units: i64| Decimal::new(units, 0);

        let carriers = vec![
            Carrier {
                code: "postnord",
                name: "PostNord",
                services: vec![
                    service(
                        "postnord",
                        "postnord-varubrev",
                        "PostNord Varubrev",
                        ServiceKind::Standard,
                        (2, 5),
                        kg(2),
                        &["mailbox-delivery"],
                        false,
                    ),
                    service(
                        "postnord",
                        "postnord-mypack-box",
                        "PostNord MyPack Box",
                        ServiceKind::Standard,
                        (1, 3),
                        kg(20),
                        &["pickup-point", "tracking"],
                        false,
                    ),
                    service(
                        "postnord",
                        "postnord-mypack-home",
                        "PostNord MyPack Home",
                        ServiceKind::Standard,
                        (1, 3),
                        kg(35),
                        &["home-delivery", "tracking"],
                        false,
                    ),
                    service(
                        "postnord",
                        "postnord-express",
                        "PostNord Express",
                        ServiceKind::Express,
                        (1, 1),
                        kg(35),
                        &["home-delivery", "tracking", "before-noon"],
                        false,
                    ),
                ],
            },
            Carrier {
                code: "dhl",
                name: "DHL Freight",
                services: vec![
                    service(
                        "dhl",
                        "dhl-service-point",
                        "DHL Service Point",
                        ServiceKind::Standard,
                        (1, 3),
                        kg(20),
                        &["pickup-point", "tracking"],
                        false,
                    ),
                    service(
                        "dhl",
                        "dhl-home",
                        "DHL Home Delivery",
                        ServiceKind::Standard,
                        (1, 3),
                        Decimal::new(315, 1),
                        &["home-delivery", "tracking"],
                        false,
                    ),
                    service(
                        "dhl",
                        "dhl-express",
                        "DHL Express",
                        ServiceKind::Express,
                        (1, 1),
                        kg(35),
                        &["home-delivery", "tracking", "same-day-dispatch"],
                        false,
                    ),
                ],
            },
            Carrier {
                code: "bring",
                name: "Bring",
                services: vec![
                    service(
                        "bring",
                        "bring-pickup",
                        "Bring Pickup Parcel",
                        ServiceKind::Standard,
                        (2, 4),
                        kg(35),
                        &["pickup-point", "tracking"],
                        false,
                    ),
                    service(
                        "bring",
                        "bring-home",
                        "Bring Home Delivery",
                        ServiceKind::Standard,
                        (2, 4),
                        kg(35),
                        &["home-delivery", "tracking"],
                        false,
                    ),
                    service(
                        "bring",
                        "bring-pickup-eco",
                        "Bring Pickup Climate Neutral",
                        ServiceKind::Eco,
                        (3, 5),
                        kg(35),
                        &["pickup-point", "tracking", "carbon-offset"],
                        true,
                    ),
                ],
            },
            Carrier {
                code: "schenker",
                name: "DB Schenker",
                services: vec![
                    service(
                        "schenker",
                        "schenker-ombud",
                        "DB Schenker Ombud",
                        ServiceKind::Standard,
                        (1, 3),
                        kg(20),
                        &["pickup-point", "tracking"],
                        false,
                    ),
                    service(
                        "schenker",
                        "schenker-home",
                        "DB Schenker Home",
                        ServiceKind::Standard,
                        (2, 4),
                        kg(30),
                        &["home-delivery", "tracking"],
                        false,
                    ),
                ],
            },
            Carrier {
                code: "budbee",
                name: "Budbee",
                services: vec![
                    service(
                        "budbee",
                        "budbee-home",
                        "Budbee Home",
                        ServiceKind::Standard,
                        (1, 2),
                        kg(20),
                        &["home-delivery", "evening-delivery", "tracking"],
                        true,
                    ),
                    service(
                        "budbee",
                        "budbee-box",
                        "Budbee Box",
                        ServiceKind::Standard,
                        (1, 2),
                        kg(15),
                        &["parcel-locker", "tracking"],
                        true,
                    ),
                ],
            },
            Carrier {
                code: "instabox",
                name: "Instabox",
                services: vec![
                    service(
                        "instabox",
                        "instabox-box",
                        "Instabox",
                        ServiceKind::Standard,
                        (1, 2),
                        kg(10),
                        &["parcel-locker", "tracking"],
                        false,
                    ),
                    service(
                        "instabox",
                        "instabox-express",
                        "Instabox Express",
                        ServiceKind::Express,
                        (0, 1),
                        kg(10),
                        &["parcel-locker", "tracking", "same-day"],
                        false,
                    ),
                ],
            },
            Carrier {
                code: "airmee",
                name: "Airmee",
                services: vec![service(
                    "airmee",
                    "airmee-evening",
                    "Airmee Evening",
                    ServiceKind::Eco,
                    (0, 1),
                    kg(25),
                    &["home-delivery", "evening-delivery", "tracking", "electric-fleet"],
                    true,
                )],
            },
            Carrier {
                code: "best",
                name: "Best Transport",
                services: vec![service(
                    "best",
                    "best-home-xl",
                    "Best Home XL",
                    ServiceKind::Standard,
                    (2, 4),
                    kg(50),
                    &["home-delivery", "two-man-handling"],
                    false,
                )],
            },
        ];

        Self { carriers }
    }

    /// All carriers in the registry.
    #[must_use]
    pub fn carriers(&self) -> &[Carrier] {
        &self.carriers
    }

    /// Look up a carrier by code.
    #[must_use]
    pub fn carrier(&self, code: &str) -> Option<&Carrier> {
        self.carriers.iter().find(|c| c.code == code)
    }

    /// Carriers with at least one tier accepting the given weight.
    #[must_use]
    pub fn carriers_for_weight(&self, weight_kg: Decimal) -> Vec<&Carrier> {
        self.carriers
            .iter()
            .filter(|c| c.accepts_weight(weight_kg))
            .collect()
    }

    /// Carriers with at least one eco-friendly tier.
    #[must_use]
    pub fn eco_friendly_carriers(&self) -> Vec<&Carrier> {
        self.carriers
            .iter()
            .filter(|c| c.is_eco_friendly())
            .collect()
    }

    /// Iterate over every service tier of every carrier.
    pub fn services(&self) -> impl Iterator<Item = &CarrierService> {
        self.carriers.iter().flat_map(|c| c.services.iter())
    }

    /// The heaviest parcel any tier accepts.
    #[must_use]
    pub fn max_supported_weight(&self) -> Decimal {
        self.services()
            .map(|s| s.max_weight_kg)
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}
