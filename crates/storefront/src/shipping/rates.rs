//! Shipping-rate engine.
//!
//! Given cart contents, a destination, and the order value, produces the set
//! of eligible shipping options: weight-bucketed carrier selection, a
//! country-keyed base rate, the Swedish postal-zone adjustment, and the
//! free-shipping rule. Options come back sorted cheapest-first (ties broken
//! by estimated delivery days), so the first option is the recommendation.
//!
//! The engine itself holds no mutable state; quotes may run with full
//! request-level concurrency.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nordic_aroma_core::{CurrencyCode, Price, ProductId};

use super::carriers::{CarrierCatalog, CarrierService, ServiceKind};
use super::zones::{PostalZone, zone_for_postal_code};
use crate::db::products::ProductLookup;

/// Destination countries with a configured rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CountryCode {
    /// Sweden - the fully modeled home market (zone adjustment applies here only).
    Sweden,
    Norway,
    Denmark,
    Finland,
}

impl CountryCode {
    /// ISO 3166-1 alpha-2 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Sweden => "SE",
            Self::Norway => "NO",
            Self::Denmark => "DK",
            Self::Finland => "FI",
        }
    }
}

impl std::str::FromStr for CountryCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SE" => Ok(Self::Sweden),
            "NO" => Ok(Self::Norway),
            "DK" => Ok(Self::Denmark),
            "FI" => Ok(Self::Finland),
            _ => Err(format!("no rate table for destination: {s}")),
        }
    }
}

/// Errors from shipping calculation.
#[derive(Debug, thiserror::Error)]
pub enum ShippingError {
    /// The cart had no items - a validation error, surfaced immediately.
    #[error("cart must contain at least one item")]
    EmptyCart,

    /// The destination has no rate table. No partial result is produced.
    #[error("unsupported destination: {0}")]
    UnsupportedDestination(String),
}

/// One cart line in a shipping-quote request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product whose catalog weight is counted
    pub product_id: ProductId,
    /// Quantity in the cart
    pub quantity: u32,
}

/// Zone adjustment applied to an option's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAdjustment {
    /// The zone that triggered the adjustment
    pub zone: PostalZone,
    /// Multiplier applied to the base rate
    pub multiplier: Decimal,
}

/// A computed shipping option. Created per request, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    /// The selected carrier service tier
    pub service: CarrierService,
    /// Final price after zone adjustment and free-shipping
    pub price: Price,
    /// Whether the free-shipping rule zeroed this option
    pub free_shipping_applied: bool,
    /// Zone adjustment applied to the base rate, if any
    pub zone_adjustment: Option<ZoneAdjustment>,
}

/// Result of a shipping calculation.
///
/// An over-limit parcel is not an error: the options list comes back empty
/// with `no_carrier_available` set, and the caller decides whether that is
/// fatal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    /// Eligible options, sorted by ascending price then delivery days
    pub options: Vec<ShippingOption>,
    /// Set when no carrier tier accepts the parcel weight
    pub no_carrier_available: bool,
    /// Resolved parcel weight the quote was computed for
    pub total_weight_kg: Decimal,
}

impl ShippingQuote {
    /// The recommended option: first after the sort.
    #[must_use]
    pub fn recommended(&self) -> Option<&ShippingOption> {
        self.options.first()
    }
}

/// Which service tiers the free-shipping rule zeroes, and above what order
/// value.
///
/// Eligibility is a set of [`ServiceKind`]s rather than a name match, so a
/// new tier added to the catalog stays paid until someone decides otherwise.
#[derive(Debug, Clone)]
pub struct FreeShippingPolicy {
    /// Order value (major units) at or above which the rule applies
    pub threshold: Decimal,
    /// Tiers the rule zeroes; express and eco tiers stay paid by default
    pub eligible_kinds: HashSet<ServiceKind>,
}

impl FreeShippingPolicy {
    /// Policy with the given threshold and the default eligible set
    /// (`Standard` only).
    #[must_use]
    pub fn with_threshold(threshold: Decimal) -> Self {
        Self {
            threshold,
            eligible_kinds: HashSet::from([ServiceKind::Standard]),
        }
    }

    /// Whether an option of the given kind ships free at the given order value.
    #[must_use]
    pub fn applies_to(&self, kind: ServiceKind, order_value: Decimal) -> bool {
        order_value >= self.threshold && self.eligible_kinds.contains(&kind)
    }
}

impl Default for FreeShippingPolicy {
    /// 500 SEK threshold, standard tiers only.
    fn default() -> Self {
        Self::with_threshold(Decimal::new(500, 0))
    }
}

/// The shipping-rate engine.
pub struct ShippingRateEngine {
    catalog: CarrierCatalog,
    rates: HashMap<CountryCode, HashMap<&'static str, Decimal>>,
    free_shipping: FreeShippingPolicy,
}

impl ShippingRateEngine {
    /// Create an engine over the given catalog and free-shipping policy,
    /// with the built-in rate tables.
    #[must_use]
    pub fn new(catalog: CarrierCatalog, free_shipping: FreeShippingPolicy) -> Self {
        Self {
            catalog,
            rates: rate_tables(),
            free_shipping,
        }
    }

    /// The carrier catalog this engine quotes from.
    #[must_use]
    pub const fn catalog(&self) -> &CarrierCatalog {
        &self.catalog
    }

    /// Compute eligible shipping options for a cart.
    ///
    /// Product weights are resolved through `products`; a product that cannot
    /// be resolved counts as 0 kg and is logged, never fatal. The zone
    /// adjustment applies only for Swedish destinations with a well-formed
    /// postal code.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingError::EmptyCart`] for an empty item list and
    /// [`ShippingError::UnsupportedDestination`] when the destination has no
    /// rate table.
    pub async fn calculate<P: ProductLookup>(
        &self,
        products: &P,
        items: &[CartItem],
        destination: &str,
        postal_code: Option<&str>,
        order_value: Decimal,
    ) -> Result<ShippingQuote, ShippingError> {
        if items.is_empty() {
            return Err(ShippingError::EmptyCart);
        }

        let country: CountryCode = destination
            .parse()
            .map_err(|_| ShippingError::UnsupportedDestination(destination.to_owned()))?;

        let total_weight_kg = resolve_total_weight(products, items).await;
        self.quote(total_weight_kg, country, postal_code, order_value, false)
    }

    /// Same pipeline as [`Self::calculate`], filtered to eco-friendly
    /// services. No free-shipping or zone adjustment is applied.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingError::EmptyCart`] for an empty item list and
    /// [`ShippingError::UnsupportedDestination`] when the destination has no
    /// rate table.
    pub async fn calculate_eco_only<P: ProductLookup>(
        &self,
        products: &P,
        items: &[CartItem],
        destination: &str,
    ) -> Result<ShippingQuote, ShippingError> {
        if items.is_empty() {
            return Err(ShippingError::EmptyCart);
        }

        let country: CountryCode = destination
            .parse()
            .map_err(|_| ShippingError::UnsupportedDestination(destination.to_owned()))?;

        let total_weight_kg = resolve_total_weight(products, items).await;
        self.quote(total_weight_kg, country, None, Decimal::ZERO, true)
    }

    fn quote(
        &self,
        total_weight_kg: Decimal,
        country: CountryCode,
        postal_code: Option<&str>,
        order_value: Decimal,
        eco_only: bool,
    ) -> Result<ShippingQuote, ShippingError> {
        let rates = self
            .rates
            .get(&country)
            .ok_or_else(|| ShippingError::UnsupportedDestination(country.code().to_owned()))?;

        // Zone adjustment is modeled for the home market only
        let zone_adjustment = match (country, postal_code) {
            (CountryCode::Sweden, Some(postal)) => zone_for_postal_code(postal)
                .filter(PostalZone::has_surcharge)
                .map(|zone| ZoneAdjustment {
                    zone,
                    multiplier: zone.surcharge_multiplier(),
                }),
            _ => None,
        };

        let mut options: Vec<ShippingOption> = Vec::new();
        for service in self.catalog.services() {
            if eco_only && !service.eco_friendly {
                continue;
            }
            let Some(base_rate) = rates.get(service.code) else {
                // This tier does not ship to this destination
                continue;
            };
            if !service.accepts_weight(total_weight_kg) {
                continue;
            }

            let mut price = *base_rate;
            if let Some(adjustment) = zone_adjustment {
                price = (price * adjustment.multiplier).round_dp(2);
            }

            let free_shipping_applied = self.free_shipping.applies_to(service.kind, order_value);
            if free_shipping_applied {
                price = Decimal::ZERO;
            }

            options.push(ShippingOption {
                service: *service,
                price: Price::new(price, CurrencyCode::SEK),
                free_shipping_applied,
                zone_adjustment,
            });
        }

        options.sort_by(|a, b| {
            a.price
                .amount
                .cmp(&b.price.amount)
                .then(a.service.estimated_days_min.cmp(&b.service.estimated_days_min))
                .then(a.service.estimated_days_max.cmp(&b.service.estimated_days_max))
                .then(a.service.code.cmp(b.service.code))
        });

        let no_carrier_available = options.is_empty();
        if no_carrier_available {
            tracing::info!(
                weight_kg = %total_weight_kg,
                country = country.code(),
                "no carrier accepts this parcel weight"
            );
        }

        Ok(ShippingQuote {
            options,
            no_carrier_available,
            total_weight_kg,
        })
    }
}

/// Sum product weights across the cart.
///
/// A product that cannot be resolved (missing row or lookup failure) counts
/// as 0 kg; the quote proceeds on the weights we do know.
async fn resolve_total_weight<P: ProductLookup>(products: &P, items: &[CartItem]) -> Decimal {
    let mut total = Decimal::ZERO;
    for item in items {
        match products.product(item.product_id).await {
            Ok(Some(product)) => {
                total += product.weight_kg * Decimal::from(item.quantity);
            }
            Ok(None) => {
                tracing::warn!(
                    product_id = %item.product_id,
                    "product not found during weight resolution, counting as 0 kg"
                );
            }
            Err(e) => {
                tracing::warn!(
                    product_id = %item.product_id,
                    error = %e,
                    "product lookup failed during weight resolution, counting as 0 kg"
                );
            }
        }
    }
    total
}

/// Base rates in SEK, keyed by service code.
///
/// Sweden carries the full lineup; the neighbors get the tiers the carriers
/// actually run across the border.
fn rate_tables() -> HashMap<CountryCode, HashMap<&'static str, Decimal>> {
    let sek = |units: i64| Decimal::new(units, 0);

    let sweden = HashMap::from([
        ("postnord-varubrev", sek(29)),
        ("postnord-mypack-box", sek(49)),
        ("postnord-mypack-home", sek(79)),
        ("postnord-express", sek(149)),
        ("dhl-service-point", sek(45)),
        ("dhl-home", sek(89)),
        ("dhl-express", sek(159)),
        ("bring-pickup", sek(45)),
        ("bring-home", sek(85)),
        ("bring-pickup-eco", sek(49)),
        ("schenker-ombud", sek(47)),
        ("schenker-home", sek(95)),
        ("budbee-home", sek(69)),
        ("budbee-box", sek(59)),
        ("instabox-box", sek(39)),
        ("instabox-express", sek(69)),
        ("airmee-evening", sek(79)),
        ("best-home-xl", sek(129)),
    ]);

    let norway = HashMap::from([
        ("postnord-mypack-box", sek(99)),
        ("postnord-mypack-home", sek(149)),
        ("dhl-service-point", sek(95)),
        ("dhl-home", sek(159)),
        ("bring-pickup", sek(79)),
        ("bring-home", sek(139)),
    ]);

    let denmark = HashMap::from([
        ("postnord-mypack-box", sek(89)),
        ("postnord-mypack-home", sek(139)),
        ("dhl-service-point", sek(85)),
        ("dhl-home", sek(149)),
        ("bring-pickup", sek(99)),
        ("bring-home", sek(149)),
    ]);

    let finland = HashMap::from([
        ("postnord-mypack-box", sek(89)),
        ("postnord-mypack-home", sek(139)),
        ("dhl-service-point", sek(95)),
        ("dhl-home", sek(159)),
        ("bring-pickup", sek(109)),
        ("bring-home", sek(159)),
    ]);

    HashMap::from([
        (CountryCode::Sweden, sweden),
        (CountryCode::Norway, norway),
        (CountryCode::Denmark, denmark),
        (CountryCode::Finland, finland),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nordic_aroma_core::CurrencyCode;

    use super::*;
    use crate::db::products::testing::MemoryProductLookup;
    use crate::models::Product;

    fn engine() -> ShippingRateEngine {
        ShippingRateEngine::new(CarrierCatalog::swedish(), FreeShippingPolicy::default())
    }

    fn catalog_products() -> MemoryProductLookup {
        MemoryProductLookup::new([
            Product {
                id: ProductId::new(1),
                name: "Lavender Oil 30ml".to_string(),
                weight_kg: Decimal::new(1, 1), // 0.1 kg
                price: Decimal::new(29_999, 2),
                currency: CurrencyCode::SEK,
            },
            Product {
                id: ProductId::new(2),
                name: "Ultrasonic Diffuser".to_string(),
                weight_kg: Decimal::new(12, 1), // 1.2 kg
                price: Decimal::new(44_950, 2),
                currency: CurrencyCode::SEK,
            },
            Product {
                id: ProductId::new(99),
                name: "Pallet of Carrier Oil".to_string(),
                weight_kg: Decimal::new(60, 0),
                price: Decimal::new(899_900, 2),
                currency: CurrencyCode::SEK,
            },
        ])
    }

    fn items(entries: &[(i32, u32)]) -> Vec<CartItem> {
        entries
            .iter()
            .map(|&(id, quantity)| CartItem {
                product_id: ProductId::new(id),
                quantity,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_empty_cart_is_a_validation_error() {
        let result = engine()
            .calculate(&catalog_products(), &[], "SE", None, Decimal::ZERO)
            .await;
        assert!(matches!(result, Err(ShippingError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_unsupported_destination_fails_outright() {
        let result = engine()
            .calculate(
                &catalog_products(),
                &items(&[(1, 1)]),
                "DE",
                None,
                Decimal::ZERO,
            )
            .await;
        assert!(matches!(
            result,
            Err(ShippingError::UnsupportedDestination(ref c)) if c == "DE"
        ));
    }

    #[tokio::test]
    async fn test_over_limit_weight_returns_empty_not_error() {
        // 60 kg is above every carrier's heaviest tier (50 kg)
        let quote = engine()
            .calculate(
                &catalog_products(),
                &items(&[(99, 1)]),
                "SE",
                None,
                Decimal::ZERO,
            )
            .await
            .unwrap();

        assert!(quote.options.is_empty());
        assert!(quote.no_carrier_available);
        assert!(quote.recommended().is_none());
    }

    #[tokio::test]
    async fn test_weight_buckets_filter_tiers() {
        // 0.1 kg fits everything including the 2 kg mailbox tier
        let light = engine()
            .calculate(
                &catalog_products(),
                &items(&[(1, 1)]),
                "SE",
                None,
                Decimal::ZERO,
            )
            .await
            .unwrap();
        assert!(
            light
                .options
                .iter()
                .any(|o| o.service.code == "postnord-varubrev")
        );

        // 12 kg drops the mailbox tier and the 10 kg lockers
        let heavy = engine()
            .calculate(
                &catalog_products(),
                &items(&[(2, 10)]),
                "SE",
                None,
                Decimal::ZERO,
            )
            .await
            .unwrap();
        assert_eq!(heavy.total_weight_kg, Decimal::new(12, 0));
        assert!(
            !heavy
                .options
                .iter()
                .any(|o| o.service.code == "postnord-varubrev")
        );
        assert!(!heavy.options.iter().any(|o| o.service.carrier == "instabox"));
    }

    #[tokio::test]
    async fn test_recommended_is_cheapest() {
        let quote = engine()
            .calculate(
                &catalog_products(),
                &items(&[(1, 1)]),
                "SE",
                None,
                Decimal::ZERO,
            )
            .await
            .unwrap();

        let recommended = quote.recommended().unwrap();
        assert_eq!(recommended.service.code, "postnord-varubrev");
        assert_eq!(recommended.price.amount, Decimal::new(29, 0));

        // Sorted ascending by price
        let prices: Vec<Decimal> = quote.options.iter().map(|o| o.price.amount).collect();
        let mut sorted = prices.clone();
        sorted.sort_unstable();
        assert_eq!(prices, sorted);
    }

    #[tokio::test]
    async fn test_free_shipping_zeroes_standard_tiers_only() {
        let quote = engine()
            .calculate(
                &catalog_products(),
                &items(&[(1, 2), (2, 1)]),
                "SE",
                None,
                Decimal::new(104_948, 2), // 1049.48 SEK, above the threshold
            )
            .await
            .unwrap();

        for option in &quote.options {
            match option.service.kind {
                ServiceKind::Standard => {
                    assert_eq!(option.price.amount, Decimal::ZERO, "{}", option.service.code);
                    assert!(option.free_shipping_applied);
                }
                ServiceKind::Express | ServiceKind::Eco => {
                    assert!(option.price.amount > Decimal::ZERO, "{}", option.service.code);
                    assert!(!option.free_shipping_applied);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_free_shipping_threshold_boundary() {
        let engine = engine();
        let products = catalog_products();

        // Exactly at the threshold: free
        let at = engine
            .calculate(&products, &items(&[(1, 1)]), "SE", None, Decimal::new(500, 0))
            .await
            .unwrap();
        assert!(
            at.options
                .iter()
                .filter(|o| o.service.kind == ServiceKind::Standard)
                .all(|o| o.free_shipping_applied)
        );

        // Just below: paid
        let below = engine
            .calculate(
                &products,
                &items(&[(1, 1)]),
                "SE",
                None,
                Decimal::new(49_999, 2),
            )
            .await
            .unwrap();
        assert!(below.options.iter().all(|o| !o.free_shipping_applied));
    }

    #[tokio::test]
    async fn test_norrland_postal_code_surcharges() {
        let engine = engine();
        let products = catalog_products();

        let base = engine
            .calculate(&products, &items(&[(1, 1)]), "SE", Some("11122"), Decimal::ZERO)
            .await
            .unwrap();
        let north = engine
            .calculate(&products, &items(&[(1, 1)]), "SE", Some("982 31"), Decimal::ZERO)
            .await
            .unwrap();

        // Metro code: no adjustment recorded
        assert!(base.options.iter().all(|o| o.zone_adjustment.is_none()));

        // Norrland: every option carries the multiplier
        for option in &north.options {
            let adjustment = option.zone_adjustment.unwrap();
            assert_eq!(adjustment.zone, PostalZone::RemoteNorth);
            let matching = base
                .options
                .iter()
                .find(|o| o.service.code == option.service.code)
                .unwrap();
            assert_eq!(
                option.price.amount,
                (matching.price.amount * Decimal::new(125, 2)).round_dp(2)
            );
        }
    }

    #[tokio::test]
    async fn test_zone_adjustment_only_applies_to_sweden() {
        let quote = engine()
            .calculate(
                &catalog_products(),
                &items(&[(1, 1)]),
                "NO",
                Some("98231"),
                Decimal::ZERO,
            )
            .await
            .unwrap();
        assert!(!quote.options.is_empty());
        assert!(quote.options.iter().all(|o| o.zone_adjustment.is_none()));
    }

    #[tokio::test]
    async fn test_malformed_postal_code_is_ignored() {
        let quote = engine()
            .calculate(
                &catalog_products(),
                &items(&[(1, 1)]),
                "SE",
                Some("not-a-code"),
                Decimal::ZERO,
            )
            .await
            .unwrap();
        assert!(!quote.options.is_empty());
        assert!(quote.options.iter().all(|o| o.zone_adjustment.is_none()));
    }

    #[tokio::test]
    async fn test_unresolvable_product_counts_as_zero_weight() {
        let quote = engine()
            .calculate(
                &catalog_products(),
                &items(&[(777, 3)]),
                "SE",
                None,
                Decimal::ZERO,
            )
            .await
            .unwrap();
        assert_eq!(quote.total_weight_kg, Decimal::ZERO);
        // Zero weight still quotes (even the 2 kg mailbox tier accepts it)
        assert!(!quote.options.is_empty());
    }

    #[tokio::test]
    async fn test_eco_only_filters_to_eco_services() {
        let quote = engine()
            .calculate_eco_only(&catalog_products(), &items(&[(1, 1)]), "SE")
            .await
            .unwrap();

        assert!(!quote.options.is_empty());
        assert!(quote.options.iter().all(|o| o.service.eco_friendly));
        let mut codes: Vec<&str> = quote.options.iter().map(|o| o.service.code).collect();
        codes.sort_unstable();
        assert_eq!(
            codes,
            vec!["airmee-evening", "bring-pickup-eco", "budbee-box", "budbee-home"]
        );
        // The eco pipeline never applies the free-shipping rule
        assert!(quote.options.iter().all(|o| !o.free_shipping_applied));
    }

    #[tokio::test]
    async fn test_neighbor_market_uses_reduced_lineup() {
        let quote = engine()
            .calculate(
                &catalog_products(),
                &items(&[(1, 1)]),
                "NO",
                None,
                Decimal::ZERO,
            )
            .await
            .unwrap();

        assert_eq!(quote.options.len(), 6);
        assert!(
            quote
                .options
                .iter()
                .all(|o| matches!(o.service.carrier, "postnord" | "dhl" | "bring"))
        );
    }

    #[test]
    fn test_free_shipping_policy_is_kind_keyed() {
        let policy = FreeShippingPolicy::default();
        let value = Decimal::new(600, 0);
        assert!(policy.applies_to(ServiceKind::Standard, value));
        assert!(!policy.applies_to(ServiceKind::Express, value));
        assert!(!policy.applies_to(ServiceKind::Eco, value));

        // A widened policy can opt other kinds in without code changes
        let mut wide = FreeShippingPolicy::default();
        wide.eligible_kinds.insert(ServiceKind::Eco);
        assert!(wide.applies_to(ServiceKind::Eco, value));
    }
}
