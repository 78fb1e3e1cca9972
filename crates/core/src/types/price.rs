//! Type-safe price representation using decimal arithmetic.
//!
//! All customer-facing amounts are major currency units (kronor, not öre),
//! carried as `rust_decimal::Decimal` to avoid float drift in totals and
//! shipping rates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's major unit (e.g., kronor, not öre).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero price in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency_code,
        }
    }

    /// Format for display with two decimals (e.g., "299.99 SEK").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2} {}", self.amount, self.currency_code.code())
    }
}

/// ISO 4217 currency codes for the markets we ship to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Swedish krona - the home market currency.
    #[default]
    SEK,
    EUR,
    NOK,
    DKK,
}

impl CurrencyCode {
    /// The ISO 4217 code as a string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SEK => "SEK",
            Self::EUR => "EUR",
            Self::NOK => "NOK",
            Self::DKK => "DKK",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SEK" => Ok(Self::SEK),
            "EUR" => Ok(Self::EUR),
            "NOK" => Ok(Self::NOK),
            "DKK" => Ok(Self::DKK),
            _ => Err(format!("unsupported currency code: {s}")),
        }
    }
}
