//! Swedish postal-code zones.
//!
//! Swedish postal codes are five digits; the leading digit encodes the broad
//! region. Deliveries to the far north (Norrland, postal codes 80000-98999)
//! cost carriers materially more, so those prefixes carry a surcharge. Metro
//! prefixes (Stockholm 1xxxx, Gothenburg 4xxxx, Malmö 2xxxx) and the rest of
//! the country price at the base rate.

use rust_decimal::Decimal;
use serde::Serialize;

/// Delivery zone derived from a postal-code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostalZone {
    /// Metro and southern/central Sweden; base rates apply.
    Standard,
    /// Norrland; carriers surcharge these routes.
    RemoteNorth,
}

impl PostalZone {
    /// Price multiplier for this zone.
    #[must_use]
    pub fn surcharge_multiplier(&self) -> Decimal {
        match self {
            Self::Standard => Decimal::ONE,
            Self::RemoteNorth => Decimal::new(125, 2),
        }
    }

    /// Whether this zone adjusts prices at all.
    #[must_use]
    pub const fn has_surcharge(&self) -> bool {
        matches!(self, Self::RemoteNorth)
    }
}

/// Classify a Swedish postal code into a [`PostalZone`].
///
/// Whitespace is ignored ("982 31" and "98231" are the same code). Returns
/// `None` for anything that is not five digits - a malformed postal code
/// never fails a shipping quote, it just gets no zone adjustment.
#[must_use]
pub fn zone_for_postal_code(postal_code: &str) -> Option<PostalZone> {
    let digits: Vec<u8> = postal_code
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    if digits.len() != 5 || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    match digits.first().copied() {
        Some(b'8' | b'9') => Some(PostalZone::RemoteNorth),
        Some(_) => Some(PostalZone::Standard),
        None => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_metro_prefixes_are_standard() {
        // Stockholm, Malmö, Gothenburg
        for code in ["111 22", "21119", "41254"] {
            assert_eq!(zone_for_postal_code(code), Some(PostalZone::Standard));
        }
    }

    #[test]
    fn test_norrland_prefixes_are_remote() {
        // Gävle, Umeå, Kiruna
        for code in ["80320", "903 30", "98231"] {
            assert_eq!(zone_for_postal_code(code), Some(PostalZone::RemoteNorth));
        }
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(
            zone_for_postal_code(" 982 31 "),
            Some(PostalZone::RemoteNorth)
        );
    }

    #[test]
    fn test_malformed_codes_get_no_zone() {
        for code in ["", "1234", "123456", "ABCDE", "12 34a"] {
            assert_eq!(zone_for_postal_code(code), None);
        }
    }

    #[test]
    fn test_surcharge_multipliers() {
        assert_eq!(
            PostalZone::Standard.surcharge_multiplier(),
            Decimal::ONE
        );
        assert_eq!(
            PostalZone::RemoteNorth.surcharge_multiplier(),
            Decimal::new(125, 2)
        );
        assert!(PostalZone::RemoteNorth.has_surcharge());
        assert!(!PostalZone::Standard.has_surcharge());
    }
}
