//! Opaque recovery token type.
//!
//! The recovery token is the only handle to an abandoned cart that ever
//! leaves the system (embedded in the reminder email link). It is unique per
//! cart and stable for the cart's lifetime; generation lives in the
//! storefront crate where a CSPRNG is available.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`RecoveryToken`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum RecoveryTokenError {
    /// The input string is empty.
    #[error("recovery token cannot be empty")]
    Empty,
    /// The input string is too long to be one of our tokens.
    #[error("recovery token must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The input contains characters outside the URL-safe alphabet.
    #[error("recovery token contains invalid characters")]
    InvalidCharacters,
}

/// An opaque, unguessable, single-cart recovery token.
///
/// Parsing only enforces shape (non-empty, bounded, URL-safe alphabet) so
/// that obviously malformed probes are rejected before hitting the store;
/// whether a well-formed token actually matches a cart is the store's call,
/// and that lookup deliberately does not distinguish "never existed" from
/// "already used".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RecoveryToken(String);

impl RecoveryToken {
    /// Maximum accepted token length.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `RecoveryToken` from an untrusted string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains characters outside
    /// `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, RecoveryTokenError> {
        if s.is_empty() {
            return Err(RecoveryTokenError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(RecoveryTokenError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(RecoveryTokenError::InvalidCharacters);
        }

        Ok(Self(s.to_owned()))
    }

    /// Wrap an already-generated token without re-validation.
    ///
    /// For use by the generator and by row mapping, where the value is
    /// trusted.
    #[must_use]
    pub const fn from_trusted(s: String) -> Self {
        Self(s)
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RecoveryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecoveryToken {
    type Err = RecoveryTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for RecoveryToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for RecoveryToken {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for RecoveryToken {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for RecoveryToken {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_tokens() {
        assert!(RecoveryToken::parse("token-abc123").is_ok());
        assert!(RecoveryToken::parse("a").is_ok());
        assert!(RecoveryToken::parse("X3_y-Z9").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            RecoveryToken::parse(""),
            Err(RecoveryTokenError::Empty)
        ));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(RecoveryToken::MAX_LENGTH + 1);
        assert!(matches!(
            RecoveryToken::parse(&long),
            Err(RecoveryTokenError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_characters() {
        for bad in ["with space", "semi;colon", "quote'", "slash/slash", "ö"] {
            assert!(matches!(
                RecoveryToken::parse(bad),
                Err(RecoveryTokenError::InvalidCharacters)
            ));
        }
    }

    #[test]
    fn test_serde_transparent() {
        let token = RecoveryToken::parse("token-abc123").unwrap();
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"token-abc123\"");
        let parsed: RecoveryToken = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn test_display() {
        let token = RecoveryToken::parse("token-abc123").unwrap();
        assert_eq!(token.to_string(), "token-abc123");
    }
}
