//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (used in recovery links)
//! - `CRON_SECRET` - Shared secret for the cron endpoints (min 32 chars, high entropy)
//! - `SMTP_HOST` - SMTP relay host for transactional email
//! - `SMTP_USERNAME` - SMTP username
//! - `SMTP_PASSWORD` - SMTP password
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SMTP_PORT` - SMTP relay port (default: 587)
//! - `EMAIL_FROM_ADDRESS` - From header (default: Nordic Aroma <hej@nordicaroma.se>)
//! - `FREE_SHIPPING_THRESHOLD` - Order value in SEK above which standard
//!   shipping is free (default: 500)
//! - `ABANDONED_AFTER_HOURS` - Idle time before a cart counts as abandoned (default: 1)
//! - `REMINDER_COOLDOWN_HOURS` - Minimum spacing between reminders (default: 1)
//! - `MAX_REMINDERS` - Reminder cap per cart (default: 3)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_CRON_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront (recovery links are built from it)
    pub base_url: String,
    /// Shared secret protecting the cron endpoints
    pub cron_secret: SecretString,
    /// SMTP configuration for recovery emails
    pub email: EmailConfig,
    /// Shipping rate tunables
    pub shipping: ShippingConfig,
    /// Abandoned-cart reminder tunables
    pub reminders: ReminderConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// SMTP configuration for transactional email.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP relay port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: SecretString,
    /// From header for outgoing mail
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// Shipping rate tunables.
#[derive(Debug, Clone)]
pub struct ShippingConfig {
    /// Order value (SEK, major units) at or above which standard-tier
    /// shipping is free
    pub free_shipping_threshold: Decimal,
}

/// Abandoned-cart reminder tunables.
///
/// The abandonment threshold and the inter-reminder cooldown are deliberately
/// two separate knobs; they default to the same value but do not have to stay
/// equal.
#[derive(Debug, Clone, Copy)]
pub struct ReminderConfig {
    /// Idle hours before a cart counts as abandoned
    pub abandoned_after_hours: i64,
    /// Minimum hours between reminders to the same cart
    pub cooldown_hours: i64,
    /// Reminder cap per cart
    pub max_reminders: i32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_parsed_or_default("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        // Recovery links are built from this; reject anything unparsable early
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;
        let cron_secret = get_validated_secret("CRON_SECRET")?;
        validate_cron_secret(&cron_secret, "CRON_SECRET")?;

        let email = EmailConfig::from_env()?;
        let shipping = ShippingConfig::from_env()?;
        let reminders = ReminderConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cron_secret,
            email,
            shipping,
            reminders,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            smtp_host: get_required_env("SMTP_HOST")?,
            smtp_port: get_parsed_or_default("SMTP_PORT", "587")?,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: get_required_secret("SMTP_PASSWORD")?,
            from_address: get_env_or_default(
                "EMAIL_FROM_ADDRESS",
                "Nordic Aroma <hej@nordicaroma.se>",
            ),
        })
    }
}

impl ShippingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let threshold = get_env_or_default("FREE_SHIPPING_THRESHOLD", "500");
        let free_shipping_threshold = threshold.parse::<Decimal>().map_err(|e| {
            ConfigError::InvalidEnvVar("FREE_SHIPPING_THRESHOLD".to_string(), e.to_string())
        })?;

        Ok(Self {
            free_shipping_threshold,
        })
    }
}

impl ReminderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            abandoned_after_hours: get_parsed_or_default("ABANDONED_AFTER_HOURS", "1")?,
            cooldown_hours: get_parsed_or_default("REMINDER_COOLDOWN_HOURS", "1")?,
            max_reminders: get_parsed_or_default("MAX_REMINDERS", "3")?,
        })
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            abandoned_after_hours: 1,
            cooldown_hours: 1,
            max_reminders: 3,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., STOREFRONT_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by Fly.io postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed into `T`, with a default value.
fn get_parsed_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that the cron secret meets minimum length requirements.
fn validate_cron_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_CRON_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_CRON_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
