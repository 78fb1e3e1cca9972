//! Recovery email rendering and delivery.
//!
//! Uses SMTP via lettre for delivery with Askama HTML + text templates.
//! Rendering is a pure function so the template contract (Swedish and
//! English wording, two-decimal prices, the recovery link) is testable
//! without a mail relay; the reminder job talks to the
//! [`RecoveryEmailSender`] trait so it can run against a mock.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;

use nordic_aroma_core::{Email, RecoveryToken};

use crate::config::EmailConfig;

/// Email locale. Reminder sends are fixed to Swedish; English exists for
/// the markets the storefront quotes shipping to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// Swedish
    #[default]
    Sv,
    /// English
    En,
}

impl Locale {
    /// BCP 47-ish language tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sv => "sv",
            Self::En => "en",
        }
    }
}

/// One line of the recovery email: resolved name plus the cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryEmailItem {
    /// Product display name (or a synthetic fallback label)
    pub name: String,
    /// Quantity in the abandoned cart
    pub quantity: i32,
    /// Snapshotted unit price, major units
    pub price: Decimal,
}

/// Everything the recovery email needs.
#[derive(Debug, Clone)]
pub struct RecoveryEmailPayload {
    /// Cart lines with resolved names
    pub items: Vec<RecoveryEmailItem>,
    /// Cart total, major units
    pub total: Decimal,
    /// Token embedded in the recovery link
    pub recovery_token: RecoveryToken,
}

impl RecoveryEmailPayload {
    fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i64::from(i.quantity)).sum()
    }
}

/// A rendered recovery email, ready for the transport.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
    /// Plain-text body
    pub text: String,
}

/// Delivery receipt from the email transport.
#[derive(Debug, Clone, Default)]
pub struct EmailReceipt {
    /// Provider message id, when the transport reports one
    pub message_id: Option<String>,
}

/// Errors that can occur when rendering or sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The upstream provider accepted the connection but rejected the send.
    #[error("Send rejected upstream: {0}")]
    Rejected(String),
}

/// Capability to deliver an abandoned-cart recovery email.
#[allow(async_fn_in_trait)]
pub trait RecoveryEmailSender {
    /// Render and deliver the recovery email for one cart.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if rendering, message building, or delivery
    /// fails. A failure affects only the cart being reminded; the reminder
    /// job isolates it.
    async fn send_cart_recovery(
        &self,
        to: &Email,
        payload: &RecoveryEmailPayload,
        locale: Locale,
    ) -> Result<EmailReceipt, EmailError>;
}

// =============================================================================
// Rendering
// =============================================================================

/// View of one cart line with the price preformatted to two decimals.
struct ItemView {
    name: String,
    quantity: i32,
    price: String,
}

#[derive(Template)]
#[template(path = "email/cart_recovery_sv.html")]
struct CartRecoverySvHtml<'a> {
    items: &'a [ItemView],
    total: &'a str,
    recovery_url: &'a str,
    item_count: i64,
}

#[derive(Template)]
#[template(path = "email/cart_recovery_sv.txt")]
struct CartRecoverySvText<'a> {
    items: &'a [ItemView],
    total: &'a str,
    recovery_url: &'a str,
    item_count: i64,
}

#[derive(Template)]
#[template(path = "email/cart_recovery_en.html")]
struct CartRecoveryEnHtml<'a> {
    items: &'a [ItemView],
    total: &'a str,
    recovery_url: &'a str,
    item_count: i64,
}

#[derive(Template)]
#[template(path = "email/cart_recovery_en.txt")]
struct CartRecoveryEnText<'a> {
    items: &'a [ItemView],
    total: &'a str,
    recovery_url: &'a str,
    item_count: i64,
}

const SUBJECT_SV: &str = "Du glömde något i din varukorg";
const SUBJECT_EN: &str = "Your cart is waiting for you";

/// Render the recovery email for the given locale.
///
/// The recovery link has the form `{base_url}/cart/recover?token={token}`
/// and all prices are formatted to two decimals.
///
/// # Errors
///
/// Returns [`EmailError::Template`] if a template fails to render.
pub fn render_cart_recovery(
    payload: &RecoveryEmailPayload,
    locale: Locale,
    base_url: &str,
) -> Result<RenderedEmail, EmailError> {
    let items: Vec<ItemView> = payload
        .items
        .iter()
        .map(|item| ItemView {
            name: item.name.clone(),
            quantity: item.quantity,
            price: format!("{:.2}", item.price),
        })
        .collect();
    let total = format!("{:.2}", payload.total);
    let recovery_url = format!(
        "{}/cart/recover?token={}",
        base_url.trim_end_matches('/'),
        payload.recovery_token
    );
    let item_count = payload.item_count();

    let (subject, html, text) = match locale {
        Locale::Sv => (
            SUBJECT_SV,
            CartRecoverySvHtml {
                items: &items,
                total: &total,
                recovery_url: &recovery_url,
                item_count,
            }
            .render()?,
            CartRecoverySvText {
                items: &items,
                total: &total,
                recovery_url: &recovery_url,
                item_count,
            }
            .render()?,
        ),
        Locale::En => (
            SUBJECT_EN,
            CartRecoveryEnHtml {
                items: &items,
                total: &total,
                recovery_url: &recovery_url,
                item_count,
            }
            .render()?,
            CartRecoveryEnText {
                items: &items,
                total: &total,
                recovery_url: &recovery_url,
                item_count,
            }
            .render()?,
        ),
    };

    Ok(RenderedEmail {
        subject: subject.to_owned(),
        html,
        text,
    })
}

// =============================================================================
// SMTP delivery
// =============================================================================

/// SMTP-backed [`RecoveryEmailSender`].
#[derive(Clone)]
pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    base_url: String,
}

impl SmtpEmailSender {
    /// Create a new sender from configuration.
    ///
    /// `base_url` is the public storefront URL recovery links point at.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay configuration is invalid.
    pub fn new(config: &EmailConfig, base_url: String) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            base_url,
        })
    }
}

impl RecoveryEmailSender for SmtpEmailSender {
    async fn send_cart_recovery(
        &self,
        to: &Email,
        payload: &RecoveryEmailPayload,
        locale: Locale,
    ) -> Result<EmailReceipt, EmailError> {
        let rendered = render_cart_recovery(payload, locale, &self.base_url)?;

        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(rendered.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(rendered.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(rendered.html),
                    ),
            )?;

        self.mailer.send(message).await?;

        tracing::info!(to = %to, locale = locale.as_str(), "Recovery email sent");

        // SMTP does not echo a provider message id back
        Ok(EmailReceipt { message_id: None })
    }
}
