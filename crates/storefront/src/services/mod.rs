//! Business services for the storefront.
//!
//! - [`email`] - Recovery email rendering and SMTP delivery
//! - [`reminder`] - The abandoned-cart reminder job
//! - [`recovery`] - Recovery-token resolution and commit

pub mod email;
pub mod recovery;
pub mod reminder;

pub use email::{Locale, RecoveryEmailSender, SmtpEmailSender};
pub use recovery::{CartRecoveryResolver, RecoveredCart, RecoveryError};
pub use reminder::{AbandonedCartReminderJob, ReminderPolicy, ReminderRunSummary};
