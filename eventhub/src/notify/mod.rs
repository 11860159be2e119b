//! Registration confirmation notifications.
//!
//! Notification is best-effort: the registration engine logs a failed send
//! and reports `emailSent: false`, it never rolls the registration back.
//!
//! - [`SmtpNotifier`]: real email over SMTP
//! - [`ConsoleNotifier`]: logs instead of sending, for development
//! - [`MockNotifier`]: records sends, for tests

pub mod console;
pub mod smtp;
pub mod template;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use crate::types::EventSummary;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

pub use console::ConsoleNotifier;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockNotifier, SentNotification};
pub use smtp::SmtpNotifier;
pub use template::RegistrationEmail;

/// Notification failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Sender or recipient address could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled.
    #[error("Failed to build email: {0}")]
    Build(String),

    /// The transport rejected or failed to deliver the message.
    #[error("Failed to send email: {0}")]
    Transport(String),
}

/// Sends registration confirmations.
///
/// # Dyn Compatibility
///
/// Returns a boxed future so the notifier can be shared as
/// `Arc<dyn NotificationProvider>`.
pub trait NotificationProvider: Send + Sync {
    /// Tell `to` that `recipient_name` is registered for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the message cannot be built or delivered.
    fn send_registration_confirmation<'a>(
        &'a self,
        to: &'a str,
        recipient_name: &'a str,
        event: &'a EventSummary,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;
}
