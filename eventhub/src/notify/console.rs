//! Console notifier for development.

use super::{NotificationProvider, NotifyError, RegistrationEmail};
use crate::types::EventSummary;
use std::future::Future;
use std::pin::Pin;

/// Logs confirmations instead of sending them.
///
/// Selected when no SMTP credentials are configured.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    frontend_url: String,
}

impl ConsoleNotifier {
    /// Create a console notifier linking to `frontend_url`.
    #[must_use]
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.into(),
        }
    }
}

impl NotificationProvider for ConsoleNotifier {
    fn send_registration_confirmation<'a>(
        &'a self,
        to: &'a str,
        recipient_name: &'a str,
        event: &'a EventSummary,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            let email = RegistrationEmail::render(recipient_name, event, &self.frontend_url);
            tracing::info!(
                to = %to,
                subject = %email.subject,
                event_id = %event.id,
                "📧 Registration confirmation (console only)\n{}",
                email.text
            );
            Ok(())
        })
    }
}
