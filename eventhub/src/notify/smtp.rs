//! SMTP notifier using Lettre.

use super::{NotificationProvider, NotifyError, RegistrationEmail};
use crate::config::EmailConfig;
use crate::types::EventSummary;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::future::Future;
use std::pin::Pin;

/// Sends confirmations through an SMTP relay with STARTTLS.
///
/// # Examples
///
/// ```ignore
/// let notifier = SmtpNotifier::new(&config.email, user, pass)?;
/// notifier.send_registration_confirmation("alice@example.com", "alice", &event).await?;
/// ```
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    frontend_url: String,
}

impl SmtpNotifier {
    /// Build a notifier sending as `username` through the configured relay.
    ///
    /// # Errors
    ///
    /// - [`NotifyError::InvalidAddress`]: the sender address does not parse
    /// - [`NotifyError::Transport`]: the relay host is invalid
    pub fn new(config: &EmailConfig, username: &str, password: &str) -> Result<Self, NotifyError> {
        let from = format!("{} <{username}>", config.from_name)
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::InvalidAddress(format!("{username}: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotifyError::Transport(format!("SMTP relay error: {e}")))?
            .port(config.smtp_port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self {
            transport,
            from,
            frontend_url: config.frontend_url.clone(),
        })
    }
}

impl NotificationProvider for SmtpNotifier {
    fn send_registration_confirmation<'a>(
        &'a self,
        to: &'a str,
        recipient_name: &'a str,
        event: &'a EventSummary,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            let content = RegistrationEmail::render(recipient_name, event, &self.frontend_url);

            let email = Message::builder()
                .from(self.from.clone())
                .to(to
                    .parse()
                    .map_err(|e| NotifyError::InvalidAddress(format!("{to}: {e}")))?)
                .subject(content.subject)
                .multipart(MultiPart::alternative_plain_html(content.text, content.html))
                .map_err(|e| NotifyError::Build(e.to_string()))?;

            self.transport
                .send(email)
                .await
                .map_err(|e| NotifyError::Transport(e.to_string()))?;

            tracing::info!(event_id = %event.id, "Registration confirmation sent");
            Ok(())
        })
    }
}
