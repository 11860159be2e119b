//! Recording notifier for tests.

use super::{NotificationProvider, NotifyError};
use crate::types::{EventId, EventSummary};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A confirmation the mock was asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    /// Recipient address.
    pub to: String,
    /// Recipient display name.
    pub recipient_name: String,
    /// Event the confirmation was for.
    pub event_id: EventId,
}

/// Notifier that records every send and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    failing: Arc<AtomicBool>,
}

impl MockNotifier {
    /// Create a mock that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successful sends so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationProvider for MockNotifier {
    fn send_registration_confirmation<'a>(
        &'a self,
        to: &'a str,
        recipient_name: &'a str,
        event: &'a EventSummary,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(NotifyError::Transport("mock transport down".to_string()));
            }

            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(SentNotification {
                    to: to.to_string(),
                    recipient_name: recipient_name.to_string(),
                    event_id: event.id,
                });
            Ok(())
        })
    }
}
