//! Registration engine.
//!
//! A registration is recorded twice: as a row in the [`RegistrationStore`]
//! and as an entry in the event's attendee list. There is no transaction
//! spanning both, so every operation writes in a fixed order:
//!
//! ```text
//! register: load event ─► reject duplicate ─► insert registration ─► add attendee ─► notify
//! cancel:   load registration ─► check owner ─► remove attendee ─► delete registration
//! ```
//!
//! The registration store is the source of truth. If the second write of a
//! pair fails, the engine logs under the `eventhub::consistency` target,
//! counts it in `eventhub_consistency_failures_total`, and returns an error;
//! [`RegistrationEngine::reconcile_attendees`] repairs what is left behind.

use crate::metrics;
use crate::notify::NotificationProvider;
use crate::stores::{EventStore, RegistrationStore, StoreError};
use crate::types::{
    Event, EventId, EventSummary, Registration, RegistrationId, RegistrationWithEvent,
};
use eventhub_auth::{AuthenticatedUser, UserId};
use eventhub_web::AppError;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Log target for partial writes across the two stores.
pub const CONSISTENCY_TARGET: &str = "eventhub::consistency";

/// Registration failures.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The event does not exist.
    #[error("Event not found")]
    EventNotFound,

    /// The registration does not exist.
    #[error("Registration not found")]
    RegistrationNotFound,

    /// The user already holds a registration for the event.
    #[error("Already registered for this event")]
    AlreadyRegistered,

    /// The requester does not own the registration.
    #[error("Not authorized to cancel this registration")]
    NotOwner,

    /// A store operation failed before anything was written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The second write of a pair failed; the stores disagree until
    /// reconciliation runs.
    #[error("Registration and attendee list out of sync: {0}")]
    AttendeeSync(StoreError),
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::EventNotFound | RegistrationError::RegistrationNotFound => {
                Self::not_found(err.to_string())
            }
            RegistrationError::AlreadyRegistered => Self::duplicate(err.to_string()),
            RegistrationError::NotOwner => Self::forbidden(err.to_string()),
            RegistrationError::Store(_) | RegistrationError::AttendeeSync(_) => {
                Self::internal().with_source(err)
            }
        }
    }
}

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    /// The stored registration.
    pub registration: Registration,
    /// Whether the confirmation email went out.
    pub email_sent: bool,
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Events examined.
    pub events_scanned: usize,
    /// Events whose attendee list was rewritten.
    pub events_repaired: usize,
    /// Registrations whose event no longer exists.
    pub orphaned_registrations: usize,
}

/// Coordinates registrations with event attendee lists.
#[derive(Clone)]
pub struct RegistrationEngine {
    events: Arc<dyn EventStore>,
    registrations: Arc<dyn RegistrationStore>,
    notifier: Arc<dyn NotificationProvider>,
}

impl RegistrationEngine {
    /// Create an engine over the given stores.
    #[must_use]
    pub fn new(
        events: Arc<dyn EventStore>,
        registrations: Arc<dyn RegistrationStore>,
        notifier: Arc<dyn NotificationProvider>,
    ) -> Self {
        Self {
            events,
            registrations,
            notifier,
        }
    }

    /// Register `user` for `event_id`.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::EventNotFound`]: no such event
    /// - [`RegistrationError::AlreadyRegistered`]: duplicate, including a lost race
    /// - [`RegistrationError::AttendeeSync`]: registration stored but attendee list not updated
    /// - [`RegistrationError::Store`]: a store failed before any write
    pub async fn register(
        &self,
        user: &AuthenticatedUser,
        event_id: EventId,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(RegistrationError::EventNotFound)?;

        if self
            .registrations
            .find_by_user_and_event(user.id, event_id)
            .await?
            .is_some()
        {
            metrics::record_registration("duplicate");
            return Err(RegistrationError::AlreadyRegistered);
        }

        let registration = match self.registrations.create(user.id, event_id).await {
            Ok(registration) => registration,
            Err(StoreError::Conflict(_)) => {
                metrics::record_registration("duplicate");
                return Err(RegistrationError::AlreadyRegistered);
            }
            Err(e) => {
                metrics::record_registration("failed");
                return Err(e.into());
            }
        };

        match self.events.add_attendee(event_id, user.id).await {
            Ok(true) => {}
            Ok(false) => {
                // Event deleted between load and append.
                return Err(self.discard_orphan(&registration).await);
            }
            Err(e) => {
                tracing::error!(
                    target: CONSISTENCY_TARGET,
                    inconsistency = "registration_without_attendee",
                    operation = "register",
                    registration_id = %registration.id,
                    user_id = %user.id,
                    event_id = %event_id,
                    error = %e,
                    "Registration stored but attendee list not updated"
                );
                metrics::record_consistency_failure("register");
                metrics::record_registration("failed");
                return Err(RegistrationError::AttendeeSync(e));
            }
        }

        metrics::record_registration("registered");
        tracing::info!(
            registration_id = %registration.id,
            user_id = %user.id,
            event_id = %event_id,
            "User registered for event"
        );

        let email_sent = self.notify(user, &event).await;

        Ok(RegistrationOutcome {
            registration,
            email_sent,
        })
    }

    /// Cancel registration `id` on behalf of `requester`.
    ///
    /// A registration whose event was deleted is still cancellable; the
    /// attendee step is skipped.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::RegistrationNotFound`]: no such registration
    /// - [`RegistrationError::NotOwner`]: `requester` does not own it; nothing changes
    /// - [`RegistrationError::AttendeeSync`]: attendee removed but registration not deleted
    /// - [`RegistrationError::Store`]: a store failed before any write
    pub async fn cancel(
        &self,
        id: RegistrationId,
        requester: &AuthenticatedUser,
    ) -> Result<(), RegistrationError> {
        let registration = self
            .registrations
            .find_by_id(id)
            .await?
            .ok_or(RegistrationError::RegistrationNotFound)?;

        if registration.user_id != requester.id {
            tracing::warn!(
                registration_id = %id,
                owner = %registration.user_id,
                requester = %requester.id,
                "Cancellation by non-owner rejected"
            );
            return Err(RegistrationError::NotOwner);
        }

        let event_exists = self
            .events
            .remove_attendee(registration.event_id, registration.user_id)
            .await?;
        if !event_exists {
            tracing::debug!(
                registration_id = %id,
                event_id = %registration.event_id,
                "Event no longer exists, skipping attendee removal"
            );
        }

        match self.registrations.delete(id).await {
            Ok(true) => {}
            Ok(false) => return Err(RegistrationError::RegistrationNotFound),
            Err(e) => {
                tracing::error!(
                    target: CONSISTENCY_TARGET,
                    inconsistency = "registration_without_attendee",
                    operation = "cancel",
                    registration_id = %id,
                    user_id = %registration.user_id,
                    event_id = %registration.event_id,
                    error = %e,
                    "Attendee removed but registration not deleted"
                );
                metrics::record_consistency_failure("cancel");
                return Err(RegistrationError::AttendeeSync(e));
            }
        }

        metrics::record_registration("cancelled");
        tracing::info!(
            registration_id = %id,
            user_id = %registration.user_id,
            event_id = %registration.event_id,
            "Registration cancelled"
        );
        Ok(())
    }

    /// Registrations of `user`, oldest first, joined with their events.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Store`] if a store fails.
    pub async fn list_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<RegistrationWithEvent>, RegistrationError> {
        let registrations = self.registrations.list_by_user(user).await?;

        let mut events: HashMap<EventId, Option<Event>> = HashMap::new();
        let mut joined = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let event_id = registration.event_id;
            if !events.contains_key(&event_id) {
                let event = self.events.find_by_id(event_id).await?;
                events.insert(event_id, event);
            }
            let event = events.get(&event_id).and_then(Option::as_ref);
            joined.push(RegistrationWithEvent::new(registration, event));
        }
        Ok(joined)
    }

    /// Rebuild every event's attendee list from the registration store.
    ///
    /// Lists are rewritten only where they differ, so running this twice in
    /// a row repairs nothing the second time. Not safe to run alongside live
    /// registrations: a registration made mid-pass may be dropped from its
    /// event's list until the next pass.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Store`] if a store fails; events already
    /// repaired stay repaired.
    pub async fn reconcile_attendees(&self) -> Result<ReconcileReport, RegistrationError> {
        let events = self.events.list_all().await?;
        let registrations = self.registrations.list_all().await?;

        let mut expected: HashMap<EventId, Vec<UserId>> = HashMap::new();
        let mut seen: HashSet<(EventId, UserId)> = HashSet::new();
        for registration in &registrations {
            if seen.insert((registration.event_id, registration.user_id)) {
                expected
                    .entry(registration.event_id)
                    .or_default()
                    .push(registration.user_id);
            }
        }

        let mut report = ReconcileReport {
            events_scanned: events.len(),
            ..ReconcileReport::default()
        };

        for event in &events {
            let attendees = expected.remove(&event.id).unwrap_or_default();
            if attendees == event.attendees {
                continue;
            }

            tracing::warn!(
                event_id = %event.id,
                before = event.attendees.len(),
                after = attendees.len(),
                "Repairing attendee list"
            );
            if self.events.set_attendees(event.id, attendees).await? {
                report.events_repaired += 1;
            }
        }

        report.orphaned_registrations = expected.values().map(Vec::len).sum();
        for event_id in expected.keys() {
            tracing::warn!(event_id = %event_id, "Registrations reference a deleted event");
        }

        metrics::record_attendee_repairs(report.events_repaired as u64);
        tracing::info!(
            events_scanned = report.events_scanned,
            events_repaired = report.events_repaired,
            orphaned_registrations = report.orphaned_registrations,
            "Attendee reconciliation complete"
        );
        Ok(report)
    }

    /// Drop a registration whose event disappeared before the attendee
    /// append, and report the event as missing.
    async fn discard_orphan(&self, registration: &Registration) -> RegistrationError {
        if let Err(e) = self.registrations.delete(registration.id).await {
            tracing::warn!(
                target: CONSISTENCY_TARGET,
                registration_id = %registration.id,
                event_id = %registration.event_id,
                error = %e,
                "Could not discard registration for deleted event"
            );
        }
        metrics::record_registration("failed");
        RegistrationError::EventNotFound
    }

    async fn notify(&self, user: &AuthenticatedUser, event: &Event) -> bool {
        let summary = EventSummary::from(event);
        let result = self
            .notifier
            .send_registration_confirmation(&user.email, &user.username, &summary)
            .await;

        metrics::record_notification(result.is_ok());
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    user_id = %user.id,
                    event_id = %event.id,
                    error = %e,
                    "Registration confirmation not sent"
                );
                false
            }
        }
    }
}
