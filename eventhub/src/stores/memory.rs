//! In-memory event and registration stores.
//!
//! Used by tests and by the server when no `DATABASE_URL` is configured.
//! Both stores can be told to fail, to exercise the partial-failure paths
//! of the registration engine.

use super::{EventStore, RegistrationStore, Result, StoreError, StoreFuture};
use crate::types::{
    Event, EventFilter, EventId, EventUpdate, NewEvent, Registration, RegistrationId,
    sort_by_schedule,
};
use chrono::Utc;
use eventhub_auth::UserId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

fn unavailable() -> StoreError {
    StoreError::Database("store unavailable".to_string())
}

fn poisoned() -> StoreError {
    StoreError::Database("store lock poisoned".to_string())
}

// ═══════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════

/// Event store backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<Mutex<HashMap<EventId, Event>>>,
    unavailable: Arc<AtomicBool>,
    fail_attendee_updates: Arc<AtomicBool>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only attendee list writes fail.
    pub fn fail_attendee_updates(&self, fail: bool) {
        self.fail_attendee_updates.store(fail, Ordering::SeqCst);
    }

    /// Insert an event as-is, attendees included.
    ///
    /// Bypasses the engine; tests use it to seed inconsistent state.
    pub fn insert(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.insert(event.id, event);
        }
    }

    fn with_events<T>(&self, f: impl FnOnce(&mut HashMap<EventId, Event>) -> T) -> Result<T> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut events = self.events.lock().map_err(|_| poisoned())?;
        Ok(f(&mut events))
    }

    fn with_attendees(
        &self,
        id: EventId,
        f: impl FnOnce(&mut Vec<UserId>),
    ) -> Result<bool> {
        if self.fail_attendee_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Database(
                "attendee update rejected".to_string(),
            ));
        }
        self.with_events(|events| {
            events.get_mut(&id).is_some_and(|event| {
                f(&mut event.attendees);
                event.updated_at = Utc::now();
                true
            })
        })
    }
}

impl EventStore for InMemoryEventStore {
    fn find_by_id(&self, id: EventId) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move { self.with_events(|events| events.get(&id).cloned()) })
    }

    fn list<'a>(&'a self, filter: &'a EventFilter) -> StoreFuture<'a, Vec<Event>> {
        Box::pin(async move {
            let mut matching = self.with_events(|events| {
                events
                    .values()
                    .filter(|event| filter.matches(event))
                    .cloned()
                    .collect::<Vec<_>>()
            })?;
            sort_by_schedule(&mut matching);
            Ok(matching)
        })
    }

    fn list_all(&self) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let mut all = self.with_events(|events| events.values().cloned().collect::<Vec<_>>())?;
            sort_by_schedule(&mut all);
            Ok(all)
        })
    }

    fn create(&self, event: NewEvent) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let now = Utc::now();
            let created = Event {
                id: EventId::new(),
                name: event.name,
                description: event.description,
                date: event.date,
                time: event.time,
                location: event.location,
                organizer: event.organizer,
                tags: event.tags,
                image_url: event.image_url,
                attendees: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            self.with_events(|events| {
                events.insert(created.id, created.clone());
            })?;
            Ok(created)
        })
    }

    fn update(&self, id: EventId, update: EventUpdate) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move {
            self.with_events(|events| {
                events.get_mut(&id).map(|event| {
                    update.apply(event, Utc::now());
                    event.clone()
                })
            })
        })
    }

    fn delete(&self, id: EventId) -> StoreFuture<'_, bool> {
        Box::pin(async move { self.with_events(|events| events.remove(&id).is_some()) })
    }

    fn add_attendee(&self, id: EventId, user: UserId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            self.with_attendees(id, |attendees| {
                if !attendees.contains(&user) {
                    attendees.push(user);
                }
            })
        })
    }

    fn remove_attendee(&self, id: EventId, user: UserId) -> StoreFuture<'_, bool> {
        Box::pin(async move { self.with_attendees(id, |attendees| attendees.retain(|a| *a != user)) })
    }

    fn set_attendees(&self, id: EventId, attendees: Vec<UserId>) -> StoreFuture<'_, bool> {
        Box::pin(async move { self.with_attendees(id, |current| *current = attendees) })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registrations
// ═══════════════════════════════════════════════════════════════════════

/// Registration store backed by a `Vec` in insertion order.
///
/// The duplicate check and the insert run under one lock, matching the
/// unique `(user_id, event_id)` index of the Postgres schema.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistrationStore {
    registrations: Arc<Mutex<Vec<Registration>>>,
    unavailable: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
}

impl InMemoryRegistrationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every operation fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only deletes fail.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Insert a registration as-is, bypassing the uniqueness check.
    pub fn insert(&self, registration: Registration) {
        if let Ok(mut registrations) = self.registrations.lock() {
            registrations.push(registration);
        }
    }

    fn with_registrations<T>(&self, f: impl FnOnce(&mut Vec<Registration>) -> Result<T>) -> Result<T> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut registrations = self.registrations.lock().map_err(|_| poisoned())?;
        f(&mut registrations)
    }

    fn select(&self, keep: impl Fn(&Registration) -> bool) -> Result<Vec<Registration>> {
        self.with_registrations(|registrations| {
            let mut selected: Vec<_> = registrations.iter().filter(|r| keep(r)).cloned().collect();
            selected.sort_by_key(|r| r.registration_date);
            Ok(selected)
        })
    }
}

impl RegistrationStore for InMemoryRegistrationStore {
    fn create(&self, user: UserId, event: EventId) -> StoreFuture<'_, Registration> {
        Box::pin(async move {
            self.with_registrations(|registrations| {
                if registrations
                    .iter()
                    .any(|r| r.user_id == user && r.event_id == event)
                {
                    return Err(StoreError::Conflict(format!(
                        "registration ({user}, {event}) already exists"
                    )));
                }

                let registration = Registration {
                    id: RegistrationId::new(),
                    user_id: user,
                    event_id: event,
                    registration_date: Utc::now(),
                };
                registrations.push(registration.clone());
                Ok(registration)
            })
        })
    }

    fn find_by_id(&self, id: RegistrationId) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            self.with_registrations(|registrations| {
                Ok(registrations.iter().find(|r| r.id == id).cloned())
            })
        })
    }

    fn find_by_user_and_event(
        &self,
        user: UserId,
        event: EventId,
    ) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            self.with_registrations(|registrations| {
                Ok(registrations
                    .iter()
                    .find(|r| r.user_id == user && r.event_id == event)
                    .cloned())
            })
        })
    }

    fn delete(&self, id: RegistrationId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(StoreError::Database("delete rejected".to_string()));
            }
            self.with_registrations(|registrations| {
                let before = registrations.len();
                registrations.retain(|r| r.id != id);
                Ok(registrations.len() != before)
            })
        })
    }

    fn list_by_user(&self, user: UserId) -> StoreFuture<'_, Vec<Registration>> {
        Box::pin(async move { self.select(|r| r.user_id == user) })
    }

    fn list_all(&self) -> StoreFuture<'_, Vec<Registration>> {
        Box::pin(async move { self.select(|_| true) })
    }
}
