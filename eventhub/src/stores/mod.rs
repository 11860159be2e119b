//! Event and registration storage.
//!
//! Two traits, each with an in-memory and a PostgreSQL implementation.
//! The registration store is the source of truth for who is registered
//! where; an event's attendee list is a denormalized copy that only the
//! [`RegistrationEngine`](crate::registration::RegistrationEngine) writes.
//!
//! Attendee edits are single-statement operations (add-if-absent, remove,
//! overwrite) so concurrent registrations for one event never lose each
//! other's updates.

pub mod memory;
pub mod postgres;

use crate::types::{Event, EventFilter, EventId, EventUpdate, NewEvent, Registration, RegistrationId};
use eventhub_auth::UserId;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

pub use memory::{InMemoryEventStore, InMemoryRegistrationStore};
pub use postgres::{PostgresEventStore, PostgresRegistrationStore};

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Boxed future returned by store methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage failures.
///
/// A missing record is never an error: lookups return `Ok(None)` and
/// mutations report whether they found their target.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Uniqueness constraint violated: {0}")]
    Conflict(String),

    /// The backing store failed.
    #[error("Database error: {0}")]
    Database(String),
}

/// Persistent events.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures so the store can be shared as
/// `Arc<dyn EventStore>`.
pub trait EventStore: Send + Sync {
    /// Find an event by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn find_by_id(&self, id: EventId) -> StoreFuture<'_, Option<Event>>;

    /// Events passing `filter`, sorted by date then time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn list<'a>(&'a self, filter: &'a EventFilter) -> StoreFuture<'a, Vec<Event>>;

    /// Every event, in schedule order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn list_all(&self) -> StoreFuture<'_, Vec<Event>>;

    /// Insert a new event with an empty attendee list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the insert fails.
    fn create(&self, event: NewEvent) -> StoreFuture<'_, Event>;

    /// Apply a partial update. Returns `None` if the event does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the update fails.
    fn update(&self, id: EventId, update: EventUpdate) -> StoreFuture<'_, Option<Event>>;

    /// Delete an event. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the delete fails.
    fn delete(&self, id: EventId) -> StoreFuture<'_, bool>;

    /// Append `user` to the attendee list unless already present.
    /// Returns whether the event exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the update fails.
    fn add_attendee(&self, id: EventId, user: UserId) -> StoreFuture<'_, bool>;

    /// Remove `user` from the attendee list. Returns whether the event exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the update fails.
    fn remove_attendee(&self, id: EventId, user: UserId) -> StoreFuture<'_, bool>;

    /// Overwrite the attendee list. Returns whether the event exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the update fails.
    fn set_attendees(&self, id: EventId, attendees: Vec<UserId>) -> StoreFuture<'_, bool>;
}

/// Persistent registrations, unique per `(user, event)`.
pub trait RegistrationStore: Send + Sync {
    /// Insert a registration stamped with the current time.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Conflict`]: the user is already registered for the event
    /// - [`StoreError::Database`]: the insert failed
    fn create(&self, user: UserId, event: EventId) -> StoreFuture<'_, Registration>;

    /// Find a registration by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn find_by_id(&self, id: RegistrationId) -> StoreFuture<'_, Option<Registration>>;

    /// Find the registration of `user` for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn find_by_user_and_event(
        &self,
        user: UserId,
        event: EventId,
    ) -> StoreFuture<'_, Option<Registration>>;

    /// Delete a registration. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the delete fails.
    fn delete(&self, id: RegistrationId) -> StoreFuture<'_, bool>;

    /// Registrations of `user`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn list_by_user(&self, user: UserId) -> StoreFuture<'_, Vec<Registration>>;

    /// Every registration, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn list_all(&self) -> StoreFuture<'_, Vec<Registration>>;
}
