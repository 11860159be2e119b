//! # EventHub
//!
//! Event management backend: accounts, campus events, and student
//! registrations, served over a cookie-authenticated JSON API.
//!
//! ## Architecture
//!
//! ```text
//! request ─► correlation id ─► CORS/trace ─► extractor (CurrentUser / Authorized<P>)
//!                                                   │
//!                      ┌────────────────────────────┼────────────────────────┐
//!                      ▼                            ▼                        ▼
//!               auth::handlers               api::events            api::registrations
//!               (AccountService)             (EventStore)           (RegistrationEngine)
//!                                                                     │          │
//!                                                          RegistrationStore  EventStore.attendees
//! ```
//!
//! The registration store is authoritative; each event's attendee list is a
//! copy the [`RegistrationEngine`](registration::RegistrationEngine) keeps in
//! step and the `reconcile` binary repairs.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod config;
pub mod metrics;
pub mod notify;
pub mod registration;
pub mod server;
pub mod stores;
pub mod types;

pub use config::Config;
pub use registration::{ReconcileReport, RegistrationEngine, RegistrationError, RegistrationOutcome};
pub use types::{Event, EventFilter, EventId, Registration, RegistrationId, RegistrationWithEvent};
