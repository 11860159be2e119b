//! HTTP authentication for EventHub.
//!
//! Wires the `eventhub-auth` gate into axum: extractors that turn the
//! session cookie into an identity, and the account endpoints that issue it.

pub mod handlers;
pub mod middleware;

pub use middleware::{AdminOnly, Authorized, CurrentUser, RolePolicy, StudentOrAdmin};
