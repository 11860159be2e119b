//! Application state for the EventHub HTTP server.

use crate::registration::RegistrationEngine;
use crate::stores::EventStore;
use axum::extract::FromRef;
use eventhub_auth::{AccountService, AuthGate, CredentialStore};
use eventhub_web::SessionCookieConfig;
use std::sync::Arc;

/// Shared resources for every handler. Cloned per request (all `Arc`s).
#[derive(Clone)]
pub struct AppState {
    /// Signup and login
    pub accounts: Arc<AccountService>,

    /// Session cookie verification
    pub gate: Arc<AuthGate>,

    /// Register, cancel and list registrations
    pub engine: Arc<RegistrationEngine>,

    /// Event CRUD
    pub events: Arc<dyn EventStore>,

    /// User lookups for attendee listings
    pub users: Arc<dyn CredentialStore>,

    /// Session cookie attributes
    pub cookies: SessionCookieConfig,
}

impl FromRef<AppState> for Arc<AuthGate> {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}

impl FromRef<AppState> for Arc<AccountService> {
    fn from_ref(state: &AppState) -> Self {
        state.accounts.clone()
    }
}

impl FromRef<AppState> for Arc<RegistrationEngine> {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

impl FromRef<AppState> for Arc<dyn EventStore> {
    fn from_ref(state: &AppState) -> Self {
        state.events.clone()
    }
}

impl FromRef<AppState> for Arc<dyn CredentialStore> {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for SessionCookieConfig {
    fn from_ref(state: &AppState) -> Self {
        state.cookies
    }
}
