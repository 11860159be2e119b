//! Wiring stores, notifier and auth components from configuration.

use super::state::AppState;
use crate::config::{Config, ConfigError, DatabaseConfig, EmailConfig};
use crate::notify::{ConsoleNotifier, NotificationProvider, SmtpNotifier};
use crate::registration::RegistrationEngine;
use crate::stores::{
    EventStore, InMemoryEventStore, InMemoryRegistrationStore, PostgresEventStore,
    PostgresRegistrationStore, RegistrationStore,
};
use eventhub_auth::stores::{InMemoryCredentialStore, PostgresCredentialStore};
use eventhub_auth::{AccountService, AuthGate, CredentialStore, SessionTokenCodec};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

/// The three stores every component is built from.
#[derive(Clone)]
pub struct AppServices {
    /// User accounts
    pub users: Arc<dyn CredentialStore>,
    /// Events
    pub events: Arc<dyn EventStore>,
    /// Registrations
    pub registrations: Arc<dyn RegistrationStore>,
}

/// Open the connection pool and apply pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn connect_database(config: &DatabaseConfig, url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .connect(url)
        .await?;
    tracing::info!("PostgreSQL connected");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Migrations complete");

    Ok(pool)
}

/// Stores backed by PostgreSQL.
#[must_use]
pub fn postgres_services(pool: &PgPool) -> AppServices {
    AppServices {
        users: Arc::new(PostgresCredentialStore::new(pool.clone())),
        events: Arc::new(PostgresEventStore::new(pool.clone())),
        registrations: Arc::new(PostgresRegistrationStore::new(pool.clone())),
    }
}

/// Stores held in process memory; everything is lost on restart.
#[must_use]
pub fn in_memory_services() -> AppServices {
    AppServices {
        users: Arc::new(InMemoryCredentialStore::new()),
        events: Arc::new(InMemoryEventStore::new()),
        registrations: Arc::new(InMemoryRegistrationStore::new()),
    }
}

/// SMTP notifier when credentials are configured, console notifier otherwise.
#[must_use]
pub fn build_notifier(config: &EmailConfig) -> Arc<dyn NotificationProvider> {
    let Some((user, pass)) = config.credentials() else {
        return Arc::new(ConsoleNotifier::new(config.frontend_url.clone()));
    };

    match SmtpNotifier::new(config, user, pass) {
        Ok(notifier) => {
            tracing::info!(host = %config.smtp_host, sender = %user, "SMTP notifier configured");
            Arc::new(notifier)
        }
        Err(e) => {
            tracing::warn!(error = %e, "SMTP notifier unavailable, falling back to console");
            Arc::new(ConsoleNotifier::new(config.frontend_url.clone()))
        }
    }
}

impl AppServices {
    /// Registration engine over these stores.
    #[must_use]
    pub fn engine(&self, notifier: Arc<dyn NotificationProvider>) -> RegistrationEngine {
        RegistrationEngine::new(self.events.clone(), self.registrations.clone(), notifier)
    }

    /// Assemble the HTTP state.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the cookie policy is invalid.
    pub fn into_state(
        self,
        config: &Config,
        notifier: Arc<dyn NotificationProvider>,
    ) -> Result<AppState, ConfigError> {
        self.into_state_with_codec(config, SessionTokenCodec::new(&config.session()), notifier)
    }

    /// Assemble the HTTP state around an existing token codec, e.g. one
    /// driven by a test clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the cookie policy is invalid.
    pub fn into_state_with_codec(
        self,
        config: &Config,
        codec: SessionTokenCodec,
        notifier: Arc<dyn NotificationProvider>,
    ) -> Result<AppState, ConfigError> {
        let cookies = config.session_cookie()?;
        let engine = self.engine(notifier);

        Ok(AppState {
            accounts: Arc::new(AccountService::new(self.users.clone(), codec.clone())),
            gate: Arc::new(AuthGate::new(codec, self.users.clone())),
            engine: Arc::new(engine),
            events: self.events,
            users: self.users,
            cookies,
        })
    }
}
