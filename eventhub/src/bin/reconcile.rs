//! Rebuild every event's attendee list from the registrations table.
//!
//! Run while registrations are paused; a registration made during the pass
//! can be dropped from its event's list until the next run.
//!
//! ```text
//! DATABASE_URL=postgres://... cargo run --bin reconcile
//! ```

use anyhow::Context;
use eventhub::config::Config;
use eventhub::notify::ConsoleNotifier;
use eventhub::server::{connect_database, postgres_services};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,eventhub=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL must be set to reconcile attendee lists")?;

    let pool = connect_database(&config.database, url).await?;
    let engine = postgres_services(&pool)
        .engine(Arc::new(ConsoleNotifier::new(config.email.frontend_url.clone())));

    let report = engine.reconcile_attendees().await?;
    info!(?report, "Reconciliation finished");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
