//! EventHub HTTP server.
//!
//! Loads `.env`, validates configuration, connects to PostgreSQL (or falls
//! back to in-memory stores when `DATABASE_URL` is unset), and serves the
//! API until Ctrl+C or SIGTERM. Prometheus metrics are served on a separate
//! port when `METRICS_PORT` is set.

use eventhub::config::Config;
use eventhub::metrics::register_metrics;
use eventhub::server::{
    build_notifier, build_router, connect_database, in_memory_services, postgres_services,
    shutdown_signal,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,eventhub=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;
    info!(
        port = config.server.port,
        production = config.auth.production,
        "Starting EventHub server"
    );

    let services = match &config.database.url {
        Some(url) => {
            info!(
                host = url.split('@').next_back().unwrap_or("unknown"),
                "Connecting to PostgreSQL"
            );
            let pool = connect_database(&config.database, url).await?;
            postgres_services(&pool)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory stores (data is lost on restart)");
            in_memory_services()
        }
    };

    let notifier = build_notifier(&config.email);
    let state = services.into_state(&config, notifier)?;
    let app = build_router(state, &config.server.cors_allowed_origins);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    let mut server_shutdown = shutdown_tx.subscribe();
    let server: JoinHandle<()> = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.recv().await;
            })
            .await
        {
            error!(error = %e, "HTTP server error");
        }
    });

    let metrics_server = match config.server.metrics_port {
        Some(port) => {
            let handle = PrometheusBuilder::new().install_recorder()?;
            register_metrics();

            let metrics_addr: SocketAddr = format!("{}:{port}", config.server.host).parse()?;
            let metrics_app = axum::Router::new().route(
                "/metrics",
                axum::routing::get(move || std::future::ready(handle.render())),
            );
            let metrics_listener = tokio::net::TcpListener::bind(metrics_addr).await?;
            info!(addr = %metrics_addr, "Prometheus metrics available at /metrics");

            let mut metrics_shutdown = shutdown_tx.subscribe();
            Some(tokio::spawn(async move {
                if let Err(e) = axum::serve(metrics_listener, metrics_app)
                    .with_graceful_shutdown(async move {
                        let _ = metrics_shutdown.recv().await;
                    })
                    .await
                {
                    error!(error = %e, "Metrics server error");
                }
            }))
        }
        None => None,
    };

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    let timeout = Duration::from_secs(config.server.shutdown_timeout);
    for (name, task) in std::iter::once(("http", server)).chain(metrics_server.map(|t| ("metrics", t))) {
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(())) => info!(server = name, "Server stopped"),
            Ok(Err(e)) => warn!(server = name, error = %e, "Server task failed during shutdown"),
            Err(_) => warn!(server = name, ?timeout, "Server did not stop in time"),
        }
    }

    info!("EventHub server stopped");
    Ok(())
}
