//! Health check endpoints.
//!
//! None of these touch a dependency; they answer as long as the process is
//! serving requests.

use axum::{Json, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Liveness probe for load balancers.
///
/// ```text
/// GET /health  ->  200 "ok"
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Body of [`api_health`].
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    /// Always `"OK"`.
    pub status: &'static str,
    /// Time the probe was answered.
    pub timestamp: DateTime<Utc>,
    /// Human-readable status.
    pub message: &'static str,
}

/// JSON health endpoint used by the frontend.
///
/// ```text
/// GET /api/health  ->  {"status":"OK","timestamp":"...","message":"API is healthy"}
/// ```
#[allow(clippy::unused_async)]
pub async fn api_health() -> Json<ApiHealth> {
    Json(ApiHealth {
        status: "OK",
        timestamp: Utc::now(),
        message: "API is healthy",
    })
}

/// Plain-text banner served at `/`.
#[allow(clippy::unused_async)]
pub async fn service_banner() -> &'static str {
    "Event Management System API is running!"
}
