//! Axum integration shared by EventHub services.
//!
//! This crate holds the HTTP pieces that do not depend on the event domain:
//!
//! - [`AppError`]: the error type every handler returns, rendered as
//!   `{"code", "message"}` with a stable code per status
//! - [`SessionCookieConfig`]: builds the `jwt` session cookie and its removal
//! - [`correlation_id_layer`]: per-request correlation ID and tracing span
//! - Extractors for the correlation ID, client IP and session cookie
//! - Health and banner handlers
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use eventhub_web::{correlation_id_layer, handlers};
//!
//! let app = Router::new()
//!     .route("/health", get(handlers::health_check))
//!     .route("/api/health", get(handlers::api_health))
//!     .layer(correlation_id_layer());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cookie;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use cookie::{SESSION_COOKIE_NAME, SameSitePolicy, SessionCookieConfig};
pub use error::AppError;
pub use extractors::{CorrelationId, SessionToken};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
