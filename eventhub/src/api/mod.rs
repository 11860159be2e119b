//! API endpoints for EventHub.
//!
//! - Events: listing, CRUD and attendee lookup
//! - Registrations: register, cancel and list your own

pub mod events;
pub mod registrations;

use axum::{Json, extract::rejection::JsonRejection};
use eventhub_web::AppError;
use serde::Serialize;
use uuid::Uuid;

/// `{"message": ...}` body for acknowledgements.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Human-readable acknowledgement.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Unwrap a JSON body, turning axum's rejection into a validation error.
pub(crate) fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

/// Parse a path identifier; anything that is not a UUID names nothing.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(not_found))
}
