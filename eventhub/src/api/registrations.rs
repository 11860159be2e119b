//! Registration endpoints. All require a student or admin session.

use super::{MessageResponse, parse_body, parse_id};
use crate::auth::{Authorized, StudentOrAdmin};
use crate::registration::RegistrationEngine;
use crate::types::{EventId, Registration, RegistrationId, RegistrationWithEvent};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use eventhub_web::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request to register for an event.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Event to register for
    pub event_id: Option<String>,
}

/// Response after registering.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Confirmation message
    pub message: String,
    /// The stored registration
    pub registration: Registration,
    /// Whether the confirmation email went out
    pub email_sent: bool,
}

/// Register the signed-in user for an event.
///
/// ```text
/// POST /api/registrations/register
/// { "eventId": "6f1c..." }
/// ```
///
/// 201 on success; 400 if already registered; 404 for an unknown event.
pub async fn register(
    Authorized { user, .. }: Authorized<StudentOrAdmin>,
    State(engine): State<Arc<RegistrationEngine>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let raw = parse_body(body)?
        .event_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::validation("Missing required field: eventId"))?;
    let event_id = EventId(parse_id(raw.trim(), "Event not found")?);

    let outcome = engine.register(&user, event_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Successfully registered for event".to_string(),
            registration: outcome.registration,
            email_sent: outcome.email_sent,
        }),
    ))
}

/// The signed-in user's registrations with event details, oldest first.
pub async fn my_registrations(
    Authorized { user, .. }: Authorized<StudentOrAdmin>,
    State(engine): State<Arc<RegistrationEngine>>,
) -> Result<Json<Vec<RegistrationWithEvent>>, AppError> {
    Ok(Json(engine.list_for_user(user.id).await?))
}

/// Cancel one of the signed-in user's registrations.
pub async fn cancel(
    Authorized { user, .. }: Authorized<StudentOrAdmin>,
    State(engine): State<Arc<RegistrationEngine>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = RegistrationId(parse_id(&id, "Registration not found")?);
    engine.cancel(id, &user).await?;
    Ok(Json(MessageResponse::new("Registration cancelled successfully")))
}
