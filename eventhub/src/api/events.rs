//! Event endpoints.
//!
//! Listing and lookup are public; everything that writes, and the attendee
//! list, requires an admin session.

use super::{MessageResponse, parse_body, parse_id};
use crate::auth::{AdminOnly, Authorized};
use crate::stores::EventStore;
use crate::types::{
    DEFAULT_IMAGE_URL, Event, EventFilter, EventId, EventUpdate, NewEvent, parse_event_date,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::NaiveDate;
use eventhub_auth::{CredentialStore, UserId};
use eventhub_web::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const EVENT_NOT_FOUND: &str = "Event not found";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing events.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    /// Organizer contains
    pub club: Option<String>,
    /// Day, `YYYY-MM-DD`
    pub date: Option<String>,
    /// Some tag contains
    pub category: Option<String>,
    /// Name or description contains
    pub keyword: Option<String>,
}

impl ListEventsQuery {
    fn into_filter(self) -> Result<EventFilter, AppError> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let date = non_empty(self.date)
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| AppError::validation(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
            })
            .transpose()?;

        Ok(EventFilter {
            club: non_empty(self.club),
            date,
            category: non_empty(self.category),
            keyword: non_empty(self.keyword),
        })
    }
}

/// Request to create an event.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Event name
    pub name: Option<String>,
    /// Event description
    pub description: Option<String>,
    /// Date, RFC 3339 or `YYYY-MM-DD`
    pub date: Option<String>,
    /// Start time, free-form
    pub time: Option<String>,
    /// Venue
    pub location: Option<String>,
    /// Organizer
    pub organizer: Option<String>,
    /// Category tags
    pub tags: Option<Vec<String>>,
    /// Image reference
    pub image_url: Option<String>,
}

impl CreateEventRequest {
    fn validate(self) -> Result<NewEvent, AppError> {
        fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::validation(format!("Missing required field: {field}")))
        }

        let raw_date = required(self.date, "date")?;
        let date = parse_event_date(&raw_date)
            .ok_or_else(|| AppError::validation(format!("Invalid date '{raw_date}'")))?;

        Ok(NewEvent {
            name: required(self.name, "name")?,
            description: required(self.description, "description")?,
            date,
            time: required(self.time, "time")?,
            location: required(self.location, "location")?,
            organizer: required(self.organizer, "organizer")?,
            tags: self.tags.unwrap_or_default(),
            image_url: self
                .image_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
        })
    }
}

/// Request to update an event. Absent or empty fields keep their value.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateEventRequest {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New date
    pub date: Option<String>,
    /// New start time
    pub time: Option<String>,
    /// New venue
    pub location: Option<String>,
    /// New organizer
    pub organizer: Option<String>,
    /// New tag list
    pub tags: Option<Vec<String>>,
    /// New image reference
    pub image_url: Option<String>,
}

impl UpdateEventRequest {
    fn validate(self) -> Result<EventUpdate, AppError> {
        let given = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let date = given(self.date)
            .map(|raw| {
                parse_event_date(&raw).ok_or_else(|| AppError::validation(format!("Invalid date '{raw}'")))
            })
            .transpose()?;

        Ok(EventUpdate {
            name: given(self.name),
            description: given(self.description),
            date,
            time: given(self.time),
            location: given(self.location),
            organizer: given(self.organizer),
            tags: self.tags,
            image_url: given(self.image_url),
        })
    }
}

/// Attendee as shown to admins.
#[derive(Debug, Clone, Serialize)]
pub struct AttendeeProfile {
    /// User ID
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// List events, sorted by date then time.
///
/// ```bash
/// curl "http://localhost:5000/api/events?club=robotics&date=2025-03-01"
/// ```
pub async fn list_events(
    State(events): State<Arc<dyn EventStore>>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let filter = query.into_filter()?;
    let found = events.list(&filter).await.map_err(internal)?;
    tracing::debug!(count = found.len(), ?filter, "Listed events");
    Ok(Json(found))
}

/// Get one event.
pub async fn get_event(
    State(events): State<Arc<dyn EventStore>>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let id = EventId(parse_id(&id, EVENT_NOT_FOUND)?);
    events
        .find_by_id(id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(EVENT_NOT_FOUND))
}

/// Create an event (admin).
pub async fn create_event(
    Authorized { user, .. }: Authorized<AdminOnly>,
    State(events): State<Arc<dyn EventStore>>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let new_event = parse_body(body)?.validate()?;
    let event = events.create(new_event).await.map_err(internal)?;

    tracing::info!(event_id = %event.id, admin = %user.id, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event (admin). Never touches the attendee list.
pub async fn update_event(
    Authorized { user, .. }: Authorized<AdminOnly>,
    State(events): State<Arc<dyn EventStore>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<Json<Event>, AppError> {
    let id = EventId(parse_id(&id, EVENT_NOT_FOUND)?);
    let update = parse_body(body)?.validate()?;

    let event = events
        .update(id, update)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::not_found(EVENT_NOT_FOUND))?;

    tracing::info!(event_id = %event.id, admin = %user.id, "Event updated");
    Ok(Json(event))
}

/// Delete an event (admin). Its registrations are kept.
pub async fn delete_event(
    Authorized { user, .. }: Authorized<AdminOnly>,
    State(events): State<Arc<dyn EventStore>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = EventId(parse_id(&id, EVENT_NOT_FOUND)?);

    if !events.delete(id).await.map_err(internal)? {
        return Err(AppError::not_found(EVENT_NOT_FOUND));
    }

    tracing::info!(event_id = %id, admin = %user.id, "Event deleted");
    Ok(Json(MessageResponse::new("Event removed")))
}

/// Attendees of an event with their usernames and emails (admin).
///
/// Attendees whose account no longer exists are left out.
pub async fn list_attendees(
    _admin: Authorized<AdminOnly>,
    State(events): State<Arc<dyn EventStore>>,
    State(users): State<Arc<dyn CredentialStore>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AttendeeProfile>>, AppError> {
    let id = EventId(parse_id(&id, EVENT_NOT_FOUND)?);
    let event = events
        .find_by_id(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::not_found(EVENT_NOT_FOUND))?;

    let mut attendees = Vec::with_capacity(event.attendees.len());
    for user_id in event.attendees {
        match users.find_by_id(user_id).await? {
            Some(user) => attendees.push(AttendeeProfile {
                id: user.id,
                username: user.username,
                email: user.email,
            }),
            None => tracing::debug!(event_id = %id, user_id = %user_id, "Skipping deleted attendee"),
        }
    }
    Ok(Json(attendees))
}

fn internal(err: crate::stores::StoreError) -> AppError {
    AppError::internal().with_source(err)
}
