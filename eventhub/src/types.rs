//! Domain types for events and registrations.
//!
//! Wire format is camelCase JSON with identifiers serialized as `_id`,
//! `userId` and `eventId`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use eventhub_auth::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Image shown for events created without one.
pub const DEFAULT_IMAGE_URL: &str = "/placeholder.svg?height=200&width=300";

// ═══════════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a new random `EventId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub Uuid);

impl RegistrationId {
    /// Generate a new random `RegistrationId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════

/// A campus event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event ID.
    #[serde(rename = "_id")]
    pub id: EventId,
    /// Event name.
    pub name: String,
    /// Event description.
    pub description: String,
    /// Day (and possibly time) of the event.
    pub date: DateTime<Utc>,
    /// Free-form start time, such as "10:00 AM".
    pub time: String,
    /// Venue.
    pub location: String,
    /// Organizing club or person.
    pub organizer: String,
    /// Category tags.
    pub tags: Vec<String>,
    /// Image reference.
    pub image_url: String,
    /// Registered users, in registration order, without duplicates.
    pub attendees: Vec<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Event name.
    pub name: String,
    /// Event description.
    pub description: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Free-form start time.
    pub time: String,
    /// Venue.
    pub location: String,
    /// Organizer.
    pub organizer: String,
    /// Category tags.
    pub tags: Vec<String>,
    /// Image reference.
    pub image_url: String,
}

/// Partial update of an event's descriptive fields.
///
/// `None` keeps the current value. The attendee list is not part of this
/// type; only the registration engine writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventUpdate {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New date.
    pub date: Option<DateTime<Utc>>,
    /// New start time.
    pub time: Option<String>,
    /// New venue.
    pub location: Option<String>,
    /// New organizer.
    pub organizer: Option<String>,
    /// New tag list.
    pub tags: Option<Vec<String>>,
    /// New image reference.
    pub image_url: Option<String>,
}

impl EventUpdate {
    /// Apply to `event` in place, bumping `updated_at` to `now`.
    pub fn apply(self, event: &mut Event, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            event.name = name;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(time) = self.time {
            event.time = time;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(organizer) = self.organizer {
            event.organizer = organizer;
        }
        if let Some(tags) = self.tags {
            event.tags = tags;
        }
        if let Some(image_url) = self.image_url {
            event.image_url = image_url;
        }
        event.updated_at = now;
    }
}

/// Listing filters. All comparisons are case-insensitive literal substring
/// matches; absent filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Organizer contains.
    pub club: Option<String>,
    /// Event falls on this UTC day.
    pub date: Option<NaiveDate>,
    /// Some tag contains.
    pub category: Option<String>,
    /// Name or description contains.
    pub keyword: Option<String>,
}

impl EventFilter {
    /// Whether `event` passes every set filter.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };

        self.club
            .as_deref()
            .is_none_or(|club| contains(&event.organizer, club))
            && self
                .date
                .is_none_or(|day| event.date.date_naive() == day)
            && self
                .category
                .as_deref()
                .is_none_or(|cat| event.tags.iter().any(|tag| contains(tag, cat)))
            && self.keyword.as_deref().is_none_or(|kw| {
                contains(&event.name, kw) || contains(&event.description, kw)
            })
    }
}

/// Sort events by date, then by their free-form time string compared
/// bytewise (`"10:00 AM"` sorts before `"9:00 AM"`).
pub fn sort_by_schedule(events: &mut [Event]) {
    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
}

/// Parse an event date as sent by clients.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) and
/// plain `YYYY-MM-DD` (midnight UTC).
#[must_use]
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Event fields shown alongside a user's registrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Event ID.
    #[serde(rename = "_id")]
    pub id: EventId,
    /// Event name.
    pub name: String,
    /// Event description.
    pub description: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Free-form start time.
    pub time: String,
    /// Venue.
    pub location: String,
    /// Organizer.
    pub organizer: String,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            description: event.description.clone(),
            date: event.date,
            time: event.time.clone(),
            location: event.location.clone(),
            organizer: event.organizer.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registrations
// ═══════════════════════════════════════════════════════════════════════

/// A user's registration for an event. At most one per (user, event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Registration ID.
    #[serde(rename = "_id")]
    pub id: RegistrationId,
    /// Registered user.
    pub user_id: UserId,
    /// Event registered for.
    pub event_id: EventId,
    /// When the registration was created.
    pub registration_date: DateTime<Utc>,
}

/// A registration joined with its event; `event` is `None` once the event
/// has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationWithEvent {
    /// Registration ID.
    #[serde(rename = "_id")]
    pub id: RegistrationId,
    /// Registered user.
    pub user_id: UserId,
    /// Event registered for.
    pub event_id: EventId,
    /// When the registration was created.
    pub registration_date: DateTime<Utc>,
    /// Event details, `null` when the event no longer exists.
    pub event: Option<EventSummary>,
}

impl RegistrationWithEvent {
    /// Join a registration with its (possibly deleted) event.
    #[must_use]
    pub fn new(registration: Registration, event: Option<&Event>) -> Self {
        Self {
            id: registration.id,
            user_id: registration.user_id,
            event_id: registration.event_id,
            registration_date: registration.registration_date,
            event: event.map(EventSummary::from),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn event(name: &str, organizer: &str, tags: &[&str], date: &str, time: &str) -> Event {
        let now = Utc::now();
        Event {
            id: EventId::new(),
            name: name.to_string(),
            description: format!("About {name}"),
            date: parse_event_date(date).unwrap(),
            time: time.to_string(),
            location: "Main Hall".to_string(),
            organizer: organizer.to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            attendees: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_event_wire_format() {
        let e = event("Hackathon", "CS Club", &["tech"], "2025-03-01", "10:00 AM");
        let json = serde_json::to_value(&e).unwrap();

        assert_eq!(json["_id"], e.id.0.to_string());
        assert_eq!(json["imageUrl"], DEFAULT_IMAGE_URL);
        assert!(json["attendees"].as_array().unwrap().is_empty());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_registration_wire_format() {
        let registration = Registration {
            id: RegistrationId::new(),
            user_id: UserId::new(),
            event_id: EventId::new(),
            registration_date: Utc::now(),
        };
        let json = serde_json::to_value(RegistrationWithEvent::new(registration.clone(), None)).unwrap();

        assert_eq!(json["userId"], registration.user_id.0.to_string());
        assert_eq!(json["eventId"], registration.event_id.0.to_string());
        assert!(json.get("registrationDate").is_some());
        assert!(json["event"].is_null());
    }

    #[test]
    fn test_parse_event_date_formats() {
        let midnight = parse_event_date("2025-03-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2025-03-01T00:00:00+00:00");

        let local = parse_event_date("2025-03-01T18:30").unwrap();
        assert_eq!(local.to_rfc3339(), "2025-03-01T18:30:00+00:00");

        let offset = parse_event_date("2025-03-01T18:30:00+02:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2025-03-01T16:30:00+00:00");

        assert!(parse_event_date("next tuesday").is_none());
    }

    #[test]
    fn test_filter_matching() {
        let e = event("Rust Workshop", "Computer Science Club", &["Coding", "workshop"], "2025-03-01T15:00:00Z", "3:00 PM");

        assert!(EventFilter::default().matches(&e));
        assert!(EventFilter { club: Some("science".into()), ..Default::default() }.matches(&e));
        assert!(!EventFilter { category: Some("CODE".into()), ..Default::default() }.matches(&e));
        assert!(EventFilter { category: Some("cod".into()), ..Default::default() }.matches(&e));
        assert!(EventFilter { keyword: Some("about rust".into()), ..Default::default() }.matches(&e));
        assert!(EventFilter { date: NaiveDate::from_ymd_opt(2025, 3, 1), ..Default::default() }.matches(&e));
        assert!(!EventFilter { date: NaiveDate::from_ymd_opt(2025, 3, 2), ..Default::default() }.matches(&e));
        assert!(!EventFilter { club: Some("Drama".into()), keyword: Some("rust".into()), ..Default::default() }.matches(&e));
    }

    #[test]
    fn test_filter_is_literal() {
        let e = event("C++ Night", "Dev Club", &[], "2025-03-01", "7:00 PM");

        assert!(EventFilter { keyword: Some("c++".into()), ..Default::default() }.matches(&e));
        assert!(!EventFilter { keyword: Some(".*".into()), ..Default::default() }.matches(&e));
    }

    #[test]
    fn test_sort_by_schedule() {
        let mut events = vec![
            event("b", "x", &[], "2025-03-02", "09:00 AM"),
            event("a2", "x", &[], "2025-03-01", "11:00 AM"),
            event("a1", "x", &[], "2025-03-01", "10:00 AM"),
        ];
        sort_by_schedule(&mut events);

        let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a1", "a2", "b"]);
    }

    #[test]
    fn test_same_day_times_compare_bytewise() {
        let mut events = vec![
            event("nine", "x", &[], "2025-03-01", "9:00 AM"),
            event("noon", "x", &[], "2025-03-01", "noon"),
            event("ten", "x", &[], "2025-03-01", "10:00 AM"),
            event("evening", "x", &[], "2025-03-01", "Evening"),
        ];
        sort_by_schedule(&mut events);

        let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["ten", "nine", "evening", "noon"]);
    }

    #[test]
    fn test_update_keeps_unset_fields_and_attendees() {
        let mut e = event("Old", "Club", &["a"], "2025-03-01", "10:00 AM");
        let attendee = UserId::new();
        e.attendees.push(attendee);

        EventUpdate {
            name: Some("New".into()),
            ..Default::default()
        }
        .apply(&mut e, Utc::now());

        assert_eq!(e.name, "New");
        assert_eq!(e.organizer, "Club");
        assert_eq!(e.attendees, vec![attendee]);
    }
}
