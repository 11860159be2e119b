//! PostgreSQL event and registration stores.
//!
//! Schema lives in `eventhub/migrations`. Attendee edits are single
//! `UPDATE` statements on the array column, so two registrations for the
//! same event never overwrite each other's entry.

use super::{EventStore, RegistrationStore, Result, StoreError, StoreFuture};
use crate::types::{
    Event, EventFilter, EventId, EventUpdate, NewEvent, Registration, RegistrationId,
};
use chrono::{DateTime, Utc};
use eventhub_auth::UserId;
use sqlx::PgPool;
use uuid::Uuid;

/// Schedule order; `time` compares bytewise like `sort_by_schedule`.
const SCHEDULE_ORDER: &str = r#"ORDER BY date ASC, time COLLATE "C" ASC"#;

fn database(context: &str, e: &sqlx::Error) -> StoreError {
    StoreError::Database(format!("{context}: {e}"))
}

/// `%value%` with LIKE metacharacters escaped, so filters match literally.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ═══════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════

/// PostgreSQL store over the `events` table.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    description: String,
    date: DateTime<Utc>,
    time: String,
    location: String,
    organizer: String,
    tags: Vec<String>,
    image_url: String,
    attendees: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId(row.id),
            name: row.name,
            description: row.description,
            date: row.date,
            time: row.time,
            location: row.location,
            organizer: row.organizer,
            tags: row.tags,
            image_url: row.image_url,
            attendees: row.attendees.into_iter().map(UserId).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const EVENT_COLUMNS: &str = "id, name, description, date, time, location, organizer, tags, \
                             image_url, attendees, created_at, updated_at";

impl PostgresEventStore {
    /// Create a new PostgreSQL event store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn execute_attendee_update(&self, sql: &str, id: EventId, user: UserId) -> Result<bool> {
        let result = sqlx::query(sql)
            .bind(id.0)
            .bind(user.0)
            .execute(&self.pool)
            .await
            .map_err(|e| database("Failed to update attendees", &e))?;
        Ok(result.rows_affected() == 1)
    }
}

impl EventStore for PostgresEventStore {
    fn find_by_id(&self, id: EventId) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move {
            let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
            let row = sqlx::query_as::<_, EventRow>(&sql)
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database("Failed to get event", &e))?;
            Ok(row.map(Event::from))
        })
    }

    fn list<'a>(&'a self, filter: &'a EventFilter) -> StoreFuture<'a, Vec<Event>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {EVENT_COLUMNS} FROM events \
                 WHERE ($1::text IS NULL OR organizer ILIKE $1) \
                   AND ($2::date IS NULL OR (date AT TIME ZONE 'UTC')::date = $2) \
                   AND ($3::text IS NULL OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $3)) \
                   AND ($4::text IS NULL OR name ILIKE $4 OR description ILIKE $4) \
                 {SCHEDULE_ORDER}"
            );

            let rows = sqlx::query_as::<_, EventRow>(&sql)
                .bind(filter.club.as_deref().map(like_pattern))
                .bind(filter.date)
                .bind(filter.category.as_deref().map(like_pattern))
                .bind(filter.keyword.as_deref().map(like_pattern))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| database("Failed to list events", &e))?;

            Ok(rows.into_iter().map(Event::from).collect())
        })
    }

    fn list_all(&self) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let sql = format!("SELECT {EVENT_COLUMNS} FROM events {SCHEDULE_ORDER}");
            let rows = sqlx::query_as::<_, EventRow>(&sql)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| database("Failed to list events", &e))?;
            Ok(rows.into_iter().map(Event::from).collect())
        })
    }

    fn create(&self, event: NewEvent) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let sql = format!(
                "INSERT INTO events (id, name, description, date, time, location, organizer, tags, image_url) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 RETURNING {EVENT_COLUMNS}"
            );

            let row = sqlx::query_as::<_, EventRow>(&sql)
                .bind(EventId::new().0)
                .bind(&event.name)
                .bind(&event.description)
                .bind(event.date)
                .bind(&event.time)
                .bind(&event.location)
                .bind(&event.organizer)
                .bind(&event.tags)
                .bind(&event.image_url)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| database("Failed to create event", &e))?;

            Ok(Event::from(row))
        })
    }

    fn update(&self, id: EventId, update: EventUpdate) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move {
            let sql = format!(
                "UPDATE events SET \
                   name = COALESCE($2, name), \
                   description = COALESCE($3, description), \
                   date = COALESCE($4, date), \
                   time = COALESCE($5, time), \
                   location = COALESCE($6, location), \
                   organizer = COALESCE($7, organizer), \
                   tags = COALESCE($8, tags), \
                   image_url = COALESCE($9, image_url), \
                   updated_at = now() \
                 WHERE id = $1 \
                 RETURNING {EVENT_COLUMNS}"
            );

            let row = sqlx::query_as::<_, EventRow>(&sql)
                .bind(id.0)
                .bind(update.name)
                .bind(update.description)
                .bind(update.date)
                .bind(update.time)
                .bind(update.location)
                .bind(update.organizer)
                .bind(update.tags)
                .bind(update.image_url)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database("Failed to update event", &e))?;

            Ok(row.map(Event::from))
        })
    }

    fn delete(&self, id: EventId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM events WHERE id = $1")
                .bind(id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| database("Failed to delete event", &e))?;
            Ok(result.rows_affected() == 1)
        })
    }

    fn add_attendee(&self, id: EventId, user: UserId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            self.execute_attendee_update(
                "UPDATE events SET \
                   attendees = CASE WHEN $2 = ANY(attendees) THEN attendees \
                                    ELSE array_append(attendees, $2) END, \
                   updated_at = now() \
                 WHERE id = $1",
                id,
                user,
            )
            .await
        })
    }

    fn remove_attendee(&self, id: EventId, user: UserId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            self.execute_attendee_update(
                "UPDATE events SET attendees = array_remove(attendees, $2), updated_at = now() \
                 WHERE id = $1",
                id,
                user,
            )
            .await
        })
    }

    fn set_attendees(&self, id: EventId, attendees: Vec<UserId>) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE events SET attendees = $2, updated_at = now() WHERE id = $1",
            )
            .bind(id.0)
            .bind(attendees.into_iter().map(|u| u.0).collect::<Vec<_>>())
            .execute(&self.pool)
            .await
            .map_err(|e| database("Failed to update attendees", &e))?;
            Ok(result.rows_affected() == 1)
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registrations
// ═══════════════════════════════════════════════════════════════════════

/// PostgreSQL store over the `registrations` table.
#[derive(Clone)]
pub struct PostgresRegistrationStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct RegistrationRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    registration_date: DateTime<Utc>,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Self {
            id: RegistrationId(row.id),
            user_id: UserId(row.user_id),
            event_id: EventId(row.event_id),
            registration_date: row.registration_date,
        }
    }
}

const REGISTRATION_COLUMNS: &str = "id, user_id, event_id, registration_date";

impl PostgresRegistrationStore {
    /// Create a new PostgreSQL registration store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all_where(&self, clause: &str, bind: Option<Uuid>) -> Result<Vec<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations {clause} \
             ORDER BY registration_date ASC, id ASC"
        );
        let mut query = sqlx::query_as::<_, RegistrationRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database("Failed to list registrations", &e))?;
        Ok(rows.into_iter().map(Registration::from).collect())
    }
}

impl RegistrationStore for PostgresRegistrationStore {
    fn create(&self, user: UserId, event: EventId) -> StoreFuture<'_, Registration> {
        Box::pin(async move {
            let sql = format!(
                "INSERT INTO registrations (id, user_id, event_id) VALUES ($1, $2, $3) \
                 RETURNING {REGISTRATION_COLUMNS}"
            );

            let row = sqlx::query_as::<_, RegistrationRow>(&sql)
                .bind(RegistrationId::new().0)
                .bind(user.0)
                .bind(event.0)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(db_err) = &e {
                        if db_err.is_unique_violation() {
                            return StoreError::Conflict(format!(
                                "registration ({user}, {event}) already exists"
                            ));
                        }
                    }
                    database("Failed to create registration", &e)
                })?;

            Ok(Registration::from(row))
        })
    }

    fn find_by_id(&self, id: RegistrationId) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1");
            let row = sqlx::query_as::<_, RegistrationRow>(&sql)
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database("Failed to get registration", &e))?;
            Ok(row.map(Registration::from))
        })
    }

    fn find_by_user_and_event(
        &self,
        user: UserId,
        event: EventId,
    ) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {REGISTRATION_COLUMNS} FROM registrations \
                 WHERE user_id = $1 AND event_id = $2"
            );
            let row = sqlx::query_as::<_, RegistrationRow>(&sql)
                .bind(user.0)
                .bind(event.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database("Failed to get registration", &e))?;
            Ok(row.map(Registration::from))
        })
    }

    fn delete(&self, id: RegistrationId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
                .bind(id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| database("Failed to delete registration", &e))?;
            Ok(result.rows_affected() == 1)
        })
    }

    fn list_by_user(&self, user: UserId) -> StoreFuture<'_, Vec<Registration>> {
        Box::pin(async move { self.fetch_all_where("WHERE user_id = $1", Some(user.0)).await })
    }

    fn list_all(&self) -> StoreFuture<'_, Vec<Registration>> {
        Box::pin(async move { self.fetch_all_where("", None).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("club"), "%club%");
        assert_eq!(like_pattern("100%_\\"), "%100\\%\\_\\\\%");
    }

    #[test]
    fn test_schedule_order_compares_time_bytewise() {
        assert_eq!(SCHEDULE_ORDER, r#"ORDER BY date ASC, time COLLATE "C" ASC"#);
    }
}
