//! Event repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{EventStore, decode_enum};
use crate::models::{Event, EventPatch, EventType, NewEvent};

const EVENT_COLUMNS: &str = "id, name, date, event_key, description, location, event_type, \
     creator_id, created_at, updated_at";

/// Event repository
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new event repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(
        &self,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> DatabaseResult<Vec<Event>> {
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        rows.iter()
            .map(event_from_row)
            .collect::<Result<_, _>>()
            .map_err(DatabaseError::Query)
    }
}

fn event_from_row(row: &PgRow) -> Result<Event, sqlx::Error> {
    Ok(Event {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        date: row.try_get("date")?,
        event_key: row.try_get("event_key")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        event_type: decode_enum(row, "event_type")?,
        creator_id: row.try_get("creator_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn optional_event(row: Option<PgRow>) -> DatabaseResult<Option<Event>> {
    row.as_ref()
        .map(event_from_row)
        .transpose()
        .map_err(DatabaseError::Query)
}

#[async_trait]
impl EventStore for EventRepository {
    async fn create_event(&self, event: &NewEvent) -> DatabaseResult<Event> {
        info!("Creating event '{}' for creator {}", event.name, event.creator_id);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO events (name, date, event_key, description, location, event_type, creator_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&event.name)
        .bind(event.date)
        .bind(&event.event_key)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.event_type.as_str())
        .bind(event.creator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        event_from_row(&row).map_err(DatabaseError::Query)
    }

    async fn find_event(&self, id: Uuid) -> DatabaseResult<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        optional_event(row)
    }

    async fn find_event_by_key(&self, event_key: &str) -> DatabaseResult<Option<Event>> {
        let row = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_key = $1"
        ))
        .bind(event_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        optional_event(row)
    }

    async fn event_name_taken(
        &self,
        name: &str,
        creator_id: Uuid,
        excluding: Option<Uuid>,
    ) -> DatabaseResult<bool> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM events
                WHERE name = $1 AND creator_id = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(name)
        .bind(creator_id)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn list_events(&self) -> DatabaseResult<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date, created_at");
        self.fetch_all(sqlx::query(&sql)).await
    }

    async fn list_events_by_creator(&self, creator_id: Uuid) -> DatabaseResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE creator_id = $1 ORDER BY date, created_at"
        );
        self.fetch_all(sqlx::query(&sql).bind(creator_id)).await
    }

    async fn list_events_by_type(&self, event_type: EventType) -> DatabaseResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_type = $1 ORDER BY date, created_at"
        );
        self.fetch_all(sqlx::query(&sql).bind(event_type.as_str()))
            .await
    }

    async fn list_events_after(&self, date: NaiveDate) -> DatabaseResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE date > $1 ORDER BY date, created_at"
        );
        self.fetch_all(sqlx::query(&sql).bind(date)).await
    }

    async fn search_events(&self, query: &str) -> DatabaseResult<Vec<Event>> {
        // strpos avoids having to escape LIKE wildcards in user input
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE strpos(lower(name), lower($1)) > 0
               OR strpos(lower(description), lower($1)) > 0
            ORDER BY date, created_at
            "#
        );
        self.fetch_all(sqlx::query(&sql).bind(query)).await
    }

    async fn update_event(&self, id: Uuid, patch: &EventPatch) -> DatabaseResult<Option<Event>> {
        info!("Updating event: {}", id);

        let row = sqlx::query(&format!(
            r#"
            UPDATE events SET
                name = COALESCE($2, name),
                date = COALESCE($3, date),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                event_type = COALESCE($6, event_type),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(patch.date)
        .bind(&patch.description)
        .bind(&patch.location)
        .bind(patch.event_type.map(|t| t.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        optional_event(row)
    }

    async fn delete_event(&self, id: Uuid) -> DatabaseResult<bool> {
        info!("Deleting event: {}", id);

        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }
}
