//! RSVP repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{RsvpStore, decode_enum};
use crate::models::{NewRsvp, Rsvp, RsvpCounts, RsvpStatus};

const RSVP_COLUMNS: &str = "id, guest_email, status, event_id, responded_at, created_at";

/// RSVP repository
#[derive(Clone)]
pub struct RsvpRepository {
    pool: PgPool,
}

impl RsvpRepository {
    /// Create a new RSVP repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn rsvp_from_row(row: &PgRow) -> Result<Rsvp, sqlx::Error> {
    Ok(Rsvp {
        id: row.try_get("id")?,
        guest_email: row.try_get("guest_email")?,
        status: decode_enum(row, "status")?,
        event_id: row.try_get("event_id")?,
        responded_at: row.try_get("responded_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl RsvpStore for RsvpRepository {
    async fn create_rsvp(&self, rsvp: &NewRsvp) -> DatabaseResult<Rsvp> {
        info!("Creating RSVP for {} on event {}", rsvp.guest_email, rsvp.event_id);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO rsvps (guest_email, status, event_id)
            VALUES ($1, $2, $3)
            RETURNING {RSVP_COLUMNS}
            "#
        ))
        .bind(&rsvp.guest_email)
        .bind(RsvpStatus::Pending.as_str())
        .bind(rsvp.event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        rsvp_from_row(&row).map_err(DatabaseError::Query)
    }

    async fn find_rsvp(&self, id: Uuid) -> DatabaseResult<Option<Rsvp>> {
        let row = sqlx::query(&format!("SELECT {RSVP_COLUMNS} FROM rsvps WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(rsvp_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn list_rsvps_by_event(&self, event_id: Uuid) -> DatabaseResult<Vec<Rsvp>> {
        let rows = sqlx::query(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE event_id = $1 ORDER BY created_at"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        rows.iter()
            .map(rsvp_from_row)
            .collect::<Result<_, _>>()
            .map_err(DatabaseError::Query)
    }

    async fn count_rsvps_by_status(&self, event_id: Uuid) -> DatabaseResult<RsvpCounts> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS count
            FROM rsvps
            WHERE event_id = $1
            GROUP BY status
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        let mut counts = RsvpCounts::default();
        for row in &rows {
            let status: RsvpStatus = decode_enum(row, "status").map_err(DatabaseError::Query)?;
            let count: i64 = row.try_get("count").map_err(DatabaseError::Query)?;
            counts.add(status, count);
        }
        Ok(counts)
    }

    async fn set_rsvp_status(
        &self,
        id: Uuid,
        status: RsvpStatus,
        responded_at: Option<DateTime<Utc>>,
    ) -> DatabaseResult<Option<Rsvp>> {
        info!("Setting RSVP {} to {}", id, status);

        let row = sqlx::query(&format!(
            r#"
            UPDATE rsvps SET status = $2, responded_at = COALESCE($3, responded_at)
            WHERE id = $1
            RETURNING {RSVP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(responded_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(rsvp_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }
}
