//! Gift repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{GiftStore, decode_enum};
use crate::models::{Gift, GiftPatch, NewGift};

const GIFT_COLUMNS: &str = "id, name, recipient, price, image, product_url, description, store, \
     status, event_id, planned_by_id, created_at, updated_at";

/// Gift repository
#[derive(Clone)]
pub struct GiftRepository {
    pool: PgPool,
}

impl GiftRepository {
    /// Create a new gift repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn gift_from_row(row: &PgRow) -> Result<Gift, sqlx::Error> {
    Ok(Gift {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        recipient: row.try_get("recipient")?,
        price: row.try_get("price")?,
        image: row.try_get("image")?,
        product_url: row.try_get("product_url")?,
        description: row.try_get("description")?,
        store: row.try_get("store")?,
        status: decode_enum(row, "status")?,
        event_id: row.try_get("event_id")?,
        planned_by_id: row.try_get("planned_by_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn gifts_from_rows(rows: Vec<PgRow>) -> DatabaseResult<Vec<Gift>> {
    rows.iter()
        .map(gift_from_row)
        .collect::<Result<_, _>>()
        .map_err(DatabaseError::Query)
}

#[async_trait]
impl GiftStore for GiftRepository {
    async fn create_gift(&self, gift: &NewGift) -> DatabaseResult<Gift> {
        info!("Creating gift '{}'", gift.name);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO gifts (name, recipient, price, image, product_url, description, store,
                               status, event_id, planned_by_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {GIFT_COLUMNS}
            "#
        ))
        .bind(&gift.name)
        .bind(&gift.recipient)
        .bind(gift.price)
        .bind(&gift.image)
        .bind(&gift.product_url)
        .bind(&gift.description)
        .bind(&gift.store)
        .bind(gift.status.as_str())
        .bind(gift.event_id)
        .bind(gift.planned_by_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        gift_from_row(&row).map_err(DatabaseError::Query)
    }

    async fn find_gift(&self, id: Uuid) -> DatabaseResult<Option<Gift>> {
        let row = sqlx::query(&format!("SELECT {GIFT_COLUMNS} FROM gifts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(gift_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn list_gifts(&self) -> DatabaseResult<Vec<Gift>> {
        let rows = sqlx::query(&format!(
            "SELECT {GIFT_COLUMNS} FROM gifts ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        gifts_from_rows(rows)
    }

    async fn list_gifts_by_event(&self, event_id: Uuid) -> DatabaseResult<Vec<Gift>> {
        let rows = sqlx::query(&format!(
            "SELECT {GIFT_COLUMNS} FROM gifts WHERE event_id = $1 ORDER BY created_at"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        gifts_from_rows(rows)
    }

    async fn update_gift(&self, id: Uuid, patch: &GiftPatch) -> DatabaseResult<Option<Gift>> {
        info!("Updating gift: {}", id);

        let row = sqlx::query(&format!(
            r#"
            UPDATE gifts SET
                name = COALESCE($2, name),
                recipient = COALESCE($3, recipient),
                price = COALESCE($4, price),
                description = COALESCE($5, description),
                status = COALESCE($6, status),
                image = COALESCE($7, image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {GIFT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.recipient)
        .bind(patch.price)
        .bind(&patch.description)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(&patch.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(gift_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn delete_gift(&self, id: Uuid) -> DatabaseResult<bool> {
        info!("Deleting gift: {}", id);

        let result = sqlx::query("DELETE FROM gifts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }
}
