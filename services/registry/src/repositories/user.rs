//! User repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use super::UserStore;
use crate::models::{NewUser, ProfilePatch, SocialLinks, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, name, location, image, \
     social_links, is_organizer, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let social_links: Option<Json<SocialLinks>> = row.try_get("social_links")?;

    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        image: row.try_get("image")?,
        social_links: social_links.map(|links| links.0),
        is_organizer: row.try_get("is_organizer")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn optional_user(row: Option<PgRow>) -> DatabaseResult<Option<User>> {
    row.as_ref()
        .map(user_from_row)
        .transpose()
        .map_err(DatabaseError::Query)
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create_user(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, is_organizer)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.is_organizer)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        user_from_row(&row).map_err(DatabaseError::Query)
    }

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        optional_user(row)
    }

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        optional_user(row)
    }

    async fn email_exists(&self, email: &str) -> DatabaseResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn username_exists(&self, username: &str) -> DatabaseResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> DatabaseResult<Option<User>> {
        info!("Updating profile of user: {}", id);

        // Each field is guarded by a flag so that an explicit null clears it
        // while a missing key keeps the stored value.
        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET
                name = CASE WHEN $2 THEN $3 ELSE name END,
                location = CASE WHEN $4 THEN $5 ELSE location END,
                image = CASE WHEN $6 THEN $7 ELSE image END,
                social_links = CASE WHEN $8 THEN $9 ELSE social_links END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name.is_some())
        .bind(patch.name.clone().flatten())
        .bind(patch.location.is_some())
        .bind(patch.location.clone().flatten())
        .bind(patch.image.is_some())
        .bind(patch.image.clone().flatten())
        .bind(patch.social_links.is_some())
        .bind(patch.social_links.clone().flatten().map(Json))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        optional_user(row)
    }

    async fn set_organizer(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET is_organizer = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        optional_user(row)
    }
}
