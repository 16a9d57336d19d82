//! User model and related payloads

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patch::double_option;

/// Platform name (e.g. `twitter`) to profile URL
pub type SocialLinks = BTreeMap<String, String>;

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub is_organizer: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_organizer: bool,
}

/// Profile update payload.
///
/// Only keys present in the request are applied; a key sent as `null`
/// clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub social_links: Option<Option<SocialLinks>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.image.is_none()
            && self.social_links.is_none()
    }
}

/// Request for user registration
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request for user login
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response for a successful login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub is_organizer: bool,
    pub name: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub is_organizer: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            location: user.location,
            image: user.image,
            social_links: user.social_links,
            is_organizer: user.is_organizer,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for LoginResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            username: user.username,
            is_organizer: user.is_organizer,
            name: user.name,
            location: user.location,
            image: user.image,
        }
    }
}
