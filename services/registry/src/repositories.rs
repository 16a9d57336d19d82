//! Persistence ports and their PostgreSQL implementations
//!
//! Each entity has a store trait used by the domain services and a
//! repository backed by a [`PgPool`]. Unique constraints are named in the
//! migrations so violations can be told apart (see [`constraints`]).

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common::error::DatabaseResult;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::{
    Event, EventPatch, EventType, Gift, GiftPatch, NewEvent, NewGift, NewRsvp, NewUser,
    ParseEnumError, ProfilePatch, Rsvp, RsvpCounts, RsvpStatus, User,
};

pub mod event;
pub mod gift;
pub mod rsvp;
pub mod user;

pub use event::EventRepository;
pub use gift::GiftRepository;
pub use rsvp::RsvpRepository;
pub use user::UserRepository;

/// Names of the unique constraints declared in `migrations/`
pub mod constraints {
    pub const USERS_USERNAME: &str = "users_username_key";
    pub const USERS_EMAIL: &str = "users_email_key";
    pub const EVENTS_EVENT_KEY: &str = "events_event_key_key";
    pub const EVENTS_NAME_CREATOR: &str = "events_name_creator_key";
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> DatabaseResult<User>;
    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;
    async fn email_exists(&self, email: &str) -> DatabaseResult<bool>;
    async fn username_exists(&self, username: &str) -> DatabaseResult<bool>;
    async fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> DatabaseResult<Option<User>>;
    async fn set_organizer(&self, id: Uuid) -> DatabaseResult<Option<User>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(&self, event: &NewEvent) -> DatabaseResult<Event>;
    async fn find_event(&self, id: Uuid) -> DatabaseResult<Option<Event>>;
    async fn find_event_by_key(&self, event_key: &str) -> DatabaseResult<Option<Event>>;
    /// True if `creator_id` owns another event called `name`
    async fn event_name_taken(
        &self,
        name: &str,
        creator_id: Uuid,
        excluding: Option<Uuid>,
    ) -> DatabaseResult<bool>;
    async fn list_events(&self) -> DatabaseResult<Vec<Event>>;
    async fn list_events_by_creator(&self, creator_id: Uuid) -> DatabaseResult<Vec<Event>>;
    async fn list_events_by_type(&self, event_type: EventType) -> DatabaseResult<Vec<Event>>;
    async fn list_events_after(&self, date: NaiveDate) -> DatabaseResult<Vec<Event>>;
    /// Case-insensitive substring match on name or description
    async fn search_events(&self, query: &str) -> DatabaseResult<Vec<Event>>;
    async fn update_event(&self, id: Uuid, patch: &EventPatch) -> DatabaseResult<Option<Event>>;
    /// Removes the event together with its gifts and RSVPs
    async fn delete_event(&self, id: Uuid) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait GiftStore: Send + Sync {
    async fn create_gift(&self, gift: &NewGift) -> DatabaseResult<Gift>;
    async fn find_gift(&self, id: Uuid) -> DatabaseResult<Option<Gift>>;
    async fn list_gifts(&self) -> DatabaseResult<Vec<Gift>>;
    async fn list_gifts_by_event(&self, event_id: Uuid) -> DatabaseResult<Vec<Gift>>;
    async fn update_gift(&self, id: Uuid, patch: &GiftPatch) -> DatabaseResult<Option<Gift>>;
    async fn delete_gift(&self, id: Uuid) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait RsvpStore: Send + Sync {
    async fn create_rsvp(&self, rsvp: &NewRsvp) -> DatabaseResult<Rsvp>;
    async fn find_rsvp(&self, id: Uuid) -> DatabaseResult<Option<Rsvp>>;
    async fn list_rsvps_by_event(&self, event_id: Uuid) -> DatabaseResult<Vec<Rsvp>>;
    async fn count_rsvps_by_status(&self, event_id: Uuid) -> DatabaseResult<RsvpCounts>;
    async fn set_rsvp_status(
        &self,
        id: Uuid,
        status: RsvpStatus,
        responded_at: Option<DateTime<Utc>>,
    ) -> DatabaseResult<Option<Rsvp>>;
}

/// Decode a TEXT column holding an enum variant name
pub(crate) fn decode_enum<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: ParseEnumError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
