//! Domain services
//!
//! Services own the business rules: validation, ownership checks and the
//! mapping from entities to response bodies. They talk to persistence and
//! the outside world only through the store, image and notifier traits.

use common::error::DatabaseError;
use thiserror::Error;

use crate::{images::ImageError, repositories::constraints};

pub mod auth;
pub mod events;
pub mod gifts;
pub mod rsvps;

pub use auth::AuthService;
pub use events::EventService;
pub use gifts::GiftService;
pub use rsvps::RsvpService;

/// Errors surfaced by the domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Database(DatabaseError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation { .. } => {
                ServiceError::Conflict(conflict_message(&err).to_string())
            }
            other => ServiceError::Database(other),
        }
    }
}

impl From<ImageError> for ServiceError {
    fn from(err: ImageError) -> Self {
        ServiceError::Upload(err.to_string())
    }
}

const CONFLICT_MESSAGES: [(&str, &str); 4] = [
    (constraints::USERS_EMAIL, "Email already exists."),
    (constraints::USERS_USERNAME, "Username already exists."),
    (constraints::EVENTS_NAME_CREATOR, "An event with this name already exists"),
    (constraints::EVENTS_EVENT_KEY, "Event key already in use"),
];

fn conflict_message(err: &DatabaseError) -> &'static str {
    CONFLICT_MESSAGES
        .iter()
        .find(|(constraint, _)| err.is_unique_violation_on(constraint))
        .map_or("Resource already exists", |(_, message)| *message)
}
