//! Domain entities, store payloads and API request/response bodies

use thiserror::Error;

pub mod event;
pub mod gift;
pub mod patch;
pub mod rsvp;
pub mod user;

pub use event::{
    CreateEventRequest, Event, EventDashboard, EventPatch, EventResponse, EventType,
    InviteOutcome, NewEvent, UpdateEventRequest,
};
pub use gift::{
    Gift, GiftInput, GiftPatch, GiftResponse, GiftStatus, GiftUpdateInput, ImageUpload, NewGift,
};
pub use rsvp::{NewRsvp, Rsvp, RsvpCounts, RsvpResponse, RsvpStatus};
pub use user::{
    LoginRequest, LoginResponse, NewUser, ProfilePatch, RegisterRequest, SocialLinks, User,
    UserProfile,
};

/// Raised when a stored or submitted value does not name a known variant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
