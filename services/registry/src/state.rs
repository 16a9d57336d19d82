//! Application state shared across handlers

use crate::services::{AuthService, EventService, GiftService, RsvpService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub events: EventService,
    pub gifts: GiftService,
    pub rsvps: RsvpService,
}
