//! RSVP model and related payloads

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ParseEnumError;

/// A guest's attendance answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RsvpStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Pending => "PENDING",
            RsvpStatus::Accepted => "ACCEPTED",
            RsvpStatus::Declined => "DECLINED",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(RsvpStatus::Pending),
            "ACCEPTED" => Ok(RsvpStatus::Accepted),
            "DECLINED" => Ok(RsvpStatus::Declined),
            _ => Err(ParseEnumError {
                kind: "response type",
                value: s.to_string(),
            }),
        }
    }
}

/// RSVP entity
#[derive(Debug, Clone)]
pub struct Rsvp {
    pub id: Uuid,
    pub guest_email: String,
    pub status: RsvpStatus,
    pub event_id: Uuid,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// New RSVP creation payload
#[derive(Debug, Clone)]
pub struct NewRsvp {
    pub guest_email: String,
    pub event_id: Uuid,
}

/// Number of RSVPs per status for one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RsvpCounts {
    pub pending: i64,
    pub accepted: i64,
    pub declined: i64,
}

impl RsvpCounts {
    pub fn add(&mut self, status: RsvpStatus, count: i64) {
        match status {
            RsvpStatus::Pending => self.pending += count,
            RsvpStatus::Accepted => self.accepted += count,
            RsvpStatus::Declined => self.declined += count,
        }
    }

    pub fn total(&self) -> i64 {
        self.pending + self.accepted + self.declined
    }
}

/// RSVP as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpResponse {
    pub id: Uuid,
    pub guest_email: String,
    pub status: RsvpStatus,
    pub event_id: Uuid,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Rsvp> for RsvpResponse {
    fn from(rsvp: Rsvp) -> Self {
        Self {
            id: rsvp.id,
            guest_email: rsvp.guest_email,
            status: rsvp.status,
            event_id: rsvp.event_id,
            responded_at: rsvp.responded_at,
            created_at: rsvp.created_at,
        }
    }
}
