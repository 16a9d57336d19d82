//! Event model and related payloads

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ParseEnumError;

/// Kind of occasion an event celebrates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Birthday,
    Wedding,
    Holiday,
    Anniversary,
    #[default]
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Birthday => "BIRTHDAY",
            EventType::Wedding => "WEDDING",
            EventType::Holiday => "HOLIDAY",
            EventType::Anniversary => "ANNIVERSARY",
            EventType::Other => "OTHER",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ParseEnumError;

    /// Case-insensitive: `birthday`, `Birthday` and `BIRTHDAY` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BIRTHDAY" => Ok(EventType::Birthday),
            "WEDDING" => Ok(EventType::Wedding),
            "HOLIDAY" => Ok(EventType::Holiday),
            "ANNIVERSARY" => Ok(EventType::Anniversary),
            "OTHER" => Ok(EventType::Other),
            _ => Err(ParseEnumError {
                kind: "event category",
                value: s.to_string(),
            }),
        }
    }
}

/// Event entity
#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub event_key: String,
    pub description: String,
    pub location: Option<String>,
    pub event_type: EventType,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New event creation payload
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub date: NaiveDate,
    pub event_key: String,
    pub description: String,
    pub location: Option<String>,
    pub event_type: EventType,
    pub creator_id: Uuid,
}

/// Event update payload; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_type: Option<EventType>,
}

/// Request for event creation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
}

/// Request for event update; null or missing fields are left unchanged
pub type UpdateEventRequest = CreateEventRequest;

/// Event as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub event_key: String,
    pub description: String,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_username: Option<String>,
    pub gift_ids: Vec<Uuid>,
}

impl EventResponse {
    pub fn new(event: Event, creator_username: Option<String>, gift_ids: Vec<Uuid>) -> Self {
        Self {
            id: event.id,
            name: event.name,
            date: event.date,
            event_key: event.event_key,
            description: event.description,
            location: event.location,
            event_type: event.event_type,
            created_at: event.created_at,
            updated_at: event.updated_at,
            creator_id: Some(event.creator_id),
            creator_username,
            gift_ids,
        }
    }

    /// Guest view: hides who created the event
    pub fn without_creator(mut self) -> Self {
        self.creator_id = None;
        self.creator_username = None;
        self
    }
}

/// RSVP tallies for an event's creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDashboard {
    pub attending_count: i64,
    pub declined_count: i64,
    pub pending_count: i64,
    pub total_invited: i64,
}

/// Result of an invitation batch
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteOutcome {
    pub message: String,
    pub successful: Vec<String>,
    pub failed: Vec<String>,
    pub total_sent: usize,
    pub total_failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_parses_case_insensitively() {
        assert_eq!("birthday".parse::<EventType>().unwrap(), EventType::Birthday);
        assert_eq!("Wedding".parse::<EventType>().unwrap(), EventType::Wedding);
        assert_eq!(
            "party".parse::<EventType>().unwrap_err().to_string(),
            "invalid event category: party"
        );
    }

    #[test]
    fn guest_view_omits_creator_fields() {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: "Bday".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
            event_key: "EVT1".to_string(),
            description: "cake".to_string(),
            location: None,
            event_type: EventType::Birthday,
            creator_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(
            EventResponse::new(event, Some("alice".to_string()), vec![]).without_creator(),
        )
        .unwrap();

        assert!(json.get("creatorId").is_none());
        assert!(json.get("creatorUsername").is_none());
        assert_eq!(json["type"], "BIRTHDAY");
        assert_eq!(json["date"], "2030-05-01");
        assert_eq!(json["eventKey"], "EVT1");
    }
}
