//! Gift model and related payloads

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ParseEnumError;

/// Where a gift stands in its purchase lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GiftStatus {
    #[default]
    Planned,
    Cancelled,
    Purchased,
}

impl GiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftStatus::Planned => "PLANNED",
            GiftStatus::Cancelled => "CANCELLED",
            GiftStatus::Purchased => "PURCHASED",
        }
    }
}

impl fmt::Display for GiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GiftStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLANNED" => Ok(GiftStatus::Planned),
            "CANCELLED" => Ok(GiftStatus::Cancelled),
            "PURCHASED" => Ok(GiftStatus::Purchased),
            _ => Err(ParseEnumError {
                kind: "gift status",
                value: s.to_string(),
            }),
        }
    }
}

/// Gift entity
#[derive(Debug, Clone)]
pub struct Gift {
    pub id: Uuid,
    pub name: String,
    pub recipient: String,
    pub price: f64,
    pub image: Option<String>,
    pub product_url: Option<String>,
    pub description: Option<String>,
    pub store: Option<String>,
    pub status: GiftStatus,
    pub event_id: Option<Uuid>,
    pub planned_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New gift creation payload
#[derive(Debug, Clone)]
pub struct NewGift {
    pub name: String,
    pub recipient: String,
    pub price: f64,
    pub image: Option<String>,
    pub product_url: Option<String>,
    pub description: Option<String>,
    pub store: Option<String>,
    pub status: GiftStatus,
    pub event_id: Option<Uuid>,
    pub planned_by_id: Option<Uuid>,
}

/// Gift update payload; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct GiftPatch {
    pub name: Option<String>,
    pub recipient: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub status: Option<GiftStatus>,
    pub image: Option<String>,
}

/// Unvalidated fields of a new gift, as read from a form
#[derive(Debug, Clone, Default)]
pub struct GiftInput {
    pub name: Option<String>,
    pub recipient: Option<String>,
    pub price: Option<String>,
    pub event_id: Option<Uuid>,
    pub planned_by: Option<Uuid>,
    pub product_url: Option<String>,
    pub description: Option<String>,
    pub store: Option<String>,
    pub image_url: Option<String>,
}

/// Unvalidated fields of a gift update, as read from a form
#[derive(Debug, Clone, Default)]
pub struct GiftUpdateInput {
    pub name: Option<String>,
    pub recipient: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// An uploaded image file
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl ImageUpload {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Gift as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftResponse {
    pub id: Uuid,
    pub name: String,
    pub recipient: String,
    pub price: f64,
    pub image: Option<String>,
    pub product_url: Option<String>,
    pub description: Option<String>,
    pub store: Option<String>,
    pub status: GiftStatus,
    pub event_id: Option<Uuid>,
    pub planned_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Gift> for GiftResponse {
    fn from(gift: Gift) -> Self {
        Self {
            id: gift.id,
            name: gift.name,
            recipient: gift.recipient,
            price: gift.price,
            image: gift.image,
            product_url: gift.product_url,
            description: gift.description,
            store: gift.store,
            status: gift.status,
            event_id: gift.event_id,
            planned_by_id: gift.planned_by_id,
            created_at: gift.created_at,
            updated_at: gift.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [GiftStatus::Planned, GiftStatus::Cancelled, GiftStatus::Purchased] {
            assert_eq!(status.as_str().parse::<GiftStatus>().unwrap(), status);
        }
        assert_eq!("purchased".parse::<GiftStatus>().unwrap(), GiftStatus::Purchased);
        assert!("lost".parse::<GiftStatus>().is_err());
    }
}
