//! Event lifecycle, invitations and RSVP dashboards

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::{
    images::ImageStore,
    models::{
        CreateEventRequest, Event, EventDashboard, EventPatch, EventResponse, EventType,
        InviteOutcome, NewEvent, NewRsvp, RsvpResponse, UpdateEventRequest, User,
    },
    notifications::{EventSummary, Notification, Notifier},
    repositories::{EventStore, GiftStore, RsvpStore, UserStore},
    validation::require,
};

const EVENT_KEY_SUFFIX_LEN: usize = 8;

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventStore>,
    users: Arc<dyn UserStore>,
    gifts: Arc<dyn GiftStore>,
    rsvps: Arc<dyn RsvpStore>,
    images: Arc<dyn ImageStore>,
    notifier: Arc<dyn Notifier>,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventStore>,
        users: Arc<dyn UserStore>,
        gifts: Arc<dyn GiftStore>,
        rsvps: Arc<dyn RsvpStore>,
        images: Arc<dyn ImageStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            events,
            users,
            gifts,
            rsvps,
            images,
            notifier,
        }
    }

    /// Create an event owned by `creator_id` and notify its creator
    pub async fn create(
        &self,
        request: CreateEventRequest,
        creator_id: Uuid,
    ) -> ServiceResult<EventResponse> {
        let name = require(request.name.as_deref(), "Name").map_err(ServiceError::Validation)?;
        let description = require(request.description.as_deref(), "Description")
            .map_err(ServiceError::Validation)?;
        let date = request
            .date
            .ok_or_else(|| ServiceError::Validation("Date is required".to_string()))?;
        let event_type = match request.event_type.as_deref() {
            Some(raw) => parse_category(raw)?,
            None => EventType::default(),
        };

        let creator = self
            .users
            .find_user(creator_id)
            .await?
            .ok_or_else(|| ServiceError::Validation("Creator not found".to_string()))?;

        if self.events.event_name_taken(name, creator_id, None).await? {
            return Err(ServiceError::Conflict(
                "An event with this name already exists".to_string(),
            ));
        }

        let event = self
            .events
            .create_event(&NewEvent {
                name: name.to_string(),
                date,
                event_key: generate_event_key(),
                description: description.to_string(),
                location: request.location.filter(|l| !l.trim().is_empty()),
                event_type,
                creator_id,
            })
            .await?;

        info!(event_id = %event.id, event_key = %event.event_key, "Event created");

        let notification = Notification::EventCreated {
            to: creator.email.clone(),
            event: EventSummary::new(&event, display_name(&creator)),
        };
        if let Err(e) = self.notifier.notify(notification) {
            warn!(event_id = %event.id, "Could not queue creation email: {}", e);
        }

        Ok(EventResponse::new(event, Some(creator.username), Vec::new()))
    }

    /// RSVP tallies, visible to the creator only
    pub async fn dashboard(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
    ) -> ServiceResult<EventDashboard> {
        let event = self.owned_event(event_id, requester_id, "Access denied").await?;
        let counts = self.rsvps.count_rsvps_by_status(event.id).await?;

        Ok(EventDashboard {
            attending_count: counts.accepted,
            declined_count: counts.declined,
            pending_count: counts.pending,
            total_invited: counts.total(),
        })
    }

    /// Create a pending RSVP per address and queue an invitation for each.
    ///
    /// Failures are isolated per address and reported in the outcome.
    pub async fn invite(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
        guest_emails: Vec<String>,
    ) -> ServiceResult<InviteOutcome> {
        let event = self.owned_event(event_id, requester_id, "Access denied").await?;
        let creator_name = match self.users.find_user(event.creator_id).await? {
            Some(creator) => display_name(&creator),
            None => String::new(),
        };
        let summary = EventSummary::new(&event, creator_name);

        let mut outcome = InviteOutcome {
            message: "Invitation process completed".to_string(),
            ..Default::default()
        };

        for email in guest_emails {
            let email = email.trim().to_string();
            match self.invite_one(&summary, &email).await {
                Ok(()) => outcome.successful.push(email),
                Err(reason) => {
                    warn!(event_id = %event.id, "Invitation to {} failed: {}", email, reason);
                    outcome.failed.push(format!("{} ({})", email, reason));
                }
            }
        }

        outcome.total_sent = outcome.successful.len();
        outcome.total_failed = outcome.failed.len();
        info!(
            event_id = %event.id,
            sent = outcome.total_sent,
            failed = outcome.total_failed,
            "Invitations processed"
        );
        Ok(outcome)
    }

    async fn invite_one(&self, event: &EventSummary, email: &str) -> Result<(), String> {
        if email.is_empty() {
            return Err("Email is required".to_string());
        }

        let rsvp = self
            .rsvps
            .create_rsvp(&NewRsvp {
                guest_email: email.to_string(),
                event_id: event.event_id,
            })
            .await
            .map_err(|e| e.to_string())?;

        self.notifier
            .notify(Notification::RsvpInvite {
                to: email.to_string(),
                event: event.clone(),
                rsvp_id: rsvp.id,
            })
            .map_err(|e| e.to_string())
    }

    /// Public lookup by event key; the creator stays anonymous
    pub async fn get_by_key(&self, event_key: &str) -> ServiceResult<EventResponse> {
        let event = self
            .events
            .find_event_by_key(event_key)
            .await?
            .ok_or_else(event_not_found)?;

        Ok(self.to_response(event).await?.without_creator())
    }

    pub async fn rsvps(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
    ) -> ServiceResult<Vec<RsvpResponse>> {
        let event = self.owned_event(event_id, requester_id, "Access denied").await?;
        let rsvps = self.rsvps.list_rsvps_by_event(event.id).await?;

        Ok(rsvps.into_iter().map(RsvpResponse::from).collect())
    }

    pub async fn list_public(&self) -> ServiceResult<Vec<EventResponse>> {
        let events = self.events.list_events().await?;
        self.to_responses(events).await
    }

    pub async fn list_by_creator(&self, creator_id: Uuid) -> ServiceResult<Vec<EventResponse>> {
        let events = self.events.list_events_by_creator(creator_id).await?;
        self.to_responses(events).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<EventResponse> {
        let event = self.events.find_event(id).await?.ok_or_else(event_not_found)?;
        self.to_response(event).await
    }

    pub async fn list_by_category(&self, category: &str) -> ServiceResult<Vec<EventResponse>> {
        let event_type = parse_category(category)?;
        let events = self.events.list_events_by_type(event_type).await?;
        self.to_responses(events).await
    }

    /// Events dated strictly after today (UTC)
    pub async fn list_upcoming(&self) -> ServiceResult<Vec<EventResponse>> {
        let today = Utc::now().date_naive();
        let events = self.events.list_events_after(today).await?;
        self.to_responses(events).await
    }

    pub async fn search(&self, query: &str) -> ServiceResult<Vec<EventResponse>> {
        let events = self.events.search_events(query.trim()).await?;
        self.to_responses(events).await
    }

    /// Apply the non-null fields of `request`; creator only
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateEventRequest,
        requester_id: Uuid,
    ) -> ServiceResult<EventResponse> {
        let event = self
            .owned_event(id, requester_id, "Only the event creator can update this event")
            .await?;

        let name = match request.name.as_deref() {
            Some(raw) => Some(require(Some(raw), "Name").map_err(ServiceError::Validation)?),
            None => None,
        };
        let description = match request.description.as_deref() {
            Some(raw) => Some(
                require(Some(raw), "Description").map_err(ServiceError::Validation)?,
            ),
            None => None,
        };
        let event_type = request.event_type.as_deref().map(parse_category).transpose()?;

        if let Some(name) = name {
            if name != event.name
                && self
                    .events
                    .event_name_taken(name, event.creator_id, Some(event.id))
                    .await?
            {
                return Err(ServiceError::Conflict(
                    "An event with this name already exists".to_string(),
                ));
            }
        }

        let patch = EventPatch {
            name: name.map(str::to_string),
            date: request.date,
            description: description.map(str::to_string),
            location: request.location,
            event_type,
        };

        let updated = self
            .events
            .update_event(event.id, &patch)
            .await?
            .ok_or_else(event_not_found)?;

        info!(event_id = %updated.id, "Event updated");
        self.to_response(updated).await
    }

    /// Delete an event with its gifts and RSVPs; creator only
    pub async fn delete(&self, id: Uuid, requester_id: Uuid) -> ServiceResult<()> {
        let event = self
            .owned_event(id, requester_id, "Only the event creator can delete this event")
            .await?;

        for gift in self.gifts.list_gifts_by_event(event.id).await? {
            if gift.image.is_some() && !self.images.delete(gift.image.as_deref()).await {
                warn!(gift_id = %gift.id, "Gift image could not be removed");
            }
        }

        if !self.events.delete_event(event.id).await? {
            return Err(event_not_found());
        }

        info!(event_id = %event.id, "Event deleted");
        Ok(())
    }

    /// Load an event and check that `requester_id` created it
    async fn owned_event(
        &self,
        id: Uuid,
        requester_id: Uuid,
        denied: &str,
    ) -> ServiceResult<Event> {
        let event = self.events.find_event(id).await?.ok_or_else(event_not_found)?;

        if event.creator_id != requester_id {
            return Err(ServiceError::Forbidden(denied.to_string()));
        }
        Ok(event)
    }

    async fn to_response(&self, event: Event) -> ServiceResult<EventResponse> {
        let creator = self.users.find_user(event.creator_id).await?;
        let gift_ids = self.gift_ids(event.id).await?;

        Ok(EventResponse::new(
            event,
            creator.map(|user| user.username),
            gift_ids,
        ))
    }

    async fn to_responses(&self, events: Vec<Event>) -> ServiceResult<Vec<EventResponse>> {
        let mut usernames: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut responses = Vec::with_capacity(events.len());

        for event in events {
            if !usernames.contains_key(&event.creator_id) {
                let creator = self.users.find_user(event.creator_id).await?;
                usernames.insert(event.creator_id, creator.map(|user| user.username));
            }
            let username = usernames.get(&event.creator_id).cloned().flatten();
            let gift_ids = self.gift_ids(event.id).await?;
            responses.push(EventResponse::new(event, username, gift_ids));
        }

        Ok(responses)
    }

    async fn gift_ids(&self, event_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        let gifts = self.gifts.list_gifts_by_event(event_id).await?;
        Ok(gifts.into_iter().map(|gift| gift.id).collect())
    }
}

fn event_not_found() -> ServiceError {
    ServiceError::NotFound("Event not found".to_string())
}

fn parse_category(raw: &str) -> ServiceResult<EventType> {
    raw.parse()
        .map_err(|_| ServiceError::Validation(format!("Invalid event category: {}", raw)))
}

fn display_name(user: &User) -> String {
    user.name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| user.username.clone())
}

/// `EVT` + epoch milliseconds + a random alphanumeric suffix
pub fn generate_event_key() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(EVENT_KEY_SUFFIX_LEN)
        .map(char::from)
        .collect();

    format!("EVT{}{}", Utc::now().timestamp_millis(), suffix)
}
