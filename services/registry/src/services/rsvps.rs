//! Guest responses to invitations

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::{
    models::{RsvpResponse, RsvpStatus},
    repositories::RsvpStore,
};

#[derive(Clone)]
pub struct RsvpService {
    rsvps: Arc<dyn RsvpStore>,
}

impl RsvpService {
    pub fn new(rsvps: Arc<dyn RsvpStore>) -> Self {
        Self { rsvps }
    }

    /// Record a guest's answer and return the message to show them
    pub async fn respond(
        &self,
        rsvp_id: Uuid,
        response: &str,
    ) -> ServiceResult<(RsvpResponse, &'static str)> {
        let rsvp = self
            .rsvps
            .find_rsvp(rsvp_id)
            .await?
            .ok_or_else(rsvp_not_found)?;

        let status: RsvpStatus = response
            .parse()
            .map_err(|_| ServiceError::Validation("Invalid response type".to_string()))?;

        let responded_at = (status != RsvpStatus::Pending).then(Utc::now);
        let updated = self
            .rsvps
            .set_rsvp_status(rsvp.id, status, responded_at)
            .await?
            .ok_or_else(rsvp_not_found)?;

        info!(rsvp_id = %updated.id, status = %status, "RSVP answered");
        Ok((RsvpResponse::from(updated), confirmation(status)))
    }

    pub async fn get(&self, rsvp_id: Uuid) -> ServiceResult<RsvpResponse> {
        self.rsvps
            .find_rsvp(rsvp_id)
            .await?
            .map(RsvpResponse::from)
            .ok_or_else(rsvp_not_found)
    }
}

fn rsvp_not_found() -> ServiceError {
    ServiceError::NotFound("RSVP not found".to_string())
}

fn confirmation(status: RsvpStatus) -> &'static str {
    match status {
        RsvpStatus::Accepted => "Thank you for confirming your attendance!",
        RsvpStatus::Declined => "We're sorry you can't make it. Thanks for letting us know!",
        RsvpStatus::Pending => "Your response has been reset to pending.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::NewRsvp, repositories::RsvpStore, testing::MemoryStore};

    async fn setup() -> (RsvpService, Arc<MemoryStore>, Uuid) {
        let store = Arc::new(MemoryStore::default());
        let rsvp = store
            .create_rsvp(&NewRsvp {
                guest_email: "a@x.com".to_string(),
                event_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
        (RsvpService::new(store.clone()), store, rsvp.id)
    }

    #[tokio::test]
    async fn accepting_stamps_responded_at() {
        let (service, _, id) = setup().await;

        let (rsvp, message) = service.respond(id, "accepted").await.unwrap();
        assert_eq!(rsvp.status, RsvpStatus::Accepted);
        assert!(rsvp.responded_at.is_some());
        assert_eq!(message, "Thank you for confirming your attendance!");

        let (rsvp, message) = service.respond(id, "DECLINED").await.unwrap();
        assert_eq!(rsvp.status, RsvpStatus::Declined);
        assert!(message.starts_with("We're sorry"));
    }

    #[tokio::test]
    async fn unknown_answer_leaves_status_untouched() {
        let (service, _, id) = setup().await;

        let err = service.respond(id, "maybe").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "Invalid response type"));

        let rsvp = service.get(id).await.unwrap();
        assert_eq!(rsvp.status, RsvpStatus::Pending);
        assert!(rsvp.responded_at.is_none());
    }

    #[tokio::test]
    async fn missing_rsvp_is_not_found() {
        let (service, _, _) = setup().await;
        assert!(matches!(
            service.respond(Uuid::new_v4(), "accepted").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.get(Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
