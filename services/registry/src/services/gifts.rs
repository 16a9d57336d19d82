//! Gift registry management

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::{
    images::ImageStore,
    models::{
        Gift, GiftInput, GiftPatch, GiftResponse, GiftStatus, GiftUpdateInput, ImageUpload,
        NewGift,
    },
    repositories::{EventStore, GiftStore, UserStore},
    validation::{parse_price, require},
};

#[derive(Clone)]
pub struct GiftService {
    gifts: Arc<dyn GiftStore>,
    events: Arc<dyn EventStore>,
    users: Arc<dyn UserStore>,
    images: Arc<dyn ImageStore>,
}

impl GiftService {
    pub fn new(
        gifts: Arc<dyn GiftStore>,
        events: Arc<dyn EventStore>,
        users: Arc<dyn UserStore>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            gifts,
            events,
            users,
            images,
        }
    }

    /// Add a gift, uploading `image` when one is attached
    pub async fn add(
        &self,
        input: GiftInput,
        image: Option<ImageUpload>,
    ) -> ServiceResult<GiftResponse> {
        let name = require(input.name.as_deref(), "Name").map_err(ServiceError::Validation)?;
        let recipient =
            require(input.recipient.as_deref(), "Recipient").map_err(ServiceError::Validation)?;
        let price = require(input.price.as_deref(), "Price")
            .and_then(parse_price)
            .map_err(ServiceError::Validation)?;

        if let Some(event_id) = input.event_id {
            if self.events.find_event(event_id).await?.is_none() {
                return Err(ServiceError::Validation("Event not found".to_string()));
            }
        }
        if let Some(planner_id) = input.planned_by {
            if self.users.find_user(planner_id).await?.is_none() {
                return Err(ServiceError::Validation("Planner not found".to_string()));
            }
        }

        let image = match image.filter(|upload| !upload.is_empty()) {
            Some(upload) => Some(self.images.upload(&upload).await?),
            None => non_blank(input.image_url),
        };

        let gift = self
            .gifts
            .create_gift(&NewGift {
                name: name.to_string(),
                recipient: recipient.to_string(),
                price,
                image,
                product_url: non_blank(input.product_url),
                description: non_blank(input.description),
                store: non_blank(input.store),
                status: GiftStatus::Planned,
                event_id: input.event_id,
                planned_by_id: input.planned_by,
            })
            .await?;

        info!(gift_id = %gift.id, event_id = ?gift.event_id, "Gift added");
        Ok(GiftResponse::from(gift))
    }

    pub async fn list_by_event(&self, event_id: Uuid) -> ServiceResult<Vec<GiftResponse>> {
        let gifts = self.gifts.list_gifts_by_event(event_id).await?;
        Ok(gifts.into_iter().map(GiftResponse::from).collect())
    }

    /// Gifts of an event as seen by `user_id`.
    ///
    /// The event's creator gets an empty list so the gifts stay a surprise.
    pub async fn list_for_user(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<Vec<GiftResponse>> {
        let event = self
            .events
            .find_event(event_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Event not found".to_string()))?;

        if event.creator_id == user_id {
            return Ok(Vec::new());
        }
        self.list_by_event(event.id).await
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<GiftResponse>> {
        let gifts = self.gifts.list_gifts().await?;
        Ok(gifts.into_iter().map(GiftResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<GiftResponse> {
        self.find(id).await.map(GiftResponse::from)
    }

    /// Apply the provided fields; a new image replaces the stored one
    pub async fn update(
        &self,
        id: Uuid,
        input: GiftUpdateInput,
        image: Option<ImageUpload>,
    ) -> ServiceResult<GiftResponse> {
        let gift = self.find(id).await?;

        let name = input
            .name
            .as_deref()
            .map(|raw| require(Some(raw), "Name").map(str::to_string))
            .transpose()
            .map_err(ServiceError::Validation)?;
        let recipient = input
            .recipient
            .as_deref()
            .map(|raw| require(Some(raw), "Recipient").map(str::to_string))
            .transpose()
            .map_err(ServiceError::Validation)?;
        let price = input
            .price
            .as_deref()
            .map(parse_price)
            .transpose()
            .map_err(ServiceError::Validation)?;
        let status = input
            .status
            .as_deref()
            .map(|raw| {
                raw.parse::<GiftStatus>()
                    .map_err(|_| ServiceError::Validation(format!("Invalid gift status: {}", raw)))
            })
            .transpose()?;

        let mut patch = GiftPatch {
            name,
            recipient,
            price,
            description: input.description.map(|d| d.trim().to_string()),
            status,
            image: None,
        };

        if let Some(upload) = image.filter(|upload| !upload.is_empty()) {
            self.remove_image(&gift).await;
            patch.image = Some(self.images.upload(&upload).await?);
        }

        let updated = self
            .gifts
            .update_gift(gift.id, &patch)
            .await?
            .ok_or_else(gift_not_found)?;

        info!(gift_id = %updated.id, "Gift updated");
        Ok(GiftResponse::from(updated))
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let gift = self.find(id).await?;
        self.delete_gift(gift).await
    }

    /// Delete a gift on behalf of the user who planned it
    pub async fn remove_planned_gift(&self, gift_id: Uuid, user_id: Uuid) -> ServiceResult<Uuid> {
        let gift = self.find(gift_id).await?;

        if gift.planned_by_id != Some(user_id) {
            return Err(ServiceError::Forbidden(
                "You can only remove gifts you planned".to_string(),
            ));
        }

        let id = gift.id;
        self.delete_gift(gift).await?;
        Ok(id)
    }

    async fn find(&self, id: Uuid) -> ServiceResult<Gift> {
        self.gifts.find_gift(id).await?.ok_or_else(gift_not_found)
    }

    async fn delete_gift(&self, gift: Gift) -> ServiceResult<()> {
        self.remove_image(&gift).await;

        if !self.gifts.delete_gift(gift.id).await? {
            return Err(gift_not_found());
        }

        info!(gift_id = %gift.id, "Gift deleted");
        Ok(())
    }

    /// Best-effort removal of the stored image
    async fn remove_image(&self, gift: &Gift) {
        if gift.image.is_some() && !self.images.delete(gift.image.as_deref()).await {
            warn!(gift_id = %gift.id, "Gift image could not be removed");
        }
    }
}

fn gift_not_found() -> ServiceError {
    ServiceError::NotFound("Gift not found".to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
