//! Gift endpoints; creates and updates arrive as multipart forms

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, State, multipart::MultipartRejection,
        rejection::PathRejection,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::json;
use uuid::Uuid;

use super::Message;
use crate::{
    error::{ApiError, ApiResult},
    models::{GiftInput, GiftUpdateInput, ImageUpload},
    state::AppState,
};

/// Largest accepted gift form, image included
const MAX_FORM_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/gifts", post(add_gift).get(list_gifts))
        .route("/api/gifts/event/:event_id", get(list_by_event))
        .route("/api/gifts/event/:event_id/user/:user_id", get(list_for_user))
        .route(
            "/api/gifts/:id",
            get(get_gift).put(update_gift).delete(delete_gift),
        )
        .route("/api/gifts/:id/user/:user_id", delete(remove_planned_gift))
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
}

/// Form fields of a gift request, text and file parts split apart
#[derive(Default)]
struct GiftForm {
    fields: Vec<(String, String)>,
    image: Option<ImageUpload>,
}

impl GiftForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = GiftForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" && field.file_name().is_some() {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                form.image = Some(ImageUpload {
                    bytes: bytes.to_vec(),
                    content_type,
                    file_name,
                });
            } else {
                let value = field.text().await?;
                form.fields.push((name, value));
            }
        }

        Ok(form)
    }

    /// Last value sent for `name`
    fn take(&mut self, name: &str) -> Option<String> {
        let index = self.fields.iter().rposition(|(key, _)| key == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Optional id field; blank counts as absent
    fn take_id(&mut self, name: &str) -> ApiResult<Option<Uuid>> {
        match self.take(name) {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", name, raw))),
            _ => Ok(None),
        }
    }
}

/// Add a gift; `image` is either a file or an image URL
pub async fn add_gift(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = GiftForm::read(multipart?).await?;

    let image_url = form.take("imageUrl").or_else(|| form.take("image"));
    let input = GiftInput {
        name: form.take("name"),
        recipient: form.take("recipient"),
        price: form.take("price"),
        event_id: form.take_id("eventId")?,
        planned_by: form.take_id("plannedBy")?,
        product_url: form.take("productUrl"),
        description: form.take("description"),
        store: form.take("store"),
        image_url,
    };

    let gift = state.gifts.add(input, form.image).await?;

    Ok((
        StatusCode::CREATED,
        Message::new("Gift added successfully!", gift),
    ))
}

pub async fn list_gifts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.gifts.get_all().await?))
}

pub async fn list_by_event(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(event_id) = path?;
    Ok(Json(state.gifts.list_by_event(event_id).await?))
}

/// Gifts of an event as seen by one user; empty for the event's creator
pub async fn list_for_user(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path((event_id, user_id)) = path?;
    Ok(Json(state.gifts.list_for_user(event_id, user_id).await?))
}

pub async fn get_gift(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.gifts.get_by_id(id).await?))
}

pub async fn update_gift(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let mut form = GiftForm::read(multipart?).await?;

    let input = GiftUpdateInput {
        name: form.take("name"),
        recipient: form.take("recipient"),
        price: form.take("price"),
        description: form.take("description"),
        status: form.take("status"),
    };

    let gift = state.gifts.update(id, input, form.image).await?;

    Ok(Message::new("Gift updated successfully!", gift))
}

pub async fn delete_gift(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    state.gifts.delete(id).await?;

    Ok(Json(json!({"message": "Gift deleted successfully"})))
}

/// Drop a gift from the plan of the user who planned it
pub async fn remove_planned_gift(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path((gift_id, user_id)) = path?;
    let removed = state.gifts.remove_planned_gift(gift_id, user_id).await?;

    Ok(Json(json!({
        "message": "Gift removed from your plan",
        "removedGiftId": removed,
    })))
}
