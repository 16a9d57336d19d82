//! Event endpoints

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{CreatorQuery, Message};
use crate::{
    error::ApiError,
    models::{CreateEventRequest, UpdateEventRequest},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", post(create_event))
        .route("/api/events/public", get(list_public))
        .route("/api/events/upcoming", get(list_upcoming))
        .route("/api/events/search", get(search_events))
        .route("/api/events/creator/:id", get(list_by_creator))
        .route("/api/events/category/:category", get(list_by_category))
        .route("/api/events/key/:event_key", get(get_by_key))
        .route("/api/events/dashboard/:id", get(dashboard))
        .route(
            "/api/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/api/events/:id/invite", post(invite_guests))
        .route("/api/events/:id/rsvps", get(list_rsvps))
}

/// Create an event owned by the `creatorId` user
pub async fn create_event(
    State(state): State<AppState>,
    query: Result<Query<CreatorQuery>, QueryRejection>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(creator) = query?;
    let Json(request) = payload?;
    let event = state.events.create(request, creator.creator_id).await?;

    Ok((
        StatusCode::CREATED,
        Message::new("Event created successfully", event),
    ))
}

pub async fn list_public(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.events.list_public().await?))
}

pub async fn list_upcoming(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.events.list_upcoming().await?))
}

/// Case-insensitive search over names and descriptions
pub async fn search_events(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(search) = query?;
    Ok(Json(state.events.search(&search.query).await?))
}

pub async fn list_by_creator(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(creator_id) = path?;
    Ok(Json(state.events.list_by_creator(creator_id).await?))
}

pub async fn list_by_category(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(category) = path?;
    Ok(Json(state.events.list_by_category(&category).await?))
}

/// Guest view of an event, looked up by its shareable key
pub async fn get_by_key(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(event_key) = path?;
    Ok(Json(state.events.get_by_key(&event_key).await?))
}

/// RSVP counts for the creator's dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<CreatorQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(creator) = query?;
    Ok(Json(state.events.dashboard(id, creator.creator_id).await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.events.get_by_id(id).await?))
}

pub async fn update_event(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<CreatorQuery>, QueryRejection>,
    payload: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(creator) = query?;
    let Json(request) = payload?;
    let event = state.events.update(id, request, creator.creator_id).await?;

    Ok(Message::new("Event updated successfully", event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<CreatorQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(creator) = query?;
    state.events.delete(id, creator.creator_id).await?;

    Ok(Json(json!({"message": "Event deleted successfully"})))
}

/// Invite a list of guest emails to an event
pub async fn invite_guests(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<CreatorQuery>, QueryRejection>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(creator) = query?;
    let Json(emails) = payload?;
    let outcome = state.events.invite(id, creator.creator_id, emails).await?;

    Ok(Json(outcome))
}

pub async fn list_rsvps(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<CreatorQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(creator) = query?;
    Ok(Json(state.events.rsvps(id, creator.creator_id).await?))
}
