//! Guest RSVP endpoints

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use super::Message;
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RespondQuery {
    #[serde(default)]
    pub response: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/rsvp/:id", get(get_rsvp))
        .route("/api/rsvp/:id/respond", post(respond))
}

pub async fn get_rsvp(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.rsvps.get(id).await?))
}

/// Record a guest's ACCEPTED / DECLINED / PENDING answer
pub async fn respond(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<RespondQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Query(answer) = query?;
    let (rsvp, message) = state.rsvps.respond(id, &answer.response).await?;

    Ok(Message::new(message, rsvp))
}
