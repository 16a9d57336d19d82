//! Account and profile endpoints

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use uuid::Uuid;

use super::Message;
use crate::{
    error::ApiError,
    models::{LoginRequest, LoginResponse, ProfilePatch, RegisterRequest, User},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/register-organizer", post(register_organizer))
        .route("/api/login", post(login))
        .route("/api/users/:id", get(get_user))
        .route("/api/users/:id/edit", put(edit_profile))
        .route(
            "/api/users/:id/upgrade-to-organizer",
            put(upgrade_to_organizer),
        )
}

fn registered(message: &str, user: User) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({
            "message": message,
            "userId": user.id,
            "email": user.email,
            "username": user.username,
        })),
    )
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let user = state.auth.register(request).await?;

    Ok(registered("User registered successfully", user))
}

/// Register a new organizer account
pub async fn register_organizer(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let user = state.auth.register_organizer(request).await?;

    Ok(registered("Organizer registered successfully", user))
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let user = state.auth.login(request).await?;

    Ok(Message::new("Login successful", LoginResponse::from(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let profile = state.auth.get_user(id).await?;

    Ok(Json(profile))
}

/// Update the profile fields present in the body
pub async fn edit_profile(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ProfilePatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let profile = state.auth.edit_profile(id, patch).await?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": profile,
    })))
}

pub async fn upgrade_to_organizer(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let profile = state.auth.upgrade_to_organizer(id).await?;

    Ok(Json(json!({
        "message": "Account upgraded to organizer successfully",
        "id": profile.id,
        "email": profile.email,
        "isOrganizer": profile.is_organizer,
    })))
}
