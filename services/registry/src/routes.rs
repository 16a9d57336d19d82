//! HTTP routes of the registry service

use axum::{
    Json, Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, InvalidHeaderValue},
    },
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

use crate::state::AppState;

mod events;
mod gifts;
mod rsvps;
mod users;

/// Body carrying a confirmation message next to the affected resource
#[derive(Serialize)]
pub struct Message<T: Serialize> {
    pub message: String,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Message<T> {
    pub fn new(message: impl Into<String>, body: T) -> Json<Self> {
        Json(Self {
            message: message.into(),
            body,
        })
    }
}

/// Identifies the requester of creator-only event operations
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorQuery {
    pub creator_id: Uuid,
}

/// Create the router for the registry service
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(users::router())
        .merge(events::router())
        .merge(gifts::router())
        .merge(rsvps::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// CORS policy admitting the frontend origin with credentials
pub fn cors_layer(frontend_origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin: HeaderValue = frontend_origin.parse()?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT])
        .allow_credentials(true))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "gift-registry"
    }))
}
