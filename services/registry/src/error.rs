//! Custom error types for the registry service

use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::ServiceError;

/// Custom error type for the HTTP layer
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request that never reached a service
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Service(err) => match err {
                ServiceError::Validation(msg) | ServiceError::Conflict(msg) => {
                    (StatusCode::BAD_REQUEST, msg)
                }
                ServiceError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
                ServiceError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
                ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                ServiceError::Upload(msg) => {
                    error!("Image upload failed: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Error uploading image: {}", msg),
                    )
                }
                ServiceError::Internal(msg) => {
                    error!("Internal error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
                ServiceError::Database(e) => {
                    error!("Database error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::DatabaseError;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Validation("v".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("c".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Unauthorized("u".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden("f".into()), StatusCode::FORBIDDEN),
            (ServiceError::NotFound("n".into()), StatusCode::NOT_FOUND),
        ];

        for (err, expected) in cases {
            let message = err.to_string();
            let (status, body) = render(ApiError::from(err)).await;
            assert_eq!(status, expected);
            assert_eq!(body["message"], message);
        }
    }

    #[tokio::test]
    async fn database_errors_are_not_leaked() {
        let err = ServiceError::Database(DatabaseError::Migration("secret detail".into()));
        let (status, body) = render(ApiError::from(err)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }
}
