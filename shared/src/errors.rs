use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Duplicate identity: {0}")]
    DuplicateIdentity(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Suspicious score: {0}")]
    SuspiciousScore(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.to_string())
    }
}

impl From<redis::RedisError> for ServiceError {
    fn from(err: redis::RedisError) -> Self {
        ServiceError::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, format!("Unauthorized: {}", msg))
            }
            ServiceError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ServiceError::DuplicateIdentity(msg) => {
                (StatusCode::CONFLICT, format!("Duplicate identity: {}", msg))
            }
            ServiceError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid input: {}", msg))
            }
            ServiceError::SuspiciousScore(msg) => {
                (StatusCode::BAD_REQUEST, format!("Suspicious score: {}", msg))
            }
            ServiceError::Database(msg) => {
                tracing::error!(error = %msg, "Database failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            ServiceError::Cache(msg) => {
                tracing::error!(error = %msg, "Cache failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            ServiceError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
