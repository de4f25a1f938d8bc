//! Error types for the feed service.
//!
//! Errors are converted to appropriate HTTP responses for API clients.
//! Collaborator outages surface as `StoreUnavailable` (503, retryable);
//! everything a caller can fix is a 4xx. Empty feeds are never errors.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;
use uuid::Uuid;

/// Result type for feed-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// A backing store (content or social graph) could not be reached.
    /// Surfaced to the caller as retryable; this service never retries
    /// internally.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Pagination parameters rejected before any store call.
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    /// Personalized and discover feeds require a known viewer.
    #[error("Viewer not found: {0}")]
    ViewerNotFound(Uuid),

    /// Missing or malformed viewer identity on the request.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidPagination(_) => StatusCode::BAD_REQUEST,
            AppError::ViewerNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
