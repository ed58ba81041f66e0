//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Application error types that map to HTTP responses
///
/// Every variant is surfaced to the caller as JSON with a `message` field:
/// a list of messages for validation failures, a single string otherwise.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed")]
    Validation { messages: Vec<String> },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Create a validation error from the collected messages
    pub fn validation(messages: Vec<String>) -> Self {
        Self::Validation { messages }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();

        let (status, message) = match self {
            ApiError::Validation { messages } => (StatusCode::BAD_REQUEST, json!(messages)),
            ApiError::Conflict { message } => (StatusCode::CONFLICT, json!(message)),
            ApiError::NotFound { message } => (StatusCode::NOT_FOUND, json!(message)),
            ApiError::Internal(e) => {
                // In production, hide internal error details from the caller
                let detail = if cfg!(debug_assertions) {
                    e.to_string()
                } else {
                    "An internal server error occurred".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, json!(detail))
            }
        };

        tracing::error!(
            error_id = %error_id,
            status_code = %status.as_u16(),
            "request error"
        );

        (status, Json(json!({ "message": message }))).into_response()
    }
}
