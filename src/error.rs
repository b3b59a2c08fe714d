use axum::{Json,
    http::StatusCode,
    response::IntoResponse
};
use serde_json::json;
use thiserror::Error;

use crate::storage::StorageError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error on {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported content shape: {0}")]
    UnsupportedContentShape(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    /// HTTP status the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnsupportedContentShape(_)
            | AppError::InternalServerError(_)
            | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        let body = match self {
            AppError::Validation { field, message } => json!({"error": message, "field": field}),
            AppError::BadRequest(msg) | AppError::NotFound(msg) => json!({"error": msg}),
            AppError::UnsupportedContentShape(msg) => {
                tracing::error!("Unexpected content format: {}", msg);
                json!({"error": format!("Unexpected content format: {}", msg)})
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({"error": msg})
            }
            AppError::Storage(err) => {
                tracing::error!("Storage Error: {:}", err);
                json!({"error": "Database error"})
            }
        };

        (status, Json(body)).into_response()
    }
}
