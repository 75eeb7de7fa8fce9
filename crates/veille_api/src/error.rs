//! Handler-boundary error type and its JSON rendering.
//!
//! Bodies are `{error, message}`, `{error, validation_errors}` for field
//! failures, or `{error, message, example}` for usage errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::{json, Value};
use thiserror::Error;
use veille_core::{FactServiceError, FactValidationError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(FactValidationError),

    /// Unknown or malformed fact id, kept as the raw path segment.
    #[error("fact not found: {0}")]
    NotFound(String),

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("{error}: {message}")]
    Usage {
        error: &'static str,
        message: String,
        example: Value,
    },

    /// Datastore or unexpected failure; `context` names the operation.
    #[error("{context}: {message}")]
    Internal {
        context: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn internal(context: &'static str, message: impl Into<String>) -> Self {
        Self::Internal {
            context,
            message: message.into(),
        }
    }

    /// Maps a service failure, labelling internal errors with `context`.
    pub fn from_service(context: &'static str, err: FactServiceError) -> Self {
        match err {
            FactServiceError::Validation(err) => Self::Validation(err),
            FactServiceError::NotFound(id) => Self::NotFound(id.to_string()),
            FactServiceError::Usage { message, example } => Self::Usage {
                error: "Missing parameters",
                message: message.to_string(),
                example: Value::String(example.to_string()),
            },
            FactServiceError::Repo(err) => Self::internal(context, err.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidJson(_) | Self::Usage { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Validation(err) => json!({
                "error": "Invalid data",
                "validation_errors": err.violations,
            }),
            Self::NotFound(id) => json!({
                "error": "Fact not found",
                "message": format!("No fact with id {id} was found"),
            }),
            Self::InvalidJson(message) => json!({
                "error": "Invalid JSON",
                "message": message,
            }),
            Self::Usage {
                error,
                message,
                example,
            } => json!({
                "error": error,
                "message": message,
                "example": example,
            }),
            Self::Internal { context, message } => json!({
                "error": context,
                "message": message,
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=request_failed module=api status=error http_status={} error={}",
                status.as_u16(),
                self
            );
        }
        (status, Json(self.body())).into_response()
    }
}
