//! # Error Handling
//!
//! Unified error taxonomy for the flatmatch API. Every failure is converted at
//! the handler boundary into a JSON body carrying a human-readable message.

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// JSON request body extractor whose rejections carry the API error contract.
/// Axum's bare `Json` answers malformed bodies with a plain-text 422; routing
/// the rejection through [`ApiError`] keeps every failure on the
/// `{"error": ...}` wire format.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable description of the failure
    #[schema(example = "Flat not found")]
    pub error: String,
}

/// API error taxonomy with predefined status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input: bad numeric filter bounds, missing required parameters.
    #[error("{0}")]
    Validation(String),
    /// No entity matched the requested id or key.
    #[error("{0}")]
    NotFound(String),
    /// Duplicate unique key on create. Surfaced as 400, matching the service's
    /// historical behavior rather than 409.
    #[error("{0}")]
    Conflict(String),
    /// The store rejected or could not execute the operation.
    #[error("store error: {0}")]
    Store(String),
}

impl ApiError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    const DUPLICATE_KEY: i32 = 11000;

    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(error: mongodb::error::Error) -> Self {
        if is_duplicate_key(&error) {
            tracing::debug!(?error, "unique index violation detected");
            return ApiError::Conflict("resource with this unique key already exists".to_string());
        }

        tracing::error!("store operation failed: {error}");
        ApiError::Store(error.to_string())
    }
}
