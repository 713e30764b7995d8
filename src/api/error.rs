//! API error handling.
//!
//! Errors are answered with an HTML error fragment so that htmx can show them
//! in place; internal details are logged and never sent to the client.

use axum::{
    extract::rejection::FormRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::infrastructure::RepositoryError;
use crate::render::error_fragment;

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level error for validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the form field or path parameter that failed validation.
    pub field: String,
    /// Error message for this field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}: {}", self.field, self.message)
    }
}

/// Malformed or missing request input, detected before any store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", join_field_errors(.errors))]
pub struct ValidationError {
    /// Field-level errors.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Creates a validation error with a single field error.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// API Error Response
// =============================================================================

/// Error response: status code plus the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Human-readable error message.
    pub message: String,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 409 Conflict response.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An internal error occurred",
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            error_fragment(&self.message),
        )
            .into_response()
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Conflict(key) => {
                tracing::warn!(%key, "Task already exists");
                Self::conflict("A task with this id already exists")
            }
            // Handlers resolve NotFound themselves; reaching here means a bug or a race.
            RepositoryError::NotFound(_)
            | RepositoryError::PartialBatch { .. }
            | RepositoryError::DatabaseError(_)
            | RepositoryError::SerializationError(_) => {
                tracing::error!(%error, "Storage operation failed");
                Self::internal_error()
            }
        }
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        tracing::debug!(%error, "Rejected request input");
        let message = error
            .errors
            .iter()
            .map(|field_error| field_error.message.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self::bad_request(message)
    }
}

impl From<FormRejection> for ApiErrorResponse {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!(%rejection, status = %rejection.status(), "Rejected form body");
        Self::bad_request("Request body must be a URL-encoded form.")
    }
}

// =============================================================================
// Tests
// =============================================================================
