//! API error handling.
//!
//! This module provides error types and response formatting for the API.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::domain::ScheduleError;
use crate::infrastructure::RepositoryError;

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional field-level errors for validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a validation error with field-level details.
    #[must_use]
    pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self {
            code: "VALIDATION_ERROR".to_string(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Field-level error for validation failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field that failed validation.
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

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response for validation errors.
    #[must_use]
    pub fn validation_error(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::validation(message, details),
        )
    }

    /// Creates a 401 Unauthorized response.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiError::new("UNAUTHORIZED", message),
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates a 409 Conflict response.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiError::new("CONFLICT", message))
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(_) => Self::not_found(error.to_string()),
            RepositoryError::Conflict(_) => Self::conflict(error.to_string()),
            RepositoryError::InvalidSchedule(error) => error.into(),
            // Internal errors should not expose details to clients.
            RepositoryError::StorageError(_) => {
                tracing::error!(%error, "Storage error");
                Self::internal_error("An internal error occurred")
            }
        }
    }
}

impl From<ScheduleError> for ApiErrorResponse {
    fn from(error: ScheduleError) -> Self {
        ValidationError::single(error.field(), error.to_string()).into()
    }
}

impl From<AuthError> for ApiErrorResponse {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingCredentials => {
                ValidationError::new(vec![
                    FieldError::new("username", "Username is required"),
                    FieldError::new("password", "Password is required"),
                ])
                .into()
            }
            AuthError::UsernameTaken(_) => Self::conflict(error.to_string()),
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
                Self::unauthorized(error.to_string())
            }
            AuthError::Repository(error) => error.into(),
            AuthError::Internal(_) => {
                tracing::error!(%error, "Auth failure");
                Self::internal_error("An internal error occurred")
            }
        }
    }
}

/// Prefix axum puts in front of the `serde_path_to_error` message.
const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        let detail = match &rejection {
            JsonRejection::JsonDataError(error) => data_error_detail(&error.body_text()),
            _ => FieldError::new("body", rejection.body_text()),
        };
        tracing::debug!(field = %detail.field, "Rejected request body");
        Self::validation_error("Malformed request body", vec![detail])
    }
}

/// Splits `path: message` out of a data error, falling back to `body`.
fn data_error_detail(text: &str) -> FieldError {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);
    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            FieldError::new(path, message)
        }
        _ => FieldError::new("body", detail),
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Validation error type for request validation.
#[derive(Debug, Clone)]
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

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        Self::validation_error("Validation failed", error.errors)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_api_error_validation() {
        let details = vec![FieldError::new("title", "Title is required")];
        let error = ApiError::validation("Validation failed", details);
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert_eq!(error.details.unwrap().len(), 1);
    }

    #[rstest]
    #[case(RepositoryError::NotFound("task-123".to_string()), StatusCode::NOT_FOUND)]
    #[case(RepositoryError::Conflict("dup".to_string()), StatusCode::CONFLICT)]
    #[case(
        RepositoryError::InvalidSchedule(ScheduleError::Missing("dueDate")),
        StatusCode::BAD_REQUEST
    )]
    #[case(
        RepositoryError::StorageError("disk".to_string()),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    fn test_repository_error_to_api_error_response(
        #[case] error: RepositoryError,
        #[case] status: StatusCode,
    ) {
        let response: ApiErrorResponse = error.into();
        assert_eq!(response.status, status);
    }

    #[rstest]
    #[case(AuthError::MissingCredentials, StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(AuthError::UsernameTaken("ada".to_string()), StatusCode::CONFLICT, "CONFLICT")]
    #[case(AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED, "UNAUTHORIZED")]
    #[case(AuthError::MissingToken, StatusCode::UNAUTHORIZED, "UNAUTHORIZED")]
    #[case(AuthError::InvalidToken, StatusCode::UNAUTHORIZED, "UNAUTHORIZED")]
    #[case(
        AuthError::Internal("argon".to_string()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR"
    )]
    fn test_auth_error_to_api_error_response(
        #[case] error: AuthError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response: ApiErrorResponse = error.into();
        assert_eq!(response.status, status);
        assert_eq!(response.error.code, code);
    }

    #[rstest]
    fn test_internal_error_hides_details() {
        let response: ApiErrorResponse =
            RepositoryError::StorageError("password=hunter2".to_string()).into();
        assert_eq!(response.error.message, "An internal error occurred");
    }

    #[rstest]
    fn test_schedule_error_names_field() {
        let response: ApiErrorResponse = ScheduleError::Missing("dueTime").into();
        let details = response.error.details.unwrap();
        assert_eq!(details[0].field, "dueTime");
        assert_eq!(details[0].message, "dueTime is required");
    }

    #[rstest]
    #[case("priority: unknown variant `Urgent`", "priority", "unknown variant `Urgent`")]
    #[case("status: invalid type: string \"yes\"", "status", "invalid type: string \"yes\"")]
    #[case("invalid type: integer `5`", "body", "invalid type: integer `5`")]
    fn test_data_error_detail_extracts_path(
        #[case] text: &str,
        #[case] field: &str,
        #[case] message: &str,
    ) {
        let detail = data_error_detail(&format!("{DATA_ERROR_PREFIX}{text}"));
        assert_eq!(detail.field, field);
        assert_eq!(detail.message, message);
    }
}
