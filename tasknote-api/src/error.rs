//! Error Types for the TaskNote API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! Client errors are serialized as JSON with a field map in `details`.
//! Not-found responses carry no body at all.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tasknote_core::{StorageError, ValidationError};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request body could not be read as a note
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Field format is incorrect
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested note does not exist
    NoteNotFound,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    /// Database connection pool exhausted
    ConnectionPoolExhausted,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,

            ErrorCode::NoteNotFound => StatusCode::NOT_FOUND,

            ErrorCode::ServiceUnavailable | ErrorCode::ConnectionPoolExhausted => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default human-readable message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Request body is not a valid note",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidFormat => "Field format is incorrect",
            ErrorCode::NoteNotFound => "Note not found",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::ConnectionPoolExhausted => "Database connection pool exhausted",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured API error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Field errors keyed by field name, each a list of messages
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// A client error for a single field, reported as `{field: [message]}`.
    pub fn field_error(code: ErrorCode, field: &str, message: impl Into<String>) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert(field.to_string(), json!([message.into()]));
        Self::from_code(code).with_details(serde_json::Value::Object(fields))
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::field_error(
            ErrorCode::MissingField,
            field,
            format!("The {} field is required.", field),
        )
    }

    /// Create an InvalidFormat error for a path or body value.
    pub fn invalid_format(field: &str, value: &str) -> Self {
        Self::field_error(
            ErrorCode::InvalidFormat,
            field,
            format!("The value '{}' is not valid.", value),
        )
    }

    /// Create an InvalidInput error for an unreadable body.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::field_error(ErrorCode::InvalidInput, "body", message)
    }

    /// Create a NoteNotFound error.
    pub fn note_not_found(note_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::NoteNotFound,
            format!("Note {} not found", note_id),
        )
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a DatabaseError.
    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Create a ConnectionPoolExhausted error.
    pub fn connection_pool_exhausted() -> Self {
        Self::from_code(ErrorCode::ConnectionPoolExhausted)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::NOT_FOUND {
            return status.into_response();
        }
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match &err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(field),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        // Log the full error; clients only see the category
        tracing::error!(error = %err, "Storage error");

        match err {
            StorageError::PoolExhausted => ApiError::connection_pool_exhausted(),
            StorageError::Unavailable { .. } => {
                ApiError::service_unavailable("Database is unavailable")
            }
            StorageError::QueryFailed { .. } | StorageError::TransactionFailed { .. } => {
                ApiError::database_error("Database operation failed")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        ApiError::invalid_input(rejection.body_text())
    }
}

impl From<deadpool_postgres::CreatePoolError> for ApiError {
    fn from(err: deadpool_postgres::CreatePoolError) -> Self {
        tracing::error!("Failed to create connection pool: {:?}", err);
        ApiError::internal_error(format!("Failed to create connection pool: {}", err))
    }
}

impl From<crate::migrations::MigrationError> for ApiError {
    fn from(err: crate::migrations::MigrationError) -> Self {
        tracing::error!(error = %err, "Migration error");
        ApiError::database_error(err.to_string())
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidFormat.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NoteNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ErrorCode::ConnectionPoolExhausted.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_missing_field_details() {
        let err = ApiError::from(ValidationError::RequiredFieldMissing {
            field: "title".to_string(),
        });
        assert_eq!(err.code, ErrorCode::MissingField);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.details,
            Some(json!({ "title": ["The title field is required."] }))
        );
    }

    #[test]
    fn test_storage_error_mapping() {
        assert_eq!(
            ApiError::from(StorageError::PoolExhausted).code,
            ErrorCode::ConnectionPoolExhausted
        );
        assert_eq!(
            ApiError::from(StorageError::unavailable("refused")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        let err = ApiError::from(StorageError::query_failed("list_all", "syntax error"));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("syntax error"));
    }

    #[tokio::test]
    async fn test_not_found_has_empty_body() -> Result<(), axum::Error> {
        let response = ApiError::note_not_found(3).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert!(body.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_request_has_json_body() -> Result<(), Box<dyn std::error::Error>> {
        let response = ApiError::invalid_format("id", "abc").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(json["code"], "INVALID_FORMAT");
        assert_eq!(json["details"]["id"][0], "The value 'abc' is not valid.");
        Ok(())
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::missing_field("title");
        let json = serde_json::to_string(&err)?;
        assert!(json.contains("MISSING_FIELD"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
