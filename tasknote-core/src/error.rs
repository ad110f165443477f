//! Error types for TaskNote operations

use thiserror::Error;

/// Storage layer errors.
///
/// "Not found" is deliberately absent: lookups return `Option`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Query failed during {operation}: {reason}")]
    QueryFailed { operation: String, reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },
}

impl StorageError {
    pub fn query_failed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::QueryFailed {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Input shape errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::query_failed("list_all", "relation does not exist");
        let display = err.to_string();
        assert!(display.contains("list_all"));
        assert!(display.contains("relation does not exist"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::RequiredFieldMissing {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "Required field missing: title");
    }
}
