//! Error type carried across the engine boundary

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Engine-facing error
///
/// Every engine error enum converts into this before leaving the engine.
/// `details` carries structured context such as the offending field or the
/// collection a storage failure happened on.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach one detail entry (builder style)
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref()?.get(key)
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Storage failed, the request itself may have been fine
    pub fn is_storage_failure(&self) -> bool {
        self.code.is_storage_failure()
    }

    // ==================== Shorthands ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}

/// Result alias used at the engine boundary
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message_comes_from_code() {
        let err = AppError::new(ErrorCode::AlreadyCheckedOut);
        assert_eq!(err.message, "Already checked out today");
        assert_eq!(err.to_string(), "Already checked out today");
        assert_eq!(err.category(), ErrorCategory::Attendance);
        assert!(err.details.is_none());
    }

    #[test]
    fn test_details() {
        let err = AppError::validation("Email must not be empty")
            .with_detail("field", "email")
            .with_detail("max_len", 254);

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.detail("field").unwrap(), "email");
        assert_eq!(err.detail("max_len").unwrap(), 254);
        assert!(err.detail("missing").is_none());
    }

    #[test]
    fn test_storage_failure_flag() {
        let err = AppError::new(ErrorCode::StorageWriteFailed).with_detail("collection", "attendance");
        assert!(err.is_storage_failure());
        assert_eq!(err.category(), ErrorCategory::System);

        assert!(!AppError::invalid_credentials().is_storage_failure());
        assert_eq!(
            AppError::permission_denied("Access denied. hr role required.").category(),
            ErrorCategory::Permission
        );
    }
}
