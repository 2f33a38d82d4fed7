//! Command response types
//!
//! Every state-changing engine operation returns a [`CommandResponse`];
//! queries return plain values.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Result of a command
///
/// ```json
/// { "success": false, "code": 3001, "message": "Already checked in today" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    /// Whether the command succeeded
    pub success: bool,
    /// Error code if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Human-readable message (error description, or an optional success note)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The created / updated record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<T>,
}

impl<T> CommandResponse<T> {
    /// Create a successful response carrying the affected record
    pub fn ok(record: T) -> Self {
        Self {
            success: true,
            code: None,
            message: None,
            record: Some(record),
        }
    }

    /// Create a successful response with a message
    pub fn ok_with_message(record: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: None,
            message: Some(message.into()),
            record: Some(record),
        }
    }

    /// Create a failed response from an error
    pub fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            code: Some(err.code),
            message: Some(err.message.clone()),
            record: None,
        }
    }

    /// Error code of a failed response (`Success` when the command succeeded)
    pub fn error_code(&self) -> ErrorCode {
        self.code.unwrap_or(ErrorCode::Success)
    }

    /// Convert into a `Result`, dropping the message on success
    pub fn into_result(self) -> Result<Option<T>, AppError> {
        if self.success {
            return Ok(self.record);
        }
        let code = self.code.unwrap_or(ErrorCode::Unknown);
        Err(match self.message {
            Some(msg) => AppError::with_message(code, msg),
            None => AppError::new(code),
        })
    }
}

impl<T> From<AppError> for CommandResponse<T> {
    fn from(err: AppError) -> Self {
        Self::failure(&err)
    }
}

impl<T> From<Result<T, AppError>> for CommandResponse<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(record) => Self::ok(record),
            Err(err) => Self::failure(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_code_and_message() {
        let resp: CommandResponse<()> = AppError::new(ErrorCode::NoCheckInFound).into();
        assert!(!resp.success);
        assert_eq!(resp.error_code(), ErrorCode::NoCheckInFound);
        assert_eq!(
            resp.message.as_deref(),
            Some("No check-in record found for today")
        );
        assert!(resp.record.is_none());
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let resp = CommandResponse::ok(7);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "record": 7 }));

        let resp: CommandResponse<i32> = AppError::new(ErrorCode::AlreadyDecided).into();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 4002);
        assert!(json.get("record").is_none());
    }

    #[test]
    fn test_into_result() {
        let ok = CommandResponse::ok_with_message("x", "Checked in at 09:00");
        assert_eq!(ok.into_result().unwrap(), Some("x"));

        let err: CommandResponse<&str> =
            AppError::with_message(ErrorCode::DuplicateEmail, "Email already exists").into();
        let err = err.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateEmail);
    }
}
