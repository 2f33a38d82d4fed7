//! Unified error codes for Pulse
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Attendance errors
//! - 4xxx: Leave errors
//! - 8xxx: Directory (employee / credential) errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for compact serialization
/// and cross-language compatibility with the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password/role)
    InvalidCredentials = 1002,
    /// Password does not satisfy length rules
    PasswordTooShort = 1003,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Attendance ====================
    /// Employee already has an open session today
    AlreadyCheckedIn = 3001,
    /// Today's session is already closed
    AlreadyCheckedOut = 3002,
    /// No check-in recorded for today
    NoCheckInFound = 3003,

    // ==================== 4xxx: Leave ====================
    /// Leave request not found
    RequestNotFound = 4001,
    /// Leave request was already approved or rejected
    AlreadyDecided = 4002,
    /// End date is before start date
    InvalidDateRange = 4003,

    // ==================== 8xxx: Directory ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Employee ID already in use
    DuplicateEmployeeId = 8002,
    /// Username already in use
    DuplicateUsername = 8003,
    /// Email already in use
    DuplicateEmail = 8004,
    /// Credential (user) not found
    UserNotFound = 8005,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Reading a collection failed
    StorageReadFailed = 9002,
    /// Writing a collection failed
    StorageWriteFailed = 9003,
    /// Stored data could not be decoded
    StorageCorrupted = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::PasswordTooShort => "Password is too short",

            // Permission
            ErrorCode::PermissionDenied => "Access denied. Insufficient permissions.",

            // Attendance
            ErrorCode::AlreadyCheckedIn => "Already checked in today",
            ErrorCode::AlreadyCheckedOut => "Already checked out today",
            ErrorCode::NoCheckInFound => "No check-in record found for today",

            // Leave
            ErrorCode::RequestNotFound => "Leave request not found",
            ErrorCode::AlreadyDecided => "Leave request has already been decided",
            ErrorCode::InvalidDateRange => "End date cannot be before start date",

            // Directory
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::DuplicateEmployeeId => "Employee ID already exists",
            ErrorCode::DuplicateUsername => "Username already exists",
            ErrorCode::DuplicateEmail => "Email already exists",
            ErrorCode::UserNotFound => "User not found",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::StorageReadFailed => "Failed to read stored data",
            ErrorCode::StorageWriteFailed => "Failed to save data",
            ErrorCode::StorageCorrupted => "Stored data is corrupted",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::PasswordTooShort),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Attendance
            3001 => Ok(ErrorCode::AlreadyCheckedIn),
            3002 => Ok(ErrorCode::AlreadyCheckedOut),
            3003 => Ok(ErrorCode::NoCheckInFound),

            // Leave
            4001 => Ok(ErrorCode::RequestNotFound),
            4002 => Ok(ErrorCode::AlreadyDecided),
            4003 => Ok(ErrorCode::InvalidDateRange),

            // Directory
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::DuplicateEmployeeId),
            8003 => Ok(ErrorCode::DuplicateUsername),
            8004 => Ok(ErrorCode::DuplicateEmail),
            8005 => Ok(ErrorCode::UserNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageReadFailed),
            9003 => Ok(ErrorCode::StorageWriteFailed),
            9004 => Ok(ErrorCode::StorageCorrupted),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
