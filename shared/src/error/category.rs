//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Attendance errors
/// - 4xxx: Leave errors
/// - 8xxx: Directory errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Attendance errors (3xxx)
    Attendance,
    /// Leave errors (4xxx)
    Leave,
    /// Directory errors (8xxx)
    Directory,
    /// System errors (9xxx, and any unassigned range)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Attendance,
            4000..5000 => Self::Leave,
            8000..9000 => Self::Directory,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Attendance => "attendance",
            Self::Leave => "leave",
            Self::Directory => "directory",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }

    /// Whether this code reports a storage failure rather than a domain rule
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            ErrorCode::StorageReadFailed | ErrorCode::StorageWriteFailed | ErrorCode::StorageCorrupted
        )
    }
}
