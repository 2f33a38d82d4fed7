use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::RepoError;

/// Attendance engine errors
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("Already checked in today")]
    AlreadyCheckedIn,

    #[error("Already checked out today")]
    AlreadyCheckedOut,

    #[error("No check-in record found for today")]
    NoCheckInFound,

    #[error("Employee ID is required")]
    MissingEmployeeId,

    #[error("Employee {0} not found")]
    EmployeeNotFound(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl AttendanceError {
    fn code(&self) -> ErrorCode {
        match self {
            AttendanceError::AlreadyCheckedIn => ErrorCode::AlreadyCheckedIn,
            AttendanceError::AlreadyCheckedOut => ErrorCode::AlreadyCheckedOut,
            AttendanceError::NoCheckInFound => ErrorCode::NoCheckInFound,
            AttendanceError::MissingEmployeeId => ErrorCode::RequiredField,
            AttendanceError::EmployeeNotFound(_) => ErrorCode::EmployeeNotFound,
            AttendanceError::Repo(e) => e.code(),
        }
    }
}

impl From<AttendanceError> for AppError {
    fn from(err: AttendanceError) -> Self {
        match err {
            AttendanceError::Repo(e) => e.into(),
            AttendanceError::EmployeeNotFound(ref id) => {
                AppError::with_message(ErrorCode::EmployeeNotFound, err.to_string())
                    .with_detail("employee_id", id.as_str())
            }
            other => AppError::with_message(other.code(), other.to_string()),
        }
    }
}
