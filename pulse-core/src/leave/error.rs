use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::RepoError;

/// Leave workflow errors
#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("Leave request {0} not found")]
    RequestNotFound(i64),

    #[error("Leave request {id} has already been {status}")]
    AlreadyDecided { id: i64, status: String },

    #[error("Employee {0} not found")]
    EmployeeNotFound(String),

    #[error("End date cannot be before start date")]
    InvalidDateRange,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<LeaveError> for AppError {
    fn from(err: LeaveError) -> Self {
        match err {
            LeaveError::RequestNotFound(id) => {
                AppError::with_message(ErrorCode::RequestNotFound, err.to_string())
                    .with_detail("request_id", id)
            }
            LeaveError::AlreadyDecided { id, .. } => {
                AppError::with_message(ErrorCode::AlreadyDecided, err.to_string())
                    .with_detail("request_id", id)
            }
            LeaveError::EmployeeNotFound(ref id) => {
                AppError::with_message(ErrorCode::EmployeeNotFound, err.to_string())
                    .with_detail("employee_id", id.as_str())
            }
            LeaveError::InvalidDateRange => {
                AppError::with_message(ErrorCode::InvalidDateRange, err.to_string())
            }
            LeaveError::Validation(msg) => AppError::validation(msg),
            LeaveError::Repo(e) => e.into(),
        }
    }
}
