use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::auth::AuthError;
use crate::db::RepoError;

/// Directory engine errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Employee {0} not found")]
    EmployeeNotFound(String),

    #[error("No user account for employee {0}")]
    UserNotFound(String),

    #[error("Employee ID {0} already exists")]
    DuplicateEmployeeId(String),

    #[error("Employee {0} already has a user account")]
    AccountExists(String),

    #[error("Username {0} is already taken")]
    DuplicateUsername(String),

    #[error("Email {0} is already in use")]
    DuplicateEmail(String),

    #[error("Invalid employee ID format: {0}")]
    InvalidEmployeeId(String),

    #[error("An employee cannot report to themselves")]
    SelfReporting,

    #[error("{0}")]
    Invalid(AppError),

    #[error("Failed to hash password: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Session(#[from] AuthError),
}

impl From<AppError> for DirectoryError {
    fn from(err: AppError) -> Self {
        DirectoryError::Invalid(err)
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        let message = err.to_string();
        match err {
            DirectoryError::EmployeeNotFound(id) => {
                AppError::with_message(ErrorCode::EmployeeNotFound, message).with_detail("employee_id", id)
            }
            DirectoryError::UserNotFound(id) => {
                AppError::with_message(ErrorCode::UserNotFound, message).with_detail("employee_id", id)
            }
            DirectoryError::DuplicateEmployeeId(id) | DirectoryError::AccountExists(id) => {
                AppError::with_message(ErrorCode::DuplicateEmployeeId, message)
                    .with_detail("employee_id", id)
            }
            DirectoryError::DuplicateUsername(name) => {
                AppError::with_message(ErrorCode::DuplicateUsername, message).with_detail("username", name)
            }
            DirectoryError::DuplicateEmail(email) => {
                AppError::with_message(ErrorCode::DuplicateEmail, message).with_detail("email", email)
            }
            DirectoryError::InvalidEmployeeId(_) => {
                AppError::validation(message).with_detail("field", "employeeId")
            }
            DirectoryError::SelfReporting => {
                AppError::validation(message).with_detail("field", "reportingInCharge")
            }
            DirectoryError::Invalid(e) => e,
            DirectoryError::PasswordHash(_) => {
                tracing::error!("{}", message);
                AppError::internal(message)
            }
            DirectoryError::Repo(e) => e.into(),
            DirectoryError::Session(e) => e.into(),
        }
    }
}
