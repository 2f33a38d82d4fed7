//! Unified error system for Pulse
//!
//! This module provides the error handling system shared by every engine:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Attendance errors
//! - 4xxx: Leave errors
//! - 8xxx: Directory errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//! use shared::response::CommandResponse;
//!
//! let err = AppError::new(ErrorCode::AlreadyCheckedIn);
//! let err = AppError::validation("Invalid email format").with_detail("field", "email");
//!
//! let response = CommandResponse::<()>::failure(&err);
//! assert!(!response.success);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
