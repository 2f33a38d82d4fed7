//! Shared types for Pulse
//!
//! Domain models, the unified error system, the command response shape and
//! the change-notification payload used by `pulse-core` and its callers.

pub mod error;
pub mod message;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use message::{SyncAction, SyncPayload};
pub use response::CommandResponse;
