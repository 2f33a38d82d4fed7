//! Data models
//!
//! Records stored by `pulse-core` and the DTOs used to create/update them.
//! Every record serializes with camelCase field names, dates as `YYYY-MM-DD`
//! and wall-clock times as `HH:MM`.

pub mod attendance;
pub mod credential;
pub mod employee;
pub mod leave;
pub mod session;
pub mod time_format;

// Re-exports
pub use attendance::*;
pub use credential::*;
pub use employee::*;
pub use leave::*;
pub use session::*;
