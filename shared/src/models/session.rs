//! Session Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credential::Role;

/// Logged-in session, stored as the single `currentSession` record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: Uuid,
    pub username: String,
    pub role: Role,
    pub employee_id: String,
    /// Unix millis
    pub login_at: i64,
}

impl Session {
    pub fn is_hr(&self) -> bool {
        self.role == Role::Hr
    }
}
