//! Credential (user account) Model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::employee::Employee;

/// Portal role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Hr,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Employee => write!(f, "employee"),
            Self::Hr => write!(f, "hr"),
        }
    }
}

/// Stored credential, one per employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: i64,
    pub username: String,
    /// argon2 PHC string
    pub password_hash: String,
    pub role: Role,
    pub employee_id: String,
}

/// Credential without the hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialView {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub employee_id: String,
}

impl From<&Credential> for CredentialView {
    fn from(c: &Credential) -> Self {
        Self {
            id: c.id,
            username: c.username.clone(),
            role: c.role,
            employee_id: c.employee_id.clone(),
        }
    }
}

/// Create credential payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialCreate {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub employee_id: String,
}

/// Account part of an onboarding request (employee id comes from the new employee)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Update credential payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialUpdate {
    pub username: Option<String>,
    /// Re-hashed when present
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Profile view: employee joined with its credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: Option<String>,
    pub role: Option<Role>,
    pub employee: Employee,
    /// Resolved manager name ("Not Assigned" when absent or dangling)
    pub reporting_manager: String,
}
