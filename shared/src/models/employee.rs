//! Employee Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
    Terminated,
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Employee record (canonical directory entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Sequential numeric id
    pub id: i64,
    /// Human-readable unique key, e.g. "EMP001"
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub position: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub join_date: NaiveDate,
    #[serde(default)]
    pub status: EmployeeStatus,
    /// Manager's `employee_id`; never validated, may dangle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_in_charge: Option<String>,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

/// Create employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCreate {
    /// Generated as `EMP{n:03}` when absent
    pub employee_id: Option<String>,
    #[validate(length(max = 200, message = "Name is too long"))]
    pub name: String,
    #[validate(length(max = 200, message = "Department is too long"))]
    pub department: String,
    #[validate(length(max = 200, message = "Position is too long"))]
    pub position: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(max = 50, message = "Phone is too long"))]
    pub phone: Option<String>,
    /// Defaults to today
    pub join_date: Option<NaiveDate>,
    /// Defaults to Active
    pub status: Option<EmployeeStatus>,
    pub reporting_in_charge: Option<String>,
}

/// Update employee payload (partial merge)
///
/// `reporting_in_charge: Some("")` clears the manager reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    #[validate(length(max = 200, message = "Name is too long"))]
    pub name: Option<String>,
    #[validate(length(max = 200, message = "Department is too long"))]
    pub department: Option<String>,
    #[validate(length(max = 200, message = "Position is too long"))]
    pub position: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 50, message = "Phone is too long"))]
    pub phone: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    pub reporting_in_charge: Option<String>,
}
