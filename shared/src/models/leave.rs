//! Leave Request Model (请假)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Leave type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeaveType {
    #[serde(rename = "Annual Leave")]
    Annual,
    #[serde(rename = "Sick Leave")]
    Sick,
    #[serde(rename = "Personal Leave")]
    Personal,
    #[serde(rename = "Maternity/Paternity Leave")]
    Parental,
    #[serde(rename = "Emergency Leave")]
    Emergency,
    #[serde(rename = "Bereavement Leave")]
    Bereavement,
    #[serde(rename = "Study Leave")]
    Study,
}

impl LeaveType {
    pub const ALL: [LeaveType; 7] = [
        LeaveType::Annual,
        LeaveType::Sick,
        LeaveType::Personal,
        LeaveType::Parental,
        LeaveType::Emergency,
        LeaveType::Bereavement,
        LeaveType::Study,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Annual => "Annual Leave",
            Self::Sick => "Sick Leave",
            Self::Personal => "Personal Leave",
            Self::Parental => "Maternity/Paternity Leave",
            Self::Emergency => "Emergency Leave",
            Self::Bereavement => "Bereavement Leave",
            Self::Study => "Study Leave",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Request status: Pending moves exactly once to Approved or Rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Approved => write!(f, "Approved"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// HR decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveDecision {
    Approved,
    Rejected,
}

impl From<LeaveDecision> for LeaveStatus {
    fn from(d: LeaveDecision) -> Self {
        match d {
            LeaveDecision::Approved => LeaveStatus::Approved,
            LeaveDecision::Rejected => LeaveStatus::Rejected,
        }
    }
}

/// Leave request record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: String,
    pub employee_name: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub applied_date: NaiveDate,
    #[serde(default)]
    pub hr_comments: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<NaiveDate>,
}

impl LeaveRequest {
    /// Inclusive day span (`end - start + 1`)
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }
}

/// Submit payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestCreate {
    pub employee_id: String,
    pub employee_name: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

/// Status filter for listings ("All" = no filter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeaveFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl LeaveFilter {
    pub fn accepts(&self, status: LeaveStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == LeaveStatus::Pending,
            Self::Approved => status == LeaveStatus::Approved,
            Self::Rejected => status == LeaveStatus::Rejected,
        }
    }
}

/// Balance of one leave type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalanceEntry {
    pub leave_type: LeaveType,
    /// None for types without an allotment
    pub allotted_days: Option<u32>,
    pub used_days: i64,
    pub remaining_days: Option<i64>,
}

/// Balance of one employee for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub employee_id: String,
    pub year: i32,
    pub entries: Vec<LeaveBalanceEntry>,
    pub total_used_days: i64,
}

impl LeaveBalance {
    pub fn entry(&self, leave_type: LeaveType) -> Option<&LeaveBalanceEntry> {
        self.entries.iter().find(|e| e.leave_type == leave_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_type_labels() {
        let json = serde_json::to_string(&LeaveType::Parental).unwrap();
        assert_eq!(json, "\"Maternity/Paternity Leave\"");
        let t: LeaveType = serde_json::from_str("\"Sick Leave\"").unwrap();
        assert_eq!(t, LeaveType::Sick);
        assert_eq!(LeaveType::Study.to_string(), "Study Leave");
    }

    #[test]
    fn test_sample_request_deserializes() {
        let json = serde_json::json!({
            "id": 2,
            "employeeId": "EMP002",
            "employeeName": "Mike Johnson",
            "leaveType": "Sick Leave",
            "startDate": "2025-09-20",
            "endDate": "2025-09-22",
            "reason": "Medical appointment",
            "status": "Approved",
            "appliedDate": "2025-09-08",
            "hrComments": "Approved",
            "approvedBy": "Jane Smith",
            "approvedDate": "2025-09-09"
        });
        let req: LeaveRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.days(), 3);
        assert!(!req.is_pending());
    }

    #[test]
    fn test_filter() {
        assert!(LeaveFilter::All.accepts(LeaveStatus::Rejected));
        assert!(LeaveFilter::Pending.accepts(LeaveStatus::Pending));
        assert!(!LeaveFilter::Approved.accepts(LeaveStatus::Pending));
    }
}
