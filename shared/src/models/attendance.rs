//! Attendance Model (考勤)

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::employee::Employee;
use super::time_format;

/// Identity of an attendance record: one per employee per calendar date
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttendanceKey {
    pub employee_id: String,
    pub date: NaiveDate,
}

impl AttendanceKey {
    pub fn new(employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
        }
    }
}

impl fmt::Display for AttendanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.employee_id, self.date.format("%Y-%m-%d"))
    }
}

/// Day status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    #[default]
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "Present"),
            Self::Absent => write!(f, "Absent"),
        }
    }
}

/// Attendance record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Local wall-clock time, `HH:MM`
    #[serde(default, with = "time_format::option")]
    pub check_in: Option<NaiveTime>,
    #[serde(default, with = "time_format::option")]
    pub check_out: Option<NaiveTime>,
    /// Hours, two decimals
    #[serde(default)]
    pub hours_worked: f64,
    /// Hours
    #[serde(default)]
    pub break_time: f64,
}

impl AttendanceRecord {
    pub fn key(&self) -> AttendanceKey {
        AttendanceKey::new(self.employee_id.clone(), self.date)
    }

    pub fn matches(&self, key: &AttendanceKey) -> bool {
        self.employee_id == key.employee_id && self.date == key.date
    }

    /// Checked in and not yet checked out
    pub fn is_open(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_none()
    }
}

/// `get_current_status` result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStatus {
    pub is_checked_in: bool,
    pub today_record: Option<AttendanceRecord>,
}

/// One row of the "today" board: employee joined with today's record
///
/// `status` is the attendance status of the day, not the employment status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDayStatus {
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub position: String,
    pub is_checked_in: bool,
    #[serde(default, with = "time_format::option")]
    pub check_in_time: Option<NaiveTime>,
    #[serde(default, with = "time_format::option")]
    pub check_out_time: Option<NaiveTime>,
    pub hours_worked: f64,
    pub status: AttendanceStatus,
}

impl EmployeeDayStatus {
    /// Join an employee with its record for the day (Absent when there is none)
    pub fn derive(employee: &Employee, today: Option<&AttendanceRecord>) -> Self {
        Self {
            employee_id: employee.employee_id.clone(),
            name: employee.name.clone(),
            department: employee.department.clone(),
            position: employee.position.clone(),
            is_checked_in: today.is_some_and(AttendanceRecord::is_open),
            check_in_time: today.and_then(|r| r.check_in),
            check_out_time: today.and_then(|r| r.check_out),
            hours_worked: today.map(|r| r.hours_worked).unwrap_or(0.0),
            status: today.map(|r| r.status).unwrap_or(AttendanceStatus::Absent),
        }
    }
}

/// Per-period attendance totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub total_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub total_hours: f64,
}
