//! Attendance Engine (考勤引擎)
//!
//! 每个员工每天最多一条记录 ([`AttendanceKey`])，状态机：
//!
//! ```text
//! NoRecord ──check_in──▶ CheckedIn ──check_out──▶ CheckedOut
//!                            ▲                        │
//!                            └──────check_in──────────┘ (覆盖当天记录)
//! ```
//!
//! 每次命令都重新读取整个集合，修改后整体写回，再发布 `attendance` 变更通知。
//! 查询不会失败：存储读取失败时记录 warn 并返回默认值。

mod error;
#[cfg(test)]
mod tests;

pub use error::AttendanceError;

use std::sync::Arc;

use chrono::Datelike;
use shared::error::AppError;
use shared::message::SyncAction;
use shared::models::{
    AttendanceKey, AttendanceRecord, AttendanceStatus, CurrentStatus, Employee, EmployeeDayStatus,
    time_format,
};
use shared::response::CommandResponse;

use crate::core::ChangeNotifier;
use crate::db::{Collection, Repository};
use crate::utils::time::{Clock, hours_between};

#[derive(Clone)]
pub struct AttendanceEngine {
    records: Arc<dyn Repository<AttendanceRecord>>,
    employees: Arc<dyn Repository<Employee>>,
    clock: Arc<dyn Clock>,
    notifier: ChangeNotifier,
}

impl AttendanceEngine {
    pub fn new(
        records: Arc<dyn Repository<AttendanceRecord>>,
        employees: Arc<dyn Repository<Employee>>,
        clock: Arc<dyn Clock>,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            records,
            employees,
            clock,
            notifier,
        }
    }

    // ========== Commands ==========

    /// 上班打卡
    ///
    /// 员工必须存在 (`EmployeeNotFound`)。
    /// 当天已有未签退的记录时拒绝 (`AlreadyCheckedIn`)；
    /// 已签退 (或没有打卡时间) 的当天记录被原地覆盖。
    pub fn check_in(&self, employee_id: &str) -> CommandResponse<AttendanceRecord> {
        match self.try_check_in(employee_id) {
            Ok(record) => {
                let time = record.check_in.map(|t| time_format::format(&t)).unwrap_or_default();
                tracing::info!(employee_id = %record.employee_id, date = %record.date, time = %time, "Checked in");
                CommandResponse::ok_with_message(record, format!("Checked in at {time}"))
            }
            Err(e) => {
                tracing::warn!(employee_id, error = %e, "Check-in rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_check_in(&self, employee_id: &str) -> Result<AttendanceRecord, AttendanceError> {
        let employee_id = employee_id.trim();
        if employee_id.is_empty() {
            return Err(AttendanceError::MissingEmployeeId);
        }

        // 已删除或不存在的员工不能再产生考勤记录
        if !self.employees.list()?.iter().any(|e| e.employee_id == employee_id) {
            return Err(AttendanceError::EmployeeNotFound(employee_id.to_string()));
        }

        let now = self.clock.now_minute();
        let key = AttendanceKey::new(employee_id, self.clock.today());
        let mut records = self.records.list()?;

        let position = records.iter().position(|r| r.matches(&key));
        let (record, action) = match position {
            Some(i) if records[i].is_open() => return Err(AttendanceError::AlreadyCheckedIn),
            Some(i) => {
                let existing = &mut records[i];
                existing.check_in = Some(now);
                existing.check_out = None;
                existing.hours_worked = 0.0;
                existing.status = AttendanceStatus::Present;
                (existing.clone(), SyncAction::Updated)
            }
            None => {
                let record = AttendanceRecord {
                    employee_id: key.employee_id.clone(),
                    date: key.date,
                    status: AttendanceStatus::Present,
                    check_in: Some(now),
                    check_out: None,
                    hours_worked: 0.0,
                    break_time: 0.0,
                };
                records.push(record.clone());
                (record, SyncAction::Created)
            }
        };

        self.records.replace(&records)?;
        self.notifier
            .publish(Collection::Attendance, action, &key, Some(&record));
        Ok(record)
    }

    /// 下班签退
    ///
    /// 需要当天有打卡时间 (`NoCheckInFound`)，且尚未签退 (`AlreadyCheckedOut`)。
    /// 工时 = 签退 - 打卡 (小时，两位小数)。
    pub fn check_out(&self, employee_id: &str) -> CommandResponse<AttendanceRecord> {
        match self.try_check_out(employee_id) {
            Ok(record) => {
                let time = record.check_out.map(|t| time_format::format(&t)).unwrap_or_default();
                tracing::info!(
                    employee_id = %record.employee_id,
                    date = %record.date,
                    time = %time,
                    hours = record.hours_worked,
                    "Checked out"
                );
                let message = format!("Checked out at {time} ({} hours)", record.hours_worked);
                CommandResponse::ok_with_message(record, message)
            }
            Err(e) => {
                tracing::warn!(employee_id, error = %e, "Check-out rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_check_out(&self, employee_id: &str) -> Result<AttendanceRecord, AttendanceError> {
        let employee_id = employee_id.trim();
        if employee_id.is_empty() {
            return Err(AttendanceError::MissingEmployeeId);
        }

        let now = self.clock.now_minute();
        let key = AttendanceKey::new(employee_id, self.clock.today());
        let mut records = self.records.list()?;

        let record = records
            .iter_mut()
            .find(|r| r.matches(&key))
            .ok_or(AttendanceError::NoCheckInFound)?;
        let Some(check_in) = record.check_in else {
            return Err(AttendanceError::NoCheckInFound);
        };
        if record.check_out.is_some() {
            return Err(AttendanceError::AlreadyCheckedOut);
        }

        record.check_out = Some(now);
        record.hours_worked = hours_between(check_in, now);
        let record = record.clone();

        self.records.replace(&records)?;
        self.notifier
            .publish(Collection::Attendance, SyncAction::Updated, &key, Some(&record));
        Ok(record)
    }

    // ========== Queries ==========

    fn load(&self) -> Vec<AttendanceRecord> {
        self.records.list().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read attendance, showing empty view");
            Vec::new()
        })
    }

    /// 当前状态 (每次都重新读取集合)
    pub fn get_current_status(&self, employee_id: &str) -> CurrentStatus {
        let key = AttendanceKey::new(employee_id.trim(), self.clock.today());
        let today_record = self.load().into_iter().find(|r| r.matches(&key));
        CurrentStatus {
            is_checked_in: today_record.as_ref().is_some_and(AttendanceRecord::is_open),
            today_record,
        }
    }

    /// 所有员工今天的状态，没有记录的为 Absent
    pub fn get_all_employee_statuses(&self) -> Vec<EmployeeDayStatus> {
        let employees = self.employees.list().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read employees, showing empty board");
            Vec::new()
        });
        let today = self.clock.today();
        let records: Vec<AttendanceRecord> =
            self.load().into_iter().filter(|r| r.date == today).collect();

        employees
            .iter()
            .map(|employee| {
                let record = records.iter().find(|r| r.employee_id == employee.employee_id);
                EmployeeDayStatus::derive(employee, record)
            })
            .collect()
    }

    /// 某员工全部记录，按日期倒序
    pub fn history(&self, employee_id: &str) -> Vec<AttendanceRecord> {
        let mut records: Vec<AttendanceRecord> = self
            .load()
            .into_iter()
            .filter(|r| r.employee_id == employee_id)
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records
    }

    /// 某员工某月的记录，按日期倒序
    pub fn records_for_month(&self, employee_id: &str, year: i32, month: u32) -> Vec<AttendanceRecord> {
        self.history(employee_id)
            .into_iter()
            .filter(|r| r.date.year() == year && r.date.month() == month)
            .collect()
    }
}
