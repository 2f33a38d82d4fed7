//! Leave Workflow Engine (请假流程)
//!
//! ```text
//! submit ──▶ Pending ──decide──▶ Approved
//!                    └─decide──▶ Rejected
//! ```
//!
//! 决定只能做一次；已决定的请求再次 decide 返回 `AlreadyDecided`，不做修改。
//! 余额是读侧聚合，不单独存储。

mod error;

pub use error::LeaveError;

use std::sync::Arc;

use chrono::Datelike;
use shared::error::AppError;
use shared::message::SyncAction;
use shared::models::{
    Employee, LeaveBalance, LeaveBalanceEntry, LeaveDecision, LeaveFilter, LeaveRequest, LeaveRequestCreate,
    LeaveStatus, LeaveType,
};
use shared::response::CommandResponse;
use shared::util::next_sequential_id;

use crate::core::{ChangeNotifier, LeaveAllotments};
use crate::db::{Collection, Repository};
use crate::utils::time::Clock;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN};

#[derive(Clone)]
pub struct LeaveEngine {
    requests: Arc<dyn Repository<LeaveRequest>>,
    employees: Arc<dyn Repository<Employee>>,
    clock: Arc<dyn Clock>,
    allotments: LeaveAllotments,
    notifier: ChangeNotifier,
}

fn require(value: &str, field: &str, max_len: usize) -> Result<String, LeaveError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LeaveError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(LeaveError::Validation(format!(
            "{field} is too long (max {max_len} characters)"
        )));
    }
    Ok(value.to_string())
}

impl LeaveEngine {
    pub fn new(
        requests: Arc<dyn Repository<LeaveRequest>>,
        employees: Arc<dyn Repository<Employee>>,
        clock: Arc<dyn Clock>,
        allotments: LeaveAllotments,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            requests,
            employees,
            clock,
            allotments,
            notifier,
        }
    }

    // ========== Commands ==========

    /// 提交请假申请 (Pending, appliedDate = 今天)
    ///
    /// 员工必须存在于目录中。
    pub fn submit_request(&self, payload: LeaveRequestCreate) -> CommandResponse<LeaveRequest> {
        let employee_id = payload.employee_id.clone();
        match self.try_submit(payload) {
            Ok(request) => {
                tracing::info!(
                    id = request.id,
                    employee_id = %request.employee_id,
                    leave_type = %request.leave_type,
                    days = request.days(),
                    "Leave request submitted"
                );
                CommandResponse::ok_with_message(request, "Leave request submitted successfully")
            }
            Err(e) => {
                tracing::warn!(employee_id = %employee_id, error = %e, "Leave request rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_submit(&self, payload: LeaveRequestCreate) -> Result<LeaveRequest, LeaveError> {
        let employee_id = require(&payload.employee_id, "Employee ID", MAX_NAME_LEN)?;
        let reason = require(&payload.reason, "Reason", MAX_NOTE_LEN)?;
        if payload.end_date < payload.start_date {
            return Err(LeaveError::InvalidDateRange);
        }
        if !self.employees.list()?.iter().any(|e| e.employee_id == employee_id) {
            return Err(LeaveError::EmployeeNotFound(employee_id));
        }

        let mut requests = self.requests.list()?;
        let request = LeaveRequest {
            id: next_sequential_id(requests.iter().map(|r| r.id)),
            employee_id,
            employee_name: payload.employee_name.trim().to_string(),
            leave_type: payload.leave_type,
            start_date: payload.start_date,
            end_date: payload.end_date,
            reason,
            status: LeaveStatus::Pending,
            applied_date: self.clock.today(),
            hr_comments: String::new(),
            approved_by: None,
            approved_date: None,
        };
        requests.push(request.clone());

        self.requests.replace(&requests)?;
        self.notifier
            .publish(Collection::LeaveRequests, SyncAction::Created, request.id, Some(&request));
        Ok(request)
    }

    /// HR 审批 (批准或拒绝)
    pub fn decide(
        &self,
        request_id: i64,
        decision: LeaveDecision,
        decided_by: &str,
        comments: &str,
    ) -> CommandResponse<LeaveRequest> {
        match self.try_decide(request_id, decision, decided_by, comments) {
            Ok(request) => {
                tracing::info!(id = request.id, status = %request.status, decided_by, "Leave request decided");
                let message = format!("Leave request {}", request.status.to_string().to_lowercase());
                CommandResponse::ok_with_message(request, message)
            }
            Err(e) => {
                tracing::warn!(id = request_id, error = %e, "Leave decision rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_decide(
        &self,
        request_id: i64,
        decision: LeaveDecision,
        decided_by: &str,
        comments: &str,
    ) -> Result<LeaveRequest, LeaveError> {
        let mut requests = self.requests.list()?;
        let request = requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(LeaveError::RequestNotFound(request_id))?;

        if !request.is_pending() {
            return Err(LeaveError::AlreadyDecided {
                id: request_id,
                status: request.status.to_string().to_lowercase(),
            });
        }

        request.status = decision.into();
        request.approved_by = Some(decided_by.trim().to_string());
        request.approved_date = Some(self.clock.today());
        request.hr_comments = comments.trim().to_string();
        let request = request.clone();

        self.requests.replace(&requests)?;
        self.notifier
            .publish(Collection::LeaveRequests, SyncAction::Updated, request.id, Some(&request));
        Ok(request)
    }

    // ========== Queries ==========

    fn load(&self) -> Vec<LeaveRequest> {
        self.requests.list().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read leave requests, showing empty view");
            Vec::new()
        })
    }

    /// 按状态筛选，按 id 倒序 (最新在前)
    pub fn list(&self, filter: LeaveFilter) -> Vec<LeaveRequest> {
        let mut requests: Vec<LeaveRequest> = self
            .load()
            .into_iter()
            .filter(|r| filter.accepts(r.status))
            .collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        requests
    }

    /// 某员工的全部申请，最新在前
    pub fn for_employee(&self, employee_id: &str) -> Vec<LeaveRequest> {
        let mut requests: Vec<LeaveRequest> = self
            .load()
            .into_iter()
            .filter(|r| r.employee_id == employee_id)
            .collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        requests
    }

    pub fn pending_count(&self) -> usize {
        self.load().iter().filter(|r| r.is_pending()).count()
    }

    /// 年度额度 (None = 不限额)
    pub fn allotment(&self, leave_type: LeaveType) -> Option<u32> {
        match leave_type {
            LeaveType::Annual => Some(self.allotments.annual),
            LeaveType::Sick => Some(self.allotments.sick),
            LeaveType::Personal => Some(self.allotments.personal),
            _ => None,
        }
    }

    /// 假期余额
    ///
    /// 只统计已批准且开始日期在 `year` 的申请，天数按闭区间计算。
    pub fn balance(&self, employee_id: &str, year: i32) -> LeaveBalance {
        let approved: Vec<LeaveRequest> = self
            .load()
            .into_iter()
            .filter(|r| {
                r.employee_id == employee_id
                    && r.status == LeaveStatus::Approved
                    && r.start_date.year() == year
            })
            .collect();

        let entries: Vec<LeaveBalanceEntry> = LeaveType::ALL
            .iter()
            .map(|&leave_type| {
                let used_days: i64 = approved
                    .iter()
                    .filter(|r| r.leave_type == leave_type)
                    .map(LeaveRequest::days)
                    .sum();
                let allotted_days = self.allotment(leave_type);
                LeaveBalanceEntry {
                    leave_type,
                    allotted_days,
                    used_days,
                    remaining_days: allotted_days.map(|a| i64::from(a) - used_days),
                }
            })
            .collect();

        LeaveBalance {
            employee_id: employee_id.to_string(),
            year,
            total_used_days: entries.iter().map(|e| e.used_days).sum(),
            entries,
        }
    }
}
