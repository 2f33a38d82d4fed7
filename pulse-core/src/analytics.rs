//! Dashboard Analytics
//!
//! 只读聚合，不会失败：集合读取失败时按空集合计算。

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::models::{AttendanceRecord, AttendanceStatus, AttendanceSummary, Employee, LeaveRequest};

use crate::db::Repository;
use crate::utils::time::{Clock, month_bounds, round2};

// ============================================================================
// Response Types
// ============================================================================

/// Present count of one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPresence {
    pub date: NaiveDate,
    pub present: u32,
}

/// HR dashboard header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrOverview {
    pub total_employees: usize,
    pub active_employees: usize,
    pub checked_in_now: usize,
    pub present_today: usize,
    pub pending_leaves: usize,
}

// ============================================================================
// Analytics
// ============================================================================

/// 出勤趋势最长窗口 (天)
pub const MAX_TREND_DAYS: u32 = 366;

#[derive(Clone)]
pub struct Analytics {
    employees: Arc<dyn Repository<Employee>>,
    attendance: Arc<dyn Repository<AttendanceRecord>>,
    leave_requests: Arc<dyn Repository<LeaveRequest>>,
    clock: Arc<dyn Clock>,
}

fn load<T>(repo: &dyn Repository<T>) -> Vec<T> {
    repo.list().unwrap_or_else(|e| {
        tracing::warn!(collection = %repo.collection(), error = %e, "Analytics read failed, using empty data");
        Vec::new()
    })
}

impl Analytics {
    pub fn new(
        employees: Arc<dyn Repository<Employee>>,
        attendance: Arc<dyn Repository<AttendanceRecord>>,
        leave_requests: Arc<dyn Repository<LeaveRequest>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            employees,
            attendance,
            leave_requests,
            clock,
        }
    }

    /// 部门 → 人数
    pub fn department_headcount(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for employee in load(self.employees.as_ref()) {
            *counts.entry(employee.department).or_insert(0) += 1;
        }
        counts
    }

    /// 出勤率 (%)，一位小数；没有记录时为 0
    pub fn attendance_rate(&self) -> f64 {
        let records = load(self.attendance.as_ref());
        if records.is_empty() {
            return 0.0;
        }
        let present = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count();
        (present as f64 / records.len() as f64 * 1000.0).round() / 10.0
    }

    /// 最近 `days` 天 (含今天) 每天的出勤人数，旧的在前
    ///
    /// 最多 [`MAX_TREND_DAYS`] 天；超出日期范围的天数被跳过。
    pub fn presence_trend(&self, days: u32) -> Vec<DailyPresence> {
        let records = load(self.attendance.as_ref());
        let today = self.clock.today();
        (0..u64::from(days.min(MAX_TREND_DAYS)))
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|date| {
                let present = records
                    .iter()
                    .filter(|r| r.date == date && r.status == AttendanceStatus::Present)
                    .count() as u32;
                DailyPresence { date, present }
            })
            .collect()
    }

    /// 某员工某月的汇总
    pub fn monthly_summary(&self, employee_id: &str, year: i32, month: u32) -> AttendanceSummary {
        let Some((first, last)) = month_bounds(year, month) else {
            return AttendanceSummary::default();
        };
        load(self.attendance.as_ref())
            .iter()
            .filter(|r| r.employee_id == employee_id && r.date >= first && r.date <= last)
            .fold(AttendanceSummary::default(), |mut summary, r| {
                summary.total_days += 1;
                match r.status {
                    AttendanceStatus::Present => summary.present_days += 1,
                    AttendanceStatus::Absent => summary.absent_days += 1,
                }
                summary.total_hours = round2(summary.total_hours + r.hours_worked);
                summary
            })
    }

    /// 某员工一年 12 个月的出勤天数
    pub fn monthly_presence(&self, employee_id: &str, year: i32) -> [u32; 12] {
        let mut months = [0u32; 12];
        for r in load(self.attendance.as_ref()) {
            if r.employee_id == employee_id
                && r.date.year() == year
                && r.status == AttendanceStatus::Present
            {
                months[r.date.month0() as usize] += 1;
            }
        }
        months
    }

    pub fn hr_overview(&self) -> HrOverview {
        let employees = load(self.employees.as_ref());
        let today = self.clock.today();
        let todays: Vec<AttendanceRecord> = load(self.attendance.as_ref())
            .into_iter()
            .filter(|r| r.date == today)
            .collect();

        HrOverview {
            total_employees: employees.len(),
            active_employees: employees.iter().filter(|e| e.is_active()).count(),
            checked_in_now: todays.iter().filter(|r| r.is_open()).count(),
            present_today: todays
                .iter()
                .filter(|r| r.status == AttendanceStatus::Present)
                .count(),
            pending_leaves: load(self.leave_requests.as_ref())
                .iter()
                .filter(|r| r.is_pending())
                .count(),
        }
    }

    /// 闭区间内的工作日
    pub fn working_days(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        crate::utils::time::working_days(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use shared::models::EmployeeStatus;

    use crate::db::{Collection, CollectionRepository, PulseStorage, seed};
    use crate::utils::time::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(employee_id: &str, date: NaiveDate, present: bool, hours: f64) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: employee_id.into(),
            date,
            status: if present {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Absent
            },
            check_in: present.then(|| NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
            check_out: present.then(|| NaiveTime::from_hms_opt(17, 0, 0).unwrap()),
            hours_worked: hours,
            break_time: 0.0,
        }
    }

    fn setup(records: Vec<AttendanceRecord>) -> (Analytics, Arc<dyn Repository<Employee>>) {
        let storage = PulseStorage::open_in_memory().unwrap();
        let employees: Arc<dyn Repository<Employee>> =
            Arc::new(CollectionRepository::new(storage.clone(), Collection::Employees));
        let attendance: Arc<dyn Repository<AttendanceRecord>> =
            Arc::new(CollectionRepository::new(storage.clone(), Collection::Attendance));
        let leave: Arc<dyn Repository<LeaveRequest>> =
            Arc::new(CollectionRepository::new(storage, Collection::LeaveRequests));
        employees.replace(&seed::sample_employees()).unwrap();
        attendance.replace(&records).unwrap();
        leave.replace(&seed::sample_leave_requests()).unwrap();

        let clock = Arc::new(FixedClock::at(date(2025, 9, 22), 12, 0));
        (
            Analytics::new(employees.clone(), attendance, leave, clock),
            employees,
        )
    }

    #[test]
    fn test_department_headcount() {
        let (analytics, _) = setup(Vec::new());
        let counts = analytics.department_headcount();
        assert_eq!(counts.get("Engineering"), Some(&2));
        assert_eq!(counts.get("Finance"), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), 5);
    }

    #[test]
    fn test_attendance_rate() {
        let (analytics, _) = setup(Vec::new());
        assert_eq!(analytics.attendance_rate(), 0.0);

        let (analytics, _) = setup(vec![
            record("EMP001", date(2025, 9, 19), true, 8.0),
            record("EMP002", date(2025, 9, 19), true, 8.0),
            record("EMP003", date(2025, 9, 19), false, 0.0),
        ]);
        assert_eq!(analytics.attendance_rate(), 66.7);
    }

    #[test]
    fn test_presence_trend_oldest_first() {
        let (analytics, _) = setup(vec![
            record("EMP001", date(2025, 9, 22), true, 0.0),
            record("EMP002", date(2025, 9, 22), true, 0.0),
            record("EMP001", date(2025, 9, 19), true, 8.0),
            record("EMP002", date(2025, 9, 19), false, 0.0),
            // outside the window
            record("EMP001", date(2025, 9, 1), true, 8.0),
        ]);
        let trend = analytics.presence_trend(7);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, date(2025, 9, 16));
        assert_eq!(trend[6].date, date(2025, 9, 22));
        assert_eq!(trend[6].present, 2);
        assert_eq!(trend[3].present, 1);
        assert_eq!(trend.iter().map(|d| d.present).sum::<u32>(), 3);
    }

    #[test]
    fn test_presence_trend_window_is_bounded() {
        let (analytics, _) = setup(vec![record("EMP001", date(2025, 9, 22), true, 0.0)]);
        assert!(analytics.presence_trend(0).is_empty());

        for days in [200_000_000, u32::MAX] {
            let trend = analytics.presence_trend(days);
            assert_eq!(trend.len(), MAX_TREND_DAYS as usize);
            assert_eq!(trend.last().unwrap().date, date(2025, 9, 22));
            assert_eq!(trend.last().unwrap().present, 1);
        }
    }

    #[test]
    fn test_presence_trend_stops_at_earliest_date() {
        let storage = PulseStorage::open_in_memory().unwrap();
        let clock = Arc::new(FixedClock::at(NaiveDate::MIN + Days::new(2), 9, 0));
        let analytics = Analytics::new(
            Arc::new(CollectionRepository::<Employee>::new(storage.clone(), Collection::Employees)),
            Arc::new(CollectionRepository::<AttendanceRecord>::new(storage.clone(), Collection::Attendance)),
            Arc::new(CollectionRepository::<LeaveRequest>::new(storage, Collection::LeaveRequests)),
            clock,
        );

        let trend = analytics.presence_trend(7);
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].date, NaiveDate::MIN);
    }

    #[test]
    fn test_monthly_summary_and_presence() {
        let (analytics, _) = setup(vec![
            record("EMP001", date(2025, 9, 1), true, 8.25),
            record("EMP001", date(2025, 9, 2), true, 7.5),
            record("EMP001", date(2025, 9, 3), false, 0.0),
            record("EMP001", date(2025, 8, 29), true, 8.0),
            record("EMP002", date(2025, 9, 1), true, 8.0),
        ]);
        let summary = analytics.monthly_summary("EMP001", 2025, 9);
        assert_eq!(summary.total_days, 3);
        assert_eq!(summary.present_days, 2);
        assert_eq!(summary.absent_days, 1);
        assert_eq!(summary.total_hours, 15.75);

        assert_eq!(analytics.monthly_summary("EMP001", 2025, 13), AttendanceSummary::default());

        let months = analytics.monthly_presence("EMP001", 2025);
        assert_eq!(months[7], 1);
        assert_eq!(months[8], 2);
        assert_eq!(months.iter().sum::<u32>(), 3);
    }

    #[test]
    fn test_hr_overview() {
        let mut open = record("EMP001", date(2025, 9, 22), true, 0.0);
        open.check_out = None;
        let (analytics, employees) = setup(vec![
            open,
            record("EMP002", date(2025, 9, 22), true, 3.0),
            record("EMP003", date(2025, 9, 22), false, 0.0),
        ]);
        let mut all = employees.list().unwrap();
        all[4].status = EmployeeStatus::Terminated;
        employees.replace(&all).unwrap();

        let overview = analytics.hr_overview();
        assert_eq!(overview.total_employees, 5);
        assert_eq!(overview.active_employees, 4);
        assert_eq!(overview.checked_in_now, 1);
        assert_eq!(overview.present_today, 2);
        assert_eq!(overview.pending_leaves, 1);
    }

    #[test]
    fn test_working_days() {
        let (analytics, _) = setup(Vec::new());
        // Mon 2025-09-22 .. Sun 2025-09-28
        assert_eq!(analytics.working_days(date(2025, 9, 22), date(2025, 9, 28)), 5);
        assert_eq!(analytics.working_days(date(2025, 9, 28), date(2025, 9, 22)), 0);
    }
}
