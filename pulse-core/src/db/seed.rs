//! 示例数据
//!
//! 集合首次被读取且从未写入时使用 (`SEED_SAMPLE_DATA=true`)。

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::Rng;
use shared::models::{
    AttendanceRecord, AttendanceStatus, Credential, Employee, EmployeeStatus, LeaveRequest,
    LeaveStatus, LeaveType, Role,
};

use crate::auth::PasswordService;
use crate::utils::time::{is_weekday, round2};

/// 示例账号的初始密码
pub const SAMPLE_PASSWORD: &str = "password123";

/// 示例考勤覆盖的天数 (含今天)
pub const SAMPLE_ATTENDANCE_DAYS: i64 = 30;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn employee(
    id: i64,
    employee_id: &str,
    name: &str,
    department: &str,
    position: &str,
    phone: &str,
    join_date: NaiveDate,
) -> Employee {
    let email = format!("{}@caarapace.com", name.to_lowercase().replace(' ', "."));
    Employee {
        id,
        employee_id: employee_id.to_string(),
        name: name.to_string(),
        department: department.to_string(),
        position: position.to_string(),
        email,
        phone: phone.to_string(),
        join_date,
        status: EmployeeStatus::Active,
        reporting_in_charge: None,
    }
}

pub fn sample_employees() -> Vec<Employee> {
    let mut employees = vec![
        employee(1, "EMP001", "John Doe", "Engineering", "Software Engineer", "+1-234-567-8901", date(2023, 1, 15)),
        employee(2, "HR001", "Jane Smith", "Human Resources", "HR Manager", "+1-234-567-8902", date(2022, 5, 10)),
        employee(3, "EMP002", "Mike Johnson", "Marketing", "Marketing Specialist", "+1-234-567-8903", date(2023, 3, 20)),
        employee(4, "EMP003", "Sarah Wilson", "Finance", "Financial Analyst", "+1-234-567-8904", date(2023, 2, 10)),
        employee(5, "EMP004", "David Brown", "Engineering", "Senior Developer", "+1-234-567-8905", date(2022, 8, 15)),
    ];
    // John reports to David
    employees[0].reporting_in_charge = Some("EMP004".to_string());
    employees
}

/// 示例账号；哈希失败的账号会被跳过
pub fn sample_credentials(passwords: &PasswordService) -> Vec<Credential> {
    [
        (1, "john.doe", Role::Employee, "EMP001"),
        (2, "jane.smith", Role::Hr, "HR001"),
        (3, "mike.johnson", Role::Employee, "EMP002"),
    ]
    .into_iter()
    .filter_map(|(id, username, role, employee_id)| match passwords.hash(SAMPLE_PASSWORD) {
        Ok(password_hash) => Some(Credential {
            id,
            username: username.to_string(),
            password_hash,
            role,
            employee_id: employee_id.to_string(),
        }),
        Err(e) => {
            tracing::error!(username, "Failed to hash sample password: {}", e);
            None
        }
    })
    .collect()
}

/// 过去 30 天 (跳过周末) 的随机考勤，约 90% 出勤，按日期倒序
///
/// 今天不生成记录，保证示例数据下所有人都可以打卡。
pub fn sample_attendance(today: NaiveDate) -> Vec<AttendanceRecord> {
    let mut rng = rand::thread_rng();
    let employee_ids: Vec<String> = sample_employees().into_iter().map(|e| e.employee_id).collect();
    let mut records = Vec::new();

    for offset in 1..SAMPLE_ATTENDANCE_DAYS {
        let day = today - Duration::days(offset);
        if !is_weekday(day) {
            continue;
        }
        for employee_id in &employee_ids {
            let present = rng.gen_bool(0.9);
            let record = if present {
                let check_in = NaiveTime::from_hms_opt(rng.gen_range(8..10), rng.gen_range(0..60), 0);
                let check_out = NaiveTime::from_hms_opt(rng.gen_range(17..19), rng.gen_range(0..60), 0);
                AttendanceRecord {
                    employee_id: employee_id.clone(),
                    date: day,
                    status: AttendanceStatus::Present,
                    check_in,
                    check_out,
                    hours_worked: round2(8.0 + rng.gen_range(-1.0..1.0)),
                    break_time: 1.0,
                }
            } else {
                AttendanceRecord {
                    employee_id: employee_id.clone(),
                    date: day,
                    status: AttendanceStatus::Absent,
                    check_in: None,
                    check_out: None,
                    hours_worked: 0.0,
                    break_time: 0.0,
                }
            };
            records.push(record);
        }
    }
    records
}

pub fn sample_leave_requests() -> Vec<LeaveRequest> {
    vec![
        LeaveRequest {
            id: 1,
            employee_id: "EMP001".into(),
            employee_name: "John Doe".into(),
            leave_type: LeaveType::Annual,
            start_date: date(2025, 9, 25),
            end_date: date(2025, 9, 27),
            reason: "Family vacation".into(),
            status: LeaveStatus::Pending,
            applied_date: date(2025, 9, 10),
            hr_comments: String::new(),
            approved_by: None,
            approved_date: None,
        },
        LeaveRequest {
            id: 2,
            employee_id: "EMP002".into(),
            employee_name: "Mike Johnson".into(),
            leave_type: LeaveType::Sick,
            start_date: date(2025, 9, 20),
            end_date: date(2025, 9, 22),
            reason: "Medical appointment".into(),
            status: LeaveStatus::Approved,
            applied_date: date(2025, 9, 8),
            hr_comments: "Approved".into(),
            approved_by: Some("Jane Smith".into()),
            approved_date: Some(date(2025, 9, 9)),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_employees_are_consistent() {
        let employees = sample_employees();
        let ids: HashSet<_> = employees.iter().map(|e| e.employee_id.as_str()).collect();
        assert_eq!(ids.len(), employees.len());
        assert_eq!(employees[1].email, "jane.smith@caarapace.com");
        assert!(employees.iter().all(|e| crate::utils::validation::is_valid_employee_id(&e.employee_id)));
    }

    #[test]
    fn test_sample_attendance_skips_weekends_and_today() {
        // Monday
        let today = date(2025, 9, 22);
        let records = sample_attendance(today);

        assert!(!records.is_empty());
        assert!(records.iter().all(|r| is_weekday(r.date)));
        assert!(records.iter().all(|r| r.date < today));
        assert!(records.iter().all(|r| !r.is_open()));
        // five employees per working day
        assert_eq!(records.len() % 5, 0);
        // newest first
        assert!(records.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_sample_credentials_verify() {
        let passwords = PasswordService::new(8, 1);
        let credentials = sample_credentials(&passwords);
        assert_eq!(credentials.len(), 3);
        assert!(passwords.verify(SAMPLE_PASSWORD, &credentials[1].password_hash));
        assert_eq!(credentials[1].role, Role::Hr);
    }
}
