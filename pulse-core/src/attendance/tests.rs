use super::*;
use chrono::{Duration, NaiveDate, NaiveTime};
use shared::error::ErrorCode;

use crate::db::repository::testing::FlakyRepository;
use crate::db::{CollectionRepository, PulseStorage, seed};
use crate::utils::time::FixedClock;

struct Fixture {
    engine: AttendanceEngine,
    clock: Arc<FixedClock>,
    records: Arc<FlakyRepository<AttendanceRecord>>,
    employees: Arc<dyn Repository<Employee>>,
    notifier: ChangeNotifier,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Monday 2025-09-22 09:00, sample employees, no attendance
fn fixture() -> Fixture {
    let storage = PulseStorage::open_in_memory().unwrap();
    let clock = Arc::new(FixedClock::at(date(2025, 9, 22), 9, 0));
    let records = Arc::new(FlakyRepository::new(Arc::new(CollectionRepository::new(
        storage.clone(),
        Collection::Attendance,
    ))));
    let employees: Arc<dyn Repository<Employee>> =
        Arc::new(CollectionRepository::new(storage, Collection::Employees));
    employees.replace(&seed::sample_employees()).unwrap();

    let notifier = ChangeNotifier::new(16);
    let engine = AttendanceEngine::new(
        records.clone(),
        employees.clone(),
        clock.clone(),
        notifier.clone(),
    );
    Fixture {
        engine,
        clock,
        records,
        employees,
        notifier,
    }
}

fn open_records(f: &Fixture, employee_id: &str) -> usize {
    f.records
        .list()
        .unwrap()
        .iter()
        .filter(|r| r.employee_id == employee_id && r.is_open())
        .count()
}

#[test]
fn test_check_in_then_check_out() {
    let f = fixture();

    let resp = f.engine.check_in("EMP001");
    assert!(resp.success);
    assert_eq!(resp.message.as_deref(), Some("Checked in at 09:00"));

    let status = f.engine.get_current_status("EMP001");
    assert!(status.is_checked_in);
    let today = status.today_record.unwrap();
    assert_eq!(today.check_in, Some(hm(9, 0)));
    assert_eq!(today.check_out, None);
    assert_eq!(today.hours_worked, 0.0);
    assert_eq!(today.status, AttendanceStatus::Present);

    f.clock.set_time(17, 30);
    let resp = f.engine.check_out("EMP001");
    assert!(resp.success);
    let record = resp.record.unwrap();
    assert_eq!(record.check_in, Some(hm(9, 0)));
    assert_eq!(record.check_out, Some(hm(17, 30)));
    assert_eq!(record.hours_worked, 8.5);

    let status = f.engine.get_current_status("EMP001");
    assert!(!status.is_checked_in);
}

#[test]
fn test_second_check_out_is_rejected_without_mutation() {
    let f = fixture();
    f.engine.check_in("EMP001");
    f.clock.set_time(17, 30);
    f.engine.check_out("EMP001");
    let before = f.records.list().unwrap();

    f.clock.set_time(18, 0);
    let resp = f.engine.check_out("EMP001");
    assert!(!resp.success);
    assert_eq!(resp.error_code(), ErrorCode::AlreadyCheckedOut);
    assert_eq!(resp.message.as_deref(), Some("Already checked out today"));
    assert_eq!(f.records.list().unwrap(), before);
}

#[test]
fn test_double_check_in_is_rejected() {
    let f = fixture();
    assert!(f.engine.check_in("EMP002").success);

    f.clock.set_time(9, 5);
    let resp = f.engine.check_in("EMP002");
    assert_eq!(resp.error_code(), ErrorCode::AlreadyCheckedIn);
    assert_eq!(open_records(&f, "EMP002"), 1);

    // the first check-in time is kept
    let today = f.engine.get_current_status("EMP002").today_record.unwrap();
    assert_eq!(today.check_in, Some(hm(9, 0)));
}

#[test]
fn test_check_out_without_check_in() {
    let f = fixture();
    let resp = f.engine.check_out("EMP003");
    assert_eq!(resp.error_code(), ErrorCode::NoCheckInFound);
    assert_eq!(
        resp.message.as_deref(),
        Some("No check-in record found for today")
    );
    assert!(f.records.list().unwrap().is_empty());
}

#[test]
fn test_re_check_in_overwrites_same_record() {
    let f = fixture();
    f.engine.check_in("EMP001");
    f.clock.set_time(12, 0);
    f.engine.check_out("EMP001");

    f.clock.set_time(13, 15);
    let resp = f.engine.check_in("EMP001");
    assert!(resp.success);
    let record = resp.record.unwrap();
    assert_eq!(record.check_in, Some(hm(13, 15)));
    assert_eq!(record.check_out, None);
    assert_eq!(record.hours_worked, 0.0);

    let todays: Vec<_> = f
        .records
        .list()
        .unwrap()
        .into_iter()
        .filter(|r| r.employee_id == "EMP001" && r.date == date(2025, 9, 22))
        .collect();
    assert_eq!(todays.len(), 1);

    f.clock.set_time(17, 45);
    let record = f.engine.check_out("EMP001").record.unwrap();
    assert_eq!(record.hours_worked, 4.5);
}

#[test]
fn test_absent_row_for_today() {
    let f = fixture();
    f.records
        .replace(&[AttendanceRecord {
            employee_id: "EMP004".into(),
            date: date(2025, 9, 22),
            status: AttendanceStatus::Absent,
            check_in: None,
            check_out: None,
            hours_worked: 0.0,
            break_time: 0.0,
        }])
        .unwrap();

    // no check-in time on the row
    assert_eq!(
        f.engine.check_out("EMP004").error_code(),
        ErrorCode::NoCheckInFound
    );

    let record = f.engine.check_in("EMP004").record.unwrap();
    assert_eq!(record.status, AttendanceStatus::Present);
    assert_eq!(f.records.list().unwrap().len(), 1);
}

#[test]
fn test_open_record_from_yesterday_does_not_block_today() {
    let f = fixture();
    f.engine.check_in("EMP001");

    f.clock.advance(Duration::days(1));
    assert!(f.engine.check_in("EMP001").success);
    // yesterday's session is still open, today's check-out only touches today
    f.clock.set_time(17, 0);
    let record = f.engine.check_out("EMP001").record.unwrap();
    assert_eq!(record.date, date(2025, 9, 23));
    assert_eq!(open_records(&f, "EMP001"), 1);
}

#[test]
fn test_all_employee_statuses() {
    let f = fixture();
    f.engine.check_in("EMP001");
    f.engine.check_in("EMP002");
    f.clock.set_time(10, 0);
    f.engine.check_out("EMP002");

    let statuses = f.engine.get_all_employee_statuses();
    assert_eq!(statuses.len(), 5);

    let find = |id: &str| statuses.iter().find(|s| s.employee_id == id).unwrap();
    let john = find("EMP001");
    assert!(john.is_checked_in);
    assert_eq!(john.check_in_time, Some(hm(9, 0)));
    assert_eq!(john.status, AttendanceStatus::Present);

    let mike = find("EMP002");
    assert!(!mike.is_checked_in);
    assert_eq!(mike.check_out_time, Some(hm(10, 0)));
    assert_eq!(mike.hours_worked, 1.0);

    let sarah = find("EMP003");
    assert!(!sarah.is_checked_in);
    assert_eq!(sarah.status, AttendanceStatus::Absent);
    assert_eq!(sarah.check_in_time, None);
    assert_eq!(sarah.hours_worked, 0.0);
}

#[test]
fn test_statuses_ignore_other_days() {
    let f = fixture();
    f.engine.check_in("EMP001");
    f.clock.advance(Duration::days(1));

    let statuses = f.engine.get_all_employee_statuses();
    assert!(statuses.iter().all(|s| s.status == AttendanceStatus::Absent));
    assert!(statuses.iter().all(|s| !s.is_checked_in));
}

#[test]
fn test_write_failure_reports_storage_error() {
    let f = fixture();
    let mut rx = f.notifier.subscribe();
    f.records.fail_writes(true);

    let resp = f.engine.check_in("EMP001");
    assert!(!resp.success);
    assert_eq!(resp.error_code(), ErrorCode::StorageWriteFailed);
    assert!(rx.try_recv().is_err());

    f.records.fail_writes(false);
    assert!(!f.engine.get_current_status("EMP001").is_checked_in);
    assert!(f.engine.check_in("EMP001").success);
}

#[test]
fn test_transitions_publish_notifications() {
    let f = fixture();
    let mut rx = f.notifier.subscribe();

    f.engine.check_in("EMP001");
    f.clock.set_time(17, 0);
    f.engine.check_out("EMP001");

    let created = rx.try_recv().unwrap();
    assert_eq!(created.resource, "attendance");
    assert_eq!(created.action, SyncAction::Created);
    assert_eq!(created.id, "EMP001_2025-09-22");
    assert_eq!(created.version, 1);

    let updated = rx.try_recv().unwrap();
    assert_eq!(updated.action, SyncAction::Updated);
    assert_eq!(updated.version, 2);
    assert_eq!(updated.data.unwrap()["checkOut"], "17:00");

    // rejected commands publish nothing
    f.engine.check_out("EMP001");
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_blank_employee_id() {
    let f = fixture();
    assert_eq!(f.engine.check_in("  ").error_code(), ErrorCode::RequiredField);
    assert_eq!(f.engine.check_out("").error_code(), ErrorCode::RequiredField);
}

#[test]
fn test_history_and_month_view() {
    let f = fixture();
    for (day, month) in [(29, 8), (1, 9), (22, 9)] {
        f.clock.set(date(2025, month, day).and_time(hm(9, 0)));
        f.engine.check_in("EMP001");
        f.clock.set_time(17, 0);
        f.engine.check_out("EMP001");
    }
    f.engine.check_in("EMP002");

    let history = f.engine.history("EMP001");
    let dates: Vec<_> = history.iter().map(|r| r.date).collect();
    assert_eq!(
        dates,
        vec![date(2025, 9, 22), date(2025, 9, 1), date(2025, 8, 29)]
    );

    let september = f.engine.records_for_month("EMP001", 2025, 9);
    assert_eq!(september.len(), 2);
    assert!(september.iter().all(|r| r.hours_worked == 8.0));
}

#[test]
fn test_check_in_requires_known_employee() {
    let f = fixture();
    let resp = f.engine.check_in("NOBODY999");
    assert_eq!(resp.error_code(), ErrorCode::EmployeeNotFound);
    assert_eq!(resp.message.as_deref(), Some("Employee NOBODY999 not found"));

    let remaining: Vec<Employee> = f
        .employees
        .list()
        .unwrap()
        .into_iter()
        .filter(|e| e.employee_id != "EMP002")
        .collect();
    f.employees.replace(&remaining).unwrap();
    assert_eq!(f.engine.check_in("EMP002").error_code(), ErrorCode::EmployeeNotFound);

    assert!(f.records.list().unwrap().is_empty());
    assert!(f.engine.history("EMP002").is_empty());
}
