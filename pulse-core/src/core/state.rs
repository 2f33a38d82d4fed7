use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::message::SyncPayload;
use shared::models::{AttendanceRecord, Credential, Employee, LeaveRequest, Session};
use tokio::sync::broadcast;

use crate::analytics::Analytics;
use crate::attendance::AttendanceEngine;
use crate::auth::{PasswordService, SessionService};
use crate::core::{ChangeNotifier, Config, PulseError, Result};
use crate::db::repository::SeedFn;
use crate::db::{Collection, CollectionRepository, PulseStorage, Repository, seed};
use crate::directory::{DirectoryEngine, DirectoryStores};
use crate::leave::LeaveEngine;
use crate::utils::time::{Clock, SystemClock};

/// 门户状态 - 持有存储和所有引擎
///
/// 所有字段内部都是 `Arc`，Clone 是浅拷贝。
///
/// # 组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | PulseStorage | redb 键值存储 |
/// | notifier | ChangeNotifier | 集合变更通知 |
/// | attendance | AttendanceEngine | 考勤打卡 |
/// | leave | LeaveEngine | 请假流程 |
/// | directory | DirectoryEngine | 员工和账号 |
/// | sessions | SessionService | 登录会话 |
/// | analytics | Analytics | 仪表盘统计 |
///
/// # 使用示例
///
/// ```ignore
/// let config = Config::from_env();
/// init_logger_from_config(&config);
///
/// let pulse = Pulse::open(&config)?;
/// pulse.sessions.login("john.doe", "password123", Role::Employee);
/// let resp = pulse.attendance.check_in("EMP001");
/// ```
#[derive(Clone)]
pub struct Pulse {
    pub config: Config,
    pub storage: PulseStorage,
    pub notifier: ChangeNotifier,
    pub attendance: AttendanceEngine,
    pub leave: LeaveEngine,
    pub directory: DirectoryEngine,
    pub sessions: SessionService,
    pub analytics: Analytics,
}

fn repository<T>(
    storage: &PulseStorage,
    collection: Collection,
    seed: Option<SeedFn<T>>,
) -> Arc<dyn Repository<T>>
where
    T: Serialize + DeserializeOwned + 'static,
{
    let repo = CollectionRepository::new(storage.clone(), collection);
    match seed {
        Some(seed) => Arc::new(repo.with_seed(seed)),
        None => Arc::new(repo),
    }
}

impl Pulse {
    /// 打开 work_dir 下的数据库 (系统时钟，业务时区取自配置)
    ///
    /// 启动时清除上次遗留的会话。
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock::new(config.timezone)))
    }

    /// 打开数据库并注入时钟
    pub fn open_with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let path = config.database_path();
        let storage = PulseStorage::open(&path)?;
        let pulse = Self::assemble(config.clone(), storage, clock);
        pulse.sessions.clear_stale().map_err(PulseError::Session)?;

        tracing::info!(
            path = %path.display(),
            timezone = %config.timezone,
            seed_sample_data = config.seed_sample_data,
            "Pulse storage opened"
        );
        Ok(pulse)
    }

    /// 内存数据库 (测试用)
    pub fn in_memory(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let storage = PulseStorage::open_in_memory()?;
        Ok(Self::assemble(config.clone(), storage, clock))
    }

    fn assemble(config: Config, storage: PulseStorage, clock: Arc<dyn Clock>) -> Self {
        let notifier = ChangeNotifier::new(config.notify_capacity);
        let passwords = PasswordService::new(config.argon2_memory_kib, config.argon2_iterations);
        let seeding = config.seed_sample_data;

        let employees: Arc<dyn Repository<Employee>> = repository(
            &storage,
            Collection::Employees,
            seeding.then(|| Arc::new(seed::sample_employees) as SeedFn<Employee>),
        );
        let credentials: Arc<dyn Repository<Credential>> = repository(
            &storage,
            Collection::Users,
            seeding.then(|| {
                let passwords = passwords.clone();
                Arc::new(move || seed::sample_credentials(&passwords)) as SeedFn<Credential>
            }),
        );
        let attendance: Arc<dyn Repository<AttendanceRecord>> = repository(
            &storage,
            Collection::Attendance,
            seeding.then(|| {
                let clock = clock.clone();
                Arc::new(move || seed::sample_attendance(clock.today())) as SeedFn<AttendanceRecord>
            }),
        );
        let leave_requests: Arc<dyn Repository<LeaveRequest>> = repository(
            &storage,
            Collection::LeaveRequests,
            seeding.then(|| Arc::new(seed::sample_leave_requests) as SeedFn<LeaveRequest>),
        );

        let attendance_engine = AttendanceEngine::new(
            attendance.clone(),
            employees.clone(),
            clock.clone(),
            notifier.clone(),
        );
        let leave = LeaveEngine::new(
            leave_requests.clone(),
            employees.clone(),
            clock.clone(),
            config.leave_allotments,
            notifier.clone(),
        );
        let sessions = SessionService::new(
            credentials.clone(),
            storage.clone(),
            passwords.clone(),
            notifier.clone(),
        );
        let directory = DirectoryEngine::new(
            DirectoryStores {
                employees: employees.clone(),
                credentials,
                attendance: attendance.clone(),
                leave_requests: leave_requests.clone(),
            },
            passwords,
            sessions.clone(),
            clock.clone(),
            notifier.clone(),
        );
        let analytics = Analytics::new(employees, attendance, leave_requests, clock);

        Self {
            config,
            storage,
            notifier,
            attendance: attendance_engine,
            leave,
            directory,
            sessions,
            analytics,
        }
    }

    /// 订阅集合变更
    pub fn subscribe(&self) -> broadcast::Receiver<SyncPayload> {
        self.notifier.subscribe()
    }

    /// 当前登录会话
    pub fn current_session(&self) -> Option<Session> {
        self.sessions.current_session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::Role;

    use crate::utils::time::FixedClock;

    fn config(seed: bool) -> Config {
        let mut config = Config::with_overrides("./unused", chrono_tz::Tz::UTC, seed);
        config.argon2_memory_kib = 8;
        config.argon2_iterations = 1;
        config
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::at(NaiveDate::from_ymd_opt(2025, 9, 22).unwrap(), 9, 0))
    }

    #[test]
    fn test_seeded_store() {
        let pulse = Pulse::in_memory(&config(true), clock()).unwrap();
        assert_eq!(pulse.directory.list_employees().len(), 5);
        assert_eq!(pulse.leave.pending_count(), 1);
        assert!(
            pulse
                .sessions
                .login("jane.smith", seed::SAMPLE_PASSWORD, Role::Hr)
                .success
        );
        // today has no seeded row, so everyone can check in
        assert!(pulse.attendance.check_in("EMP003").success);
    }

    #[test]
    fn test_unseeded_store_is_empty() {
        let pulse = Pulse::in_memory(&config(false), clock()).unwrap();
        assert!(pulse.directory.list_employees().is_empty());
        assert!(pulse.attendance.get_all_employee_statuses().is_empty());
        assert_eq!(pulse.analytics.attendance_rate(), 0.0);
    }

    #[test]
    fn test_engines_share_one_notifier() {
        let pulse = Pulse::in_memory(&config(true), clock()).unwrap();
        let mut rx = pulse.subscribe();
        pulse.attendance.check_in("EMP001");
        pulse.directory.delete_employee("EMP002");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.resource, "attendance");
        assert_eq!(pulse.notifier.version(Collection::Employees), 1);
    }
}
