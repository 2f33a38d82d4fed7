use std::path::PathBuf;

use chrono_tz::Tz;

use crate::utils::time::parse_timezone;

/// 年度假期额度 (天)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveAllotments {
    pub annual: u32,
    pub sick: u32,
    pub personal: u32,
}

impl Default for LeaveAllotments {
    fn default() -> Self {
        Self {
            annual: 20,
            sick: 10,
            personal: 5,
        }
    }
}

/// 门户核心配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库文件所在目录) |
/// | TIMEZONE | UTC | 业务时区 (IANA 名称) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOG_DIR | (无) | 日志目录，存在时写入滚动日志文件 |
/// | SEED_SAMPLE_DATA | true | 首次访问空集合时写入示例数据 |
/// | ANNUAL_LEAVE_DAYS | 20 | 年假额度 |
/// | SICK_LEAVE_DAYS | 10 | 病假额度 |
/// | PERSONAL_LEAVE_DAYS | 5 | 事假额度 |
/// | NOTIFY_CAPACITY | 256 | 变更通知通道容量 |
/// | ARGON2_MEMORY_KIB | 19456 | 密码哈希内存开销 |
/// | ARGON2_ITERATIONS | 2 | 密码哈希迭代次数 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/pulse TIMEZONE=Asia/Kolkata cargo test
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// 业务时区
    pub timezone: Tz,
    /// 日志级别
    pub log_level: String,
    /// JSON 格式日志
    pub log_json: bool,
    /// 日志目录
    pub log_dir: Option<String>,
    /// 是否写入示例数据
    pub seed_sample_data: bool,
    /// 假期额度
    pub leave_allotments: LeaveAllotments,
    /// 变更通知通道容量
    pub notify_capacity: usize,
    /// argon2 内存开销 (KiB)
    pub argon2_memory_kib: u32,
    /// argon2 迭代次数
    pub argon2_iterations: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let defaults = argon2::Params::default();
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            timezone: std::env::var("TIMEZONE")
                .map(|tz| parse_timezone(&tz))
                .unwrap_or(Tz::UTC),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            seed_sample_data: env_or("SEED_SAMPLE_DATA", true),
            leave_allotments: LeaveAllotments {
                annual: env_or("ANNUAL_LEAVE_DAYS", 20),
                sick: env_or("SICK_LEAVE_DAYS", 10),
                personal: env_or("PERSONAL_LEAVE_DAYS", 5),
            },
            notify_capacity: env_or("NOTIFY_CAPACITY", 256),
            argon2_memory_kib: env_or("ARGON2_MEMORY_KIB", defaults.m_cost()),
            argon2_iterations: env_or("ARGON2_ITERATIONS", defaults.t_cost()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, timezone: Tz, seed_sample_data: bool) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.timezone = timezone;
        config.seed_sample_data = seed_sample_data;
        config
    }

    /// 数据库文件路径 (work_dir/pulse.redb)
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("pulse.redb")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
