//! Pulse - 员工门户核心
//!
//! # 架构概述
//!
//! 所有数据保存在本地 redb 键值存储中，每个集合整体读写：
//!
//! - **考勤** (`attendance`): 上班打卡 / 下班签退状态机，工时计算
//! - **请假** (`leave`): 提交、审批、余额
//! - **员工目录** (`directory`): 员工和账号 CRUD，级联删除，上级引用
//! - **认证** (`auth`): Argon2 密码、登录会话、角色检查
//! - **统计** (`analytics`): 仪表盘聚合
//!
//! 命令流程：读取集合 → 校验 / 修改 → 整体写回 → 发布变更通知。
//!
//! # 模块结构
//!
//! ```text
//! pulse-core/src/
//! ├── core/          # 配置、状态、变更通知
//! ├── db/            # redb 存储、仓储、示例数据
//! ├── attendance/    # 考勤引擎
//! ├── leave/         # 请假引擎
//! ├── directory/     # 员工目录引擎
//! ├── auth/          # 密码和会话
//! ├── analytics.rs   # 统计
//! └── utils/         # 日志、时间、校验
//! ```

pub mod analytics;
pub mod attendance;
pub mod auth;
pub mod core;
pub mod db;
pub mod directory;
pub mod leave;
pub mod utils;

// Re-export 公共类型
pub use analytics::{Analytics, DailyPresence, HrOverview, MAX_TREND_DAYS};
pub use attendance::AttendanceEngine;
pub use auth::{PasswordService, SessionService};
pub use core::{ChangeNotifier, Config, LeaveAllotments, Pulse, PulseError};
pub use db::{Collection, PulseStorage};
pub use directory::{DirectoryEngine, DirectoryStores};
pub use leave::LeaveEngine;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use shared::response::CommandResponse;
pub use utils::{ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_from_config, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
