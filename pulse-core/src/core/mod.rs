//! 核心模块 - 配置、状态、变更通知和启动错误
//!
//! # 模块结构
//!
//! - [`Config`] - 门户配置
//! - [`Pulse`] - 门户状态 (持有存储和所有引擎)
//! - [`ChangeNotifier`] - 集合变更通知
//! - [`PulseError`] - 启动错误

pub mod config;
pub mod error;
pub mod notify;
pub mod state;

pub use config::{Config, LeaveAllotments};
pub use error::{PulseError, Result};
pub use notify::{ChangeNotifier, ResourceVersions};
pub use state::Pulse;
