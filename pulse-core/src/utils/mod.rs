//! 工具模块 - 通用工具函数
//!
//! # 内容
//!
//! - [`logger`] - 日志初始化
//! - [`time`] - 业务时区时钟与日期计算
//! - [`validation`] - 输入校验

pub mod logger;
pub mod time;
pub mod validation;

// Re-export error types from shared
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use time::{Clock, FixedClock, SystemClock};
