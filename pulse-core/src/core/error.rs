use shared::error::AppError;
use thiserror::Error;

use crate::db::StorageError;

/// 启动错误
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("存储初始化失败: {0}")]
    Storage(#[from] StorageError),

    #[error("清理会话失败: {0}")]
    Session(AppError),
}

/// 启动流程的 Result 类型别名
pub type Result<T> = std::result::Result<T, PulseError>;
