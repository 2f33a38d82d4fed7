//! 变更通知消息
//!
//! 引擎在每次成功写入集合之后发布 [`SyncPayload`]，表现层据此重新读取视图。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// 同步信号载荷
///
/// 通知订阅者某个集合发生了变化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    /// 集合名 (例如: "attendance", "employees", "leaveRequests")
    pub resource: String,
    /// 版本号 (每个集合单调递增)
    pub version: u64,
    /// 变更类型
    pub action: SyncAction,
    /// 资源 ID (例如 "EMP001_2025-09-20", "EMP003", "12")
    pub id: String,
    /// 资源数据 (可选，deleted 时为 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_payload_serialize() {
        let payload = SyncPayload {
            resource: "attendance".to_string(),
            version: 3,
            action: SyncAction::Updated,
            id: "EMP001_2025-09-20".to_string(),
            data: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["action"], "updated");
        assert_eq!(json["version"], 3);
        assert!(json.get("data").is_none());
    }
}
