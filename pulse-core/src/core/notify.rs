//! 变更通知
//!
//! 引擎每次成功写回集合后发布一条 [`SyncPayload`]。
//! 通道是 `tokio::sync::broadcast`，发送和 `try_recv` 都不需要运行时。

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use shared::message::{SyncAction, SyncPayload};
use tokio::sync::broadcast;

use crate::db::Collection;

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号，支持原子递增。
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    /// 创建空的版本管理器
    pub fn new() -> Self {
        Self::default()
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    ///
    /// 如果资源不存在，返回 0
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// 集合变更通知器 (Clone 共享同一通道)
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<SyncPayload>,
    versions: Arc<ResourceVersions>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            versions: Arc::new(ResourceVersions::new()),
        }
    }

    /// 订阅变更
    pub fn subscribe(&self) -> broadcast::Receiver<SyncPayload> {
        self.tx.subscribe()
    }

    /// 集合当前版本号
    pub fn version(&self, collection: Collection) -> u64 {
        self.versions.get(collection.key())
    }

    /// 发布变更，返回新版本号
    ///
    /// 没有订阅者时只递增版本号。
    pub fn publish<T: Serialize>(
        &self,
        collection: Collection,
        action: SyncAction,
        id: impl ToString,
        data: Option<&T>,
    ) -> u64 {
        let resource = collection.key();
        let version = self.versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action,
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        if self.tx.send(payload).is_err() {
            tracing::debug!(resource, version, "No subscribers for change notification");
        }
        version
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_per_resource() {
        let versions = ResourceVersions::new();
        assert_eq!(versions.get("attendance"), 0);
        assert_eq!(versions.increment("attendance"), 1);
        assert_eq!(versions.increment("attendance"), 2);
        assert_eq!(versions.increment("employees"), 1);
        assert_eq!(versions.get("attendance"), 2);
    }

    #[test]
    fn test_publish_reaches_subscribers() {
        let notifier = ChangeNotifier::new(8);
        let mut rx = notifier.subscribe();

        let v = notifier.publish(
            Collection::Attendance,
            SyncAction::Updated,
            "EMP001_2025-09-22",
            Some(&"payload"),
        );
        assert_eq!(v, 1);

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.resource, "attendance");
        assert_eq!(msg.action, SyncAction::Updated);
        assert_eq!(msg.id, "EMP001_2025-09-22");
        assert_eq!(msg.data, Some(serde_json::json!("payload")));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let notifier = ChangeNotifier::new(8);
        notifier.publish::<()>(Collection::Employees, SyncAction::Deleted, "EMP003", None);
        assert_eq!(notifier.version(Collection::Employees), 1);
        assert_eq!(notifier.version(Collection::Users), 0);
    }
}
