//! 认证模块
//!
//! - [`PasswordService`] - argon2 密码哈希
//! - [`SessionService`] - 登录、登出、当前会话 (`currentSession` 单条记录)

pub mod password;

pub use password::PasswordService;

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::message::SyncAction;
use shared::models::{Credential, Role, Session};
use shared::response::CommandResponse;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{Collection, PulseStorage, RepoError, Repository, StorageError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is not authenticated")]
    NotAuthenticated,

    #[error("Access denied. {required} role required.")]
    PermissionDenied { required: Role },

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("Session storage error: {0}")]
    Session(#[from] StorageError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::invalid_credentials(),
            AuthError::NotAuthenticated => AppError::new(ErrorCode::NotAuthenticated),
            AuthError::PermissionDenied { required } => {
                AppError::permission_denied(format!("Access denied. {required} role required."))
                    .with_detail("required_role", required.to_string())
            }
            AuthError::Repo(e) => e.into(),
            AuthError::Session(e) => {
                tracing::error!(error = %e, "Session storage failure");
                let code = if e.is_corruption() {
                    ErrorCode::StorageCorrupted
                } else {
                    ErrorCode::StorageWriteFailed
                };
                AppError::new(code).with_detail("collection", Collection::CurrentSession.key())
            }
        }
    }
}

/// 会话服务
#[derive(Clone)]
pub struct SessionService {
    credentials: Arc<dyn Repository<Credential>>,
    storage: PulseStorage,
    passwords: PasswordService,
    notifier: crate::core::ChangeNotifier,
}

impl SessionService {
    pub fn new(
        credentials: Arc<dyn Repository<Credential>>,
        storage: PulseStorage,
        passwords: PasswordService,
        notifier: crate::core::ChangeNotifier,
    ) -> Self {
        Self {
            credentials,
            storage,
            passwords,
            notifier,
        }
    }

    /// 登录：用户名 + 密码 + 角色都匹配才成功
    pub fn login(&self, username: &str, password: &str, role: Role) -> CommandResponse<Session> {
        match self.try_login(username, password, role) {
            Ok(session) => {
                tracing::info!(username = %session.username, role = %session.role, "Login succeeded");
                crate::security_log!("INFO", "login", username = session.username.as_str());
                CommandResponse::ok(session)
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "Login rejected");
                crate::security_log!("WARN", "login_failed", username = username);
                AppError::from(e).into()
            }
        }
    }

    fn try_login(&self, username: &str, password: &str, role: Role) -> Result<Session, AuthError> {
        let username = username.trim();
        let credentials = self.credentials.list()?;
        let credential = credentials
            .iter()
            .find(|c| c.username == username && c.role == role)
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.passwords.verify(password, &credential.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session {
            token: Uuid::new_v4(),
            username: credential.username.clone(),
            role: credential.role,
            employee_id: credential.employee_id.clone(),
            login_at: shared::util::now_millis(),
        };
        self.storage.set(Collection::CurrentSession, &session)?;
        self.notifier
            .publish(Collection::CurrentSession, SyncAction::Created, session.token, Some(&session));
        Ok(session)
    }

    /// 登出：清除当前会话
    pub fn logout(&self) -> CommandResponse<()> {
        match self.storage.remove(Collection::CurrentSession) {
            Ok(existed) => {
                if existed {
                    tracing::info!("Logged out");
                    self.notifier.publish::<()>(
                        Collection::CurrentSession,
                        SyncAction::Deleted,
                        "current",
                        None,
                    );
                }
                CommandResponse::ok(())
            }
            Err(e) => AppError::from(AuthError::Session(e)).into(),
        }
    }

    /// 当前会话；读取失败视为未登录
    pub fn current_session(&self) -> Option<Session> {
        self.storage
            .get::<Session>(Collection::CurrentSession)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read current session");
                None
            })
    }

    /// 结束属于某员工的当前会话 (删除员工时调用)，返回是否结束了会话
    pub fn end_for_employee(&self, employee_id: &str) -> Result<bool, AuthError> {
        let Some(session) = self.current_session() else {
            return Ok(false);
        };
        if session.employee_id != employee_id {
            return Ok(false);
        }
        self.storage.remove(Collection::CurrentSession)?;
        self.notifier
            .publish::<()>(Collection::CurrentSession, SyncAction::Deleted, session.token, None);
        tracing::info!(employee_id, username = %session.username, "Session ended for removed employee");
        Ok(true)
    }

    /// 当前会话必须存在且角色匹配
    pub fn require_role(&self, role: Role) -> Result<Session, AppError> {
        let session = self.current_session().ok_or(AuthError::NotAuthenticated)?;
        check_role(&session, role)?;
        Ok(session)
    }

    /// 启动时清除上次遗留的会话
    pub fn clear_stale(&self) -> Result<(), AppError> {
        if self
            .storage
            .remove(Collection::CurrentSession)
            .map_err(AuthError::Session)?
        {
            tracing::info!("Cleared stale session");
        }
        Ok(())
    }
}

/// 角色检查
pub fn check_role(session: &Session, role: Role) -> Result<(), AuthError> {
    if session.role != role {
        return Err(AuthError::PermissionDenied { required: role });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CollectionRepository;

    fn setup() -> (SessionService, Arc<dyn Repository<Credential>>) {
        let storage = PulseStorage::open_in_memory().unwrap();
        let passwords = PasswordService::new(8, 1);
        let credentials: Arc<dyn Repository<Credential>> =
            Arc::new(CollectionRepository::new(storage.clone(), Collection::Users));
        credentials
            .replace(&[
                Credential {
                    id: 1,
                    username: "john.doe".into(),
                    password_hash: passwords.hash("password123").unwrap(),
                    role: Role::Employee,
                    employee_id: "EMP001".into(),
                },
                Credential {
                    id: 2,
                    username: "jane.smith".into(),
                    password_hash: passwords.hash("password123").unwrap(),
                    role: Role::Hr,
                    employee_id: "HR001".into(),
                },
            ])
            .unwrap();
        let service = SessionService::new(
            credentials.clone(),
            storage,
            passwords,
            crate::core::ChangeNotifier::new(8),
        );
        (service, credentials)
    }

    #[test]
    fn test_login_stores_session() {
        let (service, _) = setup();
        let resp = service.login("john.doe", "password123", Role::Employee);
        assert!(resp.success);
        let session = resp.record.unwrap();
        assert_eq!(session.employee_id, "EMP001");
        assert_eq!(service.current_session(), Some(session));
    }

    #[test]
    fn test_login_requires_matching_role() {
        let (service, _) = setup();
        let resp = service.login("john.doe", "password123", Role::Hr);
        assert!(!resp.success);
        assert_eq!(resp.error_code(), ErrorCode::InvalidCredentials);
        assert!(service.current_session().is_none());
    }

    #[test]
    fn test_login_wrong_password() {
        let (service, _) = setup();
        let resp = service.login("jane.smith", "wrong-password", Role::Hr);
        assert_eq!(resp.error_code(), ErrorCode::InvalidCredentials);
    }

    #[test]
    fn test_logout_and_require_role() {
        let (service, _) = setup();
        assert_eq!(
            service.require_role(Role::Hr).unwrap_err().code,
            ErrorCode::NotAuthenticated
        );

        service.login("john.doe", "password123", Role::Employee);
        assert_eq!(
            service.require_role(Role::Hr).unwrap_err().code,
            ErrorCode::PermissionDenied
        );
        assert!(service.require_role(Role::Employee).is_ok());

        assert!(service.logout().success);
        assert!(service.current_session().is_none());
    }

    #[test]
    fn test_end_for_employee_only_matches_owner() {
        let (service, _) = setup();
        service.login("john.doe", "password123", Role::Employee);

        assert!(!service.end_for_employee("HR001").unwrap());
        assert!(service.current_session().is_some());

        assert!(service.end_for_employee("EMP001").unwrap());
        assert!(service.current_session().is_none());
        assert!(!service.end_for_employee("EMP001").unwrap());
    }

    #[test]
    fn test_clear_stale() {
        let (service, _) = setup();
        service.login("jane.smith", "password123", Role::Hr);
        service.clear_stale().unwrap();
        assert!(service.current_session().is_none());
    }
}
