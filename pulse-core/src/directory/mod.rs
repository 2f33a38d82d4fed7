//! Directory Engine (员工目录)
//!
//! 员工 ([`Employee`]) 和账号 ([`Credential`]) 两个聚合，账号通过 `employeeId` 关联员工。
//! 个人资料 ([`UserProfile`]) 在读取时 join 得到，不重复存储。
//!
//! # 级联删除
//!
//! 删除员工时先写回依赖集合 (考勤、请假、账号) 并结束其登录会话，最后写员工集合：
//! 任一写入失败时员工仍然存在，不会留下孤儿记录。
//!
//! # 上级引用
//!
//! `reportingInCharge` 写入时不校验，读取时解析，找不到显示 "Not Assigned"。

mod error;

pub use error::DirectoryError;

use std::sync::Arc;

use shared::error::AppError;
use shared::message::SyncAction;
use shared::models::{
    AttendanceRecord, Credential, CredentialCreate, CredentialUpdate, CredentialView, Employee,
    EmployeeCreate, EmployeeUpdate, LeaveRequest, NewAccount, UserProfile,
};
use shared::response::CommandResponse;
use shared::util::next_sequential_id;
use validator::Validate;

use crate::auth::{PasswordService, SessionService};
use crate::core::ChangeNotifier;
use crate::db::{Collection, Repository};
use crate::utils::time::Clock;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, from_validation_errors, is_valid_employee_id,
    validate_optional_text, validate_password, validate_required_text,
};

/// 没有上级或上级已不存在时显示的名字
pub const NOT_ASSIGNED: &str = "Not Assigned";

/// 自动生成的员工编号前缀
pub const EMPLOYEE_ID_PREFIX: &str = "EMP";

/// 目录引擎需要的集合
#[derive(Clone)]
pub struct DirectoryStores {
    pub employees: Arc<dyn Repository<Employee>>,
    pub credentials: Arc<dyn Repository<Credential>>,
    pub attendance: Arc<dyn Repository<AttendanceRecord>>,
    pub leave_requests: Arc<dyn Repository<LeaveRequest>>,
}

#[derive(Clone)]
pub struct DirectoryEngine {
    stores: DirectoryStores,
    passwords: PasswordService,
    sessions: SessionService,
    clock: Arc<dyn Clock>,
    notifier: ChangeNotifier,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 空字符串视为没有上级
fn normalize_manager(manager: Option<String>) -> Option<String> {
    manager
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// `EMP{n:03}`，n = 现有 EMP 编号的最大数字 + 1
fn generate_employee_id(employees: &[Employee]) -> String {
    let max = employees
        .iter()
        .filter_map(|e| e.employee_id.strip_prefix(EMPLOYEE_ID_PREFIX))
        .filter_map(|digits| digits.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{EMPLOYEE_ID_PREFIX}{:03}", max + 1)
}

/// 解析上级名字
pub fn resolve_manager_name(employees: &[Employee], employee: &Employee) -> String {
    employee
        .reporting_in_charge
        .as_deref()
        .and_then(|manager_id| employees.iter().find(|e| e.employee_id == manager_id))
        .map(|manager| manager.name.clone())
        .unwrap_or_else(|| NOT_ASSIGNED.to_string())
}

impl DirectoryEngine {
    pub fn new(
        stores: DirectoryStores,
        passwords: PasswordService,
        sessions: SessionService,
        clock: Arc<dyn Clock>,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            stores,
            passwords,
            sessions,
            clock,
            notifier,
        }
    }

    // ========== Employee commands ==========

    pub fn add_employee(&self, payload: EmployeeCreate) -> CommandResponse<Employee> {
        match self.try_add_employee(payload) {
            Ok(employee) => {
                tracing::info!(employee_id = %employee.employee_id, name = %employee.name, "Employee added");
                CommandResponse::ok_with_message(employee, "Employee added successfully")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Add employee rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_add_employee(&self, mut payload: EmployeeCreate) -> Result<Employee, DirectoryError> {
        validate_required_text(&payload.name, "Name", MAX_NAME_LEN)?;
        validate_required_text(&payload.email, "Email", MAX_EMAIL_LEN)?;
        validate_required_text(&payload.department, "Department", MAX_NAME_LEN)?;
        validate_required_text(&payload.position, "Position", MAX_NAME_LEN)?;
        validate_optional_text(&payload.phone, "Phone", MAX_SHORT_TEXT_LEN)?;
        payload.email = normalize_email(&payload.email);
        payload.validate().map_err(from_validation_errors)?;

        let mut employees = self.stores.employees.list()?;

        let employee_id = match payload
            .employee_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            Some(id) => {
                if !is_valid_employee_id(id) {
                    return Err(DirectoryError::InvalidEmployeeId(id.to_string()));
                }
                if employees.iter().any(|e| e.employee_id == id) {
                    return Err(DirectoryError::DuplicateEmployeeId(id.to_string()));
                }
                id.to_string()
            }
            None => generate_employee_id(&employees),
        };

        if employees.iter().any(|e| e.email.eq_ignore_ascii_case(&payload.email)) {
            return Err(DirectoryError::DuplicateEmail(payload.email));
        }

        let reporting_in_charge = normalize_manager(payload.reporting_in_charge);
        if reporting_in_charge.as_deref() == Some(employee_id.as_str()) {
            return Err(DirectoryError::SelfReporting);
        }

        let employee = Employee {
            id: next_sequential_id(employees.iter().map(|e| e.id)),
            employee_id,
            name: payload.name.trim().to_string(),
            department: payload.department.trim().to_string(),
            position: payload.position.trim().to_string(),
            email: payload.email,
            phone: payload.phone.map(|p| p.trim().to_string()).unwrap_or_default(),
            join_date: payload.join_date.unwrap_or_else(|| self.clock.today()),
            status: payload.status.unwrap_or_default(),
            reporting_in_charge,
        };
        employees.push(employee.clone());

        self.stores.employees.replace(&employees)?;
        self.notifier.publish(
            Collection::Employees,
            SyncAction::Created,
            &employee.employee_id,
            Some(&employee),
        );
        Ok(employee)
    }

    /// 部分更新；`reportingInCharge` 传空字符串表示清除上级
    pub fn update_employee(&self, employee_id: &str, update: EmployeeUpdate) -> CommandResponse<Employee> {
        match self.try_update_employee(employee_id, update) {
            Ok(employee) => {
                tracing::info!(employee_id = %employee.employee_id, "Employee updated");
                CommandResponse::ok_with_message(employee, "Employee updated successfully")
            }
            Err(e) => {
                tracing::warn!(employee_id, error = %e, "Update employee rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_update_employee(
        &self,
        employee_id: &str,
        mut update: EmployeeUpdate,
    ) -> Result<Employee, DirectoryError> {
        for (value, field) in [
            (&update.name, "Name"),
            (&update.department, "Department"),
            (&update.position, "Position"),
        ] {
            if let Some(v) = value {
                validate_required_text(v, field, MAX_NAME_LEN)?;
            }
        }
        validate_optional_text(&update.phone, "Phone", MAX_SHORT_TEXT_LEN)?;
        if let Some(email) = update.email.as_mut() {
            *email = normalize_email(email);
        }
        update.validate().map_err(from_validation_errors)?;

        let mut employees = self.stores.employees.list()?;
        let index = employees
            .iter()
            .position(|e| e.employee_id == employee_id)
            .ok_or_else(|| DirectoryError::EmployeeNotFound(employee_id.to_string()))?;

        if let Some(email) = &update.email
            && employees
                .iter()
                .enumerate()
                .any(|(i, e)| i != index && e.email.eq_ignore_ascii_case(email))
        {
            return Err(DirectoryError::DuplicateEmail(email.clone()));
        }

        let employee = &mut employees[index];
        if let Some(manager) = update.reporting_in_charge {
            let manager = normalize_manager(Some(manager));
            if manager.as_deref() == Some(employee.employee_id.as_str()) {
                return Err(DirectoryError::SelfReporting);
            }
            employee.reporting_in_charge = manager;
        }
        if let Some(name) = update.name {
            employee.name = name.trim().to_string();
        }
        if let Some(department) = update.department {
            employee.department = department.trim().to_string();
        }
        if let Some(position) = update.position {
            employee.position = position.trim().to_string();
        }
        if let Some(email) = update.email {
            employee.email = email;
        }
        if let Some(phone) = update.phone {
            employee.phone = phone.trim().to_string();
        }
        if let Some(join_date) = update.join_date {
            employee.join_date = join_date;
        }
        if let Some(status) = update.status {
            employee.status = status;
        }
        let employee = employee.clone();

        self.stores.employees.replace(&employees)?;
        self.notifier.publish(
            Collection::Employees,
            SyncAction::Updated,
            &employee.employee_id,
            Some(&employee),
        );
        Ok(employee)
    }

    /// 删除员工，级联删除其考勤、请假和账号，并结束其当前会话
    pub fn delete_employee(&self, employee_id: &str) -> CommandResponse<Employee> {
        match self.try_delete_employee(employee_id) {
            Ok(employee) => CommandResponse::ok_with_message(
                employee,
                format!("Employee {employee_id} deleted successfully"),
            ),
            Err(e) => {
                tracing::warn!(employee_id, error = %e, "Delete employee rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_delete_employee(&self, employee_id: &str) -> Result<Employee, DirectoryError> {
        let mut employees = self.stores.employees.list()?;
        let index = employees
            .iter()
            .position(|e| e.employee_id == employee_id)
            .ok_or_else(|| DirectoryError::EmployeeNotFound(employee_id.to_string()))?;

        // 依赖集合先写
        let attendance_removed = remove_where(self.stores.attendance.as_ref(), |r: &AttendanceRecord| {
            r.employee_id == employee_id
        })?;
        if attendance_removed > 0 {
            self.notifier
                .publish::<()>(Collection::Attendance, SyncAction::Deleted, employee_id, None);
        }

        let leave_removed = remove_where(self.stores.leave_requests.as_ref(), |r: &LeaveRequest| {
            r.employee_id == employee_id
        })?;
        if leave_removed > 0 {
            self.notifier
                .publish::<()>(Collection::LeaveRequests, SyncAction::Deleted, employee_id, None);
        }

        let accounts_removed = remove_where(self.stores.credentials.as_ref(), |c: &Credential| {
            c.employee_id == employee_id
        })?;
        if accounts_removed > 0 {
            self.notifier
                .publish::<()>(Collection::Users, SyncAction::Deleted, employee_id, None);
        }
        let session_ended = self.sessions.end_for_employee(employee_id)?;

        let employee = employees.remove(index);
        self.stores.employees.replace(&employees)?;
        self.notifier
            .publish::<()>(Collection::Employees, SyncAction::Deleted, employee_id, None);

        tracing::info!(
            employee_id,
            attendance_removed,
            leave_removed,
            accounts_removed,
            session_ended,
            "Employee deleted"
        );
        Ok(employee)
    }

    // ========== Credential commands ==========

    pub fn add_user(&self, payload: CredentialCreate) -> CommandResponse<CredentialView> {
        match self.try_add_user(payload) {
            Ok(view) => {
                tracing::info!(username = %view.username, employee_id = %view.employee_id, "User added");
                CommandResponse::ok_with_message(view, "User added successfully")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Add user rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_add_user(&self, payload: CredentialCreate) -> Result<CredentialView, DirectoryError> {
        let username = payload.username.trim();
        let employee_id = payload.employee_id.trim();
        validate_required_text(username, "Username", MAX_SHORT_TEXT_LEN)?;
        validate_password(&payload.password)?;

        if !self
            .stores
            .employees
            .list()?
            .iter()
            .any(|e| e.employee_id == employee_id)
        {
            return Err(DirectoryError::EmployeeNotFound(employee_id.to_string()));
        }

        let mut credentials = self.stores.credentials.list()?;
        if credentials.iter().any(|c| c.username == username) {
            return Err(DirectoryError::DuplicateUsername(username.to_string()));
        }
        if credentials.iter().any(|c| c.employee_id == employee_id) {
            return Err(DirectoryError::AccountExists(employee_id.to_string()));
        }

        let password_hash = self
            .passwords
            .hash(&payload.password)
            .map_err(|e| DirectoryError::PasswordHash(e.to_string()))?;
        let credential = Credential {
            id: next_sequential_id(credentials.iter().map(|c| c.id)),
            username: username.to_string(),
            password_hash,
            role: payload.role,
            employee_id: employee_id.to_string(),
        };
        let view = CredentialView::from(&credential);
        credentials.push(credential);

        self.stores.credentials.replace(&credentials)?;
        self.notifier
            .publish(Collection::Users, SyncAction::Created, &view.employee_id, Some(&view));
        Ok(view)
    }

    /// 更新账号；密码存在时重新哈希
    pub fn update_user(&self, employee_id: &str, update: CredentialUpdate) -> CommandResponse<CredentialView> {
        match self.try_update_user(employee_id, update) {
            Ok(view) => {
                tracing::info!(employee_id, username = %view.username, "User updated");
                CommandResponse::ok_with_message(view, "User updated successfully")
            }
            Err(e) => {
                tracing::warn!(employee_id, error = %e, "Update user rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_update_user(
        &self,
        employee_id: &str,
        update: CredentialUpdate,
    ) -> Result<CredentialView, DirectoryError> {
        let username = update.username.as_deref().map(str::trim);
        if let Some(username) = username {
            validate_required_text(username, "Username", MAX_SHORT_TEXT_LEN)?;
        }
        if let Some(password) = &update.password {
            validate_password(password)?;
        }

        let mut credentials = self.stores.credentials.list()?;
        let index = credentials
            .iter()
            .position(|c| c.employee_id == employee_id)
            .ok_or_else(|| DirectoryError::UserNotFound(employee_id.to_string()))?;

        if let Some(username) = username
            && credentials
                .iter()
                .enumerate()
                .any(|(i, c)| i != index && c.username == username)
        {
            return Err(DirectoryError::DuplicateUsername(username.to_string()));
        }

        let password_hash = match &update.password {
            Some(password) => Some(
                self.passwords
                    .hash(password)
                    .map_err(|e| DirectoryError::PasswordHash(e.to_string()))?,
            ),
            None => None,
        };

        let credential = &mut credentials[index];
        if let Some(username) = username {
            credential.username = username.to_string();
        }
        if let Some(hash) = password_hash {
            credential.password_hash = hash;
        }
        if let Some(role) = update.role {
            credential.role = role;
        }
        let view = CredentialView::from(&*credential);

        self.stores.credentials.replace(&credentials)?;
        self.notifier
            .publish(Collection::Users, SyncAction::Updated, employee_id, Some(&view));
        Ok(view)
    }

    pub fn delete_user(&self, employee_id: &str) -> CommandResponse<CredentialView> {
        match self.try_delete_user(employee_id) {
            Ok(view) => {
                tracing::info!(employee_id, username = %view.username, "User deleted");
                CommandResponse::ok_with_message(view, "User deleted successfully")
            }
            Err(e) => {
                tracing::warn!(employee_id, error = %e, "Delete user rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_delete_user(&self, employee_id: &str) -> Result<CredentialView, DirectoryError> {
        let mut credentials = self.stores.credentials.list()?;
        let index = credentials
            .iter()
            .position(|c| c.employee_id == employee_id)
            .ok_or_else(|| DirectoryError::UserNotFound(employee_id.to_string()))?;
        let removed = credentials.remove(index);

        self.stores.credentials.replace(&credentials)?;
        self.notifier
            .publish::<()>(Collection::Users, SyncAction::Deleted, employee_id, None);
        Ok(CredentialView::from(&removed))
    }

    /// 新员工入职：员工 + 账号
    ///
    /// 账号创建失败时删除刚加入的员工。
    pub fn onboard(&self, payload: EmployeeCreate, account: NewAccount) -> CommandResponse<UserProfile> {
        match self.try_onboard(payload, account) {
            Ok(profile) => {
                tracing::info!(
                    employee_id = %profile.employee.employee_id,
                    username = ?profile.username,
                    "Employee onboarded"
                );
                CommandResponse::ok_with_message(profile, "Employee and user account created successfully")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Onboarding rejected");
                AppError::from(e).into()
            }
        }
    }

    fn try_onboard(&self, payload: EmployeeCreate, account: NewAccount) -> Result<UserProfile, DirectoryError> {
        // 账号先做不需要写入的检查
        let username = account.username.trim();
        validate_required_text(username, "Username", MAX_SHORT_TEXT_LEN)?;
        validate_password(&account.password)?;
        if self
            .stores
            .credentials
            .list()?
            .iter()
            .any(|c| c.username == username)
        {
            return Err(DirectoryError::DuplicateUsername(username.to_string()));
        }

        let employee = self.try_add_employee(payload)?;
        let create = CredentialCreate {
            username: username.to_string(),
            password: account.password,
            role: account.role,
            employee_id: employee.employee_id.clone(),
        };

        match self.try_add_user(create) {
            Ok(view) => {
                let employees = self.load_employees();
                Ok(UserProfile {
                    username: Some(view.username),
                    role: Some(view.role),
                    reporting_manager: resolve_manager_name(&employees, &employee),
                    employee,
                })
            }
            Err(e) => {
                tracing::warn!(employee_id = %employee.employee_id, error = %e, "Account creation failed, removing employee");
                match remove_where(self.stores.employees.as_ref(), |x: &Employee| {
                    x.employee_id == employee.employee_id
                }) {
                    Ok(_) => {
                        self.notifier.publish::<()>(
                            Collection::Employees,
                            SyncAction::Deleted,
                            &employee.employee_id,
                            None,
                        );
                    }
                    Err(undo) => {
                        tracing::error!(
                            employee_id = %employee.employee_id,
                            error = %undo,
                            "Failed to remove employee after account failure"
                        );
                    }
                }
                Err(e)
            }
        }
    }

    // ========== Queries ==========

    fn load_employees(&self) -> Vec<Employee> {
        self.stores.employees.list().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read employees, showing empty directory");
            Vec::new()
        })
    }

    fn load_credentials(&self) -> Vec<Credential> {
        self.stores.credentials.list().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read users, showing no accounts");
            Vec::new()
        })
    }

    /// 按 id 排序
    pub fn list_employees(&self) -> Vec<Employee> {
        let mut employees = self.load_employees();
        employees.sort_by_key(|e| e.id);
        employees
    }

    pub fn get_employee(&self, employee_id: &str) -> Option<Employee> {
        self.load_employees()
            .into_iter()
            .find(|e| e.employee_id == employee_id)
    }

    /// 账号列表 (不含密码哈希)
    pub fn list_users(&self) -> Vec<CredentialView> {
        self.load_credentials().iter().map(CredentialView::from).collect()
    }

    /// 名字、编号、部门、邮箱，不区分大小写；空字符串返回全部
    pub fn search(&self, term: &str) -> Vec<Employee> {
        let term = term.trim().to_lowercase();
        self.list_employees()
            .into_iter()
            .filter(|e| {
                term.is_empty()
                    || e.name.to_lowercase().contains(&term)
                    || e.employee_id.to_lowercase().contains(&term)
                    || e.department.to_lowercase().contains(&term)
                    || e.email.contains(&term)
            })
            .collect()
    }

    /// 下一个自动编号 (预览用)
    pub fn next_employee_id(&self) -> String {
        generate_employee_id(&self.load_employees())
    }

    /// 某员工上级的名字
    pub fn reporting_manager_name(&self, employee_id: &str) -> String {
        let employees = self.load_employees();
        employees
            .iter()
            .find(|e| e.employee_id == employee_id)
            .map(|employee| resolve_manager_name(&employees, employee))
            .unwrap_or_else(|| NOT_ASSIGNED.to_string())
    }

    /// 直接下属
    pub fn direct_reports(&self, manager_id: &str) -> Vec<Employee> {
        self.list_employees()
            .into_iter()
            .filter(|e| e.reporting_in_charge.as_deref() == Some(manager_id))
            .collect()
    }

    /// 员工 + 账号 join
    pub fn profile(&self, employee_id: &str) -> Option<UserProfile> {
        let employees = self.load_employees();
        let employee = employees.iter().find(|e| e.employee_id == employee_id)?;
        let credential = self
            .load_credentials()
            .into_iter()
            .find(|c| c.employee_id == employee_id);

        Some(UserProfile {
            username: credential.as_ref().map(|c| c.username.clone()),
            role: credential.as_ref().map(|c| c.role),
            reporting_manager: resolve_manager_name(&employees, employee),
            employee: employee.clone(),
        })
    }
}

/// 删除满足条件的记录并写回，返回删除数量；没有匹配时不写入
fn remove_where<T>(
    repo: &dyn Repository<T>,
    predicate: impl Fn(&T) -> bool,
) -> Result<usize, DirectoryError> {
    let mut items = repo.list()?;
    let before = items.len();
    items.retain(|item| !predicate(item));
    let removed = before - items.len();
    if removed > 0 {
        repo.replace(&items)?;
    }
    Ok(removed)
}
