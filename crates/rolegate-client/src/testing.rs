// Rolegate
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! In-memory backend used by the unit tests

use crate::api::AdminApi;
use crate::error::{ConsoleError, ConsoleResult, ServerErrorBody};
use crate::models::{
    ActionKind, AuditLogEntry, AuditPage, AuditPageCatalog, AuditStats, Employee, EmployeeRole, Id, LoginResponse, Pagination, Permission,
    PermissionPayload, Role, RoleAssignment, RolePayload, TokenResponse, UserInfo,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    permissions: Vec<Permission>,
    roles: Vec<Role>,
    employees: Vec<Employee>,
    audit_pages: Vec<Vec<AuditLogEntry>>,
    stats: AuditStats,
    catalog: Vec<String>,
    user_permissions: Vec<String>,
    next_id: i64,
    calls: HashMap<String, usize>,
    audit_requests: Vec<u32>,
    failures: HashMap<String, (u16, ServerErrorBody, bool)>,
    failing_audit_pages: HashSet<u32>,
    wire_pages: HashMap<u32, serde_json::Value>,
    user_info: Option<UserInfo>,
    missing_credential: HashSet<String>,
}

impl State {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        Id::Num(self.next_id)
    }

    fn resolve_permissions(&self, ids: &[Id]) -> Vec<Permission> {
        ids.iter()
            .filter_map(|id| self.permissions.iter().find(|p| &p.id == id).cloned())
            .collect()
    }
}

/// Mock RBAC backend keeping its tables in memory
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<State>,
}

fn not_found(what: &str) -> ConsoleError {
    ConsoleError::Api {
        status: 404,
        body: Some(ServerErrorBody {
            error: Some(format!("{} not found", what)),
            code: None,
        }),
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Count the call and apply any injected failure
    fn enter(&self, op: &str) -> ConsoleResult<MutexGuard<'_, State>> {
        let mut state = self.lock();
        *state.calls.entry(op.to_string()).or_default() += 1;
        if state.missing_credential.remove(op) {
            return Err(ConsoleError::missing_credential("no service token"));
        }
        if let Some((status, body, persistent)) = state.failures.get(op).cloned() {
            if !persistent {
                state.failures.remove(op);
            }
            return Err(ConsoleError::Api { status, body: Some(body) });
        }
        Ok(state)
    }

    pub fn calls(&self, op: &str) -> usize {
        self.lock().calls.get(op).copied().unwrap_or(0)
    }

    /// Total number of calls that could have touched the network
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    pub fn fail_next(&self, op: &str) {
        self.fail_next_with(op, 500, Some("boom"), None);
    }

    pub fn fail_next_with(&self, op: &str, status: u16, error: Option<&str>, code: Option<&str>) {
        self.set_failure(op, status, error, code, false);
    }

    pub fn fail_always_with(&self, op: &str, status: u16, error: Option<&str>, code: Option<&str>) {
        self.set_failure(op, status, error, code, true);
    }

    fn set_failure(&self, op: &str, status: u16, error: Option<&str>, code: Option<&str>, persistent: bool) {
        let body = ServerErrorBody {
            error: error.map(str::to_string),
            code: code.map(str::to_string),
        };
        self.lock().failures.insert(op.to_string(), (status, body, persistent));
    }

    /// Fail the next `op` as if no token were stored
    pub fn fail_next_missing_credential(&self, op: &str) {
        self.lock().missing_credential.insert(op.to_string());
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn add_permission(&self, name: &str) -> Id {
        let mut state = self.lock();
        let id = state.next_id();
        state.permissions.push(Permission {
            id: id.clone(),
            permission_name: name.to_string(),
            permission_description: Some(format!("Allows {}", name)),
            created_at: None,
        });
        id
    }

    pub fn add_role(&self, name: &str, permission_ids: &[Id]) -> Id {
        let mut state = self.lock();
        let id = state.next_id();
        let permissions = state.resolve_permissions(permission_ids);
        state.roles.push(Role {
            id: id.clone(),
            role_name: name.to_string(),
            role_description: None,
            created_at: None,
            permissions,
        });
        id
    }

    pub fn add_employee(&self, first: &str, last: &str, email: &str, code: &str, role: Option<&Id>) -> Id {
        let mut state = self.lock();
        let id = state.next_id();
        let role = role.map(|rid| EmployeeRole {
            id: rid.clone(),
            role_name: state.roles.iter().find(|r| &r.id == rid).map(|r| r.role_name.clone()),
        });
        state.employees.push(Employee {
            id: id.clone(),
            employee_id: Some(code.to_string()),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            email: Some(email.to_string()),
            role,
        });
        id
    }

    pub fn role(&self, id: &Id) -> Option<Role> {
        self.lock().roles.iter().find(|r| &r.id == id).cloned()
    }

    pub fn employee(&self, id: &Id) -> Option<Employee> {
        self.lock().employees.iter().find(|e| &e.id == id).cloned()
    }

    pub fn set_audit_pages(&self, pages: Vec<Vec<AuditLogEntry>>) {
        self.lock().audit_pages = pages;
    }

    /// Serve `page` from a raw response body instead of the stored records
    pub fn set_wire_page(&self, page: u32, body: serde_json::Value) {
        self.lock().wire_pages.insert(page, body);
    }

    pub fn fail_audit_page(&self, page: u32) {
        self.lock().failing_audit_pages.insert(page);
    }

    /// Page numbers requested from the audit endpoint, in order
    pub fn audit_requests(&self) -> Vec<u32> {
        self.lock().audit_requests.clone()
    }

    pub fn set_stats(&self, stats: AuditStats) {
        self.lock().stats = stats;
    }

    pub fn set_catalog(&self, pages: &[&str]) {
        self.lock().catalog = pages.iter().map(|p| p.to_string()).collect();
    }

    pub fn set_user_permissions(&self, permissions: &[&str]) {
        self.lock().user_permissions = permissions.iter().map(|p| p.to_string()).collect();
    }

    /// Profile served by `user_info`; without one the endpoint answers 404
    pub fn set_user_info(&self, email: &str, encrypted_permissions: Option<String>) {
        self.lock().user_info = Some(UserInfo {
            email: Some(email.to_string()),
            name: None,
            encrypted_permissions,
        });
    }
}

/// Audit record with the fields the pipeline looks at
pub fn audit_entry(id: i64, kind: ActionKind, page: &str, timestamp: &str) -> AuditLogEntry {
    AuditLogEntry {
        id: Id::Num(id),
        user_name: Some("Ana".to_string()),
        user_email: Some("ana@acme.io".to_string()),
        action_page: Some(page.to_string()),
        action_performed: kind,
        timestamp: timestamp.parse::<DateTime<Utc>>().unwrap(),
    }
}

#[async_trait]
impl AdminApi for MockBackend {
    async fn validate_admin(&self) -> ConsoleResult<()> {
        self.enter("validate")?;
        Ok(())
    }

    async fn list_permissions(&self) -> ConsoleResult<Vec<Permission>> {
        Ok(self.enter("list_permissions")?.permissions.clone())
    }

    async fn create_permission(&self, payload: &PermissionPayload) -> ConsoleResult<()> {
        let mut state = self.enter("create_permission")?;
        let id = state.next_id();
        state.permissions.push(Permission {
            id,
            permission_name: payload.permission_name.clone(),
            permission_description: Some(payload.permission_description.clone()),
            created_at: None,
        });
        Ok(())
    }

    async fn update_permission(&self, id: &Id, payload: &PermissionPayload) -> ConsoleResult<()> {
        let mut state = self.enter("update_permission")?;
        let permission = state.permissions.iter_mut().find(|p| &p.id == id).ok_or_else(|| not_found("Permission"))?;
        permission.permission_name = payload.permission_name.clone();
        permission.permission_description = Some(payload.permission_description.clone());
        Ok(())
    }

    async fn delete_permission(&self, id: &Id) -> ConsoleResult<()> {
        let mut state = self.enter("delete_permission")?;
        let before = state.permissions.len();
        state.permissions.retain(|p| &p.id != id);
        if state.permissions.len() == before {
            return Err(not_found("Permission"));
        }
        Ok(())
    }

    async fn list_roles(&self) -> ConsoleResult<Vec<Role>> {
        Ok(self.enter("list_roles")?.roles.clone())
    }

    async fn create_role(&self, payload: &RolePayload) -> ConsoleResult<()> {
        let mut state = self.enter("create_role")?;
        let id = state.next_id();
        let permissions = state.resolve_permissions(&payload.permission_ids);
        state.roles.push(Role {
            id,
            role_name: payload.role_name.clone(),
            role_description: Some(payload.role_description.clone()),
            created_at: None,
            permissions,
        });
        Ok(())
    }

    async fn update_role(&self, id: &Id, payload: &RolePayload) -> ConsoleResult<()> {
        let mut state = self.enter("update_role")?;
        let permissions = state.resolve_permissions(&payload.permission_ids);
        let role = state.roles.iter_mut().find(|r| &r.id == id).ok_or_else(|| not_found("Role"))?;
        role.role_name = payload.role_name.clone();
        role.role_description = Some(payload.role_description.clone());
        role.permissions = permissions;
        Ok(())
    }

    async fn delete_role(&self, id: &Id) -> ConsoleResult<()> {
        let mut state = self.enter("delete_role")?;
        let before = state.roles.len();
        state.roles.retain(|r| &r.id != id);
        if state.roles.len() == before {
            return Err(not_found("Role"));
        }
        Ok(())
    }

    async fn list_employees(&self) -> ConsoleResult<Vec<Employee>> {
        Ok(self.enter("list_employees")?.employees.clone())
    }

    async fn assign_employee_roles(&self, employee_id: &Id, assignment: &RoleAssignment) -> ConsoleResult<()> {
        let mut state = self.enter("assign_roles")?;
        let role = match assignment.role_ids.first() {
            Some(rid) => {
                let role = state.roles.iter().find(|r| &r.id == rid).ok_or_else(|| not_found("Role"))?;
                Some(EmployeeRole {
                    id: role.id.clone(),
                    role_name: Some(role.role_name.clone()),
                })
            }
            None => None,
        };
        let employee = state.employees.iter_mut().find(|e| &e.id == employee_id).ok_or_else(|| not_found("Employee"))?;
        employee.role = role;
        Ok(())
    }

    async fn remove_employee_role(&self, employee_id: &Id, role_id: &Id) -> ConsoleResult<()> {
        let mut state = self.enter("remove_role")?;
        let employee = state.employees.iter_mut().find(|e| &e.id == employee_id).ok_or_else(|| not_found("Employee"))?;
        if employee.role_id() != Some(role_id) {
            return Err(not_found("Role assignment"));
        }
        employee.role = None;
        Ok(())
    }

    async fn audit_page(&self, per_page: u32, page: u32) -> ConsoleResult<AuditPage> {
        let mut state = self.enter("audit_page")?;
        state.audit_requests.push(page);
        if state.failing_audit_pages.contains(&page) {
            return Err(ConsoleError::Api { status: 500, body: None });
        }
        if let Some(body) = state.wire_pages.get(&page) {
            return Ok(serde_json::from_value(body.clone())?);
        }
        let total_pages = state.audit_pages.len().max(1) as u32;
        let total_count = state.audit_pages.iter().map(Vec::len).sum::<usize>() as u64;
        let records = state.audit_pages.get(page.saturating_sub(1) as usize).cloned().unwrap_or_default();
        Ok(AuditPage {
            audit_logs: records,
            pagination: Some(Pagination {
                total_count,
                total_pages,
                current_page: Some(page),
                per_page: Some(per_page),
            }),
        })
    }

    async fn audit_stats(&self) -> ConsoleResult<AuditStats> {
        Ok(self.enter("audit_stats")?.stats.clone())
    }

    async fn audit_page_catalog(&self) -> ConsoleResult<AuditPageCatalog> {
        Ok(AuditPageCatalog {
            pages: self.enter("audit_pages")?.catalog.clone(),
        })
    }

    async fn user_permissions(&self) -> ConsoleResult<Vec<String>> {
        Ok(self.enter("user_permissions")?.user_permissions.clone())
    }

    async fn user_info(&self) -> ConsoleResult<UserInfo> {
        self.enter("user_info")?.user_info.clone().ok_or_else(|| not_found("User"))
    }

    async fn exchange_federated_token(&self, _federated_token: &str, email: &str) -> ConsoleResult<TokenResponse> {
        self.enter("exchange")?;
        Ok(TokenResponse {
            token: Some(format!("service-token-for-{}", email)),
        })
    }

    async fn login(&self, email: &str, password: &str) -> ConsoleResult<LoginResponse> {
        self.enter("login")?;
        if password != "secret" {
            return Err(ConsoleError::Api {
                status: 401,
                body: Some(ServerErrorBody {
                    error: Some("Invalid credentials".to_string()),
                    code: None,
                }),
            });
        }
        Ok(LoginResponse {
            token: Some(format!("service-token-for-{}", email)),
            user: Some(serde_json::json!({ "email": email })),
        })
    }

    async fn logout(&self) -> ConsoleResult<()> {
        self.enter("logout")?;
        Ok(())
    }
}
