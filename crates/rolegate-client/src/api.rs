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

//! Backend API surface
//!
//! [`AdminApi`] is the seam between the view-models and the network. The
//! production implementation is [`crate::http::HttpAdminApi`]; tests plug in
//! in-memory fakes.

use crate::crypto::DEFAULT_PERMISSION_SECRET;
use crate::error::ConsoleResult;
use crate::models::{
    AuditPage, AuditPageCatalog, AuditStats, Employee, Id, LoginResponse, Permission, PermissionPayload, Role, RoleAssignment, RolePayload,
    TokenResponse, UserInfo,
};
use async_trait::async_trait;

/// Which stored credential a request is authenticated with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Token of the admin dashboard session
    Admin,
    /// Service token obtained at login, used by the audit endpoints
    Service,
}

/// RBAC backend operations
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// `GET /admin/validate`
    async fn validate_admin(&self) -> ConsoleResult<()>;

    /// `GET /admin/permissions`
    async fn list_permissions(&self) -> ConsoleResult<Vec<Permission>>;

    /// `POST /admin/permissions`
    async fn create_permission(&self, payload: &PermissionPayload) -> ConsoleResult<()>;

    /// `PUT /admin/permissions/{id}`
    async fn update_permission(&self, id: &Id, payload: &PermissionPayload) -> ConsoleResult<()>;

    /// `DELETE /admin/permissions/{id}`
    async fn delete_permission(&self, id: &Id) -> ConsoleResult<()>;

    /// `GET /admin/roles`
    async fn list_roles(&self) -> ConsoleResult<Vec<Role>>;

    /// `POST /admin/roles`
    async fn create_role(&self, payload: &RolePayload) -> ConsoleResult<()>;

    /// `PUT /admin/roles/{id}`
    async fn update_role(&self, id: &Id, payload: &RolePayload) -> ConsoleResult<()>;

    /// `DELETE /admin/roles/{id}`
    async fn delete_role(&self, id: &Id) -> ConsoleResult<()>;

    /// `GET /api/employees`
    async fn list_employees(&self) -> ConsoleResult<Vec<Employee>>;

    /// `PUT /admin/employees/{id}/roles`
    async fn assign_employee_roles(&self, employee_id: &Id, assignment: &RoleAssignment) -> ConsoleResult<()>;

    /// `DELETE /admin/employees/{id}/roles/{role_id}`
    async fn remove_employee_role(&self, employee_id: &Id, role_id: &Id) -> ConsoleResult<()>;

    /// `GET /api/audit-logs?per_page=&page=`
    async fn audit_page(&self, per_page: u32, page: u32) -> ConsoleResult<AuditPage>;

    /// `GET /api/audit-logs/stats`
    async fn audit_stats(&self) -> ConsoleResult<AuditStats>;

    /// `GET /api/audit-logs/pages`
    async fn audit_page_catalog(&self) -> ConsoleResult<AuditPageCatalog>;

    /// `GET /api/user/permissions`, the plain-text listing
    async fn user_permissions(&self) -> ConsoleResult<Vec<String>>;

    /// `GET /api/user/user_info`, carrying the encrypted permission list
    async fn user_info(&self) -> ConsoleResult<UserInfo>;

    /// Secret the encrypted permission list is keyed with
    fn permission_secret(&self) -> &str {
        DEFAULT_PERMISSION_SECRET
    }

    /// `POST /auth/sso-success`, authenticated with the federated token itself
    async fn exchange_federated_token(&self, federated_token: &str, email: &str) -> ConsoleResult<TokenResponse>;

    /// `POST /auth/login`
    async fn login(&self, email: &str, password: &str) -> ConsoleResult<LoginResponse>;

    /// `POST /auth/logout`
    async fn logout(&self) -> ConsoleResult<()>;
}
