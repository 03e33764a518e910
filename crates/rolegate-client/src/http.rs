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

//! reqwest-backed implementation of [`AdminApi`]

use crate::api::{AdminApi, CredentialKind};
use crate::config::ClientConfig;
use crate::error::{ConsoleError, ConsoleResult, LOGIN_REQUIRED, ServerErrorBody};
use crate::models::{
    AuditPage, AuditPageCatalog, AuditStats, Employee, EmployeeList, Id, LoginResponse, Permission, PermissionPayload, Role, RoleAssignment,
    RolePayload, TokenResponse, UserInfo, UserPermissions,
};
use crate::session::SessionStore;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

/// HTTP client for the RBAC backend.
///
/// Tokens are read from the [`SessionStore`] on every request, so a login in
/// another process is picked up without rebuilding the client.
pub struct HttpAdminApi {
    config: ClientConfig,
    client: Client,
    sessions: SessionStore,
}

impl HttpAdminApi {
    pub fn new(config: ClientConfig, sessions: SessionStore) -> ConsoleResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            config,
            client: builder.build()?,
            sessions,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn token(&self, kind: CredentialKind) -> ConsoleResult<String> {
        match kind {
            CredentialKind::Admin => self
                .sessions
                .admin_token()
                .ok_or_else(|| ConsoleError::missing_credential("Admin session not found. Please log in.")),
            CredentialKind::Service => self.sessions.service_token().ok_or_else(|| ConsoleError::missing_credential(LOGIN_REQUIRED)),
        }
    }

    fn request(&self, method: Method, path: &str, kind: CredentialKind) -> ConsoleResult<RequestBuilder> {
        let token = self.token(kind)?;
        Ok(self.raw_request(method, path).bearer_auth(token))
    }

    fn raw_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.url(path);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn send(&self, builder: RequestBuilder) -> ConsoleResult<Response> {
        let response = builder.send().await?;
        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, kind: CredentialKind) -> ConsoleResult<T> {
        let response = self.send(self.request(Method::GET, path, kind)?).await?;
        decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> ConsoleResult<()> {
        self.send(self.request(method, path, CredentialKind::Admin)?.json(body)).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> ConsoleResult<()> {
        self.send(self.request(Method::DELETE, path, CredentialKind::Admin)?).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`ConsoleError::Api`], keeping the
/// `{error, code}` body when it parses.
async fn check_status(response: Response) -> ConsoleResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let bytes = response.bytes().await.unwrap_or_default();
    let body = serde_json::from_slice::<ServerErrorBody>(&bytes).ok();
    debug!("Request failed with {}: {:?}", status, body);
    Err(ConsoleError::Api {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> ConsoleResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn validate_admin(&self) -> ConsoleResult<()> {
        self.send(self.request(Method::GET, "/admin/validate", CredentialKind::Admin)?).await?;
        Ok(())
    }

    async fn list_permissions(&self) -> ConsoleResult<Vec<Permission>> {
        self.get_json("/admin/permissions", CredentialKind::Admin).await
    }

    async fn create_permission(&self, payload: &PermissionPayload) -> ConsoleResult<()> {
        self.send_json(Method::POST, "/admin/permissions", payload).await
    }

    async fn update_permission(&self, id: &Id, payload: &PermissionPayload) -> ConsoleResult<()> {
        self.send_json(Method::PUT, &format!("/admin/permissions/{}", id), payload).await
    }

    async fn delete_permission(&self, id: &Id) -> ConsoleResult<()> {
        self.delete(&format!("/admin/permissions/{}", id)).await
    }

    async fn list_roles(&self) -> ConsoleResult<Vec<Role>> {
        self.get_json("/admin/roles", CredentialKind::Admin).await
    }

    async fn create_role(&self, payload: &RolePayload) -> ConsoleResult<()> {
        self.send_json(Method::POST, "/admin/roles", payload).await
    }

    async fn update_role(&self, id: &Id, payload: &RolePayload) -> ConsoleResult<()> {
        self.send_json(Method::PUT, &format!("/admin/roles/{}", id), payload).await
    }

    async fn delete_role(&self, id: &Id) -> ConsoleResult<()> {
        self.delete(&format!("/admin/roles/{}", id)).await
    }

    async fn list_employees(&self) -> ConsoleResult<Vec<Employee>> {
        let list: EmployeeList = self.get_json("/api/employees", CredentialKind::Admin).await?;
        Ok(list.employees)
    }

    async fn assign_employee_roles(&self, employee_id: &Id, assignment: &RoleAssignment) -> ConsoleResult<()> {
        self.send_json(Method::PUT, &format!("/admin/employees/{}/roles", employee_id), assignment).await
    }

    async fn remove_employee_role(&self, employee_id: &Id, role_id: &Id) -> ConsoleResult<()> {
        self.delete(&format!("/admin/employees/{}/roles/{}", employee_id, role_id)).await
    }

    async fn audit_page(&self, per_page: u32, page: u32) -> ConsoleResult<AuditPage> {
        let path = if page <= 1 {
            format!("/api/audit-logs?per_page={}", per_page)
        } else {
            format!("/api/audit-logs?per_page={}&page={}", per_page, page)
        };
        self.get_json(&path, CredentialKind::Service).await
    }

    async fn audit_stats(&self) -> ConsoleResult<AuditStats> {
        self.get_json("/api/audit-logs/stats", CredentialKind::Service).await
    }

    async fn audit_page_catalog(&self) -> ConsoleResult<AuditPageCatalog> {
        self.get_json("/api/audit-logs/pages", CredentialKind::Service).await
    }

    async fn user_permissions(&self) -> ConsoleResult<Vec<String>> {
        let body: UserPermissions = self.get_json("/api/user/permissions", CredentialKind::Service).await?;
        Ok(body.permissions)
    }

    async fn user_info(&self) -> ConsoleResult<UserInfo> {
        self.get_json("/api/user/user_info", CredentialKind::Service).await
    }

    fn permission_secret(&self) -> &str {
        &self.config.permission_secret
    }

    async fn exchange_federated_token(&self, federated_token: &str, email: &str) -> ConsoleResult<TokenResponse> {
        let builder = self
            .raw_request(Method::POST, "/auth/sso-success")
            .bearer_auth(federated_token)
            .json(&json!({ "email": email }));
        decode(self.send(builder).await?).await
    }

    async fn login(&self, email: &str, password: &str) -> ConsoleResult<LoginResponse> {
        let builder = self
            .raw_request(Method::POST, "/auth/login")
            .json(&json!({ "email": email, "password": password }));
        decode(self.send(builder).await?).await
    }

    async fn logout(&self) -> ConsoleResult<()> {
        let mut builder = self.raw_request(Method::POST, "/auth/logout");
        if let Some(token) = self.sessions.service_token() {
            builder = builder.bearer_auth(token);
        }
        self.send(builder).await?;
        Ok(())
    }
}
