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

//! Roles tab

use super::form::ViewState;
use super::notice::NoticeBoard;
use super::{list_failure, matches_search};
use crate::api::AdminApi;
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{Id, Permission, Role, RolePayload};
use std::time::Instant;
use tracing::{error, info};

const FETCH_FAILED: &str = "Failed to fetch data";
const SAVE_FAILED: &str = "Failed to save role";
const DELETE_FAILED: &str = "Failed to delete role";

/// Editable fields of a role, including its full permission selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleForm {
    pub role_name: String,
    pub role_description: String,
    pub permission_ids: Vec<Id>,
}

impl RoleForm {
    pub fn from_role(role: &Role) -> Self {
        Self {
            role_name: role.role_name.clone(),
            role_description: role.role_description.clone().unwrap_or_default(),
            permission_ids: role.permission_ids(),
        }
    }

    pub fn is_selected(&self, id: &Id) -> bool {
        self.permission_ids.contains(id)
    }

    pub fn toggle(&mut self, id: &Id) {
        if let Some(pos) = self.permission_ids.iter().position(|p| p == id) {
            self.permission_ids.remove(pos);
        } else {
            self.permission_ids.push(id.clone());
        }
    }

    /// Validated request body; the permission list is sent in full
    pub fn payload(&self) -> ConsoleResult<RolePayload> {
        let name = self.role_name.trim();
        if name.is_empty() {
            return Err(ConsoleError::validation("Role name is required"));
        }
        Ok(RolePayload {
            role_name: name.to_string(),
            role_description: self.role_description.trim().to_string(),
            permission_ids: self.permission_ids.clone(),
        })
    }
}

#[derive(Debug, Default)]
pub struct RolesController {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    search: String,
    picker_search: String,
    view: ViewState<RoleForm>,
    submitting: bool,
    loading: bool,
    notices: NoticeBoard,
}

impl RolesController {
    pub fn new(notices: NoticeBoard) -> Self {
        Self {
            notices,
            ..Default::default()
        }
    }

    /// Fetch roles, then permissions; both must succeed
    pub async fn load(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        self.loading = true;
        let result = async {
            let roles = api.list_roles().await?;
            let permissions = api.list_permissions().await?;
            Ok::<_, ConsoleError>((roles, permissions))
        }
        .await;
        self.loading = false;

        match result {
            Ok((roles, permissions)) => {
                self.roles = roles;
                self.permissions = permissions;
                self.notices.dismiss_banner();
                Ok(())
            }
            Err(e) => {
                error!("Failed to fetch roles data: {}", e);
                self.notices.banner(list_failure(&e, FETCH_FAILED));
                Err(e)
            }
        }
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Roles whose name or description contains the search term
    pub fn filtered(&self) -> Vec<&Role> {
        self.roles
            .iter()
            .filter(|r| matches_search(Some(&r.role_name), &self.search) || matches_search(r.role_description.as_deref(), &self.search))
            .collect()
    }

    pub fn find(&self, id: &Id) -> Option<&Role> {
        self.roles.iter().find(|r| &r.id == id)
    }

    pub fn picker_search(&self) -> &str {
        &self.picker_search
    }

    pub fn set_picker_search(&mut self, term: impl Into<String>) {
        self.picker_search = term.into();
    }

    /// Permissions offered in the role form, narrowed by the picker search
    pub fn picker_permissions(&self) -> Vec<&Permission> {
        self.permissions
            .iter()
            .filter(|p| matches_search(Some(&p.permission_name), &self.picker_search))
            .collect()
    }

    pub fn toggle_permission(&mut self, id: &Id) {
        if let Some(form) = self.view.form_mut() {
            form.toggle(id);
        }
    }

    /// Replace the selection with every permission the picker currently shows
    pub fn select_all_filtered(&mut self) {
        let ids: Vec<Id> = self.picker_permissions().iter().map(|p| p.id.clone()).collect();
        if let Some(form) = self.view.form_mut() {
            form.permission_ids = ids;
        }
    }

    pub fn deselect_all(&mut self) {
        if let Some(form) = self.view.form_mut() {
            form.permission_ids.clear();
        }
    }

    pub fn view(&self) -> &ViewState<RoleForm> {
        &self.view
    }

    pub fn form_mut(&mut self) -> Option<&mut RoleForm> {
        self.view.form_mut()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    pub fn tick(&mut self, now: Instant) {
        self.notices.tick(now);
    }

    pub fn open_create(&mut self) {
        self.picker_search.clear();
        self.notices.dismiss_toast();
        self.view = ViewState::Creating(RoleForm::default());
    }

    pub fn open_edit(&mut self, id: &Id) -> bool {
        let Some(role) = self.find(id) else {
            return false;
        };
        let form = RoleForm::from_role(role);
        self.picker_search.clear();
        self.notices.dismiss_toast();
        self.view = ViewState::Editing(id.clone(), form);
        true
    }

    pub fn cancel(&mut self) {
        self.view = ViewState::Closed;
    }

    pub async fn submit(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        let (target, payload) = match &self.view {
            ViewState::Creating(form) => (None, form.payload()),
            ViewState::Editing(id, form) => (Some(id.clone()), form.payload()),
            _ => return Err(ConsoleError::validation("No role form is open")),
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                self.notices.toast(e.user_message(SAVE_FAILED));
                return Err(e);
            }
        };

        self.submitting = true;
        let result = match &target {
            Some(id) => api.update_role(id, &payload).await,
            None => api.create_role(&payload).await,
        };
        self.submitting = false;

        match result {
            Ok(()) => {
                info!("Saved role '{}' with {} permissions", payload.role_name, payload.permission_ids.len());
                self.view = ViewState::Closed;
                self.load(api).await
            }
            Err(e) => {
                error!("Failed to save role: {}", e);
                self.notices.toast(e.user_message(SAVE_FAILED));
                Err(e)
            }
        }
    }

    pub fn request_delete(&mut self, id: &Id) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.view = ViewState::ConfirmingDelete(id.clone());
        true
    }

    pub async fn confirm_delete(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        let ViewState::ConfirmingDelete(id) = &self.view else {
            return Err(ConsoleError::validation("No deletion is awaiting confirmation"));
        };
        let id = id.clone();
        self.view = ViewState::Closed;

        match api.delete_role(&id).await {
            Ok(()) => {
                info!("Deleted role {}", id);
                self.load(api).await
            }
            Err(e) => {
                error!("Failed to delete role {}: {}", id, e);
                self.notices.banner(e.user_message(DELETE_FAILED));
                Err(e)
            }
        }
    }
}
