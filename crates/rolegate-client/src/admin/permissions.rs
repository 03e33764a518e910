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

//! Permissions tab

use super::form::ViewState;
use super::notice::NoticeBoard;
use super::{list_failure, matches_search};
use crate::api::AdminApi;
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{Id, Permission, PermissionPayload};
use std::time::Instant;
use tracing::{error, info};

const FETCH_FAILED: &str = "Failed to fetch permissions";
const SAVE_FAILED: &str = "Failed to save permission";
const DELETE_FAILED: &str = "Failed to delete permission";

/// Editable fields of a permission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionForm {
    pub permission_name: String,
    pub permission_description: String,
}

impl PermissionForm {
    pub fn from_permission(permission: &Permission) -> Self {
        Self {
            permission_name: permission.permission_name.clone(),
            permission_description: permission.permission_description.clone().unwrap_or_default(),
        }
    }

    /// Validated request body
    pub fn payload(&self) -> ConsoleResult<PermissionPayload> {
        let name = self.permission_name.trim();
        if name.is_empty() {
            return Err(ConsoleError::validation("Permission name is required"));
        }
        Ok(PermissionPayload {
            permission_name: name.to_string(),
            permission_description: self.permission_description.trim().to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct PermissionsController {
    permissions: Vec<Permission>,
    search: String,
    view: ViewState<PermissionForm>,
    submitting: bool,
    loading: bool,
    notices: NoticeBoard,
}

impl PermissionsController {
    pub fn new(notices: NoticeBoard) -> Self {
        Self {
            notices,
            ..Default::default()
        }
    }

    /// Fetch the permission list; a failure keeps the old list and raises a
    /// banner, a success clears it
    pub async fn load(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        self.loading = true;
        let result = api.list_permissions().await;
        self.loading = false;
        match result {
            Ok(permissions) => {
                self.permissions = permissions;
                self.notices.dismiss_banner();
                Ok(())
            }
            Err(e) => {
                error!("Failed to fetch permissions: {}", e);
                self.notices.banner(list_failure(&e, FETCH_FAILED));
                Err(e)
            }
        }
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

    /// Permissions whose name contains the search term
    pub fn filtered(&self) -> Vec<&Permission> {
        self.permissions
            .iter()
            .filter(|p| matches_search(Some(&p.permission_name), &self.search))
            .collect()
    }

    pub fn find(&self, id: &Id) -> Option<&Permission> {
        self.permissions.iter().find(|p| &p.id == id)
    }

    pub fn view(&self) -> &ViewState<PermissionForm> {
        &self.view
    }

    pub fn form_mut(&mut self) -> Option<&mut PermissionForm> {
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
        self.notices.dismiss_toast();
        self.view = ViewState::Creating(PermissionForm::default());
    }

    /// Open the edit form pre-filled from the permission; false if unknown
    pub fn open_edit(&mut self, id: &Id) -> bool {
        let Some(permission) = self.find(id) else {
            return false;
        };
        let form = PermissionForm::from_permission(permission);
        self.notices.dismiss_toast();
        self.view = ViewState::Editing(id.clone(), form);
        true
    }

    pub fn cancel(&mut self) {
        self.view = ViewState::Closed;
    }

    /// Send the open form.
    ///
    /// Validation failures never reach the backend. On success the modal
    /// closes and the list is refetched; on failure the form stays open.
    pub async fn submit(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        let (target, payload) = match &self.view {
            ViewState::Creating(form) => (None, form.payload()),
            ViewState::Editing(id, form) => (Some(id.clone()), form.payload()),
            _ => return Err(ConsoleError::validation("No permission form is open")),
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
            Some(id) => api.update_permission(id, &payload).await,
            None => api.create_permission(&payload).await,
        };
        self.submitting = false;

        match result {
            Ok(()) => {
                info!("Saved permission '{}'", payload.permission_name);
                self.view = ViewState::Closed;
                self.load(api).await
            }
            Err(e) => {
                error!("Failed to save permission: {}", e);
                self.notices.toast(e.user_message(SAVE_FAILED));
                Err(e)
            }
        }
    }

    /// Ask for confirmation before deleting; false if unknown
    pub fn request_delete(&mut self, id: &Id) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.view = ViewState::ConfirmingDelete(id.clone());
        true
    }

    /// Delete the entity awaiting confirmation
    pub async fn confirm_delete(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        let ViewState::ConfirmingDelete(id) = &self.view else {
            return Err(ConsoleError::validation("No deletion is awaiting confirmation"));
        };
        let id = id.clone();
        self.view = ViewState::Closed;

        match api.delete_permission(&id).await {
            Ok(()) => {
                info!("Deleted permission {}", id);
                self.load(api).await
            }
            Err(e) => {
                error!("Failed to delete permission {}: {}", id, e);
                self.notices.banner(e.user_message(DELETE_FAILED));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    async fn loaded(api: &MockBackend) -> PermissionsController {
        let mut controller = PermissionsController::default();
        controller.load(api).await.unwrap();
        controller
    }

    #[tokio::test]
    async fn search_matches_names_only() {
        let api = MockBackend::new();
        api.add_permission("employee-edit");
        api.add_permission("audit-log-view");
        api.add_permission("Employee-Delete");

        let mut controller = loaded(&api).await;
        controller.set_search("EMPLOYEE");
        let names: Vec<&str> = controller.filtered().iter().map(|p| p.permission_name.as_str()).collect();
        assert_eq!(names, vec!["employee-edit", "Employee-Delete"]);

        // descriptions are "Allows ..." and are not searched
        controller.set_search("allows");
        assert!(controller.filtered().is_empty());
    }

    #[tokio::test]
    async fn create_closes_form_and_refetches() {
        let api = MockBackend::new();
        let mut controller = loaded(&api).await;

        controller.open_create();
        let form = controller.form_mut().unwrap();
        form.permission_name = "  report-export ".to_string();
        form.permission_description = "Export reports".to_string();
        controller.submit(&api).await.unwrap();

        assert!(controller.view().is_closed());
        assert_eq!(api.calls("list_permissions"), 2);
        assert_eq!(controller.permissions()[0].permission_name, "report-export");
    }

    #[tokio::test]
    async fn blank_name_is_rejected_locally() {
        let api = MockBackend::new();
        let mut controller = loaded(&api).await;

        controller.open_create();
        controller.form_mut().unwrap().permission_name = "   ".to_string();
        let before = api.total_calls();
        assert!(matches!(controller.submit(&api).await, Err(ConsoleError::Validation { .. })));
        assert_eq!(api.total_calls(), before);
        assert_eq!(controller.notices().current_toast(), Some("Permission name is required"));
        assert!(!controller.view().is_closed());
    }

    #[tokio::test]
    async fn failed_update_keeps_form_open_with_server_message() {
        let api = MockBackend::new();
        let id = api.add_permission("employee-edit");
        let mut controller = loaded(&api).await;

        assert!(controller.open_edit(&id));
        assert_eq!(controller.view().form().unwrap().permission_name, "employee-edit");
        controller.form_mut().unwrap().permission_name = "audit-log-view".to_string();

        api.fail_next_with("update_permission", 409, Some("Permission name already exists"), None);
        assert!(controller.submit(&api).await.is_err());
        assert_eq!(controller.notices().current_toast(), Some("Permission name already exists"));
        assert!(matches!(controller.view(), ViewState::Editing(..)));
        assert_eq!(controller.permissions()[0].permission_name, "employee-edit");
        assert_eq!(api.calls("list_permissions"), 1);
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let api = MockBackend::new();
        let id = api.add_permission("employee-edit");
        let mut controller = loaded(&api).await;

        assert!(controller.confirm_delete(&api).await.is_err());
        assert_eq!(api.calls("delete_permission"), 0);

        assert!(controller.request_delete(&id));
        controller.confirm_delete(&api).await.unwrap();
        assert!(controller.permissions().is_empty());
    }

    #[tokio::test]
    async fn list_failure_raises_fixed_banner() {
        let api = MockBackend::new();
        api.fail_next_with("list_permissions", 500, Some("db down"), None);
        let mut controller = PermissionsController::default();
        assert!(controller.load(&api).await.is_err());
        assert_eq!(controller.notices().current_banner(), Some(FETCH_FAILED));
    }

    #[tokio::test]
    async fn successful_reload_clears_banner() {
        let api = MockBackend::new();
        api.add_permission("employee-edit");
        api.fail_next("list_permissions");
        let mut controller = PermissionsController::default();
        assert!(controller.load(&api).await.is_err());
        assert_eq!(controller.notices().current_banner(), Some(FETCH_FAILED));

        controller.load(&api).await.unwrap();
        assert_eq!(controller.notices().current_banner(), None);
        assert_eq!(controller.permissions().len(), 1);
    }
}
