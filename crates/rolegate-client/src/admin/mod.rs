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

//! View-models for the admin dashboard tabs
//!
//! Each controller owns a refetchable copy of its collection, a search term,
//! an explicit [`ViewState`] for its modal and a [`NoticeBoard`] for errors.
//! Submissions are sequential: one request, then a full refetch on success.

pub mod employees;
pub mod form;
pub mod notice;
pub mod permissions;
pub mod roles;

pub use employees::{EmployeeView, EmployeesController, RoleFilter};
pub use form::ViewState;
pub use notice::{NoticeBoard, TOAST_DURATION, Toast};
pub use permissions::{PermissionForm, PermissionsController};
pub use roles::{RoleForm, RolesController};

use crate::error::{ConsoleError, NETWORK_ERROR};

/// Case-insensitive substring match; an empty term matches everything
pub fn matches_search(field: Option<&str>, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    field.is_some_and(|f| f.to_lowercase().contains(&term.to_lowercase()))
}

/// Banner text for a failed list fetch.
///
/// List failures show the tab's fixed message; only a dead connection reads
/// differently.
pub(crate) fn list_failure(err: &ConsoleError, fallback: &str) -> String {
    match err {
        ConsoleError::Transport(_) => NETWORK_ERROR.to_string(),
        ConsoleError::MissingCredential { message } => message.clone(),
        _ => fallback.to_string(),
    }
}
