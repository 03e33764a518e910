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

//! Modal state shared by the CRUD tabs

use crate::models::Id;

/// What the tab's modal is currently showing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewState<F> {
    #[default]
    Closed,
    Creating(F),
    Editing(Id, F),
    /// Waiting for the user to confirm deleting this entity
    ConfirmingDelete(Id),
}

impl<F> ViewState<F> {
    pub fn is_closed(&self) -> bool {
        matches!(self, ViewState::Closed)
    }

    /// Form being filled in, if the modal is a create or edit form
    pub fn form(&self) -> Option<&F> {
        match self {
            ViewState::Creating(form) | ViewState::Editing(_, form) => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut F> {
        match self {
            ViewState::Creating(form) | ViewState::Editing(_, form) => Some(form),
            _ => None,
        }
    }
}
