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

//! Audit log pipeline
//!
//! Records are pulled page by page from the backend by [`loader`], then
//! filtered, sorted and paged locally. [`AuditLogViewer`] ties the pieces
//! together for the dashboard and the CLI.

pub mod filter;
pub mod loader;
pub mod pager;
pub mod viewer;

pub use filter::{AuditFilter, apply_filter, parse_date_bound};
pub use loader::{LoadReport, fetch_all};
pub use pager::{AUDIT_PAGE_SIZE, LocalPager};
pub use viewer::{AuditLogViewer, CONNECT_FAILED, FETCH_FAILED};
