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

//! Client library for the rolegate RBAC administration console
//!
//! Holds the typed REST client, the credential stores, the permission gate,
//! the audit log pipeline and one view-model per admin tab. Front ends (the
//! `rolegate` CLI and its dashboard) drive these types and render their state.

pub mod admin;
pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod http;
pub mod models;
pub mod permission_gate;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{AdminApi, CredentialKind};
pub use config::ClientConfig;
pub use error::{ConsoleError, ConsoleResult, ErrorCode};
pub use http::HttpAdminApi;
pub use permission_gate::{AUDIT_LOG_VIEW, PermissionGate};
pub use session::{AdminSession, GuardOutcome, ServiceCredential, SessionStore, guard_admin};
