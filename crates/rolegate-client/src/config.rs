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

//! Client configuration

use crate::crypto::DEFAULT_PERMISSION_SECRET;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest `per_page` the audit endpoint accepts
pub const MAX_AUDIT_PAGE_SIZE: u32 = 100;

/// Configuration for the HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash
    pub base_url: String,

    /// Per-request timeout; `None` leaves requests unbounded
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Page size used when draining `/api/audit-logs`
    #[serde(default = "default_audit_fetch_size")]
    pub audit_fetch_size: u32,

    /// Secret the backend keys encrypted permission lists with
    #[serde(default = "default_permission_secret")]
    pub permission_secret: String,
}

fn default_audit_fetch_size() -> u32 {
    MAX_AUDIT_PAGE_SIZE
}

fn default_permission_secret() -> String {
    DEFAULT_PERMISSION_SECRET.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: None,
            audit_fetch_size: MAX_AUDIT_PAGE_SIZE,
            permission_secret: default_permission_secret(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Fetch size clamped to what the backend accepts
    pub fn effective_audit_fetch_size(&self) -> u32 {
        self.audit_fetch_size.clamp(1, MAX_AUDIT_PAGE_SIZE)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
