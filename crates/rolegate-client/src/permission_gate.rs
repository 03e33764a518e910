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

//! Capability lookups for the signed-in user

use crate::api::AdminApi;
use crate::crypto::decrypt_permissions;
use crate::error::{ConsoleError, ConsoleResult};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Capability required to open the audit log
pub const AUDIT_LOG_VIEW: &str = "audit-log-view";

/// Cached set of permission names held by the current user.
///
/// The set is fetched once and reused until [`PermissionGate::load`] is called
/// with `force`.
#[derive(Debug, Default)]
pub struct PermissionGate {
    permissions: HashSet<String>,
    loaded: bool,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fetch the user's permissions unless they are already cached.
    ///
    /// The encrypted list from `user_info` is preferred; the plain listing is
    /// used when that endpoint fails or its payload does not decrypt. A
    /// missing credential yields an empty set instead of an error.
    pub async fn load(&mut self, api: &dyn AdminApi, force: bool) -> ConsoleResult<()> {
        if self.loaded && !force {
            return Ok(());
        }
        match fetch_permission_names(api).await {
            Ok(names) => {
                debug!("Loaded {} user permissions", names.len());
                self.permissions = names.into_iter().collect();
                self.loaded = true;
                Ok(())
            }
            Err(ConsoleError::MissingCredential { .. }) => {
                self.permissions.clear();
                self.loaded = true;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load user permissions: {}", e);
                self.permissions.clear();
                Err(e)
            }
        }
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }

    pub fn has_any_permission(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has_permission(n))
    }

    pub fn has_all_permissions(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.has_permission(n))
    }

    /// Ok when `name` is held, [`ConsoleError::AccessDenied`] otherwise
    pub fn require(&self, name: &str) -> ConsoleResult<()> {
        if self.has_permission(name) {
            Ok(())
        } else {
            Err(ConsoleError::AccessDenied { permission: name.to_string() })
        }
    }

    pub fn permissions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.permissions.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

async fn fetch_permission_names(api: &dyn AdminApi) -> ConsoleResult<Vec<String>> {
    match api.user_info().await {
        Ok(info) => match (info.encrypted_permissions.as_deref(), info.email.as_deref()) {
            (Some(sealed), Some(email)) => match decrypt_permissions(sealed, email, api.permission_secret()) {
                Ok(names) => return Ok(names),
                Err(e) => warn!("Encrypted permissions unreadable, using plain listing: {}", e),
            },
            _ => debug!("user_info carried no encrypted permissions"),
        },
        Err(e @ ConsoleError::MissingCredential { .. }) => return Err(e),
        Err(e) => debug!("user_info unavailable, using plain listing: {}", e),
    }
    api.user_permissions().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{DEFAULT_PERMISSION_SECRET, encrypt_permissions};
    use crate::testing::MockBackend;

    #[tokio::test]
    async fn caches_until_forced() {
        let api = MockBackend::new();
        api.set_user_permissions(&[AUDIT_LOG_VIEW, "employee-edit"]);

        let mut gate = PermissionGate::new();
        gate.load(&api, false).await.unwrap();
        gate.load(&api, false).await.unwrap();
        assert_eq!(api.calls("user_permissions"), 1);

        assert!(gate.has_permission(AUDIT_LOG_VIEW));
        assert!(gate.has_any_permission(&["nope", "employee-edit"]));
        assert!(gate.has_all_permissions(&[AUDIT_LOG_VIEW, "employee-edit"]));
        assert!(!gate.has_all_permissions(&[AUDIT_LOG_VIEW, "nope"]));

        api.set_user_permissions(&[]);
        gate.load(&api, true).await.unwrap();
        assert_eq!(api.calls("user_permissions"), 2);
        assert!(matches!(gate.require(AUDIT_LOG_VIEW), Err(ConsoleError::AccessDenied { .. })));
    }

    #[tokio::test]
    async fn failed_load_leaves_gate_empty() {
        let api = MockBackend::new();
        api.set_user_permissions(&[AUDIT_LOG_VIEW]);
        api.fail_next("user_permissions");

        let mut gate = PermissionGate::new();
        assert!(gate.load(&api, false).await.is_err());
        assert!(!gate.is_loaded());
        assert!(!gate.has_permission(AUDIT_LOG_VIEW));
    }

    #[tokio::test]
    async fn encrypted_user_info_is_preferred() {
        let api = MockBackend::new();
        let sealed = encrypt_permissions(&[AUDIT_LOG_VIEW, "role-edit"], "ana@example.com", DEFAULT_PERMISSION_SECRET).unwrap();
        api.set_user_info("ana@example.com", Some(sealed));
        api.set_user_permissions(&["stale-permission"]);

        let mut gate = PermissionGate::new();
        gate.load(&api, false).await.unwrap();
        assert_eq!(api.calls("user_info"), 1);
        assert_eq!(api.calls("user_permissions"), 0);
        assert_eq!(gate.permissions(), vec![AUDIT_LOG_VIEW, "role-edit"]);
    }

    #[tokio::test]
    async fn unreadable_payload_falls_back_to_plain_listing() {
        let api = MockBackend::new();
        let sealed = encrypt_permissions(&[AUDIT_LOG_VIEW], "someone-else@example.com", DEFAULT_PERMISSION_SECRET).unwrap();
        api.set_user_info("ana@example.com", Some(sealed));
        api.set_user_permissions(&["employee-edit"]);

        let mut gate = PermissionGate::new();
        gate.load(&api, false).await.unwrap();
        assert_eq!(api.calls("user_permissions"), 1);
        assert_eq!(gate.permissions(), vec!["employee-edit"]);
    }

    #[tokio::test]
    async fn missing_service_token_skips_both_endpoints() {
        let api = MockBackend::new();
        api.set_user_permissions(&[AUDIT_LOG_VIEW]);
        api.fail_next_missing_credential("user_info");

        let mut gate = PermissionGate::new();
        gate.load(&api, false).await.unwrap();
        assert!(gate.is_loaded());
        assert_eq!(api.calls("user_permissions"), 0);
        assert!(!gate.has_permission(AUDIT_LOG_VIEW));
    }
}
