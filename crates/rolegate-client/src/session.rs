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

//! Credential storage and the admin session guard
//!
//! Two independent credentials coexist. The admin dashboard keeps a token and
//! a small profile (`admin_session.json`); the login flow keeps a service
//! token with a seven day lifetime (`auth_token.json`) that the audit and
//! user endpoints authenticate with. Neither store knows about the other.

use crate::api::AdminApi;
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::AdminUser;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lifetime of the service token, in days
pub const SERVICE_TOKEN_TTL_DAYS: i64 = 7;

const ADMIN_SESSION_FILE: &str = "admin_session.json";
const SERVICE_TOKEN_FILE: &str = "auth_token.json";

/// Admin dashboard credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub token: String,
    pub user: AdminUser,
}

/// Service credential obtained through federated or email login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,

    /// Profile captured at login time
    #[serde(default)]
    pub user: Option<serde_json::Value>,

    #[serde(default)]
    pub login_method: Option<String>,
}

impl ServiceCredential {
    pub fn new(token: String, user: Option<serde_json::Value>, login_method: &str) -> Self {
        Self {
            token,
            expires_at: Utc::now() + Duration::days(SERVICE_TOKEN_TTL_DAYS),
            user,
            login_method: Some(login_method.to_string()),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// File-backed credential store rooted at the data directory
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn admin_path(&self) -> PathBuf {
        self.dir.join(ADMIN_SESSION_FILE)
    }

    fn service_path(&self) -> PathBuf {
        self.dir.join(SERVICE_TOKEN_FILE)
    }

    /// Raw admin session read.
    ///
    /// `Ok(None)` when nothing is stored; a file that does not parse is an
    /// error so the guard can tell "never logged in" from "corrupt profile".
    pub fn admin_session(&self) -> ConsoleResult<Option<AdminSession>> {
        let path = self.admin_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let session: AdminSession = serde_json::from_str(&content)?;
        if session.token.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    pub fn admin_token(&self) -> Option<String> {
        self.admin_session().ok().flatten().map(|s| s.token)
    }

    pub fn save_admin_session(&self, session: &AdminSession) -> ConsoleResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.admin_path(), serde_json::to_string_pretty(session)?)?;
        debug!("Stored admin session in {}", self.admin_path().display());
        Ok(())
    }

    pub fn clear_admin_session(&self) -> ConsoleResult<()> {
        remove_if_exists(&self.admin_path())
    }

    /// Stored service credential; an expired one reads as absent
    pub fn service_credential(&self) -> ConsoleResult<Option<ServiceCredential>> {
        let path = self.service_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let credential: ServiceCredential = serde_json::from_str(&content)?;
        if credential.is_expired(Utc::now()) {
            debug!("Service token expired at {}", credential.expires_at);
            return Ok(None);
        }
        Ok(Some(credential))
    }

    pub fn service_token(&self) -> Option<String> {
        match self.service_credential() {
            Ok(credential) => credential.map(|c| c.token),
            Err(e) => {
                warn!("Ignoring unreadable service token: {}", e);
                None
            }
        }
    }

    pub fn save_service_credential(&self, credential: &ServiceCredential) -> ConsoleResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.service_path(), serde_json::to_string_pretty(credential)?)?;
        Ok(())
    }

    pub fn clear_service_credential(&self) -> ConsoleResult<()> {
        remove_if_exists(&self.service_path())
    }

    pub fn clear_all(&self) -> ConsoleResult<()> {
        self.clear_admin_session()?;
        self.clear_service_credential()
    }
}

fn remove_if_exists(path: &Path) -> ConsoleResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConsoleError::Storage(e)),
    }
}

/// Result of running the admin guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Authorized(AdminSession),
    /// The caller must log in again before any admin screen is shown
    LoginRequired { reason: String },
}

/// Gate for the admin dashboard.
///
/// A missing token or an unreadable profile sends the user to login without
/// touching the server. Otherwise the token is validated against the backend,
/// and any failure there drops the stored session.
pub async fn guard_admin(store: &SessionStore, api: &dyn AdminApi) -> ConsoleResult<GuardOutcome> {
    let session = match store.admin_session() {
        Ok(Some(session)) => session,
        Ok(None) => {
            return Ok(GuardOutcome::LoginRequired {
                reason: "No admin session".to_string(),
            });
        }
        Err(e) => {
            warn!("Admin profile could not be read: {}", e);
            return Ok(GuardOutcome::LoginRequired {
                reason: "Stored admin profile is unreadable".to_string(),
            });
        }
    };

    match api.validate_admin().await {
        Ok(()) => Ok(GuardOutcome::Authorized(session)),
        Err(e) => {
            warn!("Admin token validation failed: {}", e);
            store.clear_admin_session()?;
            Ok(GuardOutcome::LoginRequired {
                reason: "Admin session is no longer valid".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    fn session() -> AdminSession {
        AdminSession {
            token: "admin-token".to_string(),
            user: AdminUser {
                id: Some("1".to_string()),
                name: Some("Root".to_string()),
                email: Some("root@example.com".to_string()),
            },
        }
    }

    #[test]
    fn admin_session_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        assert_eq!(store.admin_session().unwrap(), None);
        store.save_admin_session(&session()).unwrap();
        assert_eq!(store.admin_session().unwrap(), Some(session()));
        assert_eq!(store.admin_token().as_deref(), Some("admin-token"));

        store.clear_admin_session().unwrap();
        assert_eq!(store.admin_session().unwrap(), None);
        // clearing twice is fine
        store.clear_admin_session().unwrap();
    }

    #[test]
    fn corrupt_admin_profile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ADMIN_SESSION_FILE), "{not json").unwrap();
        let store = SessionStore::new(dir.path());
        assert!(store.admin_session().is_err());
        assert_eq!(store.admin_token(), None);
    }

    #[test]
    fn expired_service_token_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        let mut credential = ServiceCredential::new("svc".to_string(), None, "email_password");
        store.save_service_credential(&credential).unwrap();
        assert_eq!(store.service_token().as_deref(), Some("svc"));

        credential.expires_at = Utc::now() - Duration::minutes(1);
        store.save_service_credential(&credential).unwrap();
        assert_eq!(store.service_token(), None);
    }

    #[test]
    fn stores_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        store.save_admin_session(&session()).unwrap();
        store
            .save_service_credential(&ServiceCredential::new("svc".to_string(), None, "google_sso"))
            .unwrap();

        store.clear_service_credential().unwrap();
        assert!(store.admin_session().unwrap().is_some());
        assert_eq!(store.service_token(), None);

        store.clear_all().unwrap();
        assert!(store.admin_session().unwrap().is_none());
    }

    #[tokio::test]
    async fn guard_skips_server_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let api = MockBackend::new();

        let outcome = guard_admin(&store, &api).await.unwrap();
        assert!(matches!(outcome, GuardOutcome::LoginRequired { .. }));
        assert_eq!(api.calls("validate"), 0);

        std::fs::write(dir.path().join(ADMIN_SESSION_FILE), "garbage").unwrap();
        let outcome = guard_admin(&store, &api).await.unwrap();
        assert!(matches!(outcome, GuardOutcome::LoginRequired { .. }));
        assert_eq!(api.calls("validate"), 0);
    }

    #[tokio::test]
    async fn rejected_token_clears_admin_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        store.save_admin_session(&session()).unwrap();
        let api = MockBackend::new();

        assert_eq!(guard_admin(&store, &api).await.unwrap(), GuardOutcome::Authorized(session()));

        api.fail_next_with("validate", 401, Some("Invalid token"), Some("INVALID_TOKEN"));
        let outcome = guard_admin(&store, &api).await.unwrap();
        assert!(matches!(outcome, GuardOutcome::LoginRequired { .. }));
        assert!(store.admin_session().unwrap().is_none());
    }
}
