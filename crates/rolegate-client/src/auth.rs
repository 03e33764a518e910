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

//! Login and logout flows for the service credential

use crate::api::AdminApi;
use crate::error::{ConsoleError, ConsoleResult};
use crate::session::{ServiceCredential, SessionStore};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tracing::{info, warn};

pub const FEDERATED_LOGIN_METHOD: &str = "google_sso";
pub const PASSWORD_LOGIN_METHOD: &str = "email_password";

/// Claims read from a federated identity token
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FederatedClaims {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub picture: Option<String>,
}

/// Decode the payload segment of a JWT.
///
/// The signature is not checked; the backend verifies the token when it is
/// exchanged.
pub fn decode_jwt_payload(token: &str) -> ConsoleResult<FederatedClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ConsoleError::validation("Malformed identity token"))?;
    // some issuers pad, URL_SAFE_NO_PAD does not accept it
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| ConsoleError::validation("Malformed identity token"))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Rejection text for accounts outside the organisation
pub const UNAUTHORIZED_DOMAIN: &str = "Unauthorized domain. Please use your organization email.";

/// Whether `email` belongs to `allowed_domain` (case-insensitive); an empty
/// domain accepts every address
pub fn email_in_domain(email: &str, allowed_domain: &str) -> bool {
    let domain = allowed_domain.trim().trim_start_matches('@');
    if domain.is_empty() {
        return true;
    }
    email.to_lowercase().ends_with(&format!("@{}", domain.to_lowercase()))
}

/// Exchange a federated identity token for a service credential.
///
/// The email claim must belong to `allowed_domain`; otherwise nothing is sent
/// and nothing is stored.
pub async fn federated_login(
    api: &dyn AdminApi,
    store: &SessionStore,
    federated_token: &str,
    allowed_domain: &str,
) -> ConsoleResult<ServiceCredential> {
    let claims = decode_jwt_payload(federated_token)?;
    let email = claims
        .email
        .clone()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ConsoleError::validation("Identity token carries no email"))?;

    if !email_in_domain(&email, allowed_domain) {
        return Err(ConsoleError::validation(UNAUTHORIZED_DOMAIN));
    }

    let response = api.exchange_federated_token(federated_token, &email).await?;
    let token = response
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ConsoleError::validation("Invalid response from server"))?;

    let profile = serde_json::json!({
        "email": email,
        "name": claims.name,
        "picture": claims.picture,
    });
    let credential = ServiceCredential::new(token, Some(profile), FEDERATED_LOGIN_METHOD);
    store.save_service_credential(&credential)?;
    info!("Signed in as {} via federated login", email);
    Ok(credential)
}

/// Email and password login
pub async fn email_login(api: &dyn AdminApi, store: &SessionStore, email: &str, password: &str) -> ConsoleResult<ServiceCredential> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ConsoleError::validation("Email and password are required"));
    }

    let response = api.login(email.trim(), password).await?;
    let (token, user) = match (response.token, response.user) {
        (Some(token), Some(user)) if !token.is_empty() && !user.is_null() => (token, user),
        _ => return Err(ConsoleError::validation("Invalid response from server")),
    };

    let credential = ServiceCredential::new(token, Some(user), PASSWORD_LOGIN_METHOD);
    store.save_service_credential(&credential)?;
    info!("Signed in as {}", email.trim());
    Ok(credential)
}

/// Tell the backend, then drop every stored credential regardless of the
/// backend's answer.
pub async fn logout(api: &dyn AdminApi, store: &SessionStore) -> ConsoleResult<()> {
    if let Err(e) = api.logout().await {
        warn!("Backend logout failed: {}", e);
    }
    store.clear_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    fn jwt(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn decodes_claims_without_verifying() {
        let claims = decode_jwt_payload(&jwt(serde_json::json!({"email": "ana@acme.io", "name": "Ana"}))).unwrap();
        assert_eq!(claims.email.as_deref(), Some("ana@acme.io"));
        assert_eq!(claims.name.as_deref(), Some("Ana"));
        assert!(decode_jwt_payload("not-a-jwt").is_err());
    }

    #[test]
    fn domain_check_is_suffix_based() {
        assert!(email_in_domain("Ana@Acme.io", "acme.io"));
        assert!(email_in_domain("ana@acme.io", "@acme.io"));
        assert!(!email_in_domain("ana@notacme.io.evil", "acme.io"));
        assert!(!email_in_domain("ana@evilacme.io", "acme.io"));
        assert!(email_in_domain("anyone@gmail.com", ""));
    }

    #[tokio::test]
    async fn foreign_domain_is_rejected_before_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let api = MockBackend::new();

        let token = jwt(serde_json::json!({"email": "bob@gmail.com"}));
        let err = federated_login(&api, &store, &token, "acme.io").await.unwrap_err();
        assert_eq!(err.user_message("x"), UNAUTHORIZED_DOMAIN);
        assert_eq!(api.calls("exchange"), 0);
        assert_eq!(store.service_token(), None);
    }

    #[tokio::test]
    async fn federated_login_stores_returned_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let api = MockBackend::new();

        let token = jwt(serde_json::json!({"email": "ana@acme.io", "name": "Ana"}));
        let credential = federated_login(&api, &store, &token, "acme.io").await.unwrap();
        assert_eq!(credential.login_method.as_deref(), Some(FEDERATED_LOGIN_METHOD));
        assert_eq!(store.service_token().as_deref(), Some("service-token-for-ana@acme.io"));
    }

    #[tokio::test]
    async fn logout_clears_even_when_backend_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        store
            .save_service_credential(&ServiceCredential::new("svc".to_string(), None, PASSWORD_LOGIN_METHOD))
            .unwrap();

        let api = MockBackend::new();
        api.fail_next("logout");
        logout(&api, &store).await.unwrap();
        assert_eq!(store.service_token(), None);
    }
}
