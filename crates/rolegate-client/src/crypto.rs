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

//! Permission payload cipher
//!
//! `GET /api/user/user_info` returns the caller's permission list as a
//! base64 string: the JSON array XOR-ed with `SHA-256("{email}:{secret}")`.
//! The cipher is symmetric, so one routine both seals and opens a payload.

use crate::error::{ConsoleError, ConsoleResult};
use base64::{Engine as _, engine::general_purpose};
use sha2::{Digest, Sha256};

/// Secret the backend uses until a deployment sets its own
pub const DEFAULT_PERMISSION_SECRET: &str = "default-secret-key-change-in-production";

/// Per-user key: SHA-256 of `"{email}:{secret}"`
pub fn derive_key(email: &str, secret: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", email, secret).as_bytes());
    hasher.finalize().into()
}

fn xor_with_key(data: &[u8], key: &[u8; 32]) -> Vec<u8> {
    data.iter().zip(key.iter().cycle()).map(|(b, k)| b ^ k).collect()
}

fn decrypt_error(message: impl Into<String>) -> ConsoleError {
    ConsoleError::Decrypt { message: message.into() }
}

/// Open an encrypted permission payload into the list of permission names
pub fn decrypt_permissions(encoded: &str, email: &str, secret: &str) -> ConsoleResult<Vec<String>> {
    let sealed = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| decrypt_error(format!("invalid base64: {}", e)))?;
    let plain = xor_with_key(&sealed, &derive_key(email, secret));
    let text = String::from_utf8(plain).map_err(|_| decrypt_error("payload is not UTF-8"))?;
    serde_json::from_str(&text).map_err(|_| decrypt_error("payload is not an array of permissions"))
}

/// Seal a permission list the way the backend does
pub fn encrypt_permissions(permissions: &[&str], email: &str, secret: &str) -> ConsoleResult<String> {
    let plain = serde_json::to_vec(permissions)?;
    Ok(general_purpose::STANDARD.encode(xor_with_key(&plain, &derive_key(email, secret))))
}
