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

//! Error handling for the admin console client
//!
//! Every failure a screen can show is folded into [`ConsoleError`]; the
//! user-facing text is produced by [`ConsoleError::user_message`] so each tab
//! only has to supply its own fallback string.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message shown for any transport-level failure.
pub const NETWORK_ERROR: &str = "Network error";

/// Message shown when the audit log is opened without a credential.
pub const LOGIN_REQUIRED: &str = "Please log in to view audit logs.";

/// Message shown when the backend has no audit table yet.
pub const TABLE_MISSING: &str = "Audit log table not found. Please run database migration to enable audit logging.";

/// Error codes the backend puts in the `code` field of an error body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    TableNotFound,
    NoToken,
    InvalidToken,
    Other(String),
}

impl ErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "TABLE_NOT_FOUND" => ErrorCode::TableNotFound,
            "NO_TOKEN" => ErrorCode::NoToken,
            "INVALID_TOKEN" => ErrorCode::InvalidToken,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    /// True for the codes that mean the caller is not logged in
    pub fn is_auth(&self) -> bool {
        matches!(self, ErrorCode::NoToken | ErrorCode::InvalidToken)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::TableNotFound => write!(f, "TABLE_NOT_FOUND"),
            ErrorCode::NoToken => write!(f, "NO_TOKEN"),
            ErrorCode::InvalidToken => write!(f, "INVALID_TOKEN"),
            ErrorCode::Other(code) => write!(f, "{}", code),
        }
    }
}

/// Structured error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerErrorBody {
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub code: Option<String>,
}

impl ServerErrorBody {
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code.as_deref().map(ErrorCode::parse)
    }
}

/// Console error types
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response, with the decoded body when the backend sent one
    #[error("API error {status}: {}", .body.as_ref().and_then(|b| b.error.as_deref()).unwrap_or("no error body"))]
    Api { status: u16, body: Option<ServerErrorBody> },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to decrypt permissions: {message}")]
    Decrypt { message: String },

    #[error("No credential stored: {message}")]
    MissingCredential { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Access denied: missing permission '{permission}'")]
    AccessDenied { permission: String },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::Validation { message: message.into() }
    }

    pub fn missing_credential(message: impl Into<String>) -> Self {
        ConsoleError::MissingCredential { message: message.into() }
    }

    /// Server error code, if the backend sent one
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ConsoleError::Api { body: Some(body), .. } => body.error_code(),
            _ => None,
        }
    }

    /// Server-provided `error` string, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ConsoleError::Api { body: Some(body), .. } => body.error.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ConsoleError::Transport(_))
    }

    /// Text to put in a banner or toast.
    ///
    /// Transport failures read as [`NETWORK_ERROR`], known auth codes and the
    /// missing-table code get their fixed messages, everything else prefers the
    /// server's `error` string and falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ConsoleError::Transport(_) => NETWORK_ERROR.to_string(),
            ConsoleError::Validation { message } => message.clone(),
            ConsoleError::MissingCredential { message } => message.clone(),
            ConsoleError::AccessDenied { .. } => self.to_string(),
            ConsoleError::Api { .. } => match self.code() {
                Some(ErrorCode::TableNotFound) => TABLE_MISSING.to_string(),
                Some(code) if code.is_auth() => LOGIN_REQUIRED.to_string(),
                _ => self.server_message().unwrap_or(fallback).to_string(),
            },
            _ => fallback.to_string(),
        }
    }
}

/// Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;
