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

//! Data models for the RBAC backend
//!
//! Field names follow the backend's JSON. Everything here is a refetchable
//! copy of server-owned state.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::collections::HashMap;
use std::fmt;

/// Layouts accepted for timestamps that carry no offset; read as UTC
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp: RFC 3339 first, then an offset-less form taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

/// Optional timestamp; null or an unreadable value becomes `None`
fn optional_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Treat an explicit `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Opaque entity identifier.
///
/// The backend hands out numeric ids for some tables and string ids for
/// others; the wire shape is kept so ids round-trip unchanged in payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(i64),
    Text(String),
}

impl Id {
    /// Parse user input, preferring the numeric form
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        raw.parse::<i64>().map(Id::Num).unwrap_or_else(|_| Id::Text(raw.to_string()))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{}", n),
            Id::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Num(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Text(value.to_string())
    }
}

/// A named capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: Id,

    /// Unique display key
    pub permission_name: String,

    #[serde(default)]
    pub permission_description: Option<String>,

    #[serde(default, deserialize_with = "optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A named group of permissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: Id,

    pub role_name: String,

    #[serde(default)]
    pub role_description: Option<String>,

    #[serde(default, deserialize_with = "optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    /// Associated permissions, in backend order
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn permission_ids(&self) -> Vec<Id> {
        self.permissions.iter().map(|p| p.id.clone()).collect()
    }
}

/// Role summary embedded in an employee record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRole {
    pub id: Id,

    #[serde(default)]
    pub role_name: Option<String>,
}

/// An employee as listed by `/api/employees`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Id,

    /// Employee code (e.g. "SS-0042")
    #[serde(default)]
    pub employee_id: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// At most one role in this client's model
    #[serde(default)]
    pub role: Option<EmployeeRole>,
}

impl Employee {
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{} {}", first, last).trim().to_string()
    }

    pub fn role_id(&self) -> Option<&Id> {
        self.role.as_ref().map(|r| &r.id)
    }
}

/// Kind of action recorded in the audit log
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Create,
    Edit,
    Delete,
    BulkImport,
    AssignHierarchy,
    UnassignHierarchy,
    /// Kinds this client does not know about are carried verbatim
    Other(String),
}

impl ActionKind {
    pub const KNOWN: [ActionKind; 6] = [
        ActionKind::Create,
        ActionKind::Edit,
        ActionKind::Delete,
        ActionKind::BulkImport,
        ActionKind::AssignHierarchy,
        ActionKind::UnassignHierarchy,
    ];

    pub fn as_wire(&self) -> &str {
        match self {
            ActionKind::Create => "CREATE",
            ActionKind::Edit => "EDIT",
            ActionKind::Delete => "DELETE",
            ActionKind::BulkImport => "BULK_IMPORT",
            ActionKind::AssignHierarchy => "ASSIGN_HIERARCHY",
            ActionKind::UnassignHierarchy => "UNASSIGN_HIERARCHY",
            ActionKind::Other(raw) => raw,
        }
    }

    /// Label used in tables
    pub fn label(&self) -> &str {
        match self {
            ActionKind::Create => "Create",
            ActionKind::Edit => "Edit",
            ActionKind::Delete => "Delete",
            ActionKind::BulkImport => "BULK IMPORT",
            ActionKind::AssignHierarchy => "ASSIGN HIERARCHY",
            ActionKind::UnassignHierarchy => "UNASSIGN HIERARCHY",
            ActionKind::Other(raw) => raw,
        }
    }
}

impl From<String> for ActionKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "CREATE" => ActionKind::Create,
            "EDIT" => ActionKind::Edit,
            "DELETE" => ActionKind::Delete,
            "BULK_IMPORT" => ActionKind::BulkImport,
            "ASSIGN_HIERARCHY" => ActionKind::AssignHierarchy,
            "UNASSIGN_HIERARCHY" => ActionKind::UnassignHierarchy,
            _ => ActionKind::Other(raw),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_wire().to_string()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

/// One immutable audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Id,

    #[serde(default)]
    pub user_name: Option<String>,

    #[serde(default)]
    pub user_email: Option<String>,

    /// Page or feature the action happened on
    #[serde(default)]
    pub action_page: Option<String>,

    pub action_performed: ActionKind,

    #[serde(deserialize_with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Server-side pagination block of an audit page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_count: u64,

    /// Zero (or null on the wire) means a single page
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_pages: u32,

    #[serde(default)]
    pub current_page: Option<u32>,

    #[serde(default)]
    pub per_page: Option<u32>,
}

/// One page of `/api/audit-logs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditPage {
    #[serde(default)]
    pub audit_logs: Vec<AuditLogEntry>,

    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Raw `/api/audit-logs/stats` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditStats {
    #[serde(default)]
    pub total_actions: u64,

    #[serde(default)]
    pub actions_by_type: HashMap<String, u64>,
}

/// Stats folded into the three buckets the dashboard shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupedStats {
    pub total_actions: u64,
    pub created: u64,
    pub edited: u64,
    pub deleted: u64,
}

impl AuditStats {
    /// Bulk imports count as creations; hierarchy (un)assignments count as edits.
    pub fn grouped(&self) -> GroupedStats {
        let count = |kind: &str| self.actions_by_type.get(kind).copied().unwrap_or(0);
        GroupedStats {
            total_actions: self.total_actions,
            created: count("CREATE") + count("BULK_IMPORT"),
            edited: count("EDIT") + count("ASSIGN_HIERARCHY") + count("UNASSIGN_HIERARCHY"),
            deleted: count("DELETE"),
        }
    }
}

/// `/api/audit-logs/pages` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditPageCatalog {
    #[serde(default)]
    pub pages: Vec<String>,
}

/// `/api/employees` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeList {
    #[serde(default)]
    pub employees: Vec<Employee>,
}

/// `/api/user/permissions` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPermissions {
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// `/api/user/user_info` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Permission list sealed with [`crate::crypto`]
    #[serde(default)]
    pub encrypted_permissions: Option<String>,
}

/// Create/update payload for a permission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionPayload {
    pub permission_name: String,
    pub permission_description: String,
}

/// Create/update payload for a role; the permission list replaces the old one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePayload {
    pub role_name: String,
    pub role_description: String,
    pub permission_ids: Vec<Id>,
}

/// Role assignment payload; list-shaped on the wire, at most one entry here
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role_ids: Vec<Id>,
}

impl RoleAssignment {
    pub fn single(role: Option<Id>) -> Self {
        Self { role_ids: role.into_iter().collect() }
    }
}

/// Minimal admin profile kept next to the admin token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

/// Body returned by `/auth/sso-success`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Body returned by `/auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_keep_their_wire_shape() {
        let ids: Vec<Id> = serde_json::from_value(json!([7, "a1b2"])).unwrap();
        assert_eq!(ids, vec![Id::Num(7), Id::Text("a1b2".to_string())]);
        assert_eq!(serde_json::to_value(&ids).unwrap(), json!([7, "a1b2"]));
        assert_eq!(Id::parse(" 42 "), Id::Num(42));
        assert_eq!(Id::parse("emp-9"), Id::Text("emp-9".to_string()));
    }

    #[test]
    fn unknown_action_kinds_survive() {
        let entry: AuditLogEntry = serde_json::from_value(json!({
            "id": 1,
            "user_name": "Ana",
            "user_email": "ana@example.com",
            "action_page": "Projects",
            "action_performed": "ARCHIVE",
            "timestamp": "2025-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(entry.action_performed, ActionKind::Other("ARCHIVE".to_string()));
        assert_eq!(entry.action_performed.label(), "ARCHIVE");

        let kind: ActionKind = serde_json::from_value(json!("BULK_IMPORT")).unwrap();
        assert_eq!(kind, ActionKind::BulkImport);
        assert_eq!(kind.label(), "BULK IMPORT");
    }

    #[test]
    fn stats_are_grouped_into_three_buckets() {
        let stats = AuditStats {
            total_actions: 21,
            actions_by_type: HashMap::from([
                ("CREATE".to_string(), 5),
                ("BULK_IMPORT".to_string(), 2),
                ("EDIT".to_string(), 6),
                ("ASSIGN_HIERARCHY".to_string(), 3),
                ("UNASSIGN_HIERARCHY".to_string(), 1),
                ("DELETE".to_string(), 4),
            ]),
        };
        assert_eq!(
            stats.grouped(),
            GroupedStats {
                total_actions: 21,
                created: 7,
                edited: 10,
                deleted: 4
            }
        );
    }

    #[test]
    fn role_assignment_is_single_valued() {
        assert_eq!(serde_json::to_value(RoleAssignment::single(Some(Id::Num(3)))).unwrap(), json!({"role_ids": [3]}));
        assert_eq!(serde_json::to_value(RoleAssignment::single(None)).unwrap(), json!({"role_ids": []}));
    }

    #[test]
    fn offsetless_timestamps_are_read_as_utc() {
        let page: AuditPage = serde_json::from_value(json!({
            "audit_logs": [{
                "id": 1,
                "action_page": "Roles",
                "action_performed": "CREATE",
                "timestamp": "2025-03-01T09:00:00"
            }],
            "pagination": {"total_count": 1, "total_pages": 1}
        }))
        .unwrap();
        assert_eq!(page.audit_logs[0].timestamp.to_rfc3339(), "2025-03-01T09:00:00+00:00");
        assert_eq!(
            parse_timestamp("2025-03-01 09:00:00.250").map(|t| t.timestamp_millis() % 1000),
            Some(250)
        );
        assert!(parse_timestamp("yesterday").is_none());

        let perm: Permission = serde_json::from_value(json!({
            "id": 3, "permission_name": "audit.view", "created_at": "2025-03-01T09:00:00.123456"
        }))
        .unwrap();
        assert!(perm.created_at.is_some());
    }

    #[test]
    fn null_pagination_counters_mean_unknown() {
        let page: AuditPage = serde_json::from_value(json!({
            "audit_logs": [],
            "pagination": {"total_count": null, "total_pages": null, "current_page": 1}
        }))
        .unwrap();
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.total_pages, 0);
        assert_eq!(pagination.total_count, 0);
    }
}
