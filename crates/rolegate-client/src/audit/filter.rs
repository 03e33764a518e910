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

//! Local audit record filtering

use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{ActionKind, AuditLogEntry};
use chrono::{DateTime, NaiveDate, Utc};

/// Filter criteria; `None` fields do not constrain the result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub action_type: Option<ActionKind>,
    pub page_name: Option<String>,
    /// Inclusive lower bound
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub end_date: Option<DateTime<Utc>>,
}

impl AuditFilter {
    pub fn is_empty(&self) -> bool {
        self.action_type.is_none() && self.page_name.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        if let Some(kind) = &self.action_type {
            if &entry.action_performed != kind {
                return false;
            }
        }
        if let Some(page) = &self.page_name {
            if entry.action_page.as_deref() != Some(page.as_str()) {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if entry.timestamp > end {
                return false;
            }
        }
        true
    }
}

/// Records matching `filter`, newest first.
///
/// Recomputed from the full set every time; ties keep their input order.
pub fn apply_filter(records: &[AuditLogEntry], filter: &AuditFilter) -> Vec<AuditLogEntry> {
    let mut filtered: Vec<AuditLogEntry> = records.iter().filter(|r| filter.matches(r)).cloned().collect();
    filtered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    filtered
}

/// Parse a date filter bound.
///
/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates; a bare date means
/// midnight UTC of that day for either bound. Blank input clears the bound.
pub fn parse_date_bound(raw: &str) -> ConsoleResult<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ConsoleError::validation(format!("Invalid date '{}'", raw)))?;
    Ok(date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()))
}
