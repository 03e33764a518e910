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

//! Multi-page audit retrieval

use crate::api::AdminApi;
use crate::error::ConsoleResult;
use crate::models::AuditLogEntry;
use tracing::{debug, warn};

/// Outcome of draining the audit endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub records: Vec<AuditLogEntry>,
    /// Page count reported by the first response
    pub total_pages: u32,
    /// Pages beyond the first that failed and were skipped
    pub failed_pages: Vec<u32>,
}

/// Fetch every audit page, one request at a time.
///
/// Page 1 must succeed; its pagination block decides how many more pages are
/// requested. A later page that fails is logged and left out.
pub async fn fetch_all(api: &dyn AdminApi, per_page: u32) -> ConsoleResult<LoadReport> {
    let first = api.audit_page(per_page, 1).await?;
    let total_pages = first.pagination.as_ref().map(|p| p.total_pages).filter(|&n| n > 0).unwrap_or(1);

    let mut report = LoadReport {
        records: first.audit_logs,
        total_pages,
        failed_pages: Vec::new(),
    };

    for page in 2..=total_pages {
        match api.audit_page(per_page, page).await {
            Ok(body) => report.records.extend(body.audit_logs),
            Err(e) => {
                warn!("Failed to fetch audit page {}: {}", page, e);
                report.failed_pages.push(page);
            }
        }
    }

    debug!(
        "Fetched {} audit records from {} pages ({} skipped)",
        report.records.len(),
        total_pages,
        report.failed_pages.len()
    );
    Ok(report)
}
