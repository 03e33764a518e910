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

//! Audit log view-model

use super::filter::{AuditFilter, apply_filter, parse_date_bound};
use super::loader::{LoadReport, fetch_all};
use super::pager::LocalPager;
use crate::api::AdminApi;
use crate::error::{ConsoleError, ConsoleResult, ErrorCode, TABLE_MISSING};
use crate::models::{ActionKind, AuditLogEntry, GroupedStats};
use crate::permission_gate::{AUDIT_LOG_VIEW, PermissionGate};
use tracing::{error, info, warn};

/// Fallback when the first audit page fails without a usable message
pub const FETCH_FAILED: &str = "Failed to fetch audit logs";

/// Shown when the stats endpoint cannot be reached at all
pub const CONNECT_FAILED: &str = "Failed to connect to audit log service. Please check if the backend is running.";

/// State behind the audit log screen.
///
/// The full record set is held in memory; every filter change re-derives the
/// filtered list from it and moves the pager back to page 1.
#[derive(Debug)]
pub struct AuditLogViewer {
    per_page: u32,
    gate: PermissionGate,
    records: Vec<AuditLogEntry>,
    filtered: Vec<AuditLogEntry>,
    filter: AuditFilter,
    pager: LocalPager,
    stats: Option<GroupedStats>,
    catalog: Vec<String>,
    error: Option<String>,
    access_denied: bool,
    last_report: Option<LoadReport>,
}

impl AuditLogViewer {
    /// `per_page` is the backend fetch size, `page_size` the local page size
    pub fn new(per_page: u32, page_size: usize) -> Self {
        Self {
            per_page,
            gate: PermissionGate::new(),
            records: Vec::new(),
            filtered: Vec::new(),
            filter: AuditFilter::default(),
            pager: LocalPager::new(page_size),
            stats: None,
            catalog: Vec::new(),
            error: None,
            access_denied: false,
            last_report: None,
        }
    }

    /// Confirm the current user may view the audit log
    pub async fn check_access(&mut self, api: &dyn AdminApi) -> bool {
        if let Err(e) = self.gate.load(api, false).await {
            warn!("Permission lookup failed, treating as denied: {}", e);
        }
        self.access_denied = !self.gate.has_permission(AUDIT_LOG_VIEW);
        !self.access_denied
    }

    /// Initial load: records, then stats, then the page catalogue.
    ///
    /// Nothing is requested from the audit endpoints without access.
    pub async fn load(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        if !self.check_access(api).await {
            return Err(ConsoleError::AccessDenied {
                permission: AUDIT_LOG_VIEW.to_string(),
            });
        }
        let records = self.fetch_records(api).await;
        self.fetch_stats(api).await;
        self.fetch_catalog(api).await;
        records
    }

    /// Re-run the multi-page fetch and reload stats.
    ///
    /// Access is checked first when no permission lookup has succeeded yet.
    pub async fn refresh(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        if !self.gate.is_loaded() {
            self.check_access(api).await;
        }
        if self.access_denied {
            return Err(ConsoleError::AccessDenied {
                permission: AUDIT_LOG_VIEW.to_string(),
            });
        }
        let records = self.fetch_records(api).await;
        self.fetch_stats(api).await;
        records
    }

    /// Replace the record set on success; keep it on failure
    pub async fn fetch_records(&mut self, api: &dyn AdminApi) -> ConsoleResult<()> {
        match fetch_all(api, self.per_page).await {
            Ok(report) => {
                info!("Loaded {} audit records", report.records.len());
                self.records = report.records.clone();
                self.last_report = Some(report);
                self.error = None;
                self.recompute();
                Ok(())
            }
            Err(e) => {
                let message = e.user_message(FETCH_FAILED);
                error!("Audit log fetch failed: {}", e);
                self.error = Some(message);
                Err(e)
            }
        }
    }

    pub async fn fetch_stats(&mut self, api: &dyn AdminApi) {
        match api.audit_stats().await {
            Ok(stats) => self.stats = Some(stats.grouped()),
            Err(e) if e.code() == Some(ErrorCode::TableNotFound) => {
                self.error = Some(TABLE_MISSING.to_string());
            }
            Err(e) if e.is_transport() => {
                error!("Audit stats unreachable: {}", e);
                self.error = Some(CONNECT_FAILED.to_string());
            }
            Err(e) => warn!("Failed to fetch audit stats: {}", e),
        }
    }

    pub async fn fetch_catalog(&mut self, api: &dyn AdminApi) {
        match api.audit_page_catalog().await {
            Ok(catalog) => self.catalog = catalog.pages,
            Err(e) => warn!("Failed to fetch available pages: {}", e),
        }
    }

    fn recompute(&mut self) {
        self.filtered = apply_filter(&self.records, &self.filter);
        self.pager.reset(self.filtered.len());
    }

    pub fn set_filter(&mut self, filter: AuditFilter) {
        self.filter = filter;
        self.recompute();
    }

    pub fn set_action_type(&mut self, kind: Option<ActionKind>) {
        self.filter.action_type = kind;
        self.recompute();
    }

    pub fn set_page_name(&mut self, page: Option<String>) {
        self.filter.page_name = page.filter(|p| !p.is_empty());
        self.recompute();
    }

    pub fn set_start_date(&mut self, raw: &str) -> ConsoleResult<()> {
        self.filter.start_date = parse_date_bound(raw)?;
        self.recompute();
        Ok(())
    }

    pub fn set_end_date(&mut self, raw: &str) -> ConsoleResult<()> {
        self.filter.end_date = parse_date_bound(raw)?;
        self.recompute();
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.set_filter(AuditFilter::default());
    }

    /// Rows on the current local page
    pub fn visible(&self) -> &[AuditLogEntry] {
        self.pager.window(&self.filtered)
    }

    pub fn next_page(&mut self) -> bool {
        self.pager.next_page()
    }

    pub fn prev_page(&mut self) -> bool {
        self.pager.prev_page()
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.pager.go_to(page)
    }

    pub fn first_page(&mut self) {
        self.pager.first_page();
    }

    pub fn last_page(&mut self) {
        self.pager.last_page();
    }

    pub fn pager(&self) -> &LocalPager {
        &self.pager
    }

    pub fn records(&self) -> &[AuditLogEntry] {
        &self.records
    }

    pub fn filtered(&self) -> &[AuditLogEntry] {
        &self.filtered
    }

    pub fn filter(&self) -> &AuditFilter {
        &self.filter
    }

    pub fn stats(&self) -> Option<GroupedStats> {
        self.stats
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn is_access_denied(&self) -> bool {
        self.access_denied
    }

    pub fn last_report(&self) -> Option<&LoadReport> {
        self.last_report.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LOGIN_REQUIRED;
    use crate::models::AuditStats;
    use crate::testing::{MockBackend, audit_entry};
    use std::collections::HashMap;

    fn backend() -> MockBackend {
        let api = MockBackend::new();
        api.set_user_permissions(&[AUDIT_LOG_VIEW]);
        let page: Vec<AuditLogEntry> = (0..45)
            .map(|i| {
                let kind = if i % 3 == 0 { ActionKind::Delete } else { ActionKind::Create };
                audit_entry(i, kind, "Projects", &format!("2025-02-{:02}T10:00:00Z", 1 + (i % 28)))
            })
            .collect();
        api.set_audit_pages(vec![page, vec![audit_entry(100, ActionKind::Edit, "Skills", "2025-03-01T00:00:00Z")]]);
        api.set_catalog(&["Projects", "Skills"]);
        api.set_stats(AuditStats {
            total_actions: 46,
            actions_by_type: HashMap::from([("CREATE".to_string(), 30), ("DELETE".to_string(), 15), ("EDIT".to_string(), 1)]),
        });
        api
    }

    #[tokio::test]
    async fn denied_user_triggers_no_audit_requests() {
        let api = backend();
        api.set_user_permissions(&["employee-view"]);

        let mut viewer = AuditLogViewer::new(100, 40);
        let err = viewer.load(&api).await.unwrap_err();
        assert!(matches!(err, ConsoleError::AccessDenied { .. }));
        assert!(viewer.is_access_denied());
        assert!(api.audit_requests().is_empty());
        assert_eq!(api.calls("audit_stats"), 0);
    }

    #[tokio::test]
    async fn refresh_before_load_still_checks_access() {
        let api = backend();
        api.set_user_permissions(&["employee-view"]);

        let mut viewer = AuditLogViewer::new(100, 40);
        let err = viewer.refresh(&api).await.unwrap_err();
        assert!(matches!(err, ConsoleError::AccessDenied { .. }));
        assert!(viewer.is_access_denied());
        assert!(api.audit_requests().is_empty());
        assert_eq!(api.calls("audit_stats"), 0);

        api.set_user_permissions(&[AUDIT_LOG_VIEW]);
        let mut granted = AuditLogViewer::new(100, 40);
        granted.refresh(&api).await.unwrap();
        assert_eq!(granted.records().len(), 46);
    }

    #[tokio::test]
    async fn load_fills_records_stats_and_catalog() {
        let api = backend();
        let mut viewer = AuditLogViewer::new(100, 40);
        viewer.load(&api).await.unwrap();

        assert_eq!(viewer.records().len(), 46);
        assert_eq!(viewer.visible().len(), 40);
        assert_eq!(viewer.visible()[0].id.to_string(), "100");
        assert_eq!(viewer.pager().total_pages(), 2);
        assert_eq!(viewer.catalog(), ["Projects", "Skills"]);
        let stats = viewer.stats().unwrap();
        assert_eq!((stats.created, stats.edited, stats.deleted), (30, 1, 15));
    }

    #[tokio::test]
    async fn filter_change_resets_to_first_page() {
        let api = backend();
        let mut viewer = AuditLogViewer::new(100, 40);
        viewer.load(&api).await.unwrap();

        assert!(viewer.next_page());
        assert_eq!(viewer.pager().current_page(), 2);

        viewer.set_action_type(Some(ActionKind::Delete));
        assert_eq!(viewer.pager().current_page(), 1);
        assert_eq!(viewer.filtered().len(), 15);
        assert!(viewer.filtered().iter().all(|r| r.action_performed == ActionKind::Delete));

        viewer.clear_filters();
        assert_eq!(viewer.filtered().len(), 46);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_records() {
        let api = backend();
        let mut viewer = AuditLogViewer::new(100, 40);
        viewer.load(&api).await.unwrap();

        api.fail_next_with("audit_page", 500, Some("relation missing"), Some("TABLE_NOT_FOUND"));
        assert!(viewer.refresh(&api).await.is_err());
        assert_eq!(viewer.error(), Some(TABLE_MISSING));
        assert_eq!(viewer.records().len(), 46);
    }

    #[tokio::test]
    async fn auth_codes_ask_for_login() {
        let api = backend();
        api.fail_next_with("audit_page", 401, Some("no token"), Some("NO_TOKEN"));

        let mut viewer = AuditLogViewer::new(100, 40);
        assert!(viewer.load(&api).await.is_err());
        assert_eq!(viewer.error(), Some(LOGIN_REQUIRED));
        // stats and catalogue are still requested after a record failure
        assert_eq!(api.calls("audit_pages"), 1);
    }

    #[tokio::test]
    async fn stats_table_missing_sets_error_and_catalog_failure_is_quiet() {
        let api = backend();
        api.fail_next_with("audit_stats", 500, None, Some("TABLE_NOT_FOUND"));
        api.fail_next("audit_pages");

        let mut viewer = AuditLogViewer::new(100, 40);
        viewer.load(&api).await.unwrap();
        assert_eq!(viewer.error(), Some(TABLE_MISSING));
        assert!(viewer.stats().is_none());
        assert!(viewer.catalog().is_empty());
    }
}
