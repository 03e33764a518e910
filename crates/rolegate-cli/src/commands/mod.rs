pub mod audit;
pub mod config;
pub mod employees;
pub mod permissions;
pub mod roles;
pub mod session;

use crate::config::RolegateConfig;
use anyhow::{Result, bail};
use rolegate_client::admin::NoticeBoard;
use rolegate_client::models::Id;
use rolegate_client::{AdminSession, GuardOutcome, HttpAdminApi, SessionStore, guard_admin};
use std::future::Future;
use std::path::PathBuf;
use tokio::runtime::Runtime;

pub struct CommandContext {
    pub config: RolegateConfig,
    /// File the configuration was loaded from, if any
    pub config_path: Option<PathBuf>,
    pub store: SessionStore,
    pub api: HttpAdminApi,
    runtime: Runtime,
}

impl CommandContext {
    pub fn new(config: RolegateConfig, cli_config: Option<PathBuf>) -> Result<Self> {
        let store = SessionStore::new(&config.data_dir);
        let api = HttpAdminApi::new(config.client_config(), store.clone())?;
        // one request at a time, on this thread
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            config_path: RolegateConfig::locate(cli_config),
            config,
            store,
            api,
            runtime,
        })
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn notice_board(&self) -> NoticeBoard {
        NoticeBoard::new(self.config.toast_duration())
    }

    /// Run the admin guard; refuse to continue without a valid admin session
    pub fn require_admin(&self) -> Result<AdminSession> {
        match self.block_on(guard_admin(&self.store, &self.api))? {
            GuardOutcome::Authorized(session) => Ok(session),
            GuardOutcome::LoginRequired { reason } => {
                bail!("{}. Sign in with `rolegate admin-login --token <TOKEN>`.", reason)
            }
        }
    }
}

/// Id of the listed entity whose id reads as `raw`, whatever its wire shape
pub fn resolve_id<T>(items: &[T], raw: &str, id_of: impl Fn(&T) -> &Id) -> Option<Id> {
    let raw = raw.trim();
    items.iter().map(id_of).find(|id| id.to_string() == raw).cloned()
}

/// Cut `value` to `width` characters for table output
pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let cut: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_ids_of_either_shape() {
        let ids = vec![Id::Num(4), Id::Text("12".to_string()), Id::Text("p-7".to_string())];
        assert_eq!(resolve_id(&ids, "4", |id| id), Some(Id::Num(4)));
        assert_eq!(resolve_id(&ids, " 12 ", |id| id), Some(Id::Text("12".to_string())));
        assert_eq!(resolve_id(&ids, "p-7", |id| id), Some(Id::Text("p-7".to_string())));
        assert_eq!(resolve_id(&ids, "9", |id| id), None);
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("employee-edit", 20), "employee-edit");
        assert_eq!(truncate("ñandú-permission", 6), "ñandú…");
    }
}
