use anyhow::{Result, anyhow, bail};
use rolegate_client::ClientConfig;
use rolegate_client::config::MAX_AUDIT_PAGE_SIZE;
use rolegate_client::crypto::DEFAULT_PERMISSION_SECRET;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolegateConfig {
    pub data_dir: PathBuf,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Unset means requests never time out
    pub request_timeout_secs: Option<u64>,
    pub audit_fetch_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Email domain accepted by federated login; empty accepts any
    pub allowed_domain: String,
    /// Must match the backend's encryption secret for `user_info` permission lists
    pub permission_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub toast_secs: u64,
    pub audit_page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: None,
            audit_fetch_size: MAX_AUDIT_PAGE_SIZE,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_domain: "squareshift.co".to_string(),
            permission_secret: DEFAULT_PERMISSION_SECRET.to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 250,
            toast_secs: 8,
            audit_page_size: 40,
        }
    }
}

impl Default for RolegateConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("rolegate"),
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl RolegateConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default location used by `config set` when no file was given
    pub fn default_path() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("rolegate").join("config.toml")
    }

    /// File to read from: `--config`, then `$ROLEGATE_CONFIG`, then the default path if it exists
    pub fn locate(cli_config: Option<PathBuf>) -> Option<PathBuf> {
        cli_config
            .or_else(|| std::env::var("ROLEGATE_CONFIG").ok().map(PathBuf::from))
            .or_else(|| Some(Self::default_path()).filter(|p| p.exists()))
    }

    pub fn resolve_config(cli_config: Option<PathBuf>, cli_data_dir: Option<PathBuf>, cli_base_url: Option<String>) -> Result<Self> {
        let mut config = match Self::locate(cli_config) {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };

        // CLI flags override environment settings
        if let Some(data_dir) = cli_data_dir {
            config.data_dir = data_dir;
        } else if let Ok(env_data_dir) = std::env::var("ROLEGATE_DATA_DIR") {
            config.data_dir = PathBuf::from(env_data_dir);
        }

        if let Some(base_url) = cli_base_url {
            config.api.base_url = base_url;
        } else if let Ok(env_base_url) = std::env::var("ROLEGATE_BASE_URL") {
            config.api.base_url = env_base_url;
        }

        std::fs::create_dir_all(&config.data_dir)?;
        Ok(config)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout_secs: self.api.request_timeout_secs,
            audit_fetch_size: self.api.audit_fetch_size,
            permission_secret: self.auth.permission_secret.clone(),
            ..ClientConfig::new(self.api.base_url.clone())
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.ui.toast_secs)
    }

    /// Validate and apply one `section.key = value` update
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "api.base_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    bail!("Base URL must start with http:// or https://");
                }
                self.api.base_url = value.trim_end_matches('/').to_string();
            }
            "api.request_timeout_secs" => {
                self.api.request_timeout_secs = match value {
                    "" | "none" | "off" => None,
                    v => Some(v.parse::<u64>().map_err(|_| anyhow!("Invalid timeout: {}", v))?),
                };
            }
            "api.audit_fetch_size" => {
                let size = value.parse::<u32>().map_err(|_| anyhow!("Invalid page size: {}", value))?;
                if size == 0 || size > MAX_AUDIT_PAGE_SIZE {
                    bail!("Audit fetch size must be between 1 and {}", MAX_AUDIT_PAGE_SIZE);
                }
                self.api.audit_fetch_size = size;
            }
            "auth.allowed_domain" => {
                let domain = value.trim().trim_start_matches('@');
                if !domain.is_empty() && !domain.contains('.') {
                    bail!("Invalid domain: {}", value);
                }
                self.auth.allowed_domain = domain.to_string();
            }
            "auth.permission_secret" => {
                if value.trim().is_empty() {
                    bail!("Permission secret cannot be empty");
                }
                self.auth.permission_secret = value.trim().to_string();
            }
            "ui.refresh_rate_ms" => {
                let rate = value.parse::<u64>().map_err(|_| anyhow!("Invalid refresh rate: {}", value))?;
                if !(50..=10000).contains(&rate) {
                    bail!("Refresh rate must be between 50 and 10000ms");
                }
                self.ui.refresh_rate_ms = rate;
            }
            "ui.toast_secs" => {
                let secs = value.parse::<u64>().map_err(|_| anyhow!("Invalid duration: {}", value))?;
                if secs == 0 {
                    bail!("Toast duration must be at least one second");
                }
                self.ui.toast_secs = secs;
            }
            "ui.audit_page_size" => {
                let size = value.parse::<usize>().map_err(|_| anyhow!("Invalid page size: {}", value))?;
                if size == 0 {
                    bail!("Audit page size must be positive");
                }
                self.ui.audit_page_size = size;
            }
            _ => bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }
}
