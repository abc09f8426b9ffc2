//! # Panel Configuration
//!
//! Settings for the API connection, listing pages and logging. Loaded from a
//! TOML file, then overridden by environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const CONFIG_PATH_VAR: &str = "SMM_PANEL_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "./smm-panel.toml";

/// Top-level panel configuration
///
/// # Examples
///
/// ```rust
/// use smm_panel::config::PanelConfig;
///
/// let config = PanelConfig::default();
/// assert_eq!(config.api.base_url, "http://localhost:5000/api");
/// assert_eq!(config.listing.users_per_page, 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub api: ApiEndpointConfig,
    pub listing: ListingConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for the panel REST API
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpointConfig {
    /// Base URL every endpoint path is joined onto
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Bearer token sent with every request (if set)
    pub auth_token: Option<String>,
    /// Use the admin service catalog endpoints
    pub admin: bool,
}

impl Default for ApiEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_ms: 30_000,
            auth_token: None,
            admin: false,
        }
    }
}

impl std::fmt::Debug for ApiEndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEndpointConfig")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("auth_enabled", &self.auth_token.is_some())
            .field("admin", &self.admin)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub orders_per_page: usize,
    pub users_per_page: usize,
    /// Orders shown on the dashboard
    pub recent_orders: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { orders_per_page: 10, users_per_page: 10, recent_orders: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "smm_panel=info".to_string() }
    }
}

impl PanelConfig {
    /// Load configuration from the config file and environment
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file (`$SMM_PANEL_CONFIG`, else `./smm-panel.toml`)
    /// 3. Default values
    ///
    /// A missing default file is not an error; an unreadable or malformed one is.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
        let mut config = match Self::find_config_file(explicit) {
            Some(path) => {
                debug!(path = %path.display(), "Loading panel config");
                Self::load_from_file(&path)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        debug!(?config, "Loaded panel configuration");
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    fn find_config_file(explicit: Option<PathBuf>) -> Option<PathBuf> {
        // An explicit path is returned even when missing so the read error surfaces
        if explicit.is_some() {
            return explicit;
        }
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.is_file().then_some(default)
    }

    /// Apply overrides from `lookup` (the process environment in [`PanelConfig::load`])
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("SMM_PANEL_API_URL") {
            self.api.base_url = url;
        }
        if let Some(token) = lookup("SMM_PANEL_API_TOKEN") {
            self.api.auth_token = (!token.is_empty()).then_some(token);
        }
        if let Some(timeout) = lookup("SMM_PANEL_TIMEOUT_MS") {
            self.api.timeout_ms = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SMM_PANEL_TIMEOUT_MS".to_string(),
                value: timeout.clone(),
            })?;
        }
        if let Some(filter) = lookup("SMM_PANEL_LOG") {
            self.logging.filter = filter;
        }
        Ok(())
    }
}
