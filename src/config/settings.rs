//! Configuration settings for the Vidu MCP server.

use crate::error::{Result, ViduError};
use crate::vidu::PollConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the Vidu API key.
pub const ENV_API_KEY: &str = "VIDU_API_KEY";
/// Environment variable holding the Vidu API host.
pub const ENV_API_HOST: &str = "VIDU_API_HOST";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "VIDU_LOG_LEVEL";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub api: ApiSettings,
    pub polling: PollingSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Upstream API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Vidu API key.
    pub api_key: Option<String>,
    /// Vidu API host, e.g. `https://api.vidu.com`.
    pub api_host: Option<String>,
    /// Timeout for a single HTTP request.
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_host: None,
            request_timeout_secs: 60,
        }
    }
}

/// Job polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Seconds to wait between status checks.
    pub interval_secs: u64,
    /// Maximum number of status checks before giving up.
    pub max_attempts: u32,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_secs: 20,
            max_attempts: 30, // 10 minutes at the default interval
        }
    }
}

/// Validated credentials required to talk to the upstream API.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub api_host: String,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment variables take precedence over the file.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Override values from the environment using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.api.api_key = Some(key);
        }
        if let Some(host) = non_empty(ENV_API_HOST) {
            self.api.api_host = Some(host);
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.general.log_level = level.to_lowercase();
        }
    }

    /// Return the API credentials, failing if either is missing.
    pub fn credentials(&self) -> Result<Credentials> {
        let api_key = self
            .api
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ViduError::Config(format!("{} environment variable is required", ENV_API_KEY))
            })?;

        let api_host = self
            .api
            .api_host
            .as_deref()
            .map(|h| h.trim().trim_end_matches('/'))
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                ViduError::Config(format!("{} environment variable is required", ENV_API_HOST))
            })?;

        Ok(Credentials {
            api_key: api_key.to_string(),
            api_host: api_host.to_string(),
        })
    }

    /// Polling behaviour derived from the `[polling]` section.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.polling.interval_secs),
            max_attempts: self.polling.max_attempts,
        }
    }

    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidu-mcp")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}
