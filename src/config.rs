//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub realtime: RealtimeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Feed backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// No timeout unless set
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_page_size() -> u32 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            request_timeout_secs: None,
        }
    }
}

/// Push channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "default_realtime_enabled")]
    pub enabled: bool,

    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Overrides the URL derived from the backend base URL
    #[serde(default)]
    pub ws_url: Option<String>,

    #[serde(default)]
    pub reconnect_max_attempts: u32,

    #[serde(default = "default_reconnect_base_delay")]
    pub reconnect_base_delay_ms: u64,

    #[serde(default = "default_reconnect_max_delay")]
    pub reconnect_max_delay_ms: u64,
}

fn default_realtime_enabled() -> bool {
    true
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_reconnect_base_delay() -> u64 {
    1000 // 1 second
}

fn default_reconnect_max_delay() -> u64 {
    30000 // 30 seconds
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: default_realtime_enabled(),
            ws_path: default_ws_path(),
            ws_url: None,
            reconnect_max_attempts: 0,
            reconnect_base_delay_ms: default_reconnect_base_delay(),
            reconnect_max_delay_ms: default_reconnect_max_delay(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("viewfeed").join("config.toml")),
            Some(PathBuf::from("./viewfeed.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first existing file in `paths`, skipping broken ones
    pub fn load_first(paths: &[PathBuf]) -> Self {
        for path_opt in paths {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Backend overrides
        if let Some(url) = var("VIEWFEED_BASE_URL") {
            self.backend.base_url = url;
        }
        if let Some(size) = var("VIEWFEED_PAGE_SIZE") {
            if let Ok(n) = size.parse() {
                self.backend.page_size = n;
            }
        }

        // Realtime overrides
        if let Some(url) = var("VIEWFEED_WS_URL") {
            self.realtime.ws_url = Some(url);
        }

        // Logging overrides
        if let Some(level) = var("VIEWFEED_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("VIEWFEED_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// URL of the push socket
    ///
    /// Uses `realtime.ws_url` when set, otherwise swaps the base URL's scheme
    /// (`http` → `ws`, `https` → `wss`) and appends `realtime.ws_path`.
    pub fn ws_url(&self) -> String {
        if let Some(url) = &self.realtime.ws_url {
            return url.clone();
        }

        let base = self.backend.base_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };

        format!("{}{}", base, self.realtime.ws_path)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Viewfeed Configuration
#
# Environment variables override these settings:
# - VIEWFEED_BASE_URL
# - VIEWFEED_PAGE_SIZE
# - VIEWFEED_WS_URL
# - VIEWFEED_LOG_LEVEL
# - VIEWFEED_LOG_FORMAT

[backend]
# Feed backend base URL; media paths are appended to it
base_url = "http://127.0.0.1:8000"

# Views fetched per feed load
page_size = 10

# Per-request timeout in seconds (unset = wait forever)
# request_timeout_secs = 30

[realtime]
# Listen for new views and comments
enabled = true

# Socket path appended to the base URL (http -> ws, https -> wss)
ws_path = "/ws"

# Explicit socket URL, overrides the derived one
# ws_url = "ws://127.0.0.1:8000/ws"

# Reconnect attempts after the socket drops (0 = never reconnect)
reconnect_max_attempts = 0

# Backoff: min(base * 2^attempt, max)
reconnect_base_delay_ms = 1000
reconnect_max_delay_ms = 30000

[logging]
# Log level (trace, debug, info, warn, error)
level = "info"

# Log format (pretty, json)
format = "pretty"
"#
    .to_string()
}
