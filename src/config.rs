//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::model::TrendPeriod;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// REST API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Live update stream configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamConfig {
    /// WebSocket URL; derived from `api.base_url` when unset
    pub url: Option<String>,

    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Reconnect policy for the live stream (disabled by default)
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    30_000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

/// How the initial load treats a failed read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPolicy {
    /// All reads run concurrently; one failure never blocks the others
    #[default]
    Independent,
    /// Reads run in order and the first failure aborts the rest
    FailFast,
}

impl std::str::FromStr for FetchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "independent" => Ok(FetchPolicy::Independent),
            "fail_fast" => Ok(FetchPolicy::FailFast),
            other => Err(format!(
                "unknown fetch policy '{}', expected independent or fail_fast",
                other
            )),
        }
    }
}

/// Initial load configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub policy: FetchPolicy,

    /// Call `/health` before loading
    #[serde(default)]
    pub probe_health: bool,

    #[serde(default = "default_distribution_hours")]
    pub distribution_hours: u32,

    #[serde(default)]
    pub trend_period: TrendPeriod,

    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,

    /// Restrict the distribution to one source
    pub source: Option<String>,
}

fn default_distribution_hours() -> u32 {
    24
}

fn default_recent_limit() -> u32 {
    5
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            policy: FetchPolicy::default(),
            probe_health: false,
            distribution_hours: default_distribution_hours(),
            trend_period: TrendPeriod::default(),
            recent_limit: default_recent_limit(),
            source: None,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfig {
    /// Show times in UTC instead of local time
    #[serde(default)]
    pub utc: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
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
            file: None,
        }
    }
}

impl StreamConfig {
    /// Effective WebSocket URL
    ///
    /// `http://host:8000/api` becomes `ws://host:8000/ws/sentiment`.
    pub fn resolve_url(&self, api: &ApiConfig) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        let base = api
            .base_url
            .trim_end_matches('/')
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        let root = base.strip_suffix("/api").unwrap_or(&base);
        format!("{}/ws/sentiment", root)
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
        let config_paths = [
            dirs::config_dir().map(|p| p.join("sentiview").join("config.toml")),
            Some(PathBuf::from("./sentiview.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
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
        if let Some(url) = var("SENTIVIEW_API_URL") {
            self.api.base_url = url;
        }
        if let Some(url) = var("SENTIVIEW_WS_URL") {
            self.stream.url = Some(url);
        }
        if let Some(policy) = var("SENTIVIEW_FETCH_POLICY") {
            match policy.parse() {
                Ok(p) => self.fetch.policy = p,
                Err(e) => tracing::warn!("Ignoring SENTIVIEW_FETCH_POLICY: {}", e),
            }
        }
        if let Some(level) = var("SENTIVIEW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SENTIVIEW_LOG_FORMAT") {
            self.logging.format = format;
        }
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
    r#"# Sentiview Configuration
#
# Environment variables override these settings:
# - SENTIVIEW_API_URL
# - SENTIVIEW_WS_URL
# - SENTIVIEW_FETCH_POLICY
# - SENTIVIEW_LOG_LEVEL
# - SENTIVIEW_LOG_FORMAT

[api]
# Base URL of the sentiment API (including the /api prefix)
base_url = "http://localhost:8000/api"

# Request timeout in seconds
request_timeout_secs = 10

[stream]
# WebSocket URL for live updates (derived from api.base_url when unset)
# url = "ws://localhost:8000/ws/sentiment"

[stream.reconnect]
# Reconnect after the stream drops
enabled = false

# Give up after this many consecutive failed attempts
max_attempts = 5

# Backoff: base_delay_ms * 2^attempt, capped at max_delay_ms
base_delay_ms = 1000
max_delay_ms = 30000

[fetch]
# independent: reads run concurrently, one failure does not block the others
# fail_fast: reads run in order, the first failure aborts the rest
policy = "independent"

# Call /health before the initial load
probe_health = false

# Distribution window (hours)
distribution_hours = 24

# Trend bucket: hour, day, week
trend_period = "hour"

# Number of recent posts to load (the list holds at most 5)
recent_limit = 5

# Restrict the distribution to one source
# source = "twitter"

[display]
# Show times in UTC instead of local time
utc = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path (logs go to stderr otherwise)
# file = "/tmp/sentiview.log"
"#
    .to_string()
}
