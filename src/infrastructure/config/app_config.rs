//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::errors::ConfigError;
use crate::infrastructure::backend::RetryPolicy;
use crate::infrastructure::image::PreloadConfig;

use super::args::CliArgs;

const APP_NAME: &str = "homefeed";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "homefeed";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Retry configuration for backend queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the initial attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff in milliseconds; doubles per attempt.
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
        }
    }
}

impl RetrySettings {
    /// Converts to the retry policy used by the query layer.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_backoff: Duration::from_millis(self.base_backoff_ms),
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
        }
    }
}

/// Image prefetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchSettings {
    /// Leading images of a batch loaded before returning.
    #[serde(default = "default_eager_count")]
    pub eager_count: usize,
    /// Background batch size.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between background batches in milliseconds.
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
    /// Listings fetched per prefetch run.
    #[serde(default = "default_listing_limit")]
    pub listing_limit: u32,
}

impl Default for PrefetchSettings {
    fn default() -> Self {
        Self {
            eager_count: default_eager_count(),
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            listing_limit: default_listing_limit(),
        }
    }
}

impl PrefetchSettings {
    /// Converts to the preload configuration used by the image cache.
    #[must_use]
    pub const fn preload_config(&self) -> PreloadConfig {
        PreloadConfig {
            eager_count: self.eager_count,
            batch_size: self.batch_size,
            batch_pause: Duration::from_millis(self.batch_pause_ms),
        }
    }
}

/// Application configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Backend base URL.
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Backend API key. Usually supplied via `HOMEFEED_API_KEY` instead.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds for the HTTP clients.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry configuration.
    #[serde(default)]
    pub retry: RetrySettings,

    /// Prefetch configuration.
    #[serde(default)]
    pub prefetch: PrefetchSettings,
}

impl AppConfig {
    /// Loads configuration: config file (if present) merged with CLI args.
    ///
    /// # Errors
    /// Returns error if an explicitly given config file cannot be read or
    /// parsed.
    pub fn load(args: CliArgs) -> Result<Self, ConfigError> {
        let explicit = args.config.clone();
        let path = explicit.clone().or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })?
            }
            Some(path) if explicit.is_some() => {
                return Err(ConfigError::Read {
                    path,
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            _ => Self::default(),
        };

        config.merge_with_args(args);
        Ok(config)
    }

    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(backend_url) = args.backend_url {
            self.backend_url = Some(backend_url);
        }
        if let Some(api_key) = args.api_key {
            self.api_key = Some(api_key);
        }
        if let Some(limit) = args.limit {
            self.prefetch.listing_limit = limit;
        }
    }

    /// Request timeout for the HTTP clients.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the configured backend URL.
    ///
    /// # Errors
    /// Returns error if no URL was configured.
    pub fn require_backend_url(&self) -> Result<&str, ConfigError> {
        self.backend_url
            .as_deref()
            .ok_or(ConfigError::MissingBackendUrl)
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("homefeed.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            backend_url: None,
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            retry: RetrySettings::default(),
            prefetch: PrefetchSettings::default(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    1000
}

fn default_attempt_timeout_secs() -> u64 {
    15
}

fn default_eager_count() -> usize {
    3
}

fn default_batch_size() -> usize {
    4
}

fn default_batch_pause_ms() -> u64 {
    50
}

fn default_listing_limit() -> u32 {
    24
}
