use super::{parse_duration, ConfigBuilder, ConfigError};
use crate::backoff::{BackoffFactory, ExponentialBackoff};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// First backoff interval in milliseconds.
    pub initial_interval_ms: u64,
    /// Growth factor applied after every retry.
    pub multiplier: f64,
    /// Upper bound on a single interval in milliseconds.
    pub max_interval_ms: u64,
    /// Give up after this many retries (None = retry forever).
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Give up once this many seconds have passed (None = no limit).
    #[serde(default)]
    pub max_elapsed_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 500,
            multiplier: 1.5,
            max_interval_ms: 60_000,
            max_retries: None,
            max_elapsed_secs: None,
        }
    }
}

impl RetryConfig {
    /// Backoff factory described by this section.
    pub fn to_factory(&self) -> BackoffFactory {
        let initial = Duration::from_millis(self.initial_interval_ms);
        let max = Duration::from_millis(self.max_interval_ms);
        let multiplier = self.multiplier;
        let mut factory =
            BackoffFactory::new(move || ExponentialBackoff::new(initial, multiplier, max));
        if let Some(n) = self.max_retries {
            factory = factory.with_max_retries(n);
        }
        if let Some(secs) = self.max_elapsed_secs {
            factory = factory.with_max_elapsed(Duration::from_secs(secs));
        }
        factory
    }
}

/// Worker settings loaded from `~/.config/raven/config.toml`.
///
/// Every field is optional so the environment can fill the gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Backend endpoint URLs, in rotation order.
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub flow_id: Option<String>,
    #[serde(default)]
    pub worker_id: Option<String>,
    /// Bound on a Consume call, e.g. "30s". Missing or "0" waits forever.
    #[serde(default)]
    pub consume_timeout: Option<String>,
    /// Stop claiming after this many messages.
    #[serde(default)]
    pub max_intake: Option<u64>,
    /// Per-request HTTP timeout in seconds.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl ConfigBuilder {
    /// Take every value present in `file`.
    pub fn apply_file(mut self, file: &FileConfig) -> Result<Self, ConfigError> {
        if !file.endpoints.is_empty() {
            self = self.endpoints(&file.endpoints.join(","));
        }
        if let Some(flow_id) = &file.flow_id {
            self = self.flow_id(flow_id.clone());
        }
        if let Some(worker_id) = &file.worker_id {
            self = self.worker_id(worker_id.clone());
        }
        if let Some(timeout) = &file.consume_timeout {
            self = self.consume_timeout(parse_duration(timeout)?);
        }
        if let Some(n) = file.max_intake {
            self = self.max_intake(n);
        }
        if let Some(secs) = file.http_timeout_secs {
            self = self.http_timeout(Duration::from_secs(secs));
        }
        if let Some(retry) = &file.retry {
            self = self.backoff(retry.to_factory());
        }
        Ok(self)
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("raven")?;
    xdg_dirs
        .place_config_file("config.toml")
        .map_err(|source| ConfigError::Io {
            path: xdg_dirs.get_config_home(),
            source,
        })
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FileConfig, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FileConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, toml).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<FileConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&data)?)
}
