//! Worker configuration.
//!
//! A [`Config`] only exists in validated form: it is produced by
//! [`ConfigBuilder::build`], which fails if the endpoint list, flow id or
//! worker id is missing. Values can come from code, the environment
//! ([`ConfigBuilder::apply_env`]) or `config.toml` ([`ConfigBuilder::apply_file`]).

mod duration;
mod env;
mod file;

pub use duration::parse_duration;
pub use env::{ENV_CONSUME_TIMEOUT, ENV_FLOW_ID, ENV_MAX_INTAKE, ENV_RAVEN_URL, ENV_WORKER_ID};
pub use file::{config_path, load_from, load_or_init, FileConfig, RetryConfig};

use crate::backoff::BackoffFactory;
use crate::endpoint::check_endpoint;
use crate::session::http::{default_user_agent, DEFAULT_HTTP_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no backend endpoints configured (set {})", ENV_RAVEN_URL)]
    MissingEndpoints,

    #[error("invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("flow id is empty (set {})", ENV_FLOW_ID)]
    MissingFlowId,

    #[error("worker id is empty (set {})", ENV_WORKER_ID)]
    MissingWorkerId,

    #[error("invalid duration {0:?} (expected e.g. 250ms, 5s, 1m30s)")]
    InvalidDuration(String),

    #[error("invalid value for {name}: {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("config directory: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),

    #[error("config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("write config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Validated worker configuration.
#[derive(Debug, Clone)]
pub struct Config {
    endpoints: Vec<Url>,
    flow_id: String,
    worker_id: String,
    consume_timeout: Option<Duration>,
    backoff: BackoffFactory,
    max_intake: Option<u64>,
    http_timeout: Duration,
    user_agent: String,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Backend endpoints in rotation order.
    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Bound on a whole Consume call; `None` waits forever.
    pub fn consume_timeout(&self) -> Option<Duration> {
        self.consume_timeout
    }

    pub fn backoff(&self) -> &BackoffFactory {
        &self.backoff
    }

    /// Number of claims after which Consume stops; `None` is unlimited.
    pub fn max_intake(&self) -> Option<u64> {
        self.max_intake
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Collects configuration values; [`build`](Self::build) validates them.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    endpoints: Vec<String>,
    flow_id: Option<String>,
    worker_id: Option<String>,
    consume_timeout: Option<Duration>,
    backoff: Option<BackoffFactory>,
    max_intake: Option<u64>,
    http_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ConfigBuilder {
    /// Replace the endpoint list with a comma-separated list of URLs.
    pub fn endpoints(mut self, list: &str) -> Self {
        self.endpoints = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Append one endpoint URL.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoints.push(url.into());
        self
    }

    pub fn flow_id(mut self, flow_id: impl Into<String>) -> Self {
        self.flow_id = Some(flow_id.into());
        self
    }

    pub fn worker_id(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = Some(worker_id.into());
        self
    }

    /// Bound every Consume call. Zero means no bound.
    pub fn consume_timeout(mut self, timeout: Duration) -> Self {
        self.consume_timeout = Some(timeout);
        self
    }

    pub fn backoff(mut self, factory: BackoffFactory) -> Self {
        self.backoff = Some(factory);
        self
    }

    /// Stop claiming after `n` successful claims. Zero means unlimited.
    pub fn max_intake(mut self, n: u64) -> Self {
        self.max_intake = Some(n);
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validate and produce the final config.
    pub fn build(self) -> Result<Config, ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::MissingEndpoints);
        }
        let endpoints = self
            .endpoints
            .iter()
            .map(|raw| parse_endpoint(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let flow_id = non_empty(self.flow_id).ok_or(ConfigError::MissingFlowId)?;
        let worker_id = non_empty(self.worker_id).ok_or(ConfigError::MissingWorkerId)?;

        Ok(Config {
            endpoints,
            flow_id,
            worker_id,
            consume_timeout: self.consume_timeout.filter(|t| !t.is_zero()),
            backoff: self.backoff.unwrap_or_default(),
            max_intake: self.max_intake.filter(|n| *n > 0),
            http_timeout: self
                .http_timeout
                .filter(|t| !t.is_zero())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
        })
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    check_endpoint(&url)?;
    Ok(url)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
