//! Configuration for the hdfstools client

use crate::common::{Error, Result};
use crate::coordinator::CoordinatorNode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `HDFSTOOLS__LOG_LEVEL=debug`
pub const ENV_PREFIX: &str = "HDFSTOOLS";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Candidate namenodes, in order of preference
    #[serde(default)]
    pub namenodes: Vec<CoordinatorNode>,

    /// How long an active-namenode answer is trusted before re-probing
    #[serde(default = "default_staleness_window")]
    pub staleness_window_ms: u64,

    /// Timeout for a single HTTP request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Attempt budgets per operation class
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_staleness_window() -> u64 {
    10_000
}
fn default_request_timeout() -> u64 {
    30_000
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Attempt budgets. A spurious retry of a read is cheap, a spurious
/// re-upload is not, hence separate knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// LISTSTATUS, GETFILESTATUS, OPEN
    #[serde(default = "default_read_attempts")]
    pub read_attempts: u32,

    /// DELETE
    #[serde(default = "default_delete_attempts")]
    pub delete_attempts: u32,

    /// CREATE, RENAME, MKDIRS
    #[serde(default = "default_write_attempts")]
    pub write_attempts: u32,
}

fn default_read_attempts() -> u32 {
    2
}
fn default_delete_attempts() -> u32 {
    2
}
fn default_write_attempts() -> u32 {
    3
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            read_attempts: default_read_attempts(),
            delete_attempts: default_delete_attempts(),
            write_attempts: default_write_attempts(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            namenodes: Vec::new(),
            staleness_window_ms: default_staleness_window(),
            request_timeout_ms: default_request_timeout(),
            retry: RetryConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    pub fn new(namenodes: Vec<CoordinatorNode>) -> Self {
        Self {
            namenodes,
            ..Default::default()
        }
    }

    /// Load configuration from an optional TOML file, then apply
    /// `HDFSTOOLS__*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::InvalidConfig(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn staleness_window(&self) -> Duration {
        Duration::from_millis(self.staleness_window_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Reject configurations the client cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.namenodes.is_empty() {
            return Err(Error::InvalidConfig("at least one namenode is required".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::InvalidConfig("request timeout must be positive".into()));
        }
        Ok(())
    }
}
