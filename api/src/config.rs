//! Server configuration
//!
//! JSON file named by `KVQ_CONFIG` (default `/etc/kvq/server.json`). Every
//! field is optional; absent fields take their defaults.

use kvq_common::{KvqError, KvqResult};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Env var naming the config file
pub const CONFIG_PATH_ENV: &str = "KVQ_CONFIG";
/// Env var overriding `listen_addr`
pub const LISTEN_ADDR_ENV: &str = "KVQ_LISTEN_ADDR";
/// Config file used when `KVQ_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "/etc/kvq/server.json";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid JSON for [`ServerConfig`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Values are inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds
    pub listen_addr: SocketAddr,
    /// Period of the expiry/lease sweeper
    pub sweep_interval_ms: u64,
    /// Lease length when a receive names none
    pub default_visibility_timeout_ms: u64,
    /// Longer requested leases are clamped to this
    pub max_visibility_timeout_ms: u64,
    /// Snapshot file; no persistence when unset
    pub snapshot_path: Option<PathBuf>,
    /// Period of background snapshot saves while `snapshot_path` is set
    pub snapshot_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            sweep_interval_ms: 1_000,
            default_visibility_timeout_ms: 30_000,
            max_visibility_timeout_ms: 12 * 60 * 60 * 1_000,
            snapshot_path: None,
            snapshot_interval_ms: 60_000,
        }
    }
}

impl ServerConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config from the environment
    ///
    /// A missing or unreadable file falls back to defaults with a warning;
    /// a file that exists but does not parse or validate is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

        let mut config = match Self::load(&path) {
            Ok(config) => {
                tracing::info!(path = %path, "loaded config");
                config
            }
            Err(ConfigError::Io(err)) => {
                if err.kind() == ErrorKind::NotFound {
                    tracing::warn!(path = %path, "config not found, using defaults");
                } else {
                    tracing::warn!(path = %path, error = %err, "config unreadable, using defaults");
                }
                Self::default()
            }
            Err(err) => return Err(err),
        };

        if let Ok(addr) = std::env::var(LISTEN_ADDR_ENV) {
            config.listen_addr = addr.parse().map_err(|_| {
                ConfigError::Invalid(format!("{LISTEN_ADDR_ENV}={addr} is not a socket address"))
            })?;
        }
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid("sweep_interval_ms must be > 0".into()));
        }
        if self.snapshot_interval_ms == 0 {
            return Err(ConfigError::Invalid("snapshot_interval_ms must be > 0".into()));
        }
        if self.default_visibility_timeout_ms > self.max_visibility_timeout_ms {
            return Err(ConfigError::Invalid(
                "default_visibility_timeout_ms exceeds max_visibility_timeout_ms".into(),
            ));
        }
        Ok(())
    }

    /// Sweeper period
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Background snapshot period
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }

    /// Turn a client-supplied visibility timeout into a lease length
    ///
    /// Absent means the default; larger than the maximum is clamped; negative
    /// is rejected. Zero is allowed.
    pub fn visibility_timeout(&self, requested_ms: Option<i64>) -> KvqResult<Duration> {
        let ms = match requested_ms {
            None => self.default_visibility_timeout_ms,
            Some(ms) if ms < 0 => {
                return Err(KvqError::validation(format!(
                    "visibilityTimeout must be >= 0, got {ms}"
                )))
            }
            Some(ms) => (ms as u64).min(self.max_visibility_timeout_ms),
        };
        Ok(Duration::from_millis(ms))
    }
}
