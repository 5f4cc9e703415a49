//! Service configuration.
//!
//! Configuration is a small JSON document. Every field is optional; missing
//! fields take the defaults below.
//!
//! ```json
//! {
//!   "store_dir": "/var/lib/nftune",
//!   "initial_energy": 50,
//!   "randomness_timeout_ms": 60000,
//!   "poll_interval_ms": 2000,
//!   "flip_delay_ms": 600
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use nftune_battle::{DEFAULT_INITIAL_ENERGY, MAX_ENERGY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the store directory.
pub const STORE_DIR_ENV: &str = "NFTUNE_STORE_DIR";

/// Default bounded wait for the randomness source.
pub const DEFAULT_RANDOMNESS_TIMEOUT_MS: u64 = 60_000;

/// Default polling interval while waiting for randomness.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default card flip animation delay.
pub const DEFAULT_FLIP_DELAY_MS: u64 = 600;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for [`ServiceConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid config value for {field}: {message}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    /// Returns the stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "CFG_001",
            ConfigError::Parse(_) => "CFG_002",
            ConfigError::Invalid { .. } => "CFG_003",
        }
    }
}

/// Tunables of the battle service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Directory of the JSON-file store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    /// Energy a new battle starts with.
    pub initial_energy: u8,
    /// How long battle creation waits for a seed.
    pub randomness_timeout_ms: u64,
    /// Delay between randomness polls.
    pub poll_interval_ms: u64,
    /// Card flip animation delay for reveal sessions.
    pub flip_delay_ms: u64,
    /// Seed of the generator used for rearranges. Random when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            initial_energy: DEFAULT_INITIAL_ENERGY,
            randomness_timeout_ms: DEFAULT_RANDOMNESS_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            flip_delay_ms: DEFAULT_FLIP_DELAY_MS,
            shuffle_seed: None,
        }
    }
}

impl ServiceConfig {
    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_energy > MAX_ENERGY {
            return Err(ConfigError::Invalid {
                field: "initial_energy",
                message: format!("must be at most {}, got {}", MAX_ENERGY, self.initial_energy),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_ms",
                message: "must be positive".to_string(),
            });
        }
        if self.randomness_timeout_ms < self.poll_interval_ms {
            return Err(ConfigError::Invalid {
                field: "randomness_timeout_ms",
                message: format!(
                    "must be at least poll_interval_ms ({})",
                    self.poll_interval_ms
                ),
            });
        }
        Ok(())
    }

    /// Bounded wait for the randomness source.
    pub fn randomness_timeout(&self) -> Duration {
        Duration::from_millis(self.randomness_timeout_ms)
    }

    /// Delay between randomness polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Flip animation delay.
    pub fn flip_delay(&self) -> Duration {
        Duration::from_millis(self.flip_delay_ms)
    }

    /// Resolves the store directory: explicit setting, then `NFTUNE_STORE_DIR`,
    /// then the platform data directory.
    pub fn resolve_store_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.store_dir {
            return Some(dir.clone());
        }
        if let Some(dir) = std::env::var_os(STORE_DIR_ENV).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(dir));
        }
        Self::default_store_dir()
    }

    /// Platform data directory for the store.
    pub fn default_store_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("nftune").join("store"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.initial_energy, 50);
        assert_eq!(config.randomness_timeout(), Duration::from_secs(60));
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.flip_delay(), Duration::from_millis(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ServiceConfig::from_json(r#"{"initial_energy": 80}"#).unwrap();
        assert_eq!(config.initial_energy, 80);
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = ServiceConfig::from_json(r#"{"initial_energy": 120}"#).unwrap_err();
        assert_eq!(err.code(), "CFG_003");

        let err = ServiceConfig::from_json(r#"{"poll_interval_ms": 0}"#).unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));

        let err = ServiceConfig::from_json(r#"{"unknown": 1}"#).unwrap_err();
        assert_eq!(err.code(), "CFG_002");
    }

    #[test]
    fn test_explicit_store_dir_wins() {
        let config = ServiceConfig {
            store_dir: Some(PathBuf::from("/tmp/nftune-test")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_store_dir(),
            Some(PathBuf::from("/tmp/nftune-test"))
        );
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nftune.json");
        std::fs::write(&path, r#"{"flip_delay_ms": 0}"#).unwrap();
        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.flip_delay(), Duration::ZERO);

        let missing = ServiceConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(missing.code(), "CFG_001");
    }
}
