//! Opening the battle service for a command.
//!
//! Every command builds its own service from the global `--store` and
//! `--config` options. The store defaults to the directory chosen by
//! [`ServiceConfig::resolve_store_dir`].

use anyhow::{Context, Result};
use nftune_service::{
    BattleService, JsonFileStore, LocalRandomness, MemoryStore, ServiceConfig, Store,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// The service as used by the CLI.
pub type CliService = BattleService<LocalRandomness>;

/// Global options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Store directory override.
    pub store: Option<PathBuf>,
    /// Config file.
    pub config: Option<PathBuf>,
    /// Keep records in memory only.
    pub memory: bool,
}

impl AppOptions {
    /// Options for a JSON-file store at `dir`.
    pub fn with_store(dir: impl Into<PathBuf>) -> Self {
        Self {
            store: Some(dir.into()),
            ..Default::default()
        }
    }

    /// Loads the configuration file, or the defaults when none was given.
    pub fn load_config(&self) -> Result<ServiceConfig> {
        match &self.config {
            Some(path) => ServiceConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display())),
            None => Ok(ServiceConfig::default()),
        }
    }

    /// Opens the store named by the options and config.
    pub fn open_store(&self, config: &ServiceConfig) -> Result<Arc<dyn Store>> {
        if self.memory {
            return Ok(Arc::new(MemoryStore::new()));
        }
        let dir = self
            .store
            .clone()
            .or_else(|| config.resolve_store_dir())
            .context("No store directory: pass --store or set NFTUNE_STORE_DIR")?;
        Ok(Arc::new(open_file_store(&dir)?))
    }

    /// Builds the battle service.
    pub fn open_service(&self) -> Result<CliService> {
        let config = self.load_config()?;
        let store = self.open_store(&config)?;
        let randomness = match config.shuffle_seed {
            Some(seed) => LocalRandomness::new(seed),
            None => LocalRandomness::from_entropy(),
        };
        Ok(BattleService::new(store, randomness, config))
    }
}

fn open_file_store(dir: &Path) -> Result<JsonFileStore> {
    JsonFileStore::open(dir).with_context(|| format!("Failed to open store: {}", dir.display()))
}

/// Single-threaded runtime for one command.
pub fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_ignores_directory() {
        let options = AppOptions {
            memory: true,
            ..Default::default()
        };
        let config = ServiceConfig::default();
        assert!(options.open_store(&config).is_ok());
    }

    #[test]
    fn test_open_file_store_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("store");
        let options = AppOptions::with_store(&dir);

        let service = options.open_service().unwrap();
        assert!(dir.is_dir());
        assert_eq!(service.config().initial_energy, 50);
    }

    #[test]
    fn test_missing_config_is_reported() {
        let options = AppOptions {
            config: Some(PathBuf::from("/nonexistent/nftune.json")),
            ..Default::default()
        };
        let err = options.load_config().unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
