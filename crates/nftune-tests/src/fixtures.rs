//! Test fixture utilities for catalogues, stores and services.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nftune_battle::{PlaylistPrompt, RandomSeed, Song};
use nftune_cli::app::AppOptions;
use nftune_service::{
    BattleService, Catalog, FixedRandomness, JsonFileStore, MemoryStore, ServiceConfig, Store,
};
use tempfile::TempDir;

/// Seed used by fixed-randomness fixtures: 64 digits, mixed reveals.
pub const FIXTURE_SEED: &str =
    "0x8c3f0a9e17b2d4f65e0c9a8b7d3f21e4a6c8e0f2b4d6a8c0e2f4b6d8a0c2e4f6";

/// Prompt id present in every fixture catalogue.
pub const FIXTURE_PROMPT: &str = "road-trip";

/// A catalogue of `songs` songs and two prompts.
pub fn sample_catalog(songs: usize) -> Catalog {
    Catalog {
        songs: (1..=songs)
            .map(|i| {
                let mut song = Song::new(
                    format!("song-{:02}", i),
                    format!("Track {}", i),
                    format!("Artist {}", (i % 4) + 1),
                );
                song.duration = 150 + (i as u32 * 7) % 120;
                song
            })
            .collect(),
        prompts: vec![
            PlaylistPrompt {
                id: FIXTURE_PROMPT.into(),
                name: "Road Trip".into(),
                description: "Songs for the open road".into(),
                color: "from-orange-900 to-red-500".into(),
            },
            PlaylistPrompt {
                id: "late-night".into(),
                name: "Late Night".into(),
                description: "After hours".into(),
                color: "from-blue-900 to-cyan-500".into(),
            },
        ],
    }
}

/// Fast config for tests: short randomness waits, no flip delay.
pub fn fast_config(shuffle_seed: u64) -> ServiceConfig {
    ServiceConfig {
        randomness_timeout_ms: 2_000,
        poll_interval_ms: 5,
        flip_delay_ms: 0,
        shuffle_seed: Some(shuffle_seed),
        ..Default::default()
    }
}

/// In-memory service answering [`FIXTURE_SEED`], with the sample catalogue.
pub fn memory_service(songs: usize) -> BattleService<FixedRandomness> {
    service_on(Arc::new(MemoryStore::new()), songs)
}

/// Service over `store` answering [`FIXTURE_SEED`], with the sample catalogue.
pub fn service_on(store: Arc<dyn Store>, songs: usize) -> BattleService<FixedRandomness> {
    let seed = RandomSeed::parse(FIXTURE_SEED).expect("fixture seed is valid");
    let service = BattleService::new(store, FixedRandomness::new(seed, true), fast_config(1));
    service
        .import_catalog(&sample_catalog(songs))
        .expect("Failed to import fixture catalogue");
    service
}

/// A temporary JSON-file store with a config and catalogue file beside it.
pub struct StoreFixture {
    pub root: TempDir,
    pub store_dir: PathBuf,
    pub config_path: PathBuf,
    pub catalog_path: PathBuf,
}

impl StoreFixture {
    /// Create a fixture with `songs` catalogue songs (not yet imported).
    pub fn new(songs: usize) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let store_dir = root.path().join("store");

        let config_path = root.path().join("nftune.json");
        let config = serde_json::to_string_pretty(&fast_config(7)).expect("config serializes");
        fs::write(&config_path, config).expect("Failed to write config");

        let catalog_path = root.path().join("catalog.json");
        let catalog =
            serde_json::to_string_pretty(&sample_catalog(songs)).expect("catalogue serializes");
        fs::write(&catalog_path, catalog).expect("Failed to write catalogue");

        Self {
            root,
            store_dir,
            config_path,
            catalog_path,
        }
    }

    /// Get the fixture root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// CLI options pointing at this fixture.
    pub fn app(&self) -> AppOptions {
        AppOptions {
            store: Some(self.store_dir.clone()),
            config: Some(self.config_path.clone()),
            memory: false,
        }
    }

    /// Opens the store directly.
    pub fn open_store(&self) -> Arc<dyn Store> {
        Arc::new(JsonFileStore::open(&self.store_dir).expect("Failed to open store"))
    }
}
