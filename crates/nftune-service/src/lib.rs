//! NFTune Battle Service
//!
//! This crate runs playlist battles on top of the rules in `nftune-battle`.
//! It owns the persisted records, the randomness source battles are seeded
//! from and the per-battle serialisation of mutations.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use nftune_battle::{PlaylistPrompt, RandomSeed, Song};
//! use nftune_service::{BattleService, Catalog, FixedRandomness, MemoryStore, NewBattle, ServiceConfig};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let service = BattleService::new(
//!     Arc::new(MemoryStore::new()),
//!     FixedRandomness::new(RandomSeed::parse("0x9c4e").unwrap(), false),
//!     ServiceConfig::default(),
//! );
//! service
//!     .import_catalog(&Catalog {
//!         songs: vec![Song::new("s1", "Intro", "Band"), Song::new("s2", "Outro", "Band")],
//!         prompts: vec![PlaylistPrompt {
//!             id: "p1".into(),
//!             name: "Late Night".into(),
//!             description: String::new(),
//!             color: String::new(),
//!         }],
//!     })
//!     .unwrap();
//!
//! let battle = service
//!     .create_battle(&NewBattle {
//!         wallet_address: "0xABC".into(),
//!         prompt_id: "p1".into(),
//!         songs: Vec::new(),
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(battle.queue_songs.len(), 2);
//! assert_eq!(battle.energy_units.units(), 50);
//! # });
//! ```
//!
//! # Modules
//!
//! - [`api`]: Request and response bodies of the action endpoints
//! - [`config`]: Service configuration file
//! - [`locks`]: Per-record async locks
//! - [`randomness`]: Seed sources and the bounded wait for a seed
//! - [`service`]: The battle service
//! - [`store`]: Record stores (in-memory and JSON files)

pub mod api;
pub mod config;
pub mod locks;
pub mod randomness;
pub mod service;
pub mod store;

pub use api::{ActionKind, ActionRequest, ActionResponse, BattleView, ErrorBody, SuccessBody};
pub use config::{ConfigError, ServiceConfig};
pub use locks::InstanceLocks;
pub use randomness::{
    wait_for_result, FixedRandomness, LocalRandomness, RandomnessResult, RandomnessSource,
    RequestId,
};
pub use service::{
    gallery_entry_id, BattleService, Catalog, ImportSummary, NewBattle, MAX_WRITE_ATTEMPTS,
};
pub use store::{
    Collection, JsonFileStore, MemoryStore, Record, Store, StoreExt, StoredRecord,
    WritePrecondition,
};
