//! The battle service.
//!
//! [`BattleService`] is the single mutator of persisted battles. Every
//! mutation runs under the battle's async lock, reads the stored snapshot,
//! applies the rule from `nftune-battle` and writes back with a
//! compare-and-swap on the snapshot version. A conflicting write is retried
//! once against a fresh read.

mod battles;
mod catalog;
mod gallery;


pub use battles::NewBattle;
pub use catalog::{Catalog, ImportSummary};
pub use gallery::gallery_entry_id;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use nftune_battle::{create_rng, BattleError, BattleInstance, BattleResult, RevealState};
use rand_pcg::Pcg32;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::locks::InstanceLocks;
use crate::randomness::RandomnessSource;
use crate::store::{Store, StoreExt};

/// Reads per mutation before a conflict is surfaced.
pub const MAX_WRITE_ATTEMPTS: u32 = 2;

/// Battle service over a store and a randomness source.
pub struct BattleService<R> {
    store: Arc<dyn Store>,
    randomness: R,
    config: ServiceConfig,
    locks: InstanceLocks,
    shuffle_rng: Mutex<Pcg32>,
    id_counter: AtomicU64,
}

impl<R: RandomnessSource> BattleService<R> {
    /// Creates a service.
    pub fn new(store: Arc<dyn Store>, randomness: R, config: ServiceConfig) -> Self {
        let shuffle_seed = config.shuffle_seed.unwrap_or_else(rand::random);
        Self {
            store,
            randomness,
            config,
            locks: InstanceLocks::new(),
            shuffle_rng: Mutex::new(create_rng(shuffle_seed)),
            id_counter: AtomicU64::new(0),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// The active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The randomness source.
    pub fn randomness(&self) -> &R {
        &self.randomness
    }

    /// Fresh session-local reveal state using the configured flip delay.
    pub fn new_reveal_state(&self) -> RevealState {
        RevealState::with_flip_delay(self.config.flip_delay())
    }

    /// Runs `op` against the stored battle and commits its result.
    ///
    /// `op` may run twice if the first write loses a race.
    async fn mutate<F>(&self, id: &str, label: &'static str, op: F) -> BattleResult<BattleInstance>
    where
        F: Fn(&BattleInstance) -> BattleResult<BattleInstance> + Send + Sync,
    {
        let _guard = self.locks.acquire(id).await;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let current: BattleInstance = self.store.require(id)?;
            current.validate()?;

            let mut next = op(&current)?;
            next.touch(Utc::now());

            match self.store.compare_and_swap(current.version, &next) {
                Ok(()) => {
                    info!(
                        battle = id,
                        action = label,
                        version = next.version,
                        energy = next.energy_units.units(),
                        queue = next.queue_songs.len(),
                        playlist = next.playlist_songs.len(),
                        "battle updated"
                    );
                    return Ok(next);
                }
                Err(err) if err.is_conflict() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(battle = id, action = label, error = %err, "write conflict, retrying");
                }
                Err(err) => {
                    warn!(battle = id, action = label, error = %err, "battle update failed");
                    return Err(err);
                }
            }
        }
    }

    fn shuffle_rng(&self) -> BattleResult<MutexGuard<'_, Pcg32>> {
        self.shuffle_rng
            .lock()
            .map_err(|_| BattleError::storage("shuffle generator lock poisoned"))
    }

    /// New record id: `<prefix>-` followed by 16 hex digits.
    fn new_record_id(&self, prefix: &str, parts: &[&str]) -> String {
        let counter = self.id_counter.fetch_add(1, Ordering::Relaxed);
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update(b"\0");
        }
        hasher.update(&Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
        hasher.update(&counter.to_le_bytes());
        let hex = hasher.finalize().to_hex();
        format!("{}-{}", prefix, &hex.as_str()[..16])
    }
}
