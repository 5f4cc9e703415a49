//! Songs, prompts, users and daily playlists.

use chrono::Utc;
use nftune_battle::{
    generate_daily_playlists, generate_daily_playlists_with_rng, BattleError, BattleResult,
    DailyPlaylist, PlaylistPrompt, RandomSeed, Song, SongId, User,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::BattleService;
use crate::randomness::RandomnessSource;
use crate::store::StoreExt;

/// A catalogue file: songs and prompts to load into the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Songs.
    #[serde(default)]
    pub songs: Vec<Song>,
    /// Prompts.
    #[serde(default)]
    pub prompts: Vec<PlaylistPrompt>,
}

impl Catalog {
    /// Parses a catalogue from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Counts of imported records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Songs written.
    pub songs: usize,
    /// Prompts written.
    pub prompts: usize,
}

impl<R: RandomnessSource> BattleService<R> {
    /// Writes every song and prompt of the catalogue, replacing same-id records.
    pub fn import_catalog(&self, catalog: &Catalog) -> BattleResult<ImportSummary> {
        for song in &catalog.songs {
            self.store.put(song)?;
        }
        for prompt in &catalog.prompts {
            self.store.put(prompt)?;
        }
        let summary = ImportSummary {
            songs: catalog.songs.len(),
            prompts: catalog.prompts.len(),
        };
        info!(songs = summary.songs, prompts = summary.prompts, "catalogue imported");
        Ok(summary)
    }

    /// Loads a song.
    pub fn song(&self, id: &SongId) -> BattleResult<Song> {
        self.store.require(id.as_str())
    }

    /// The whole catalogue, ordered by id.
    pub fn songs(&self) -> BattleResult<Vec<Song>> {
        self.store.all()
    }

    /// Resolves ids in order, skipping ids missing from the catalogue.
    pub fn songs_for(&self, ids: &[SongId]) -> BattleResult<Vec<Song>> {
        let mut songs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(song) = self.store.get::<Song>(id.as_str())? {
                songs.push(song);
            }
        }
        Ok(songs)
    }

    /// Increments a song's like counter.
    pub async fn like_song(&self, id: &SongId) -> BattleResult<Song> {
        self.update_song(id, |song| song.likes += 1).await
    }

    /// Increments a song's play counter.
    pub async fn record_song_play(&self, id: &SongId) -> BattleResult<Song> {
        self.update_song(id, |song| song.play_count += 1).await
    }

    async fn update_song(&self, id: &SongId, update: impl FnOnce(&mut Song)) -> BattleResult<Song> {
        let _guard = self.locks.acquire(&format!("song:{}", id)).await;
        let mut song = self.song(id)?;
        update(&mut song);
        self.store.put(&song)?;
        Ok(song)
    }

    /// All prompts, ordered by id.
    pub fn prompts(&self) -> BattleResult<Vec<PlaylistPrompt>> {
        self.store.all()
    }

    /// Finds a user by wallet address (case-insensitive).
    pub fn user_by_wallet(&self, wallet_address: &str) -> BattleResult<Option<User>> {
        let wallet = User::normalize_wallet(wallet_address);
        Ok(self
            .store
            .all::<User>()?
            .into_iter()
            .find(|u| u.wallet_address == wallet))
    }

    /// Finds the user for a wallet, creating it on first use.
    pub async fn ensure_user(&self, wallet_address: &str) -> BattleResult<User> {
        let wallet = User::normalize_wallet(wallet_address);
        if wallet.is_empty() {
            return Err(BattleError::invalid_request("wallet address is required"));
        }

        let _guard = self.locks.acquire(&format!("user:{}", wallet)).await;
        if let Some(user) = self.user_by_wallet(&wallet)? {
            return Ok(user);
        }

        let hash = blake3::hash(wallet.as_bytes()).to_hex();
        let user = User {
            id: format!("usr-{}", &hash.as_str()[..16]),
            wallet_address: wallet,
            username: None,
            created_at: Utc::now(),
        };
        match self.store.insert(&user) {
            Ok(()) => {
                info!(user = %user.id, wallet = %user.wallet_address, "user created");
                Ok(user)
            }
            Err(err) if err.is_conflict() => self.store.require(&user.id),
            Err(err) => Err(err),
        }
    }

    /// The six daily playlists.
    ///
    /// A missing or all-zero seed falls back to the service's own generator.
    pub fn daily_playlists(&self, seed: Option<&RandomSeed>) -> BattleResult<Vec<DailyPlaylist>> {
        let catalog = self.songs()?;
        match seed {
            Some(seed) if !seed.is_zero() => Ok(generate_daily_playlists(seed, &catalog)),
            _ => {
                let mut rng = self.shuffle_rng()?;
                Ok(generate_daily_playlists_with_rng(&catalog, &mut *rng))
            }
        }
    }
}
