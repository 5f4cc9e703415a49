//! Battle instance types.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::energy::Energy;
use crate::error::BattleError;
use crate::seed::RandomSeed;

/// Opaque song identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(String);

impl SongId {
    /// Wraps an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SongId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SongId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SongId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle of a battle instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    /// Accepting player actions.
    #[default]
    Active,
    /// Playlist was submitted to the gallery.
    Submitted,
    /// Player walked away.
    Abandoned,
}

impl BattleStatus {
    /// Returns the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BattleStatus::Active => "active",
            BattleStatus::Submitted => "submitted",
            BattleStatus::Abandoned => "abandoned",
        }
    }

    /// Whether the battle can no longer change.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BattleStatus::Active)
    }
}

impl std::fmt::Display for BattleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One playthrough of the playlist battle.
///
/// The persisted copy is authoritative for energy and both song lists; clients
/// re-read it after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleInstance {
    /// Battle identifier.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Prompt the playlist answers.
    pub prompt_id: String,
    /// Seed driving all reveal outcomes. Fixed at creation.
    pub random_seed: RandomSeed,
    /// Coin flip returned alongside the seed.
    #[serde(default)]
    pub coin_flip_result: bool,
    /// Usable seed characters at creation.
    pub initial_seed_count: usize,
    /// Current energy, always in `[0, 100]`.
    pub energy_units: Energy,
    /// Every candidate the queue was drawn from.
    #[serde(default)]
    pub library_songs: Vec<SongId>,
    /// The playlist being built.
    #[serde(default)]
    pub playlist_songs: Vec<SongId>,
    /// Songs still waiting to be revealed.
    #[serde(default)]
    pub queue_songs: Vec<SongId>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: BattleStatus,
    /// Incremented on every committed mutation.
    #[serde(default)]
    pub version: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last committed mutation.
    pub updated_at: DateTime<Utc>,
}

impl BattleInstance {
    /// Creates a builder for a battle with the given id and seed.
    pub fn builder(id: impl Into<String>, random_seed: RandomSeed) -> BattleInstanceBuilder {
        BattleInstanceBuilder::new(id, random_seed)
    }

    /// Parses a battle from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Total reveal attempts the seed allows.
    pub fn total_attempts(&self) -> usize {
        self.random_seed.usable_len()
    }

    /// Whether the battle still accepts actions.
    pub fn is_active(&self) -> bool {
        self.status == BattleStatus::Active
    }

    /// Whether the song is waiting in the queue.
    pub fn queue_contains(&self, song_id: &SongId) -> bool {
        self.queue_songs.contains(song_id)
    }

    /// Whether the song is in the playlist.
    pub fn playlist_contains(&self, song_id: &SongId) -> bool {
        self.playlist_songs.contains(song_id)
    }

    /// Fails with `BattleClosed` unless the battle is active.
    pub fn ensure_active(&self) -> Result<(), BattleError> {
        if self.status.is_terminal() {
            return Err(BattleError::BattleClosed {
                id: self.id.clone(),
                status: self.status.as_str(),
            });
        }
        Ok(())
    }

    /// Marks a committed mutation: bumps the version and the update time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }

    /// Checks the structural invariants of a persisted battle.
    ///
    /// - no song appears twice in the queue or twice in the playlist
    /// - no song is in both lists
    pub fn validate(&self) -> Result<(), BattleError> {
        let mut queue = HashSet::with_capacity(self.queue_songs.len());
        for song in &self.queue_songs {
            if !queue.insert(song) {
                return Err(BattleError::InvariantViolation(format!(
                    "song {} appears twice in queue of battle {}",
                    song, self.id
                )));
            }
        }

        let mut playlist = HashSet::with_capacity(self.playlist_songs.len());
        for song in &self.playlist_songs {
            if !playlist.insert(song) {
                return Err(BattleError::InvariantViolation(format!(
                    "song {} appears twice in playlist of battle {}",
                    song, self.id
                )));
            }
            if queue.contains(song) {
                return Err(BattleError::InvariantViolation(format!(
                    "song {} is in both queue and playlist of battle {}",
                    song, self.id
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`BattleInstance`].
#[derive(Debug, Clone)]
pub struct BattleInstanceBuilder {
    id: String,
    user_id: String,
    prompt_id: String,
    random_seed: RandomSeed,
    coin_flip_result: bool,
    energy_units: Energy,
    library_songs: Option<Vec<SongId>>,
    playlist_songs: Vec<SongId>,
    queue_songs: Vec<SongId>,
    created_at: Option<DateTime<Utc>>,
}

impl BattleInstanceBuilder {
    /// Creates a new builder.
    pub fn new(id: impl Into<String>, random_seed: RandomSeed) -> Self {
        Self {
            id: id.into(),
            user_id: String::new(),
            prompt_id: String::new(),
            random_seed,
            coin_flip_result: false,
            energy_units: Energy::default(),
            library_songs: None,
            playlist_songs: Vec::new(),
            queue_songs: Vec::new(),
            created_at: None,
        }
    }

    /// Sets the owning user.
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Sets the prompt.
    pub fn prompt(mut self, prompt_id: impl Into<String>) -> Self {
        self.prompt_id = prompt_id.into();
        self
    }

    /// Sets the coin flip result.
    pub fn coin_flip(mut self, heads: bool) -> Self {
        self.coin_flip_result = heads;
        self
    }

    /// Sets the energy (clamped).
    pub fn energy(mut self, units: i64) -> Self {
        self.energy_units = Energy::new(units);
        self
    }

    /// Sets the library. Defaults to queue followed by playlist.
    pub fn library<I, S>(mut self, songs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SongId>,
    {
        self.library_songs = Some(songs.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the queue.
    pub fn queue<I, S>(mut self, songs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SongId>,
    {
        self.queue_songs = songs.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the playlist.
    pub fn playlist<I, S>(mut self, songs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SongId>,
    {
        self.playlist_songs = songs.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the creation time.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Builds the battle.
    pub fn build(self) -> BattleInstance {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        let library_songs = self.library_songs.unwrap_or_else(|| {
            self.queue_songs
                .iter()
                .chain(self.playlist_songs.iter())
                .cloned()
                .collect()
        });
        BattleInstance {
            id: self.id,
            user_id: self.user_id,
            prompt_id: self.prompt_id,
            initial_seed_count: self.random_seed.usable_len(),
            random_seed: self.random_seed,
            coin_flip_result: self.coin_flip_result,
            energy_units: self.energy_units,
            library_songs,
            playlist_songs: self.playlist_songs,
            queue_songs: self.queue_songs,
            status: BattleStatus::Active,
            version: 0,
            created_at,
            updated_at: created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seed() -> RandomSeed {
        RandomSeed::parse("0x9a3f").unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let battle = BattleInstance::builder("b1", seed())
            .queue(["a", "b"])
            .playlist(["c"])
            .build();

        assert_eq!(battle.initial_seed_count, 4);
        assert_eq!(battle.total_attempts(), 4);
        assert_eq!(battle.energy_units.units(), 50);
        assert_eq!(battle.status, BattleStatus::Active);
        assert_eq!(battle.version, 0);
        assert_eq!(
            battle.library_songs,
            vec![SongId::from("a"), SongId::from("b"), SongId::from("c")]
        );
        assert!(battle.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let battle = BattleInstance::builder("b1", seed())
            .queue(["a", "b"])
            .playlist(["b"])
            .build();
        let err = battle.validate().unwrap_err();
        assert!(err.to_string().contains("both queue and playlist"));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let battle = BattleInstance::builder("b1", seed())
            .queue(["a", "a"])
            .build();
        assert!(battle.validate().is_err());
    }

    #[test]
    fn test_ensure_active() {
        let mut battle = BattleInstance::builder("b1", seed()).build();
        assert!(battle.ensure_active().is_ok());

        battle.status = BattleStatus::Submitted;
        let err = battle.ensure_active().unwrap_err();
        assert_eq!(err.code(), "BTL_010");
        assert!(err.to_string().contains("submitted"));
    }

    #[test]
    fn test_touch_bumps_version() {
        let mut battle = BattleInstance::builder("b1", seed()).build();
        let later = battle.created_at + chrono::Duration::seconds(5);
        battle.touch(later);
        assert_eq!(battle.version, 1);
        assert_eq!(battle.updated_at, later);
    }

    #[test]
    fn test_json_round_trip() {
        let battle = BattleInstance::builder("b1", seed())
            .user("u1")
            .prompt("p1")
            .coin_flip(true)
            .energy(73)
            .queue(["a"])
            .playlist(["b"])
            .build();

        let json = battle.to_json_pretty().unwrap();
        assert!(json.contains("\"energy_units\": 73"));
        assert!(json.contains("\"random_seed\": \"0x9a3f\""));

        let parsed = BattleInstance::from_json(&json).unwrap();
        assert_eq!(parsed, battle);
    }

    #[test]
    fn test_json_rejects_bad_seed() {
        let json = r#"{
            "id": "b1",
            "user_id": "u1",
            "prompt_id": "p1",
            "random_seed": "not-hex",
            "initial_seed_count": 0,
            "energy_units": 10,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        assert!(BattleInstance::from_json(json).is_err());
    }
}
