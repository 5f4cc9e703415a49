//! NFTune Playlist Battle Rules
//!
//! This crate provides the rules of the playlist battle mini-game: battle
//! records, the seeded reveal engine, the energy ledger and the
//! playlist/queue mutator. It does no I/O; persistence and randomness live in
//! `nftune-service`.
//!
//! # Overview
//!
//! A battle starts with a hex seed, a queue of candidate songs and 50 energy.
//! The player flips cards (one seed digit per flip) to reveal queue songs,
//! then adds them to the playlist (-5) or passes (-3). Rearranging the
//! playlist (+2) and pausing (+5) recover energy.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use nftune_battle::{
//!     add_song_to_playlist, BattleInstance, FlipOutcome, RandomSeed, RevealContext, RevealState,
//! };
//!
//! let battle = BattleInstance::builder("b1", RandomSeed::parse("0xf3").unwrap())
//!     .queue(["intro", "outro"])
//!     .build();
//!
//! let mut reveal = RevealState::with_flip_delay(Duration::ZERO);
//! let outcome = reveal.flip(&RevealContext::from_battle(&battle), Instant::now());
//!
//! if let FlipOutcome::Flipped(result) = outcome {
//!     let song = result.song_id.expect("digit f reveals a song");
//!     let next = add_song_to_playlist(&battle, &song).unwrap();
//!     reveal.remove_song_from_revealed(&song);
//!     assert_eq!(next.playlist_songs, vec![song]);
//!     assert_eq!(next.energy_units.units(), 45);
//! }
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Add, pass, rearrange and pause
//! - [`battle`]: Battle instance, song ids and status
//! - [`daily`]: Seed-driven daily playlists
//! - [`energy`]: Energy counter and tariffs
//! - [`error`]: Error type with stable codes
//! - [`records`]: Songs, users, prompts and gallery entries
//! - [`reveal`]: Flip/flip-back state machine
//! - [`rng`]: Deterministic PCG32 shuffles
//! - [`seed`]: Seed parsing and derivation

pub mod actions;
pub mod battle;
pub mod daily;
pub mod energy;
pub mod error;
pub mod records;
pub mod reveal;
pub mod rng;
pub mod seed;

// Re-export commonly used types at the crate root
pub use actions::{add_song_to_playlist, apply_action, pass_song, pause, rearrange_playlist, Action};
pub use battle::{BattleInstance, BattleInstanceBuilder, BattleStatus, SongId};
pub use daily::{
    fallback_playlists, generate_daily_playlists, generate_daily_playlists_with_rng, DailyPlaylist,
};
pub use energy::{Energy, Tariff, DEFAULT_INITIAL_ENERGY, MAX_ENERGY};
pub use error::{BattleError, BattleResult};
pub use records::{group_by_prompt, GalleryGroup, GalleryPlaylist, PlaylistPrompt, Song, User};
pub use reveal::{
    replay, FlipOutcome, RejectReason, RevealContext, RevealResult, RevealSnapshot, RevealState,
    FLIP_DELAY,
};
pub use rng::{create_queue_rng, create_rng, shuffled};
pub use seed::RandomSeed;
