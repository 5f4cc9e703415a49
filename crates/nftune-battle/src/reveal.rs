//! Reveal engine.
//!
//! A reveal attempt ("flip") consumes one hex digit of the battle seed. The
//! digit decides whether a song is revealed; when it is, the song is chosen
//! among the queue songs not yet revealed this session, at an index derived
//! from the seed. The same seed and queue order always give the same sequence.
//!
//! Mapping:
//!
//! ```text
//! revealed(i) = digit(i) >= 8                      // 8 of 16 digits
//! index(i)    = truncate_u64(BLAKE3(seed || "reveal" || i_le)) mod remaining
//! ```
//!
//! The card animation is modelled with timestamps: a flip at `t` is in
//! progress until `t + flip_delay`, after which the card shows face up. Input
//! arriving while a flip is in progress is rejected, not queued.
//!
//! [`RevealState`] is session-local. It is never authoritative for energy or
//! song lists; those come from the persisted battle via [`RevealContext`].

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::battle::{BattleInstance, SongId};
use crate::energy::Energy;
use crate::error::BattleError;
use crate::seed::RandomSeed;

/// Delay between starting a flip and the card showing face up.
pub const FLIP_DELAY: Duration = Duration::from_millis(600);

/// Digits at or above this value reveal a song.
pub const REVEAL_THRESHOLD: u8 = 8;

const REVEAL_KEY: &str = "reveal";

/// Outcome of one reveal attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealResult {
    /// Zero-based attempt (seed digit) index.
    pub attempt: usize,
    /// Whether a song was revealed.
    pub revealed: bool,
    /// The revealed song.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_id: Option<SongId>,
}

/// Why a flip or flip-back was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The card is still animating.
    FlipInProgress,
    /// Every seed digit has been used.
    SeedExhausted,
    /// Neither add nor pass is affordable.
    InsufficientEnergy,
    /// Flip-back needs a face-up card.
    CardNotFlipped,
}

impl RejectReason {
    /// Returns the reason as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::FlipInProgress => "flip_in_progress",
            RejectReason::SeedExhausted => "seed_exhausted",
            RejectReason::InsufficientEnergy => "insufficient_energy",
            RejectReason::CardNotFlipped => "card_not_flipped",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tagged result of a reveal-engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlipOutcome {
    /// A seed digit was consumed.
    Flipped(RevealResult),
    /// The card was turned face down.
    FlippedBack,
    /// Nothing changed.
    Rejected(RejectReason),
}

impl FlipOutcome {
    /// Converts a rejection into an error; returns the reveal result of a flip.
    pub fn into_result(self) -> Result<Option<RevealResult>, BattleError> {
        match self {
            FlipOutcome::Flipped(result) => Ok(Some(result)),
            FlipOutcome::FlippedBack => Ok(None),
            FlipOutcome::Rejected(reason) => Err(reason.into()),
        }
    }
}

/// The persisted battle fields the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealContext<'a> {
    /// Battle seed.
    pub seed: &'a RandomSeed,
    /// Current queue order.
    pub queue: &'a [SongId],
    /// Current energy.
    pub energy: Energy,
}

impl<'a> RevealContext<'a> {
    /// Creates a context from explicit parts.
    pub fn new(seed: &'a RandomSeed, queue: &'a [SongId], energy: Energy) -> Self {
        Self {
            seed,
            queue,
            energy,
        }
    }

    /// Reads the context from a battle snapshot.
    pub fn from_battle(battle: &'a BattleInstance) -> Self {
        Self::new(&battle.random_seed, &battle.queue_songs, battle.energy_units)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardPhase {
    FaceDown,
    Flipping { since: Instant },
    FaceUp,
}

/// Session-local reveal state for one battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealState {
    current_seed_index: usize,
    revealed_queue_songs: Vec<SongId>,
    phase: CardPhase,
    last_reveal_result: Option<RevealResult>,
    flip_delay: Duration,
}

impl Default for RevealState {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealState {
    /// Fresh state with the standard flip delay.
    pub fn new() -> Self {
        Self::with_flip_delay(FLIP_DELAY)
    }

    /// Fresh state with a custom flip delay.
    pub fn with_flip_delay(flip_delay: Duration) -> Self {
        Self {
            current_seed_index: 0,
            revealed_queue_songs: Vec::new(),
            phase: CardPhase::FaceDown,
            last_reveal_result: None,
            flip_delay,
        }
    }

    /// Rebuilds the state reached after `attempts` flips on `seed` and `queue`.
    ///
    /// The card ends face down.
    pub fn rebuild(seed: &RandomSeed, queue: &[SongId], attempts: usize) -> Self {
        let mut state = Self::new();
        for _ in 0..attempts {
            if state.draw(seed, queue).is_none() {
                break;
            }
        }
        state
    }

    /// Replaces the flip delay, keeping progress.
    pub fn delayed_by(mut self, flip_delay: Duration) -> Self {
        self.flip_delay = flip_delay;
        self
    }

    /// Seed digits consumed so far.
    pub fn current_seed_index(&self) -> usize {
        self.current_seed_index
    }

    /// Songs revealed this session and not yet consumed.
    pub fn revealed_queue_songs(&self) -> &[SongId] {
        &self.revealed_queue_songs
    }

    /// Outcome of the most recent flip.
    pub fn last_reveal_result(&self) -> Option<&RevealResult> {
        self.last_reveal_result.as_ref()
    }

    /// Configured animation delay.
    pub fn flip_delay(&self) -> Duration {
        self.flip_delay
    }

    /// Whether a flip animation is still running at `now`.
    pub fn is_flipping(&self, now: Instant) -> bool {
        matches!(self.phase_at(now), CardPhase::Flipping { .. })
    }

    /// Whether the card shows face up at `now`.
    pub fn is_card_flipped(&self, now: Instant) -> bool {
        matches!(self.phase_at(now), CardPhase::FaceUp)
    }

    /// Attempts remaining on the seed.
    pub fn attempts_left(&self, ctx: &RevealContext<'_>) -> usize {
        ctx.seed.usable_len().saturating_sub(self.current_seed_index)
    }

    /// Revealed songs that are still waiting in the queue.
    pub fn revealed_count(&self, ctx: &RevealContext<'_>) -> usize {
        self.revealed_queue_songs
            .iter()
            .filter(|s| ctx.queue.contains(s))
            .count()
    }

    /// Whether another flip makes sense: seed left, add or pass affordable,
    /// and some queue song not yet revealed.
    pub fn can_flip_more(&self, ctx: &RevealContext<'_>) -> bool {
        self.current_seed_index < ctx.seed.usable_len()
            && ctx.energy.can_act_on_reveal()
            && self.revealed_count(ctx) < ctx.queue.len()
    }

    /// Attempts one reveal.
    ///
    /// Rejected while a flip is animating, once the seed is exhausted, or when
    /// neither add nor pass is affordable. An empty queue (or one whose songs
    /// were all revealed) still consumes a digit and yields "not revealed".
    pub fn flip(&mut self, ctx: &RevealContext<'_>, now: Instant) -> FlipOutcome {
        if self.is_flipping(now) {
            return FlipOutcome::Rejected(RejectReason::FlipInProgress);
        }
        if self.current_seed_index >= ctx.seed.usable_len() {
            return FlipOutcome::Rejected(RejectReason::SeedExhausted);
        }
        if !ctx.energy.can_act_on_reveal() {
            return FlipOutcome::Rejected(RejectReason::InsufficientEnergy);
        }

        match self.draw(ctx.seed, ctx.queue) {
            Some(result) => {
                self.phase = CardPhase::Flipping { since: now };
                FlipOutcome::Flipped(result)
            }
            None => FlipOutcome::Rejected(RejectReason::SeedExhausted),
        }
    }

    /// Turns a face-up card back over. Never touches the seed index.
    pub fn flip_back(&mut self, now: Instant) -> FlipOutcome {
        match self.phase_at(now) {
            CardPhase::Flipping { .. } => FlipOutcome::Rejected(RejectReason::FlipInProgress),
            CardPhase::FaceDown => FlipOutcome::Rejected(RejectReason::CardNotFlipped),
            CardPhase::FaceUp => {
                self.phase = CardPhase::FaceDown;
                FlipOutcome::FlippedBack
            }
        }
    }

    /// Forgets a song after it was added or passed. Returns whether it was tracked.
    pub fn remove_song_from_revealed(&mut self, song_id: &SongId) -> bool {
        let before = self.revealed_queue_songs.len();
        self.revealed_queue_songs.retain(|s| s != song_id);
        self.revealed_queue_songs.len() != before
    }

    /// Returns to the initial state (used when switching battles).
    pub fn reset_reveal_state(&mut self) {
        *self = Self::with_flip_delay(self.flip_delay);
    }

    /// Serializable view of the state at `now`.
    pub fn snapshot(&self, ctx: &RevealContext<'_>, now: Instant) -> RevealSnapshot {
        RevealSnapshot {
            current_seed_index: self.current_seed_index,
            total_attempts: ctx.seed.usable_len(),
            attempts_left: self.attempts_left(ctx),
            revealed_queue_songs: self.revealed_queue_songs.clone(),
            revealed_count: self.revealed_count(ctx),
            total_queue_songs: ctx.queue.len(),
            is_flipping: self.is_flipping(now),
            is_card_flipped: self.is_card_flipped(now),
            can_flip_more: self.can_flip_more(ctx),
            can_add_song: ctx.energy.can_add_song(),
            can_pass_song: ctx.energy.can_pass_song(),
            last_reveal_result: self.last_reveal_result.clone(),
        }
    }

    fn phase_at(&self, now: Instant) -> CardPhase {
        match self.phase {
            CardPhase::Flipping { since } if now >= since + self.flip_delay => CardPhase::FaceUp,
            phase => phase,
        }
    }

    /// Consumes one digit. `None` once the seed is exhausted.
    fn draw(&mut self, seed: &RandomSeed, queue: &[SongId]) -> Option<RevealResult> {
        let attempt = self.current_seed_index;
        let revealed = reveal_digit(seed, attempt)?;

        let song_id = if revealed {
            let candidates: Vec<&SongId> = queue
                .iter()
                .filter(|s| !self.revealed_queue_songs.contains(s))
                .collect();
            if candidates.is_empty() {
                None
            } else {
                let pick = seed.derive_u64(REVEAL_KEY, attempt as u64) % candidates.len() as u64;
                Some(candidates[pick as usize].clone())
            }
        } else {
            None
        };

        if let Some(ref song) = song_id {
            self.revealed_queue_songs.push(song.clone());
        }

        let result = RevealResult {
            attempt,
            revealed: song_id.is_some(),
            song_id,
        };
        self.current_seed_index += 1;
        self.last_reveal_result = Some(result.clone());
        Some(result)
    }
}

/// Serializable reveal state for front-ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealSnapshot {
    /// Seed digits consumed.
    pub current_seed_index: usize,
    /// Usable seed digits.
    pub total_attempts: usize,
    /// Digits remaining.
    pub attempts_left: usize,
    /// Songs revealed and not yet consumed.
    pub revealed_queue_songs: Vec<SongId>,
    /// Revealed songs still in the queue.
    pub revealed_count: usize,
    /// Queue length.
    pub total_queue_songs: usize,
    /// Card animating.
    pub is_flipping: bool,
    /// Card face up.
    pub is_card_flipped: bool,
    /// Another flip is possible.
    pub can_flip_more: bool,
    /// Add is affordable.
    pub can_add_song: bool,
    /// Pass is affordable.
    pub can_pass_song: bool,
    /// Most recent flip.
    pub last_reveal_result: Option<RevealResult>,
}

/// Whether the digit at `index` reveals a song, or `None` past the end.
pub fn reveal_digit(seed: &RandomSeed, index: usize) -> Option<bool> {
    seed.digit_at(index).map(|d| d >= REVEAL_THRESHOLD)
}

/// Replays up to `attempts` flips from a fresh state, ignoring energy and timing.
pub fn replay(seed: &RandomSeed, queue: &[SongId], attempts: usize) -> Vec<RevealResult> {
    let mut state = RevealState::new();
    let mut results = Vec::with_capacity(attempts.min(seed.usable_len()));
    for _ in 0..attempts {
        match state.draw(seed, queue) {
            Some(result) => results.push(result),
            None => break,
        }
    }
    results
}
