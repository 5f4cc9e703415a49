//! Error types for battle rules and the layers built on top of them.

use thiserror::Error;

use crate::reveal::RejectReason;

/// Result type for battle operations.
pub type BattleResult<T> = Result<T, BattleError>;

/// Errors that can occur while creating, mutating or persisting a battle.
///
/// Every variant is recoverable at the UI boundary: front-ends turn it into a
/// user-visible message using [`BattleError::code`] and [`BattleError::status`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// The action costs more energy than the battle holds.
    #[error("not enough energy to {action}: need {required}, have {available}")]
    InsufficientEnergy {
        /// Action that was attempted.
        action: &'static str,
        /// Energy the action costs.
        required: u8,
        /// Energy the battle currently holds.
        available: u8,
    },

    /// Rearrange was requested on an empty playlist.
    #[error("no songs in playlist to rearrange")]
    EmptyPlaylist,

    /// Every usable seed character has already been consumed.
    #[error("random seed exhausted: no reveal attempts left")]
    SeedExhausted,

    /// A flip or flip-back was rejected for a reason other than seed exhaustion.
    #[error("reveal rejected: {0}")]
    FlipRejected(RejectReason),

    /// A record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind (battle, song, user, ...).
        kind: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The randomness source did not answer within the bounded wait.
    #[error("randomness source did not respond within {waited_ms} ms")]
    UpstreamTimeout {
        /// How long the caller waited before giving up.
        waited_ms: u64,
    },

    /// The persisted snapshot changed between read and write.
    #[error("{id} was modified concurrently (expected version {expected}, found {found})")]
    PersistenceConflict {
        /// Record identifier.
        id: String,
        /// Version the writer read.
        expected: u64,
        /// Version currently persisted.
        found: u64,
    },

    /// A seed string is not `0x` followed by hex digits.
    #[error("invalid random seed '{seed}': {reason}")]
    InvalidSeed {
        /// The rejected seed.
        seed: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Add or pass named a song that is not waiting in the queue.
    #[error("song {song_id} is not in the queue")]
    SongNotInQueue {
        /// The song that was named.
        song_id: String,
    },

    /// The battle was already submitted or abandoned.
    #[error("battle {id} is {status} and no longer accepts actions")]
    BattleClosed {
        /// Battle identifier.
        id: String,
        /// Current status label.
        status: &'static str,
    },

    /// A persisted record violates a battle invariant.
    #[error("corrupt battle state: {0}")]
    InvariantViolation(String),

    /// Malformed request (missing song id, bad identifier, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Storage backend failure (I/O or serialization).
    #[error("storage error: {0}")]
    Storage(String),
}

impl BattleError {
    /// Creates a not-found error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Creates a storage error from anything displayable.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns the stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            BattleError::InsufficientEnergy { .. } => "BTL_001",
            BattleError::EmptyPlaylist => "BTL_002",
            BattleError::SeedExhausted => "BTL_003",
            BattleError::FlipRejected(_) => "BTL_004",
            BattleError::NotFound { .. } => "BTL_005",
            BattleError::UpstreamTimeout { .. } => "BTL_006",
            BattleError::PersistenceConflict { .. } => "BTL_007",
            BattleError::InvalidSeed { .. } => "BTL_008",
            BattleError::SongNotInQueue { .. } => "BTL_009",
            BattleError::BattleClosed { .. } => "BTL_010",
            BattleError::InvariantViolation(_) => "BTL_011",
            BattleError::InvalidRequest(_) => "BTL_012",
            BattleError::Storage(_) => "BTL_013",
        }
    }

    /// Returns the transport status used when the error crosses a request boundary.
    pub fn status(&self) -> u16 {
        match self {
            BattleError::InsufficientEnergy { .. }
            | BattleError::EmptyPlaylist
            | BattleError::SeedExhausted
            | BattleError::FlipRejected(_)
            | BattleError::InvalidSeed { .. }
            | BattleError::SongNotInQueue { .. }
            | BattleError::InvalidRequest(_) => 400,
            BattleError::NotFound { .. } => 404,
            BattleError::PersistenceConflict { .. } | BattleError::BattleClosed { .. } => 409,
            BattleError::UpstreamTimeout { .. } => 504,
            BattleError::InvariantViolation(_) | BattleError::Storage(_) => 500,
        }
    }

    /// Whether a fresh read followed by a retry may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BattleError::PersistenceConflict { .. })
    }
}

impl From<RejectReason> for BattleError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::SeedExhausted => BattleError::SeedExhausted,
            other => BattleError::FlipRejected(other),
        }
    }
}

impl From<serde_json::Error> for BattleError {
    fn from(err: serde_json::Error) -> Self {
        BattleError::Storage(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for BattleError {
    fn from(err: std::io::Error) -> Self {
        BattleError::Storage(format!("I/O error: {}", err))
    }
}
