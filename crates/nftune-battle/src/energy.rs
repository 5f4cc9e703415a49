//! Energy ledger.
//!
//! Energy is a bounded counter in `[0, 100]` that gates the scoring actions.
//! Adding and passing songs spend energy; rearranging and pausing earn it.
//! Every change is clamped to the bounds.

use serde::{Deserialize, Serialize};

use crate::error::BattleError;

/// Upper bound of a battle's energy.
pub const MAX_ENERGY: u8 = 100;

/// Energy a new battle starts with unless configured otherwise.
pub const DEFAULT_INITIAL_ENERGY: u8 = 50;

/// The four scoring actions and their fixed energy effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tariff {
    /// Move a revealed song into the playlist: costs 5.
    AddSong,
    /// Discard a revealed song: costs 3.
    PassSong,
    /// Shuffle the playlist: earns 2.
    Rearrange,
    /// Take a break: earns 5.
    Pause,
}

impl Tariff {
    /// Signed energy change applied by this action.
    pub fn delta(&self) -> i16 {
        match self {
            Tariff::AddSong => -5,
            Tariff::PassSong => -3,
            Tariff::Rearrange => 2,
            Tariff::Pause => 5,
        }
    }

    /// Energy the action requires up front, if it spends any.
    pub fn cost(&self) -> Option<u8> {
        let delta = self.delta();
        if delta < 0 {
            Some(delta.unsigned_abs() as u8)
        } else {
            None
        }
    }

    /// Human-readable action label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tariff::AddSong => "add song",
            Tariff::PassSong => "pass song",
            Tariff::Rearrange => "rearrange",
            Tariff::Pause => "pause",
        }
    }

    /// All tariffs.
    pub fn all() -> &'static [Tariff] {
        &[
            Tariff::AddSong,
            Tariff::PassSong,
            Tariff::Rearrange,
            Tariff::Pause,
        ]
    }
}

impl std::fmt::Display for Tariff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Energy units held by a battle. Always within `[0, MAX_ENERGY]`.
///
/// Out-of-range values (from a stale client or a hand-edited record) are
/// clamped on construction and on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Energy(u8);

impl Energy {
    /// Zero energy.
    pub const EMPTY: Energy = Energy(0);
    /// Full energy.
    pub const FULL: Energy = Energy(MAX_ENERGY);

    /// Creates an energy value, clamping into range.
    pub fn new(units: i64) -> Self {
        Self(units.clamp(0, MAX_ENERGY as i64) as u8)
    }

    /// Current units.
    pub fn units(&self) -> u8 {
        self.0
    }

    /// Whether the action's cost is covered.
    pub fn can_afford(&self, tariff: Tariff) -> bool {
        tariff.cost().map_or(true, |cost| self.0 >= cost)
    }

    /// Advisory check used to disable the add button.
    pub fn can_add_song(&self) -> bool {
        self.can_afford(Tariff::AddSong)
    }

    /// Advisory check used to disable the pass button.
    pub fn can_pass_song(&self) -> bool {
        self.can_afford(Tariff::PassSong)
    }

    /// True when at least one of add/pass is affordable.
    pub fn can_act_on_reveal(&self) -> bool {
        self.can_add_song() || self.can_pass_song()
    }

    /// Applies a tariff, failing if a spending action is not covered.
    pub fn apply(&self, tariff: Tariff) -> Result<Energy, BattleError> {
        if let Some(cost) = tariff.cost() {
            if self.0 < cost {
                return Err(BattleError::InsufficientEnergy {
                    action: tariff.as_str(),
                    required: cost,
                    available: self.0,
                });
            }
        }
        Ok(Energy::new(self.0 as i64 + tariff.delta() as i64))
    }
}

impl Default for Energy {
    fn default() -> Self {
        Energy(DEFAULT_INITIAL_ENERGY)
    }
}

impl From<i64> for Energy {
    fn from(units: i64) -> Self {
        Energy::new(units)
    }
}

impl From<Energy> for i64 {
    fn from(energy: Energy) -> Self {
        energy.0 as i64
    }
}

impl std::fmt::Display for Energy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, MAX_ENERGY)
    }
}
