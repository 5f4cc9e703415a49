//! Per-connection reveal session.

use std::time::Duration;

use nftune_battle::{RevealState, SongId};

/// Reveal state owned by one WebSocket connection.
///
/// A connection follows one battle at a time; naming another battle starts
/// a fresh reveal.
#[derive(Debug)]
pub struct Session {
    battle_id: Option<String>,
    reveal: RevealState,
}

impl Session {
    /// Creates an idle session.
    pub fn new(flip_delay: Duration) -> Self {
        Self {
            battle_id: None,
            reveal: RevealState::with_flip_delay(flip_delay),
        }
    }

    /// Battle currently followed.
    pub fn battle_id(&self) -> Option<&str> {
        self.battle_id.as_deref()
    }

    /// Reveal state for `battle_id`, reset if the connection switched battles.
    pub fn reveal_for(&mut self, battle_id: &str) -> &mut RevealState {
        if self.battle_id.as_deref() != Some(battle_id) {
            self.reveal.reset_reveal_state();
            self.battle_id = Some(battle_id.to_string());
        }
        &mut self.reveal
    }

    /// Forgets a song that left the queue of the followed battle.
    pub fn consume(&mut self, battle_id: &str, song_id: &SongId) {
        if self.battle_id.as_deref() == Some(battle_id) {
            self.reveal.remove_song_from_revealed(song_id);
        }
    }
}
