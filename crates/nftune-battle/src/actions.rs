//! Playlist/queue mutations.
//!
//! Each action takes the current persisted battle and produces the next
//! snapshot, or explains why it was rejected. A rejected action leaves the
//! input untouched; an accepted one applies its list change and energy change
//! together.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::{BattleInstance, SongId};
use crate::energy::Tariff;
use crate::error::BattleError;
use crate::rng::shuffled;

/// A scoring action requested by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Move a song from the queue to the end of the playlist.
    AddSong {
        /// Song to add.
        song_id: SongId,
    },
    /// Drop a song from the queue.
    PassSong {
        /// Song to pass.
        song_id: SongId,
    },
    /// Shuffle the playlist.
    Rearrange,
    /// Recover energy.
    Pause,
}

impl Action {
    /// Energy effect of this action.
    pub fn tariff(&self) -> Tariff {
        match self {
            Action::AddSong { .. } => Tariff::AddSong,
            Action::PassSong { .. } => Tariff::PassSong,
            Action::Rearrange => Tariff::Rearrange,
            Action::Pause => Tariff::Pause,
        }
    }

    /// Song the action consumes, if any.
    pub fn song_id(&self) -> Option<&SongId> {
        match self {
            Action::AddSong { song_id } | Action::PassSong { song_id } => Some(song_id),
            Action::Rearrange | Action::Pause => None,
        }
    }

    /// Short action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AddSong { .. } => "add_song",
            Action::PassSong { .. } => "pass_song",
            Action::Rearrange => "rearrange",
            Action::Pause => "pause",
        }
    }
}

/// Applies any action. `rng` is only consulted by rearrange.
pub fn apply_action<R: Rng + ?Sized>(
    battle: &BattleInstance,
    action: &Action,
    rng: &mut R,
) -> Result<BattleInstance, BattleError> {
    match action {
        Action::AddSong { song_id } => add_song_to_playlist(battle, song_id),
        Action::PassSong { song_id } => pass_song(battle, song_id),
        Action::Rearrange => rearrange_playlist(battle, rng),
        Action::Pause => pause(battle),
    }
}

/// Moves `song_id` from the queue to the end of the playlist for 5 energy.
///
/// # Example
/// ```
/// use nftune_battle::{add_song_to_playlist, BattleInstance, RandomSeed, SongId};
///
/// let battle = BattleInstance::builder("b1", RandomSeed::parse("0x12").unwrap())
///     .energy(5)
///     .queue(["a", "b"])
///     .build();
///
/// let next = add_song_to_playlist(&battle, &SongId::from("a")).unwrap();
/// assert_eq!(next.queue_songs, vec![SongId::from("b")]);
/// assert_eq!(next.playlist_songs, vec![SongId::from("a")]);
/// assert_eq!(next.energy_units.units(), 0);
/// ```
pub fn add_song_to_playlist(
    battle: &BattleInstance,
    song_id: &SongId,
) -> Result<BattleInstance, BattleError> {
    battle.ensure_active()?;
    let energy = battle.energy_units.apply(Tariff::AddSong)?;

    let mut next = battle.clone();
    take_from_queue(&mut next, song_id)?;
    next.playlist_songs.push(song_id.clone());
    next.energy_units = energy;
    Ok(next)
}

/// Drops `song_id` from the queue for 3 energy.
pub fn pass_song(battle: &BattleInstance, song_id: &SongId) -> Result<BattleInstance, BattleError> {
    battle.ensure_active()?;
    let energy = battle.energy_units.apply(Tariff::PassSong)?;

    let mut next = battle.clone();
    take_from_queue(&mut next, song_id)?;
    next.energy_units = energy;
    Ok(next)
}

/// Shuffles the playlist uniformly and earns 2 energy.
pub fn rearrange_playlist<R: Rng + ?Sized>(
    battle: &BattleInstance,
    rng: &mut R,
) -> Result<BattleInstance, BattleError> {
    battle.ensure_active()?;
    if battle.playlist_songs.is_empty() {
        return Err(BattleError::EmptyPlaylist);
    }

    let mut next = battle.clone();
    next.playlist_songs = shuffled(&battle.playlist_songs, rng);
    next.energy_units = battle.energy_units.apply(Tariff::Rearrange)?;
    Ok(next)
}

/// Earns 5 energy. Never fails on an active battle.
pub fn pause(battle: &BattleInstance) -> Result<BattleInstance, BattleError> {
    battle.ensure_active()?;
    let mut next = battle.clone();
    next.energy_units = battle.energy_units.apply(Tariff::Pause)?;
    Ok(next)
}

fn take_from_queue(battle: &mut BattleInstance, song_id: &SongId) -> Result<(), BattleError> {
    let position = battle
        .queue_songs
        .iter()
        .position(|s| s == song_id)
        .ok_or_else(|| BattleError::SongNotInQueue {
            song_id: song_id.to_string(),
        })?;
    battle.queue_songs.remove(position);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattleStatus;
    use crate::rng::create_rng;
    use crate::seed::RandomSeed;
    use pretty_assertions::assert_eq;

    fn battle(energy: i64, queue: &[&str], playlist: &[&str]) -> BattleInstance {
        BattleInstance::builder("b1", RandomSeed::parse("0x0123456789abcdef").unwrap())
            .energy(energy)
            .queue(queue.iter().copied())
            .playlist(playlist.iter().copied())
            .build()
    }

    fn ids(items: &[&str]) -> Vec<SongId> {
        items.iter().copied().map(SongId::from).collect()
    }

    #[test]
    fn test_add_song_at_exact_cost() {
        let before = battle(5, &["a", "b"], &[]);
        let after = add_song_to_playlist(&before, &"a".into()).unwrap();

        assert_eq!(after.queue_songs, ids(&["b"]));
        assert_eq!(after.playlist_songs, ids(&["a"]));
        assert_eq!(after.energy_units.units(), 0);
    }

    #[test]
    fn test_add_song_below_cost_leaves_state() {
        let before = battle(4, &["a", "b"], &[]);
        let err = add_song_to_playlist(&before, &"a".into()).unwrap_err();

        assert!(matches!(err, BattleError::InsufficientEnergy { required: 5, available: 4, .. }));
        assert_eq!(before.queue_songs, ids(&["a", "b"]));
        assert_eq!(before.energy_units.units(), 4);
    }

    #[test]
    fn test_pass_song() {
        let before = battle(10, &["a", "b"], &["z"]);
        let after = pass_song(&before, &"a".into()).unwrap();

        assert_eq!(after.queue_songs, ids(&["b"]));
        assert_eq!(after.playlist_songs, ids(&["z"]));
        assert_eq!(after.energy_units.units(), 7);
    }

    #[test]
    fn test_pass_song_below_cost() {
        let before = battle(2, &["a"], &[]);
        assert!(matches!(
            pass_song(&before, &"a".into()),
            Err(BattleError::InsufficientEnergy { required: 3, .. })
        ));
    }

    #[test]
    fn test_song_not_in_queue() {
        let before = battle(50, &["a"], &["b"]);
        let err = add_song_to_playlist(&before, &"b".into()).unwrap_err();
        assert_eq!(
            err,
            BattleError::SongNotInQueue {
                song_id: "b".to_string()
            }
        );
    }

    #[test]
    fn test_energy_checked_before_membership() {
        let before = battle(0, &["a"], &[]);
        let err = pass_song(&before, &"missing".into()).unwrap_err();
        assert_eq!(err.code(), "BTL_001");
    }

    #[test]
    fn test_rearrange_preserves_songs_and_credits() {
        let before = battle(40, &[], &["a", "b", "c", "d", "e"]);
        let after = rearrange_playlist(&before, &mut create_rng(9)).unwrap();

        let mut sorted = after.playlist_songs.clone();
        sorted.sort();
        assert_eq!(sorted, ids(&["a", "b", "c", "d", "e"]));
        assert_eq!(after.energy_units.units(), 42);
    }

    #[test]
    fn test_rearrange_clamps_at_max() {
        let before = battle(99, &[], &["a"]);
        let after = rearrange_playlist(&before, &mut create_rng(1)).unwrap();
        assert_eq!(after.energy_units.units(), 100);
    }

    #[test]
    fn test_rearrange_empty_playlist() {
        let before = battle(40, &["a"], &[]);
        assert_eq!(
            rearrange_playlist(&before, &mut create_rng(1)).unwrap_err(),
            BattleError::EmptyPlaylist
        );
    }

    #[test]
    fn test_rearrange_is_roughly_uniform() {
        // 3 songs -> 6 permutations; each should land near 1/6 of the draws.
        let before = battle(0, &[], &["a", "b", "c"]);
        let mut rng = create_rng(2024);
        let mut counts = std::collections::HashMap::new();
        let draws = 6000;
        for _ in 0..draws {
            let after = rearrange_playlist(&before, &mut rng).unwrap();
            *counts.entry(after.playlist_songs).or_insert(0u32) += 1;
        }
        assert_eq!(counts.len(), 6);
        for count in counts.values() {
            assert!((800..1200).contains(count), "count {} out of range", count);
        }
    }

    #[test]
    fn test_pause_always_succeeds() {
        let before = battle(98, &[], &[]);
        let after = pause(&before).unwrap();
        assert_eq!(after.energy_units.units(), 100);
    }

    #[test]
    fn test_closed_battle_rejects_actions() {
        let mut before = battle(50, &["a"], &["b"]);
        before.status = BattleStatus::Abandoned;
        let mut rng = create_rng(1);

        for action in [
            Action::AddSong { song_id: "a".into() },
            Action::PassSong { song_id: "a".into() },
            Action::Rearrange,
            Action::Pause,
        ] {
            let err = apply_action(&before, &action, &mut rng).unwrap_err();
            assert_eq!(err.code(), "BTL_010", "action {}", action.as_str());
        }
    }

    #[test]
    fn test_action_serde_shape() {
        let action: Action =
            serde_json::from_str(r#"{"action":"add_song","song_id":"s1"}"#).unwrap();
        assert_eq!(action, Action::AddSong { song_id: "s1".into() });
        assert_eq!(action.tariff(), Tariff::AddSong);
        assert_eq!(action.song_id().map(SongId::as_str), Some("s1"));

        let pause: Action = serde_json::from_str(r#"{"action":"pause"}"#).unwrap();
        assert_eq!(pause, Action::Pause);
    }
}
