//! Property-based tests for battle invariants.
//!
//! These tests use proptest to check that no sequence of actions can push a
//! battle out of its invariants: energy in range, queue and playlist
//! disjoint, every song accounted for, rejected actions changing nothing.

use std::collections::HashSet;

use nftune_battle::{
    apply_action, create_rng, rearrange_playlist, replay, Action, BattleInstance, Energy,
    RandomSeed, SongId, MAX_ENERGY,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// A hex seed of 1-64 digits.
fn arb_seed() -> impl Strategy<Value = RandomSeed> {
    "[0-9a-f]{1,64}".prop_map(|digits| RandomSeed::parse(&format!("0x{}", digits)).unwrap())
}

/// Song ids `s0..s{n}`.
fn songs(n: usize) -> Vec<SongId> {
    (0..n).map(|i| SongId::new(format!("s{}", i))).collect()
}

/// An action naming a song by index; indexes past the catalogue name unknown songs.
fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0usize..24).prop_map(|i| Action::AddSong {
            song_id: SongId::new(format!("s{}", i)),
        }),
        (0usize..24).prop_map(|i| Action::PassSong {
            song_id: SongId::new(format!("s{}", i)),
        }),
        Just(Action::Rearrange),
        Just(Action::Pause),
    ]
}

fn battle(queue: usize, energy: i64) -> BattleInstance {
    BattleInstance::builder("prop", RandomSeed::parse("0x8").unwrap())
        .energy(energy)
        .queue(songs(queue))
        .build()
}

fn check_invariants(b: &BattleInstance) -> Result<(), TestCaseError> {
    prop_assert!(b.energy_units.units() <= MAX_ENERGY);
    prop_assert!(b.validate().is_ok(), "invalid battle: {:?}", b.validate());

    let queue: HashSet<_> = b.queue_songs.iter().collect();
    let playlist: HashSet<_> = b.playlist_songs.iter().collect();
    prop_assert_eq!(queue.len(), b.queue_songs.len());
    prop_assert_eq!(playlist.len(), b.playlist_songs.len());
    prop_assert!(queue.is_disjoint(&playlist));

    let library: HashSet<_> = b.library_songs.iter().collect();
    prop_assert!(queue.is_subset(&library));
    prop_assert!(playlist.is_subset(&library));
    Ok(())
}

// ============================================================================
// Action sequences
// ============================================================================

proptest! {
    /// No action sequence breaks the battle invariants.
    #[test]
    fn actions_preserve_invariants(
        queue in 0usize..16,
        energy in 0i64..=100,
        actions in prop::collection::vec(arb_action(), 0..64),
        shuffle_seed in any::<u64>(),
    ) {
        let mut rng = create_rng(shuffle_seed);
        let mut current = battle(queue, energy);
        check_invariants(&current)?;

        for action in &actions {
            let before = current.clone();
            match apply_action(&current, action, &mut rng) {
                Ok(next) => {
                    let delta = action.tariff().delta() as i64;
                    let expected = Energy::new(before.energy_units.units() as i64 + delta);
                    prop_assert_eq!(next.energy_units, expected);
                    check_invariants(&next)?;
                    current = next;
                }
                Err(_) => {
                    // Rejected actions leave the battle untouched.
                    prop_assert_eq!(&current, &before);
                }
            }
        }

        // Songs only ever leave the queue.
        prop_assert!(current.queue_songs.len() + current.playlist_songs.len() <= queue);
    }

    /// Spending actions fail exactly when their cost is not covered.
    #[test]
    fn spending_requires_energy(energy in 0i64..=10) {
        let b = battle(2, energy);
        let add = apply_action(&b, &Action::AddSong { song_id: "s0".into() }, &mut create_rng(0));
        prop_assert_eq!(add.is_ok(), energy >= 5);
        let pass = apply_action(&b, &Action::PassSong { song_id: "s0".into() }, &mut create_rng(0));
        prop_assert_eq!(pass.is_ok(), energy >= 3);
    }

    /// Rearrange permutes the playlist and earns two energy, capped at 100.
    #[test]
    fn rearrange_preserves_songs(
        size in 1usize..20,
        energy in 0i64..=100,
        shuffle_seed in any::<u64>(),
    ) {
        let b = BattleInstance::builder("prop", RandomSeed::parse("0x8").unwrap())
            .energy(energy)
            .playlist(songs(size))
            .build();
        let next = rearrange_playlist(&b, &mut create_rng(shuffle_seed)).unwrap();

        let mut before = b.playlist_songs.clone();
        let mut after = next.playlist_songs.clone();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
        prop_assert_eq!(next.energy_units.units() as i64, (energy + 2).min(100));
        prop_assert_eq!(next.queue_songs, b.queue_songs);
    }

    /// Energy construction always clamps into range.
    #[test]
    fn energy_clamps(units in any::<i64>()) {
        let energy = Energy::new(units);
        prop_assert!(energy.units() <= MAX_ENERGY);
        if (0..=100).contains(&units) {
            prop_assert_eq!(energy.units() as i64, units);
        }
    }
}

// ============================================================================
// Reveal engine
// ============================================================================

proptest! {
    /// Replays are prefixes of longer replays.
    #[test]
    fn replay_is_prefix_stable(
        seed in arb_seed(),
        queue in 0usize..12,
        short in 0usize..32,
        extra in 0usize..32,
    ) {
        let queue = songs(queue);
        let a = replay(&seed, &queue, short);
        let b = replay(&seed, &queue, short + extra);
        prop_assert!(a.len() <= b.len());
        prop_assert_eq!(&b[..a.len()], a.as_slice());
        prop_assert!(b.len() <= seed.usable_len());
    }

    /// Each song is revealed at most once, and only from the queue.
    #[test]
    fn reveals_are_unique_queue_songs(seed in arb_seed(), queue in 0usize..12) {
        let queue = songs(queue);
        let results = replay(&seed, &queue, 64);
        let revealed: Vec<_> = results.iter().filter_map(|r| r.song_id.clone()).collect();
        let unique: HashSet<_> = revealed.iter().collect();
        prop_assert_eq!(unique.len(), revealed.len());
        prop_assert!(revealed.iter().all(|s| queue.contains(s)));
        for result in &results {
            prop_assert_eq!(result.revealed, result.song_id.is_some());
        }
    }
}

// ============================================================================
// Seed parsing
// ============================================================================

proptest! {
    /// Random strings never panic when parsed as seeds.
    #[test]
    fn seed_parse_never_panics(s in "\\PC{0,80}") {
        let _ = RandomSeed::parse(&s);
    }

    /// Parsed seeds are lower-case and keep every digit.
    #[test]
    fn seed_parse_normalizes(digits in "[0-9a-fA-F]{1,64}") {
        let seed = RandomSeed::parse(&format!("0x{}", digits)).unwrap();
        prop_assert_eq!(seed.digits(), digits.to_ascii_lowercase());
        prop_assert_eq!(seed.usable_len(), digits.len());
    }

    /// Anything without the prefix is rejected.
    #[test]
    fn seed_without_prefix_fails(digits in "[0-9a-f]{1,64}") {
        prop_assert!(RandomSeed::parse(&digits).is_err());
    }
}
