//! Feeds arbitrary bytes to the battle record parser, then plays every action
//! against whatever parsed. Nothing may panic, and a battle that validates
//! must still validate after any accepted action.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nftune_battle::{apply_action, create_rng, replay, Action, BattleInstance};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(battle) = BattleInstance::from_json(text) else {
        return;
    };

    let _ = replay(&battle.random_seed, &battle.queue_songs, 64);
    if battle.validate().is_err() {
        return;
    }

    let mut rng = create_rng(data.len() as u64);
    let mut actions = vec![Action::Rearrange, Action::Pause];
    for song_id in battle.queue_songs.iter().chain(&battle.playlist_songs) {
        actions.push(Action::AddSong {
            song_id: song_id.clone(),
        });
        actions.push(Action::PassSong {
            song_id: song_id.clone(),
        });
    }

    for action in &actions {
        if let Ok(next) = apply_action(&battle, action, &mut rng) {
            assert!(next.validate().is_ok(), "{} broke {:?}", action.as_str(), next);
        }
    }
});
