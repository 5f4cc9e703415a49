//! CLI command sessions against a JSON-file store.
//!
//! Commands are called through their library entry points with `--json`
//! output, the same path `main` dispatches to.

use std::process::ExitCode;

use nftune_cli::commands::{action, battle, catalog, daily, gallery, reveal};
use nftune_service::ActionKind;
use nftune_tests::fixtures::{StoreFixture, FIXTURE_PROMPT};
use pretty_assertions::assert_eq;

const WALLET: &str = "0x00C1100000000000000000000000000000000001";

fn imported_fixture(songs: usize) -> StoreFixture {
    let fixture = StoreFixture::new(songs);
    let code = catalog::import(&fixture.app(), fixture.catalog_path.to_str().unwrap(), true)
        .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    fixture
}

#[test]
fn test_cli_session_from_import_to_gallery() {
    let fixture = imported_fixture(10);
    let app = fixture.app();

    assert_eq!(
        battle::new(&app, WALLET, FIXTURE_PROMPT, &[], true).unwrap(),
        ExitCode::SUCCESS
    );
    let service = app.open_service().unwrap();
    let battles = service.battles_for(WALLET).unwrap();
    assert_eq!(battles.len(), 1);
    let id = battles[0].id.clone();
    assert_eq!(battles[0].queue_songs.len(), 10);

    let session = reveal::reveal(&service, &id, 0, 64).unwrap();
    assert_eq!(session.state.current_seed_index, session.flips.len());
    assert!(!session.state.is_card_flipped);
    for (i, flip) in session.flips.iter().enumerate() {
        assert_eq!(flip.attempt, i);
        if let Some(song) = &flip.song_id {
            assert!(battles[0].queue_songs.contains(song));
        }
    }

    // A later session picking up at --from repeats nothing.
    let resumed = reveal::reveal(&service, &id, 2, 3).unwrap();
    assert_eq!(resumed.flips.as_slice(), &session.flips[2..5]);

    let revealed = session
        .flips
        .iter()
        .find_map(|f| f.song_id.clone())
        .expect("a 64-digit seed reveals at least one song");
    assert_eq!(
        action::run(&app, ActionKind::AddSong, &id, Some(revealed.as_str()), true).unwrap(),
        ExitCode::SUCCESS
    );
    assert_eq!(
        action::run(&app, ActionKind::Pause, &id, None, true).unwrap(),
        ExitCode::SUCCESS
    );
    // Already in the playlist: no longer in the queue.
    assert_eq!(
        action::run(&app, ActionKind::PassSong, &id, Some(revealed.as_str()), true).unwrap(),
        ExitCode::from(1)
    );

    let stored = service.battle(&id).unwrap();
    assert_eq!(stored.energy_units.units(), 50);
    assert_eq!(stored.playlist_songs, vec![revealed]);

    assert_eq!(
        gallery::submit(&app, &id, "CLI Mix", "", true).unwrap(),
        ExitCode::SUCCESS
    );
    let groups = service.gallery(Some(WALLET)).unwrap();
    let entry_id = groups[0].playlists[0].id.clone();
    assert_eq!(gallery::like(&app, &entry_id, true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(gallery::play(&app, &entry_id, true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(gallery::show(&app, &entry_id, true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(gallery::list(&app, Some(WALLET), true).unwrap(), ExitCode::SUCCESS);

    let entry = service.gallery_entry(&entry_id).unwrap();
    assert_eq!(entry.likes, 1);
    assert_eq!(entry.play_count, 1);

    // Submitted battles are closed to further actions.
    assert_eq!(
        action::run(&app, ActionKind::Pause, &id, None, true).unwrap(),
        ExitCode::from(1)
    );
    assert_eq!(
        battle::abandon(&app, &id, true).unwrap(),
        ExitCode::from(1)
    );
    assert_eq!(reveal::run(&app, &id, 0, 1, true).unwrap(), ExitCode::from(1));
    assert_eq!(
        reveal::reveal(&service, &id, 0, 1).unwrap_err().code(),
        "BTL_010"
    );
}

#[test]
fn test_cli_catalog_commands() {
    let fixture = imported_fixture(3);
    let app = fixture.app();

    assert_eq!(catalog::list_songs(&app, true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(catalog::list_prompts(&app, true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(catalog::like_song(&app, "song-01", true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(catalog::play_song(&app, "song-01", true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(catalog::play_song(&app, "song-01", true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(catalog::like_song(&app, "song-99", true).unwrap(), ExitCode::from(1));

    let song = app
        .open_service()
        .unwrap()
        .song(&"song-01".into())
        .unwrap();
    assert_eq!(song.likes, 1);
    assert_eq!(song.play_count, 2);
}

#[test]
fn test_cli_daily_and_errors() {
    let fixture = imported_fixture(6);
    let app = fixture.app();

    assert_eq!(
        daily::run(&app, Some("0x1234abcd"), true).unwrap(),
        ExitCode::SUCCESS
    );
    assert_eq!(daily::run(&app, None, true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(
        daily::run(&app, Some("not-a-seed"), true).unwrap(),
        ExitCode::from(1)
    );
    assert!(daily::run(&app, Some("not-a-seed"), false).is_err());

    assert_eq!(battle::show(&app, "btl-missing", true).unwrap(), ExitCode::from(1));
    assert_eq!(
        battle::new(&app, WALLET, "no-such-prompt", &[], true).unwrap(),
        ExitCode::from(1)
    );
    assert_eq!(
        catalog::import(&app, fixture.path().join("missing.json").to_str().unwrap(), true)
            .unwrap(),
        ExitCode::from(1)
    );
}
