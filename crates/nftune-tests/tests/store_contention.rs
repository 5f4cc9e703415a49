//! Two services racing on one store directory.
//!
//! Services in different processes share nothing but the files, so their
//! per-battle locks do not see each other. The store's version check is the
//! only thing keeping concurrent writes from being lost.

use std::sync::{Arc, Barrier};
use std::thread;

use nftune_battle::{BattleError, BattleInstance, RandomSeed, Tariff};
use nftune_service::{ActionKind, ActionRequest, ActionResponse, StoreExt};
use nftune_tests::fixtures::{service_on, StoreFixture};
use pretty_assertions::assert_eq;

const PAUSES_PER_WORKER: usize = 5;

#[test]
fn test_concurrent_writers_never_lose_updates() {
    let fixture = StoreFixture::new(4);
    let battle = BattleInstance::builder("btl-shared", RandomSeed::parse("0x8f").unwrap())
        .energy(50)
        .queue(["song-01", "song-02"])
        .build();
    fixture.open_store().insert(&battle).unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let workers: Vec<_> = (0..2)
        .map(|_| {
            let store = fixture.open_store();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let service = service_on(store, 4);
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();
                barrier.wait();

                let mut applied = 0usize;
                let mut conflicts = 0usize;
                for _ in 0..PAUSES_PER_WORKER {
                    let response = rt.block_on(
                        service.handle(ActionKind::Pause, &ActionRequest::new("btl-shared")),
                    );
                    match response {
                        ActionResponse::Success(_) => applied += 1,
                        ActionResponse::Failure(err) => {
                            assert_eq!(err.code, "BTL_007", "unexpected failure: {}", err.error);
                            assert_eq!(err.status, 409);
                            conflicts += 1;
                        }
                    }
                }
                (applied, conflicts)
            })
        })
        .collect();

    let (applied, conflicts) = workers
        .into_iter()
        .map(|w| w.join().expect("worker panicked"))
        .fold((0, 0), |(a, c), (wa, wc)| (a + wa, c + wc));
    assert_eq!(applied + conflicts, 2 * PAUSES_PER_WORKER);
    // A surfaced conflict means the other worker committed twice meanwhile.
    assert!(applied >= 2 * conflicts);

    // Every applied pause landed exactly once.
    let stored: BattleInstance = fixture.open_store().require("btl-shared").unwrap();
    assert_eq!(stored.version as usize, applied);
    assert_eq!(stored.energy_units.units() as usize, 50 + 5 * applied);
    stored.validate().unwrap();
}

#[test]
fn test_stale_write_is_refused() {
    let fixture = StoreFixture::new(2);
    let store = fixture.open_store();
    let battle = BattleInstance::builder("btl-stale", RandomSeed::parse("0x8f").unwrap())
        .energy(10)
        .queue(["song-01"])
        .build();
    store.insert(&battle).unwrap();

    let mut first = battle.clone();
    first.energy_units = first.energy_units.apply(Tariff::Pause).unwrap();
    first.version += 1;
    store.compare_and_swap(0, &first).unwrap();

    let mut stale = battle.clone();
    stale.version += 1;
    let err = store.compare_and_swap(0, &stale).unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(err, BattleError::PersistenceConflict { .. }));

    let stored: BattleInstance = store.require("btl-stale").unwrap();
    assert_eq!(stored.energy_units.units(), 15);
}
