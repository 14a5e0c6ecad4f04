//! End-to-end tests over the public API.
//!
//! Drives a [`TomatoUniverse`] through whole user journeys and checks that
//! state survives a reopen on both store backends.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tomato_core::storage::keys;
use tomato_core::{
    Config, CoreError, KvStore, MemoryStore, SqliteStore, StreakCredit, TomatoState,
    TomatoUniverse,
};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, d, 10, 0, 0).unwrap()
}

fn no_seed() -> Config {
    let mut cfg = Config::default();
    cfg.sets.seed_defaults = false;
    cfg
}

#[test]
fn three_item_set_walkthrough() {
    let mut u = TomatoUniverse::open_at(MemoryStore::new(), no_seed(), &day(1));
    let id = u.create_set("Gym", Some("Three sessions".into()), None, Some(3)).id();

    let states = |u: &TomatoUniverse<MemoryStore>| -> Vec<TomatoState> {
        u.set(id).unwrap().items().iter().map(|i| i.state()).collect()
    };
    assert_eq!(
        states(&u),
        vec![TomatoState::Available, TomatoState::Locked, TomatoState::Locked]
    );

    u.complete_current(id, 1, &day(1)).unwrap();
    assert_eq!(
        states(&u),
        vec![TomatoState::Done, TomatoState::Available, TomatoState::Locked]
    );
    assert_eq!(u.set(id).unwrap().current_index(), 2);

    // skipping ahead is rejected
    match u.complete_current(id, 3, &day(1)) {
        Err(CoreError::OutOfOrder { expected, requested }) => {
            assert_eq!((expected, requested), (2, 3));
        }
        other => panic!("expected OutOfOrder, got {other:?}"),
    }

    u.complete_current(id, 2, &day(2)).unwrap();
    let last = u.complete_current(id, 3, &day(2)).unwrap();
    assert!(last.set_complete);
    assert!(last.harvested);
    assert_eq!(u.set(id).unwrap().current_index(), 4);
    assert_eq!(u.set(id).unwrap().done_count(), 3);
    assert_eq!(u.harvest_total(), 1);
    assert_eq!(u.streak().current, 2);

    // completing anything further is out of order
    assert!(u.complete_current(id, 3, &day(2)).is_err());
    assert_eq!(u.harvest_total(), 1);
}

#[test]
fn sqlite_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tomato.db");

    let id = {
        let store = SqliteStore::open_at(&path).unwrap();
        let mut u = TomatoUniverse::open_at(store, no_seed(), &day(5));
        let id = u.create_set("Reading", None, Some(day(20)), Some(2)).id();
        u.complete_current(id, 1, &day(5)).unwrap();
        u.attach_photo(id, 1, vec![0xde, 0xad, 0xbe, 0xef]).unwrap();
        u.add_todo("Library run", Some(day(6))).unwrap();
        id
    };

    let store = SqliteStore::open_at(&path).unwrap();
    let u = TomatoUniverse::open_at(store, no_seed(), &day(6));
    let set = u.set(id).unwrap();
    assert_eq!(set.title, "Reading");
    assert_eq!(set.target_date, Some(day(20)));
    assert_eq!(set.current_index(), 2);
    assert_eq!(set.item(1).unwrap().photo(), Some(&[0xde, 0xad, 0xbe, 0xef][..]));
    assert_eq!(u.streak().current, 1);
    assert_eq!(u.todos().items().len(), 1);
}

#[test]
fn first_launch_seeds_only_once() {
    let mut u = TomatoUniverse::open_at(MemoryStore::new(), Config::default(), &day(1));
    let titles: Vec<String> = u.sets().iter().map(|s| s.title.clone()).collect();
    assert_eq!(titles, vec!["Spanish", "Reading"]);

    let spanish = u.sets()[0].id();
    u.delete_set(spanish).unwrap();
    let store = u.into_store();

    let u = TomatoUniverse::open_at(store, Config::default(), &day(2));
    assert_eq!(u.sets().len(), 1);
    assert_eq!(u.sets()[0].title, "Reading");
}

#[test]
fn corrupt_sets_blob_falls_back_to_seeds() {
    let mut store = MemoryStore::new();
    store.set(keys::SETS, "{not json").unwrap();
    let u = TomatoUniverse::open_at(store, Config::default(), &day(1));
    assert_eq!(u.sets().len(), 2);
}

#[test]
fn streak_across_days() {
    let mut u = TomatoUniverse::open_at(MemoryStore::new(), no_seed(), &day(1));
    for d in 1..=3 {
        assert!(matches!(
            u.record_standalone_session(&day(d)),
            StreakCredit::Credited { .. }
        ));
    }
    assert_eq!(u.streak().current, 3);

    // a missed day resets the run on the next session
    let credit = u.record_standalone_session(&(day(3) + Duration::days(2)));
    assert!(matches!(credit, StreakCredit::Credited { current: 1, .. }));
}

#[test]
fn each_completed_set_harvests_once() {
    let mut u = TomatoUniverse::open_at(MemoryStore::new(), no_seed(), &day(1));
    let a = u.create_set("A", None, None, Some(1)).id();
    let b = u.create_set("B", None, None, Some(2)).id();

    u.complete_current(a, 1, &day(1)).unwrap();
    u.complete_current(b, 1, &day(1)).unwrap();
    assert_eq!(u.harvest_total(), 1);
    assert!(!u.claim_harvest(b).unwrap());

    u.complete_current(b, 2, &day(1)).unwrap();
    assert_eq!(u.harvest_total(), 2);
    assert!(!u.claim_harvest(a).unwrap());
    assert!(!u.claim_harvest(b).unwrap());
    assert_eq!(u.harvest_total(), 2);
}
