//! Persistence gateway between the domain types and a [`KvStore`].
//!
//! Every read and write has a fail-soft form used by the rest of the core
//! and a `try_` form that reports the underlying error. Fail-soft reads fall
//! back to defaults; fail-soft writes are logged and dropped, leaving the
//! in-memory state authoritative for the current process.
//!
//! There are no transactions across keys. Callers order their writes so
//! that a crash in between is safe to retry (a set is saved complete before
//! its harvest is claimed).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::keys;
use super::kv::KvStore;
use crate::error::{CoreError, PersistenceError, Result};
use crate::todo::TodoItem;
use crate::tomato::{PomodoroSet, DEFAULT_TOTAL};
use crate::tracker::StreakState;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Sets written when the store holds no readable collection.
pub fn seed_sets(now: DateTime<Utc>, total: u32) -> Vec<PomodoroSet> {
    vec![
        PomodoroSet::create(
            "Spanish",
            Some("Understand daily conversation".into()),
            Some(now + Duration::days(7)),
            total,
        ),
        PomodoroSet::create(
            "Reading",
            Some("Finish 200 pages".into()),
            Some(now + Duration::days(14)),
            total,
        ),
    ]
}

pub struct Gateway<S: KvStore> {
    store: S,
    seed_defaults: bool,
    seed_total: u32,
}

impl<S: KvStore> Gateway<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            seed_defaults: true,
            seed_total: DEFAULT_TOTAL,
        }
    }

    /// Whether [`Gateway::load_sets`] falls back to [`seed_sets`] or to an
    /// empty collection.
    pub fn seed_defaults(mut self, enabled: bool) -> Self {
        self.seed_defaults = enabled;
        self
    }

    pub fn seed_total(mut self, total: u32) -> Self {
        self.seed_total = total;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    // ── Sets ─────────────────────────────────────────────────────────

    /// Read the set collection. `Ok(None)` when nothing was ever saved.
    ///
    /// # Errors
    /// Returns an error if the store fails, the value is not valid JSON, or
    /// a set is in a shape progress operations cannot produce.
    pub fn try_load_sets(&self) -> Result<Option<Vec<PomodoroSet>>> {
        let Some(sets) = self.try_load_json::<Vec<PomodoroSet>>(keys::SETS)? else {
            return Ok(None);
        };
        for set in &sets {
            set.check_consistency().map_err(|e| PersistenceError::Malformed {
                key: keys::SETS.to_string(),
                message: format!("set {}: {e}", set.id()),
            })?;
        }
        Ok(Some(sets))
    }

    /// Read the set collection, seeding and persisting defaults when it is
    /// missing or unreadable. An unreadable value is copied to
    /// [`keys::SETS_CORRUPT`] first.
    pub fn load_sets(&mut self) -> Vec<PomodoroSet> {
        match self.try_load_sets() {
            Ok(Some(sets)) => {
                debug!(count = sets.len(), "sets loaded");
                return sets;
            }
            Ok(None) => debug!("no saved sets"),
            Err(e) => {
                warn!(error = %e, "saved sets unreadable, falling back to defaults");
                self.set_aside_corrupt_sets();
            }
        }
        let sets = if self.seed_defaults {
            seed_sets(Utc::now(), self.seed_total)
        } else {
            Vec::new()
        };
        self.save_sets(&sets);
        sets
    }

    fn set_aside_corrupt_sets(&mut self) {
        let raw = match self.store.get(keys::SETS) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "could not read sets to set them aside");
                return;
            }
        };
        warn!(key = keys::SETS_CORRUPT, bytes = raw.len(), "unreadable sets set aside");
        self.soft(keys::SETS_CORRUPT, |gw| Ok(gw.store.set(keys::SETS_CORRUPT, &raw)?));
    }

    /// # Errors
    /// Returns an error if serialization or the store write fails.
    pub fn try_save_sets(&mut self, sets: &[PomodoroSet]) -> Result<()> {
        self.try_store_json(keys::SETS, &sets)
    }

    /// Returns whether the write reached the store.
    pub fn save_sets(&mut self, sets: &[PomodoroSet]) -> bool {
        self.soft(keys::SETS, |gw| gw.try_save_sets(sets))
    }

    // ── Harvest ──────────────────────────────────────────────────────

    pub fn is_claimed(&self, set_id: Uuid) -> bool {
        self.load_json::<bool>(&keys::harvest_claimed(set_id))
            .unwrap_or(false)
    }

    pub fn save_claimed(&mut self, set_id: Uuid) -> bool {
        let key = keys::harvest_claimed(set_id);
        self.soft(&key, |gw| gw.try_store_json(&key, &true))
    }

    pub fn clear_claim(&mut self, set_id: Uuid) -> bool {
        let key = keys::harvest_claimed(set_id);
        self.soft(&key, |gw| Ok(gw.store.remove(&key)?))
    }

    pub fn harvest_count(&self) -> u64 {
        self.load_json::<u64>(keys::HARVEST_COUNT).unwrap_or(0)
    }

    pub fn save_harvest_count(&mut self, count: u64) -> bool {
        self.soft(keys::HARVEST_COUNT, |gw| {
            gw.try_store_json(keys::HARVEST_COUNT, &count)
        })
    }

    // ── Streak ───────────────────────────────────────────────────────

    pub fn streak(&self) -> StreakState {
        let current = self.load_json::<u32>(keys::STREAK_CURRENT).unwrap_or(0);
        let last_day = match self.store.get(keys::STREAK_LAST_DAY) {
            Ok(Some(raw)) if !raw.is_empty() => {
                match NaiveDate::parse_from_str(&raw, DAY_FORMAT) {
                    Ok(day) => Some(day),
                    Err(e) => {
                        warn!(value = %raw, error = %e, "unreadable streak day, treating as unset");
                        None
                    }
                }
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "streak day read failed");
                None
            }
        };
        StreakState { current, last_day }
    }

    /// Writes both streak keys; the day is written as an empty string when unset.
    pub fn save_streak(&mut self, state: &StreakState) -> bool {
        let day = state
            .last_day
            .map(|d| d.format(DAY_FORMAT).to_string())
            .unwrap_or_default();
        let current_ok = self.soft(keys::STREAK_CURRENT, |gw| {
            gw.try_store_json(keys::STREAK_CURRENT, &state.current)
        });
        let day_ok = self.soft(keys::STREAK_LAST_DAY, |gw| {
            Ok(gw.store.set(keys::STREAK_LAST_DAY, &day)?)
        });
        current_ok && day_ok
    }

    // ── To-do ────────────────────────────────────────────────────────

    pub fn todo_items(&self) -> Vec<TodoItem> {
        self.load_json(keys::TODO_ITEMS).unwrap_or_default()
    }

    pub fn save_todo_items(&mut self, items: &[TodoItem]) -> bool {
        self.soft(keys::TODO_ITEMS, |gw| gw.try_store_json(keys::TODO_ITEMS, &items))
    }

    // ── Generic JSON values ──────────────────────────────────────────

    /// # Errors
    /// Returns an error if the store fails or the value does not decode as `T`.
    pub fn try_load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| {
                CoreError::from(PersistenceError::Malformed {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            })
    }

    /// Missing and unreadable values both come back as `None`.
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_load_json(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "unreadable value, using default");
                None
            }
        }
    }

    /// # Errors
    /// Returns an error if serialization or the store write fails.
    pub fn try_store_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|e| PersistenceError::Malformed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(key, &raw)?;
        Ok(())
    }

    fn soft(&mut self, key: &str, write: impl FnOnce(&mut Self) -> Result<()>) -> bool {
        match write(self) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "write dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::tomato::progress;

    /// Store whose writes always fail.
    #[derive(Default)]
    struct ReadOnlyStore(MemoryStore);

    impl KvStore for ReadOnlyStore {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, PersistenceError> {
            self.0.get(key)
        }
        fn set(&mut self, _: &str, _: &str) -> std::result::Result<(), PersistenceError> {
            Err(PersistenceError::Locked)
        }
        fn remove(&mut self, _: &str) -> std::result::Result<(), PersistenceError> {
            Err(PersistenceError::Locked)
        }
    }

    #[test]
    fn missing_sets_are_seeded_and_persisted() {
        let mut gw = Gateway::new(MemoryStore::new());
        let sets = gw.load_sets();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].title, "Spanish");
        assert_eq!(sets[1].title, "Reading");
        assert_eq!(sets[0].total(), DEFAULT_TOTAL);

        let again = gw.load_sets();
        assert_eq!(again, sets);
    }

    #[test]
    fn seeding_can_be_disabled() {
        let mut gw = Gateway::new(MemoryStore::new()).seed_defaults(false);
        assert!(gw.load_sets().is_empty());
        assert!(gw.try_load_sets().unwrap().unwrap().is_empty());
    }

    #[test]
    fn corrupt_sets_fall_back_to_seed() {
        let mut store = MemoryStore::new();
        store.set(keys::SETS, "{not json").unwrap();
        let mut gw = Gateway::new(store).seed_total(3);

        assert!(matches!(
            gw.try_load_sets(),
            Err(CoreError::Persistence(PersistenceError::Malformed { .. }))
        ));
        let sets = gw.load_sets();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].total(), 3);
    }

    #[test]
    fn unreadable_sets_are_set_aside_before_reseeding() {
        let mut broken = PomodoroSet::create("Mine", None, None, 3);
        broken.current_index = 3;
        let raw = serde_json::to_string(&[broken]).unwrap();
        let mut store = MemoryStore::new();
        store.set(keys::SETS, &raw).unwrap();
        let mut gw = Gateway::new(store);

        let sets = gw.load_sets();
        assert_eq!(sets[0].title, "Spanish");
        assert_eq!(
            gw.store().get(keys::SETS_CORRUPT).unwrap().as_deref(),
            Some(raw.as_str())
        );
        // the seed pair is what gets saved under the live key
        assert_eq!(gw.try_load_sets().unwrap().unwrap(), sets);
    }

    #[test]
    fn missing_sets_leave_nothing_aside() {
        let mut gw = Gateway::new(MemoryStore::new());
        gw.load_sets();
        assert!(gw.store().get(keys::SETS_CORRUPT).unwrap().is_none());
    }

    #[test]
    fn inconsistent_sets_are_rejected() {
        let mut set = PomodoroSet::create("Broken", None, None, 3);
        set.current_index = 3;
        let mut gw = Gateway::new(MemoryStore::new());
        gw.try_save_sets(&[set]).unwrap();
        assert!(gw.try_load_sets().is_err());
    }

    #[test]
    fn sets_round_trip_field_for_field() {
        let mut set = PomodoroSet::create(
            "Gym",
            Some("three times a week".into()),
            Some(Utc::now()),
            4,
        );
        progress::complete_current(&mut set, 1).unwrap();
        set.attach_photo(1, vec![9, 8, 7]).unwrap();

        let mut gw = Gateway::new(MemoryStore::new());
        assert!(gw.save_sets(std::slice::from_ref(&set)));
        let loaded = gw.try_load_sets().unwrap().unwrap();
        assert_eq!(loaded, vec![set]);
    }

    #[test]
    fn failed_writes_are_dropped() {
        let mut gw = Gateway::new(ReadOnlyStore::default());
        let sets = gw.load_sets();
        assert_eq!(sets.len(), 2);
        assert!(!gw.save_sets(&sets));
        assert!(gw.try_save_sets(&sets).is_err());
        assert!(!gw.save_harvest_count(1));
        assert_eq!(gw.harvest_count(), 0);
    }

    #[test]
    fn claims_are_keyed_per_set() {
        let mut gw = Gateway::new(MemoryStore::new());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(!gw.is_claimed(a));

        gw.save_claimed(a);
        assert!(gw.is_claimed(a));
        assert!(!gw.is_claimed(b));
        assert_eq!(
            gw.store().get(&keys::harvest_claimed(a)).unwrap().as_deref(),
            Some("true")
        );

        gw.clear_claim(a);
        assert!(!gw.is_claimed(a));
    }

    #[test]
    fn malformed_counters_read_as_zero() {
        let mut store = MemoryStore::new();
        store.set(keys::HARVEST_COUNT, "lots").unwrap();
        store.set(keys::STREAK_CURRENT, "-2").unwrap();
        store.set(keys::STREAK_LAST_DAY, "yesterday").unwrap();
        let gw = Gateway::new(store);

        assert_eq!(gw.harvest_count(), 0);
        assert_eq!(gw.streak(), StreakState::default());
    }

    #[test]
    fn streak_layout() {
        let mut gw = Gateway::new(MemoryStore::new());
        let state = StreakState {
            current: 4,
            last_day: NaiveDate::from_ymd_opt(2026, 10, 19),
        };
        gw.save_streak(&state);

        assert_eq!(
            gw.store().get(keys::STREAK_CURRENT).unwrap().as_deref(),
            Some("4")
        );
        assert_eq!(
            gw.store().get(keys::STREAK_LAST_DAY).unwrap().as_deref(),
            Some("2026-10-19")
        );
        assert_eq!(gw.streak(), state);

        gw.save_streak(&StreakState::default());
        assert_eq!(
            gw.store().get(keys::STREAK_LAST_DAY).unwrap().as_deref(),
            Some("")
        );
        assert_eq!(gw.streak().last_day, None);
    }
}
