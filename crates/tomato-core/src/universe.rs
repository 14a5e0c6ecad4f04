//! The assembled core: sets, trackers, to-do feed and event bus over one
//! injected key-value store.
//!
//! A UI drives everything through [`TomatoUniverse`]. Completing a tomato
//! runs the whole chain in one call:
//!
//! ```text
//! complete_current
//!   -> progress transition        (rejects out-of-order ids)
//!   -> save sets
//!   -> streak credit              (once per calendar day)
//!   -> harvest check and claim    (once per completed set)
//!   -> events to subscribers
//! ```

use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::events::{Event, EventBus, SubscriptionId};
use crate::storage::{Config, Gateway, KvStore};
use crate::todo::{TodoFeed, TodoItem};
use crate::tomato::{progress, Completion, PomodoroSet};
use crate::tracker::{HarvestTracker, StreakCredit, StreakState, StreakTracker};

/// Everything that happened as a result of finishing one session in a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub set_id: Uuid,
    pub item_id: u32,
    pub done_count: u32,
    pub set_complete: bool,
    pub streak: StreakCredit,
    /// True when this session's completion claimed the set's harvest.
    pub harvested: bool,
}

pub struct TomatoUniverse<S: KvStore> {
    gateway: Gateway<S>,
    config: Config,
    sets: Vec<PomodoroSet>,
    streak: StreakTracker,
    harvest: HarvestTracker,
    todo: TodoFeed,
    bus: EventBus,
}

impl<S: KvStore> TomatoUniverse<S> {
    /// Load all state from `store`, expiring a stale streak against the
    /// local clock.
    pub fn open(store: S, config: Config) -> Self {
        Self::open_at(store, config, &Local::now())
    }

    /// Load all state from `store`, taking `now` as the startup time.
    pub fn open_at<Tz: TimeZone>(store: S, config: Config, now: &DateTime<Tz>) -> Self {
        let mut gateway = Gateway::new(store)
            .seed_defaults(config.sets.seed_defaults)
            .seed_total(config.sets.default_total);
        let sets = gateway.load_sets();
        let mut streak = StreakTracker::load(&gateway);
        streak.expire_if_stale(now, &mut gateway);
        let harvest = HarvestTracker::load(&gateway);
        let todo = TodoFeed::load(&gateway);
        debug!(
            sets = sets.len(),
            streak = streak.current(),
            harvested = harvest.total(),
            "universe opened"
        );
        Self {
            gateway,
            config,
            sets,
            streak,
            harvest,
            todo,
            bus: EventBus::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sets(&self) -> &[PomodoroSet] {
        &self.sets
    }

    pub fn set(&self, id: Uuid) -> Option<&PomodoroSet> {
        self.sets.iter().find(|s| s.id() == id)
    }

    pub fn streak(&self) -> StreakState {
        self.streak.state()
    }

    pub fn harvest_total(&self) -> u64 {
        self.harvest.total()
    }

    pub fn is_harvest_claimed(&self, set_id: Uuid) -> bool {
        self.harvest.is_claimed(set_id, &self.gateway)
    }

    pub fn todos(&self) -> &TodoFeed {
        &self.todo
    }

    pub fn gateway(&self) -> &Gateway<S> {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut Gateway<S> {
        &mut self.gateway
    }

    pub fn into_store(self) -> S {
        self.gateway.into_inner()
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn subscribe(&mut self, callback: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.bus.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    fn publish(&mut self, event: Event) {
        self.bus.publish(&event);
    }

    // ── Sets ─────────────────────────────────────────────────────────

    /// Create a set, using the configured size when `total` is `None`.
    pub fn create_set(
        &mut self,
        title: &str,
        target_note: Option<String>,
        target_date: Option<DateTime<Utc>>,
        total: Option<u32>,
    ) -> &PomodoroSet {
        let total = total.unwrap_or(self.config.sets.default_total);
        let set = PomodoroSet::create(title, target_note, target_date, total);
        info!(set = %set.id(), title = %set.title, total = set.total(), "set created");
        let event = Event::SetCreated {
            set_id: set.id(),
            title: set.title.clone(),
            total: set.total(),
            at: Utc::now(),
        };
        self.sets.push(set);
        self.gateway.save_sets(&self.sets);
        self.publish(event);
        &self.sets[self.sets.len() - 1]
    }

    /// Delete a set with all its items and photos, and its claim record.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an unknown set id.
    pub fn delete_set(&mut self, id: Uuid) -> Result<PomodoroSet> {
        let pos = self.position(id)?;
        let removed = self.sets.remove(pos);
        self.gateway.save_sets(&self.sets);
        self.harvest.forget(id, &mut self.gateway);
        info!(set = %id, "set deleted");
        self.publish(Event::SetDeleted {
            set_id: id,
            at: Utc::now(),
        });
        Ok(removed)
    }

    /// Complete the current tomato of a set and run the streak and harvest
    /// side effects.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an unknown set and `OutOfOrder` when
    /// `item_id` is not the set's current item. Nothing changes on error.
    pub fn complete_current<Tz: TimeZone>(
        &mut self,
        set_id: Uuid,
        item_id: u32,
        now: &DateTime<Tz>,
    ) -> Result<SessionReport> {
        let pos = self.position(set_id)?;
        let Completion { set_complete, .. } = progress::complete_current(&mut self.sets[pos], item_id)?;
        Ok(self.after_session(pos, item_id, set_complete, now))
    }

    /// Reopen a done tomato. See [`progress::restart`].
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an unknown set or item, or an item
    /// that is not done.
    pub fn restart(&mut self, set_id: Uuid, item_id: u32) -> Result<()> {
        let pos = self.position(set_id)?;
        progress::restart(&mut self.sets[pos], item_id)?;
        self.gateway.save_sets(&self.sets);
        self.publish(Event::TomatoRestarted {
            set_id,
            item_id,
            at: Utc::now(),
        });
        Ok(())
    }

    /// Close a reopened tomato. Counts as a completed focus session.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an unknown set and `OutOfOrder` when
    /// the item was not reopened.
    pub fn finish_restarted<Tz: TimeZone>(
        &mut self,
        set_id: Uuid,
        item_id: u32,
        now: &DateTime<Tz>,
    ) -> Result<SessionReport> {
        let pos = self.position(set_id)?;
        let set_complete = progress::finish_restarted(&mut self.sets[pos], item_id)?;
        Ok(self.after_session(pos, item_id, set_complete, now))
    }

    /// Claim a set's harvest outside of a completion, e.g. to retry after
    /// a crash between saving the set and writing the claim.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an unknown set id.
    pub fn claim_harvest(&mut self, set_id: Uuid) -> Result<bool> {
        let pos = self.position(set_id)?;
        let complete = progress::is_set_complete(&self.sets[pos]);
        Ok(self.try_harvest(set_id, complete))
    }

    /// # Errors
    /// Returns `InvalidArgument` for an unknown set, unknown item or empty photo.
    pub fn attach_photo(&mut self, set_id: Uuid, item_id: u32, bytes: Vec<u8>) -> Result<()> {
        let pos = self.position(set_id)?;
        self.sets[pos].attach_photo(item_id, bytes)?;
        self.gateway.save_sets(&self.sets);
        Ok(())
    }

    /// Returns whether a photo was removed.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an unknown set or item.
    pub fn remove_photo(&mut self, set_id: Uuid, item_id: u32) -> Result<bool> {
        let pos = self.position(set_id)?;
        let removed = self.sets[pos].remove_photo(item_id)?;
        if removed {
            self.gateway.save_sets(&self.sets);
        }
        Ok(removed)
    }

    // ── Sessions and streak ──────────────────────────────────────────

    /// A focus session finished on the standalone timer, outside any set.
    pub fn record_standalone_session<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> StreakCredit {
        self.record_session(None, None, now)
    }

    /// Reset the streak if it broke since the last credit.
    pub fn expire_stale_streak<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> bool {
        self.streak.expire_if_stale(now, &mut self.gateway)
    }

    // ── To-do ────────────────────────────────────────────────────────

    /// # Errors
    /// Returns `InvalidArgument` for a blank title.
    pub fn add_todo(&mut self, title: &str, due: Option<DateTime<Utc>>) -> Result<TodoItem> {
        let item = self.todo.add(title, due, &mut self.gateway)?.clone();
        self.todos_updated();
        Ok(item)
    }

    /// # Errors
    /// Returns `InvalidArgument` for an unknown id.
    pub fn remove_todo(&mut self, id: Uuid) -> Result<TodoItem> {
        let item = self.todo.remove(id, &mut self.gateway)?;
        self.todos_updated();
        Ok(item)
    }

    /// # Errors
    /// Returns `InvalidArgument` for an unknown id.
    pub fn toggle_todo(&mut self, id: Uuid) -> Result<bool> {
        let done = self.todo.toggle(id, &mut self.gateway)?;
        self.todos_updated();
        Ok(done)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn position(&self, id: Uuid) -> Result<usize> {
        self.sets
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| CoreError::invalid(format!("no set {id}")))
    }

    /// Shared tail of every transition that finishes a focus session. The
    /// set is saved before the harvest is claimed, so a crash in between
    /// leaves a complete, unclaimed set that `claim_harvest` can retry.
    fn after_session<Tz: TimeZone>(
        &mut self,
        pos: usize,
        item_id: u32,
        set_complete: bool,
        now: &DateTime<Tz>,
    ) -> SessionReport {
        self.gateway.save_sets(&self.sets);
        let set_id = self.sets[pos].id();
        let done_count = self.sets[pos].done_count();
        let total = self.sets[pos].total();
        self.publish(Event::TomatoCompleted {
            set_id,
            item_id,
            done_count,
            total,
            at: now.with_timezone(&Utc),
        });

        let streak = self.record_session(Some(set_id), Some(item_id), now);
        let harvested = self.try_harvest(set_id, set_complete);

        SessionReport {
            set_id,
            item_id,
            done_count,
            set_complete,
            streak,
            harvested,
        }
    }

    fn record_session<Tz: TimeZone>(
        &mut self,
        set_id: Option<Uuid>,
        item_id: Option<u32>,
        now: &DateTime<Tz>,
    ) -> StreakCredit {
        let at = now.with_timezone(&Utc);
        self.publish(Event::SessionCompleted {
            set_id,
            item_id,
            at,
        });
        let credit = self.streak.credit_session_completion(now, &mut self.gateway);
        if let StreakCredit::Credited { current, day } = credit {
            self.publish(Event::StreakUpdated { current, day, at });
        }
        credit
    }

    fn try_harvest(&mut self, set_id: Uuid, set_complete: bool) -> bool {
        let delta = self.config.harvest.delta;
        let claimed =
            self.harvest
                .check_and_claim_with(set_id, set_complete, delta, &mut self.gateway);
        if claimed {
            self.publish(Event::HarvestAdded {
                set_id,
                delta,
                total: self.harvest.total(),
                at: Utc::now(),
            });
        }
        claimed
    }

    fn todos_updated(&mut self) {
        let count = self.todo.items().len();
        self.publish(Event::TodoItemsUpdated {
            count,
            at: Utc::now(),
        });
    }
}
