//! Harvest bookkeeping: one bonus per fully completed set.

use std::collections::HashSet;

use tracing::{debug, info};
use uuid::Uuid;

use crate::storage::{Gateway, KvStore};

/// Delta applied by [`HarvestTracker::check_and_claim`].
pub const DEFAULT_HARVEST_DELTA: i64 = 1;

/// Global harvested-tomato counter plus per-set claim records.
///
/// Claims are remembered in memory as soon as they succeed, so a second
/// check that runs before the persisted flag is visible is still a no-op.
#[derive(Debug, Clone, Default)]
pub struct HarvestTracker {
    total: u64,
    claimed: HashSet<Uuid>,
}

impl HarvestTracker {
    pub fn load<S: KvStore>(gateway: &Gateway<S>) -> Self {
        Self {
            total: gateway.harvest_count(),
            claimed: HashSet::new(),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_claimed<S: KvStore>(&self, set_id: Uuid, gateway: &Gateway<S>) -> bool {
        self.claimed.contains(&set_id) || gateway.is_claimed(set_id)
    }

    /// Claim the harvest of `set_id` with the default delta.
    pub fn check_and_claim<S: KvStore>(
        &mut self,
        set_id: Uuid,
        set_complete: bool,
        gateway: &mut Gateway<S>,
    ) -> bool {
        self.check_and_claim_with(set_id, set_complete, DEFAULT_HARVEST_DELTA, gateway)
    }

    /// Claim the harvest of `set_id` if the set is complete and unclaimed.
    ///
    /// On success the claim record is written first, then the counter moves
    /// by `delta` (clamped at zero) and is written. Returns whether this
    /// call performed the claim.
    pub fn check_and_claim_with<S: KvStore>(
        &mut self,
        set_id: Uuid,
        set_complete: bool,
        delta: i64,
        gateway: &mut Gateway<S>,
    ) -> bool {
        if !set_complete {
            return false;
        }
        if self.is_claimed(set_id, gateway) {
            debug!(set = %set_id, "harvest already claimed");
            self.claimed.insert(set_id);
            return false;
        }
        self.claimed.insert(set_id);
        gateway.save_claimed(set_id);
        self.increment(delta, gateway);
        info!(set = %set_id, delta, total = self.total, "harvest claimed");
        true
    }

    /// Move the counter by `delta`, never below zero, and persist it.
    pub fn increment<S: KvStore>(&mut self, delta: i64, gateway: &mut Gateway<S>) -> u64 {
        self.total = if delta >= 0 {
            self.total.saturating_add(delta as u64)
        } else {
            self.total.saturating_sub(delta.unsigned_abs())
        };
        gateway.save_harvest_count(self.total);
        self.total
    }

    /// Drop the claim record of a deleted set. The counter keeps its value.
    pub fn forget<S: KvStore>(&mut self, set_id: Uuid, gateway: &mut Gateway<S>) {
        self.claimed.remove(&set_id);
        gateway.clear_claim(set_id);
    }
}
