use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::TimerKind;

/// Every state change in the core produces an Event.
/// Widgets subscribe to them through an [`EventBus`] instead of reaching
/// into each other's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SetCreated {
        set_id: Uuid,
        title: String,
        total: u32,
        at: DateTime<Utc>,
    },
    SetDeleted {
        set_id: Uuid,
        at: DateTime<Utc>,
    },
    TomatoCompleted {
        set_id: Uuid,
        item_id: u32,
        done_count: u32,
        total: u32,
        at: DateTime<Utc>,
    },
    TomatoRestarted {
        set_id: Uuid,
        item_id: u32,
        at: DateTime<Utc>,
    },
    /// A 25-minute focus session finished, from a set or the standalone timer.
    SessionCompleted {
        set_id: Option<Uuid>,
        item_id: Option<u32>,
        at: DateTime<Utc>,
    },
    HarvestAdded {
        set_id: Uuid,
        delta: i64,
        total: u64,
        at: DateTime<Utc>,
    },
    StreakUpdated {
        current: u32,
        day: NaiveDate,
        at: DateTime<Utc>,
    },
    TodoItemsUpdated {
        count: usize,
        at: DateTime<Utc>,
    },
    TimerStarted {
        kind: TimerKind,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        kind: TimerKind,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        kind: TimerKind,
        at: DateTime<Utc>,
    },
    TimerReset {
        kind: TimerKind,
        at: DateTime<Utc>,
    },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Event)>;

/// Synchronous in-process fan-out.
///
/// Subscribers run in subscription order on the publishing thread. Events
/// published with no subscribers are dropped.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&Event) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to every subscriber. Returns how many received it.
    pub fn publish(&mut self, event: &Event) -> usize {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
