//! Countdown timer for focus and break intervals.
//!
//! The timer is a wall-clock-based state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` periodically
//! (once a second is plenty).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed -> (start) Running
//! ```
//!
//! Every command has an `_at` form taking the current time in epoch
//! milliseconds, so the timer can be driven deterministically.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Minutes in a standard focus session.
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
/// Minutes in a standard break.
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Focus,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero. The completion event has been emitted.
    Completed,
}

/// Point-in-time view for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub kind: TimerKind,
    pub state: TimerState,
    pub remaining_ms: u64,
    pub total_ms: u64,
    pub display: String,
}

/// Countdown for a single focus or break interval.
///
/// Operates on wall-clock deltas. No internal thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTimer {
    kind: TimerKind,
    total_ms: u64,
    state: TimerState,
    remaining_ms: u64,
    /// Timestamp (ms since epoch) of the last start/resume or tick.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
}

impl FocusTimer {
    /// A timer of `minutes` (at least one) in the `Idle` state.
    pub fn new(kind: TimerKind, minutes: u32) -> Self {
        let total_ms = u64::from(minutes.max(1)) * 60_000;
        Self {
            kind,
            total_ms,
            state: TimerState::Idle,
            remaining_ms: total_ms,
            last_tick_epoch_ms: None,
        }
    }

    pub fn focus() -> Self {
        Self::new(TimerKind::Focus, DEFAULT_FOCUS_MINUTES)
    }

    pub fn short_break() -> Self {
        Self::new(TimerKind::Break, DEFAULT_BREAK_MINUTES)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Remaining time as `MM:SS`, rounding partial seconds up.
    pub fn display(&self) -> String {
        let secs = self.remaining_ms.div_ceil(1000);
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// 0.0 .. 1.0 progress through the interval.
    pub fn progress(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / self.total_ms as f64)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            kind: self.kind,
            state: self.state,
            remaining_ms: self.remaining_ms,
            total_ms: self.total_ms,
            display: self.display(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    pub fn start_at(&mut self, now: u64) -> Option<Event> {
        match self.state {
            // already counting; settle the elapsed time in case it ran out
            TimerState::Running => self.settle(now),
            TimerState::Idle | TimerState::Paused | TimerState::Completed => {
                if self.state == TimerState::Completed {
                    self.remaining_ms = self.total_ms;
                }
                self.state = TimerState::Running;
                self.last_tick_epoch_ms = Some(now);
                Some(Event::TimerStarted {
                    kind: self.kind,
                    duration_secs: self.remaining_ms / 1000,
                    at: Utc::now(),
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    /// A countdown that already ran out completes here and returns
    /// `TimerCompleted` instead of `TimerPaused`.
    pub fn pause_at(&mut self, now: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        if let Some(completed) = self.settle(now) {
            return Some(completed);
        }
        self.state = TimerState::Paused;
        self.last_tick_epoch_ms = None;
        Some(Event::TimerPaused {
            kind: self.kind,
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Pause when running, start otherwise.
    ///
    /// Like [`FocusTimer::pause_at`], this completes a running timer whose
    /// countdown already ran out instead of pausing it.
    pub fn toggle_at(&mut self, now: u64) -> Option<Event> {
        if self.state == TimerState::Running {
            self.pause_at(now)
        } else {
            self.start_at(now)
        }
    }

    /// Stop and rewind to the full duration. Dismissing a timer this way
    /// never counts as a completed session.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.remaining_ms = self.total_ms;
        self.last_tick_epoch_ms = None;
        Some(Event::TimerReset {
            kind: self.kind,
            at: Utc::now(),
        })
    }

    /// Call periodically. Returns `Some(Event::TimerCompleted)` exactly
    /// once, on the tick where the countdown reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&mut self, now: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.settle(now)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply elapsed time to a running timer and complete it if the
    /// countdown reached zero. Shared by every command that sees a running
    /// timer.
    fn settle(&mut self, now: u64) -> Option<Event> {
        self.flush_elapsed(now);
        if self.remaining_ms > 0 {
            return None;
        }
        self.state = TimerState::Completed;
        self.last_tick_epoch_ms = None;
        Some(Event::TimerCompleted {
            kind: self.kind,
            at: Utc::now(),
        })
    }

    fn flush_elapsed(&mut self, now: u64) {
        if let Some(last) = self.last_tick_epoch_ms {
            let elapsed = now.saturating_sub(last);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick_epoch_ms = Some(now);
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
