//! Daily focus streak.
//!
//! A streak counts consecutive calendar days with at least one completed
//! focus session. Days are taken in the time zone of the timestamp passed
//! in, so callers decide whether "today" is local or UTC.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::storage::{Gateway, KvStore};

/// Persisted streak counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current: u32,
    pub last_day: Option<NaiveDate>,
}

impl StreakState {
    /// Apply a session credit on `today`. Returns whether anything changed.
    pub fn credit(&mut self, today: NaiveDate) -> bool {
        if self.last_day == Some(today) {
            return false;
        }
        self.current = if self.last_day == today.pred_opt() {
            self.current.saturating_add(1)
        } else {
            1
        };
        self.last_day = Some(today);
        true
    }

    /// True when the last credit is neither `today` nor the day before.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        match self.last_day {
            Some(last) => last != today && Some(last) != today.pred_opt(),
            None => false,
        }
    }
}

/// Outcome of [`StreakTracker::credit_session_completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakCredit {
    /// Today was already credited.
    AlreadyCredited,
    /// The streak moved to this value.
    Credited { current: u32, day: NaiveDate },
}

/// Streak counter with load-at-startup, save-on-mutation lifecycle.
#[derive(Debug, Clone, Default)]
pub struct StreakTracker {
    state: StreakState,
}

impl StreakTracker {
    pub fn load<S: KvStore>(gateway: &Gateway<S>) -> Self {
        Self {
            state: gateway.streak(),
        }
    }

    pub fn state(&self) -> StreakState {
        self.state
    }

    pub fn current(&self) -> u32 {
        self.state.current
    }

    /// Credit a completed focus session at `now`. At most one credit per
    /// calendar day; a gap of two or more days restarts the streak at 1.
    pub fn credit_session_completion<Tz: TimeZone, S: KvStore>(
        &mut self,
        now: &DateTime<Tz>,
        gateway: &mut Gateway<S>,
    ) -> StreakCredit {
        let today = now.date_naive();
        if !self.state.credit(today) {
            return StreakCredit::AlreadyCredited;
        }
        gateway.save_streak(&self.state);
        info!(current = self.state.current, %today, "streak credited");
        StreakCredit::Credited {
            current: self.state.current,
            day: today,
        }
    }

    /// Reset a streak whose last credit is older than yesterday, so the
    /// displayed value does not claim a run that has already broken.
    /// Returns whether it was reset.
    pub fn expire_if_stale<Tz: TimeZone, S: KvStore>(
        &mut self,
        now: &DateTime<Tz>,
        gateway: &mut Gateway<S>,
    ) -> bool {
        let today = now.date_naive();
        if !self.state.is_stale(today) || self.state.current == 0 {
            return false;
        }
        info!(previous = self.state.current, "streak expired");
        self.state.current = 0;
        gateway.save_streak(&self.state);
        true
    }

    /// Days between the last credit and `now`, if any credit exists.
    pub fn days_since_last_credit<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<i64> {
        self.state
            .last_day
            .map(|last| (now.date_naive() - last).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{FixedOffset, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn setup() -> (StreakTracker, Gateway<MemoryStore>) {
        let gw = Gateway::new(MemoryStore::new());
        (StreakTracker::load(&gw), gw)
    }

    #[test]
    fn first_credit_starts_at_one() {
        let (mut tracker, mut gw) = setup();
        let credit = tracker.credit_session_completion(&at(2026, 10, 19, 9), &mut gw);
        assert_eq!(
            credit,
            StreakCredit::Credited {
                current: 1,
                day: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
            }
        );
        assert_eq!(gw.streak(), tracker.state());
    }

    #[test]
    fn same_day_credits_once() {
        let (mut tracker, mut gw) = setup();
        tracker.credit_session_completion(&at(2026, 10, 19, 9), &mut gw);
        let again = tracker.credit_session_completion(&at(2026, 10, 19, 23), &mut gw);
        assert_eq!(again, StreakCredit::AlreadyCredited);
        assert_eq!(tracker.current(), 1);
    }

    #[test]
    fn consecutive_days_extend_the_streak() {
        let (mut tracker, mut gw) = setup();
        tracker.credit_session_completion(&at(2026, 10, 18, 22), &mut gw);
        tracker.credit_session_completion(&at(2026, 10, 19, 7), &mut gw);
        tracker.credit_session_completion(&at(2026, 10, 20, 7), &mut gw);
        assert_eq!(tracker.current(), 3);
    }

    #[test]
    fn month_and_year_boundaries_count_as_consecutive() {
        let (mut tracker, mut gw) = setup();
        tracker.credit_session_completion(&at(2026, 12, 31, 12), &mut gw);
        tracker.credit_session_completion(&at(2027, 1, 1, 12), &mut gw);
        assert_eq!(tracker.current(), 2);
    }

    #[test]
    fn gap_of_two_days_restarts_at_one() {
        let (mut tracker, mut gw) = setup();
        tracker.credit_session_completion(&at(2026, 10, 17, 9), &mut gw);
        tracker.credit_session_completion(&at(2026, 10, 18, 9), &mut gw);
        assert_eq!(tracker.current(), 2);

        tracker.credit_session_completion(&at(2026, 10, 20, 9), &mut gw);
        assert_eq!(tracker.current(), 1);
    }

    #[test]
    fn day_follows_the_timestamp_time_zone() {
        let (mut tracker, mut gw) = setup();
        let riyadh = FixedOffset::east_opt(3 * 3600).unwrap();
        // 22:30 UTC on the 18th is already the 19th at UTC+3.
        let late = riyadh.with_ymd_and_hms(2026, 10, 19, 1, 30, 0).unwrap();
        tracker.credit_session_completion(&late, &mut gw);
        assert_eq!(
            tracker.state().last_day,
            NaiveDate::from_ymd_opt(2026, 10, 19)
        );
    }

    #[test]
    fn state_survives_reload() {
        let (mut tracker, mut gw) = setup();
        tracker.credit_session_completion(&at(2026, 10, 18, 9), &mut gw);
        tracker.credit_session_completion(&at(2026, 10, 19, 9), &mut gw);

        let reloaded = StreakTracker::load(&gw);
        assert_eq!(reloaded.state(), tracker.state());
        assert_eq!(reloaded.current(), 2);
    }

    #[test]
    fn stale_streak_expires_to_zero() {
        let (mut tracker, mut gw) = setup();
        tracker.credit_session_completion(&at(2026, 10, 10, 9), &mut gw);

        assert!(!tracker.expire_if_stale(&at(2026, 10, 11, 9), &mut gw));
        assert_eq!(tracker.current(), 1);

        assert!(tracker.expire_if_stale(&at(2026, 10, 19, 9), &mut gw));
        assert_eq!(tracker.current(), 0);
        assert_eq!(gw.streak().current, 0);

        // expiring again is a no-op
        assert!(!tracker.expire_if_stale(&at(2026, 10, 19, 9), &mut gw));

        tracker.credit_session_completion(&at(2026, 10, 19, 10), &mut gw);
        assert_eq!(tracker.current(), 1);
    }

    #[test]
    fn days_since_last_credit() {
        let (mut tracker, mut gw) = setup();
        assert_eq!(tracker.days_since_last_credit(&at(2026, 10, 19, 9)), None);
        tracker.credit_session_completion(&at(2026, 10, 16, 9), &mut gw);
        assert_eq!(tracker.days_since_last_credit(&at(2026, 10, 19, 9)), Some(3));
    }

    #[test]
    fn fresh_tracker_is_never_stale() {
        let state = StreakState::default();
        assert!(!state.is_stale(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
    }
}
