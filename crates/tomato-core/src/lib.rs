//! # Tomato Universe Core Library
//!
//! Core logic for Tomato Universe, a habit tracker where every goal is a
//! set of tomatoes completed one focus session at a time. The CLI and any
//! GUI shell are thin layers over this library.
//!
//! ## Architecture
//!
//! - **Tomatoes**: Sets of strictly ordered items with optional photos
//! - **Trackers**: Daily focus streak and a one-per-set harvest counter
//! - **Storage**: Flat key-value persistence (SQLite or in-memory) behind a
//!   fail-soft gateway, plus TOML configuration
//! - **Timer**: Wall-clock focus/break countdown that the caller ticks
//!
//! ## Key Components
//!
//! - [`TomatoUniverse`]: Facade tying sets, trackers and events together
//! - [`PomodoroSet`]: A goal and its ordered tomatoes
//! - [`Gateway`]: Typed load/save over any [`KvStore`]
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod timer;
pub mod todo;
pub mod tomato;
pub mod tracker;
pub mod universe;

pub use error::{ConfigError, CoreError, PersistenceError, Result};
pub use events::{Event, EventBus, SubscriptionId};
pub use storage::{Config, Gateway, KvStore, MemoryStore, SqliteStore};
pub use timer::{FocusTimer, TimerKind, TimerSnapshot, TimerState};
pub use todo::{TodoFeed, TodoItem};
pub use tomato::{Completion, PomodoroSet, TomatoItem, TomatoState};
pub use tracker::{HarvestTracker, StreakCredit, StreakState, StreakTracker};
pub use universe::{SessionReport, TomatoUniverse};
