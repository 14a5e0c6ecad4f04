mod engine;

pub use engine::{
    FocusTimer, TimerKind, TimerSnapshot, TimerState, DEFAULT_BREAK_MINUTES,
    DEFAULT_FOCUS_MINUTES,
};
