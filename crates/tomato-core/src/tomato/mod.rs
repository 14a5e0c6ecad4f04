mod item;
pub mod progress;
mod set;

pub use item::{TomatoItem, TomatoState};
pub use progress::Completion;
pub use set::{PomodoroSet, DEFAULT_TOTAL, PLACEHOLDER_TITLE};
