mod config;
pub mod gateway;
pub mod kv;

pub use config::Config;
pub use gateway::Gateway;
pub use kv::{KvStore, MemoryStore, SqliteStore};

use std::path::PathBuf;

/// Logical key namespace of the flat key-value store.
pub mod keys {
    use uuid::Uuid;

    pub const SETS: &str = "sets";
    /// Last unreadable `sets` value, kept aside before defaults replace it.
    pub const SETS_CORRUPT: &str = "sets.corrupt";
    pub const HARVEST_COUNT: &str = "harvest.count";
    pub const STREAK_CURRENT: &str = "streak.current";
    pub const STREAK_LAST_DAY: &str = "streak.lastDay";
    pub const TODO_ITEMS: &str = "todo.items";
    pub const TIMER_STATE: &str = "timer.state";

    const HARVEST_CLAIMED_PREFIX: &str = "harvest.claimed.";

    pub fn harvest_claimed(set_id: Uuid) -> String {
        format!("{HARVEST_CLAIMED_PREFIX}{set_id}")
    }
}

/// Returns the data directory for the store and config file.
///
/// `TOMATO_HOME` overrides the location entirely. Otherwise this is
/// `~/.config/tomato-universe[-dev]/`, with TOMATO_ENV=dev selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("TOMATO_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TOMATO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tomato-universe-dev")
            } else {
                base_dir.join("tomato-universe")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
