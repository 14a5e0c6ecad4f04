pub mod config;
pub mod harvest;
pub mod set;
pub mod streak;
pub mod timer;
pub mod todo;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tomato_core::{Config, SqliteStore, TomatoUniverse};
use uuid::Uuid;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open the on-disk store with the user's configuration.
pub fn open_universe() -> CliResult<TomatoUniverse<SqliteStore>> {
    let store = SqliteStore::open()?;
    Ok(TomatoUniverse::open(store, Config::load_or_default()))
}

pub fn parse_id(raw: &str) -> CliResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| format!("invalid id '{raw}': {e}").into())
}

/// `YYYY-MM-DD`, taken as midnight UTC.
pub fn parse_date(raw: &str) -> CliResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{raw}' (expected YYYY-MM-DD): {e}"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("invalid date '{raw}'"))?;
    Ok(midnight.and_utc())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
