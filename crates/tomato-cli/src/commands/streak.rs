use chrono::Local;
use clap::Subcommand;
use serde_json::json;

use super::{open_universe, print_json, CliResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Print the current streak
    Show,
}

pub fn run(action: StreakAction) -> CliResult {
    let mut universe = open_universe()?;

    match action {
        StreakAction::Show => {
            let now = Local::now();
            let expired = universe.expire_stale_streak(&now);
            let state = universe.streak();
            let today = now.date_naive();
            print_json(&json!({
                "current": state.current,
                "lastDay": state.last_day,
                "creditedToday": state.last_day == Some(today),
                "expired": expired,
            }))?;
        }
    }
    Ok(())
}
