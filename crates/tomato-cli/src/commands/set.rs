//! Tomato set commands.

use chrono::Local;
use clap::Subcommand;
use serde_json::json;
use tomato_core::{PomodoroSet, SessionReport, StreakCredit};

use super::{open_universe, parse_date, parse_id, print_json, CliResult};

#[derive(Subcommand)]
pub enum SetAction {
    /// Create a new set
    Create {
        /// Goal title
        title: String,
        /// What reaching the goal looks like
        #[arg(long)]
        note: Option<String>,
        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Number of tomatoes (default from config)
        #[arg(long)]
        total: Option<u32>,
    },
    /// List sets with their progress
    List,
    /// Print a set with all its items
    Show {
        /// Set ID
        id: String,
    },
    /// Delete a set and its photos
    Delete {
        /// Set ID
        id: String,
    },
    /// Complete the current tomato of a set
    Complete {
        /// Set ID
        id: String,
        /// Item number (must be the current one)
        item: u32,
    },
    /// Reopen a done tomato
    Restart {
        /// Set ID
        id: String,
        /// Item number
        item: u32,
    },
    /// Finish a reopened tomato
    Finish {
        /// Set ID
        id: String,
        /// Item number
        item: u32,
    },
    /// Attach a photo file to a tomato
    PhotoAttach {
        /// Set ID
        id: String,
        /// Item number
        item: u32,
        /// Image file to read
        path: std::path::PathBuf,
    },
    /// Remove a tomato's photo
    PhotoRemove {
        /// Set ID
        id: String,
        /// Item number
        item: u32,
    },
}

fn summary(set: &PomodoroSet) -> serde_json::Value {
    json!({
        "id": set.id(),
        "title": set.title,
        "targetNote": set.target_note,
        "targetDate": set.target_date,
        "total": set.total(),
        "doneCount": set.done_count(),
        "currentIndex": set.current_index(),
    })
}

fn report_json(report: &SessionReport) -> serde_json::Value {
    let streak = match report.streak {
        StreakCredit::AlreadyCredited => json!({ "credited": false }),
        StreakCredit::Credited { current, day } => {
            json!({ "credited": true, "current": current, "day": day })
        }
    };
    json!({
        "setId": report.set_id,
        "itemId": report.item_id,
        "doneCount": report.done_count,
        "setComplete": report.set_complete,
        "harvested": report.harvested,
        "streak": streak,
    })
}

pub fn run(action: SetAction) -> CliResult {
    let mut universe = open_universe()?;

    match action {
        SetAction::Create {
            title,
            note,
            date,
            total,
        } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            let set = universe.create_set(&title, note, date, total);
            print_json(&summary(set))?;
        }
        SetAction::List => {
            let sets: Vec<_> = universe.sets().iter().map(summary).collect();
            print_json(&sets)?;
        }
        SetAction::Show { id } => {
            let id = parse_id(&id)?;
            let set = universe.set(id).ok_or_else(|| format!("no set {id}"))?;
            print_json(set)?;
        }
        SetAction::Delete { id } => {
            let removed = universe.delete_set(parse_id(&id)?)?;
            print_json(&summary(&removed))?;
        }
        SetAction::Complete { id, item } => {
            let report = universe.complete_current(parse_id(&id)?, item, &Local::now())?;
            print_json(&report_json(&report))?;
        }
        SetAction::Restart { id, item } => {
            let id = parse_id(&id)?;
            universe.restart(id, item)?;
            print_json(&json!({ "setId": id, "itemId": item, "restarted": true }))?;
        }
        SetAction::Finish { id, item } => {
            let report = universe.finish_restarted(parse_id(&id)?, item, &Local::now())?;
            print_json(&report_json(&report))?;
        }
        SetAction::PhotoAttach { id, item, path } => {
            let id = parse_id(&id)?;
            let bytes = std::fs::read(&path)?;
            let size = bytes.len();
            universe.attach_photo(id, item, bytes)?;
            print_json(&json!({ "setId": id, "itemId": item, "bytes": size }))?;
        }
        SetAction::PhotoRemove { id, item } => {
            let id = parse_id(&id)?;
            let removed = universe.remove_photo(id, item)?;
            print_json(&json!({ "setId": id, "itemId": item, "removed": removed }))?;
        }
    }
    Ok(())
}
