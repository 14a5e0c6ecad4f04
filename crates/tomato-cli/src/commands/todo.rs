use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use super::{open_universe, parse_date, parse_id, print_json, CliResult};

#[derive(Subcommand)]
pub enum TodoAction {
    /// Add a to-do item
    Add {
        /// Item title
        title: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// List to-do items
    List {
        /// Only open items, soonest due first
        #[arg(long)]
        open: bool,
    },
    /// Remove an item
    Remove {
        /// Item ID
        id: String,
    },
    /// Toggle an item's done flag
    Toggle {
        /// Item ID
        id: String,
    },
}

pub fn run(action: TodoAction) -> CliResult {
    let mut universe = open_universe()?;

    match action {
        TodoAction::Add { title, due } => {
            let due = due.as_deref().map(parse_date).transpose()?;
            let item = universe.add_todo(&title, due)?;
            print_json(&item)?;
        }
        TodoAction::List { open } => {
            let now = Utc::now();
            let items: Vec<_> = if open {
                universe.todos().upcoming()
            } else {
                universe.todos().items().iter().collect()
            };
            let rows: Vec<_> = items
                .into_iter()
                .map(|item| {
                    json!({
                        "id": item.id,
                        "title": item.title,
                        "due": item.due,
                        "done": item.done,
                        "overdue": item.is_overdue(now),
                    })
                })
                .collect();
            print_json(&rows)?;
        }
        TodoAction::Remove { id } => {
            let removed = universe.remove_todo(parse_id(&id)?)?;
            print_json(&removed)?;
        }
        TodoAction::Toggle { id } => {
            let id = parse_id(&id)?;
            let done = universe.toggle_todo(id)?;
            print_json(&json!({ "id": id, "done": done }))?;
        }
    }
    Ok(())
}
