use clap::Subcommand;
use serde_json::json;

use super::{open_universe, parse_id, print_json, CliResult};

#[derive(Subcommand)]
pub enum HarvestAction {
    /// Print the harvest total and which sets have been claimed
    Show,
    /// Claim the harvest of a completed set if it is still unclaimed
    Claim {
        /// Set ID
        id: String,
    },
}

pub fn run(action: HarvestAction) -> CliResult {
    let mut universe = open_universe()?;

    match action {
        HarvestAction::Show => {
            let claimed: Vec<_> = universe
                .sets()
                .iter()
                .map(|s| s.id())
                .filter(|id| universe.is_harvest_claimed(*id))
                .collect();
            print_json(&json!({
                "total": universe.harvest_total(),
                "claimed": claimed,
            }))?;
        }
        HarvestAction::Claim { id } => {
            let id = parse_id(&id)?;
            let claimed = universe.claim_harvest(id)?;
            print_json(&json!({
                "setId": id,
                "claimed": claimed,
                "total": universe.harvest_total(),
            }))?;
        }
    }
    Ok(())
}
