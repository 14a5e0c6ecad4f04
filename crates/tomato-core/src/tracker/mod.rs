mod harvest;
mod streak;

pub use harvest::{HarvestTracker, DEFAULT_HARVEST_DELTA};
pub use streak::{StreakCredit, StreakState, StreakTracker};
