//! Stats counters, team chat membership checks, and invite/gift incentive
//! codes (`spec.md` §4.9). Three small, mostly-independent subsystems
//! bundled in one crate the way the teacher keeps its smaller pallets
//! (`pallets/identity`, `pallets/nomination-pools`) each self-contained but
//! grouped by theme in the workspace.

pub mod config;
pub mod errors;
pub mod incentives;
pub mod stats;
pub mod state;
pub mod teams;

#[cfg(test)]
mod tests;

pub use config::{IncentiveConfig, IncentivesConfig, StatConfig, StatsConfig, TeamsConfig};
pub use incentives::{IncentivesEngine, IncentivesSystem};
pub use stats::{StatsEngine, StatsSystem};
pub use state::UserIncentives;
pub use teams::{TeamsEngine, TeamsSystem};

pub use pamlogix_core::{Incentive, IncentiveType, Stat, StatOperator, UserStats};
