//! CRON-scheduled counters with idle decay and tiered reward claims
//! (`spec.md` §4.6).

pub mod config;
pub mod engine;
pub mod errors;
pub mod state;

#[cfg(test)]
mod tests;

pub use config::{StreakConfig, StreakRewardTier, StreaksConfig};
pub use engine::{StreakClaimResult, StreaksEngine, StreaksSystem};
pub use state::{Streak, UserStreaks};
