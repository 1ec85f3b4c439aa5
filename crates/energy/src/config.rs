//! Declarative per-bucket energy catalogue (`spec.md` §3 "Energy bucket",
//! §4.4).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyBucketConfig {
    pub energy_id: String,
    pub max: i64,
    #[serde(default)]
    pub max_overfill: i64,
    pub refill_amount: i64,
    pub refill_period_sec: i64,
    /// Starting `current` the first time a user's bucket is created.
    /// Defaults to `max` when unset (a fresh bucket starts full).
    #[serde(default)]
    pub start_current: Option<i64>,
}

impl Default for EnergyBucketConfig {
    fn default() -> Self {
        Self { energy_id: String::new(), max: 0, max_overfill: 0, refill_amount: 0, refill_period_sec: 0, start_current: None }
    }
}

/// One daily UTC reset slot (`spec.md` §4.4 `ResetEnergyAtUTC(hour,min)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyResetConfig {
    pub hour: u8,
    pub minute: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnergyConfig {
    #[serde(default)]
    pub buckets: HashMap<String, EnergyBucketConfig>,
}
