//! Declarative per-streak catalogue (`spec.md` §4.6).

use pamlogix_core::RewardConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A claimable reward band: `Claim` grants `reward` once `count` first falls
/// within `[count_min, count_max]` (spec.md §4.6 "A reward tier ... is
/// claimable iff count ∈ [count_min, count_max] and not yet present in
/// claimed_rewards").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreakRewardTier {
    pub count_min: i64,
    pub count_max: i64,
    #[serde(default)]
    pub reward: RewardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    pub max_count: i64,
    #[serde(default)]
    pub max_count_current_reset: i64,
    /// 5-field POSIX cron (`min hour dom month dow`); `None` disables
    /// CRON-driven idle decay entirely for this streak.
    #[serde(default)]
    pub reset_cron: Option<String>,
    #[serde(default)]
    pub idle_count_decay_reset: i64,
    #[serde(default)]
    pub max_idle_count_decay: i64,
    #[serde(default)]
    pub reward_tiers: Vec<StreakRewardTier>,
    #[serde(default)]
    pub disabled: bool,
    /// Window during which `Update` is accepted; `None` means unbounded.
    /// Out-of-window updates fail (spec.md §4.6 "fail for unknown/disabled/
    /// out-of-window streaks").
    #[serde(default)]
    pub start_time_sec: Option<i64>,
    #[serde(default)]
    pub end_time_sec: Option<i64>,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            max_count: i64::MAX,
            max_count_current_reset: i64::MAX,
            reset_cron: None,
            idle_count_decay_reset: 0,
            max_idle_count_decay: 0,
            reward_tiers: Vec::new(),
            disabled: false,
            start_time_sec: None,
            end_time_sec: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreaksConfig {
    #[serde(default)]
    pub streaks: HashMap<String, StreakConfig>,
}
