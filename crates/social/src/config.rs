//! Declarative configuration for stats, teams, and incentives (`spec.md`
//! §4.9).

use pamlogix_core::RewardConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-stat declarations are optional: an unconfigured stat name is still
/// accepted and tracked with default bounds, mirroring the teacher's
/// permissive `storage_value_or_default` pattern rather than rejecting
/// unknown keys outright.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatConfig {
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub stats: HashMap<String, StatConfig>,
}

/// `spec.md` §4.9 "Teams chat: ... a bounded fetch of the user's top-N
/// groups (N≈10)".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsConfig {
    #[serde(default = "default_membership_fetch_limit")]
    pub membership_fetch_limit: u32,
}

fn default_membership_fetch_limit() -> u32 {
    10
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self { membership_fetch_limit: default_membership_fetch_limit() }
    }
}

/// One incentive catalogue entry: the bounds `SenderCreate`/`RecipientClaim`
/// enforce, plus the two reward configs granted to sender and recipient
/// (`spec.md` §3 "Incentive", §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncentiveConfig {
    pub incentive_type: pamlogix_core::IncentiveType,
    #[serde(default)]
    pub max_concurrent: u32,
    #[serde(default)]
    pub max_claims: u32,
    #[serde(default)]
    pub max_global_claims: u32,
    #[serde(default)]
    pub max_recipient_age_sec: i64,
    #[serde(default)]
    pub expiry_sec: i64,
    #[serde(default)]
    pub sender_reward: RewardConfig,
    #[serde(default)]
    pub recipient_reward: RewardConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncentivesConfig {
    #[serde(default)]
    pub incentives: HashMap<String, IncentiveConfig>,
}
