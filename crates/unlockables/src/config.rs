//! Declarative unlockable-definition catalogue and per-user slot scheduler
//! parameters (`spec.md` §4.8).

use pamlogix_core::{RewardConfig, UnlockableId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One catalogue entry. `reward` has no counterpart on the core
/// `UnlockableInstance` entity (`spec.md` §3 only lists scheduler fields) —
/// it lives here because rolling the completion reward only ever needs the
/// originating def's config, not a persisted per-instance copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnlockableDefConfig {
    pub id: UnlockableId,
    pub wait_time_sec: i64,
    #[serde(default)]
    pub start_cost: HashMap<String, i64>,
    #[serde(default)]
    pub cost: HashMap<String, i64>,
    /// Relative weight used by `Create("", None)`'s random draw (`spec.md`
    /// §4.8 "a probability vector is precomputed from per-config
    /// `probability` weights").
    #[serde(default)]
    pub probability: f64,
    #[serde(default)]
    pub reward: RewardConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnlockablesConfig {
    pub defs: HashMap<UnlockableId, UnlockableDefConfig>,
    #[serde(default)]
    pub slots: u32,
    #[serde(default)]
    pub active_slots: u32,
    #[serde(default)]
    pub max_active_slots: u32,
    #[serde(default)]
    pub slot_cost: HashMap<String, i64>,
    #[serde(default)]
    pub max_queued_unlocks: u32,
}
