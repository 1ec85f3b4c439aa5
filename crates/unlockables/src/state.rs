//! Per-user persisted unlockables state (`spec.md` §6 storage layout
//! `unlockables` → `user_unlockables`).

pub use pamlogix_core::{UnlockableInstance, UnlockablesList};

use pamlogix_core::RewardConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The persisted blob: the public `UnlockablesList` shape plus the
/// completion reward each live instance was created against, keyed by
/// instance id so `Create`'s optional `overrideConfig` can diverge per
/// instance from the catalogue def.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUnlockablesState {
    pub list: UnlockablesList,
    #[serde(default)]
    pub rewards: HashMap<String, RewardConfig>,
}
