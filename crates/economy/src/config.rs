//! Declarative catalogue the economy engine is built from (`spec.md` §4.2).
//! Analogous to the teacher's `#[pallet::genesis_config]` / `parameter_types!`
//! constants: loaded once by the embedding host and handed to
//! `EconomyEngine::new`, never mutated at runtime.

use pamlogix_core::{ItemDefId, RewardConfig, StoreItemId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreItemConfig {
    pub id: StoreItemId,
    /// Apple/Google/etc. product id, if this item is purchasable via IAP.
    #[serde(default)]
    pub product_id: Option<String>,
    pub reward: RewardConfig,
    #[serde(default)]
    pub cost_currencies: HashMap<String, i64>,
    #[serde(default)]
    pub cost_items: HashMap<ItemDefId, i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DonationConfig {
    pub id: String,
    pub duration_sec: i64,
    pub max_count: i64,
    pub user_contribution_max_count: i64,
    pub cost_currencies: HashMap<String, i64>,
    pub contributor_reward: RewardConfig,
    pub recipient_reward: RewardConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub id: String,
    pub reward: RewardConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EconomyConfig {
    #[serde(default)]
    pub reward_configs: HashMap<String, RewardConfig>,
    #[serde(default)]
    pub store_items: HashMap<StoreItemId, StoreItemConfig>,
    #[serde(default)]
    pub donations: HashMap<String, DonationConfig>,
    #[serde(default)]
    pub placements: HashMap<String, PlacementConfig>,
}
