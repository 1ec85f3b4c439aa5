//! Item-definition catalogue (`spec.md` §4.3).

use pamlogix_core::{ItemDefId, RewardConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemDefId,
    pub name: String,
    pub category: String,
    pub stackable: bool,
    /// `0` means unlimited.
    #[serde(default)]
    pub max_count: i64,
    #[serde(default)]
    pub string_properties: HashMap<String, String>,
    #[serde(default)]
    pub numeric_properties: HashMap<String, f64>,
    /// Reward rolled (via the economy engine) when an instance of this def is
    /// consumed (spec.md §4.3 "If the def has a consume-reward config...").
    #[serde(default)]
    pub consume_reward: Option<RewardConfig>,
    /// If false, a drained (count==0) stackable instance is deleted rather
    /// than kept at zero (spec.md §4.3 "keep_zero").
    #[serde(default)]
    pub keep_zero: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryConfig {
    pub items: HashMap<ItemDefId, ItemDef>,
    /// Per-category cap on total item count across all defs in that
    /// category. `0` means unlimited.
    #[serde(default)]
    pub category_limits: HashMap<String, i64>,
    /// Named item sets used for per-set caps (spec.md §9 "Item-set limit
    /// enforcement when an item belongs to multiple sets"). Each set also
    /// carries its own cap.
    #[serde(default)]
    pub item_sets: HashMap<String, ItemSetConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemSetConfig {
    pub item_ids: Vec<ItemDefId>,
    /// `0` means unlimited.
    #[serde(default)]
    pub max_count: i64,
}

impl InventoryConfig {
    pub fn sets_containing<'a>(&'a self, item_id: &'a ItemDefId) -> impl Iterator<Item = (&'a String, &'a ItemSetConfig)> {
        self.item_sets.iter().filter(move |(_, set)| set.item_ids.contains(item_id))
    }
}
