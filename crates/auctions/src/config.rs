//! Declarative auction template catalogue (`spec.md` §4.5).

use pamlogix_core::ItemDefId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingCost {
    #[serde(default)]
    pub currencies: HashMap<String, i64>,
    #[serde(default)]
    pub energies: HashMap<String, i64>,
    #[serde(default)]
    pub items: HashMap<ItemDefId, i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeConfig {
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub fixed: HashMap<String, i64>,
}

/// `spec.md` §4.5 step 6: `max(percentage * bid, fixed)` per currency,
/// defaulting to `max(bid/10, 1)` if neither configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BidIncrementConfig {
    #[serde(default)]
    pub percentage: HashMap<String, f64>,
    #[serde(default)]
    pub fixed: HashMap<String, i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuctionTemplate {
    pub id: String,
    #[serde(default)]
    pub allowed_item_ids: Vec<ItemDefId>,
    #[serde(default)]
    pub allowed_item_sets: Vec<String>,
    pub bid_history_count: usize,
    #[serde(default)]
    pub listing_cost: ListingCost,
    #[serde(default)]
    pub fee: FeeConfig,
    pub duration_sec: i64,
    #[serde(default)]
    pub extension_threshold_sec: i64,
    #[serde(default)]
    pub extension_sec: i64,
    #[serde(default)]
    pub extension_max_sec: i64,
    /// The floor the very first bid must meet, per currency (`spec.md` §8
    /// scenario 1: `bid_start={gold:10}`). Seeds `Auction::bid_next` at
    /// `create`; currencies absent here have no minimum until the first bid.
    #[serde(default)]
    pub bid_start: HashMap<String, i64>,
    #[serde(default)]
    pub bid_increment: BidIncrementConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuctionsConfig {
    #[serde(default)]
    pub templates: HashMap<String, AuctionTemplate>,
}
