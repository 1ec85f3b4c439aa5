//! Persisted per-user/per-entity data model (`spec.md` §3). Shared here
//! (rather than split one-struct-per-crate) because several subsystems read
//! or embed each other's entity shapes — e.g. auctions embed `RewardItem`s,
//! unlockables and streaks both embed `Reward`.

use crate::ids::{
    AuctionId, IncentiveId, InstanceId, ItemDefId, ProgressionNodeId, StreakId, UnixSeconds,
    UnlockableId, UnlockableInstanceId, UserId,
};
use crate::reward::{EnergyModifierKind, GrantedEnergyModifier, GrantedModifier, Reward};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------
// Inventory (spec.md §3 "InventoryItem", §4.3)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: ItemDefId,
    pub instance_id: InstanceId,
    pub count: i64,
    pub stackable: bool,
    #[serde(default)]
    pub string_properties: HashMap<String, String>,
    #[serde(default)]
    pub numeric_properties: HashMap<String, f64>,
    pub create_time_sec: UnixSeconds,
    pub update_time_sec: UnixSeconds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInventory {
    pub items: Vec<InventoryItem>,
}

// ---------------------------------------------------------------------
// Energy (spec.md §3 "Energy bucket", §4.4)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEnergyModifier {
    pub energy_id: String,
    pub kind: EnergyModifierKind,
    pub value: f64,
    pub start_time_sec: UnixSeconds,
    pub expire_time_sec: UnixSeconds,
}

impl From<GrantedEnergyModifier> for ActiveEnergyModifier {
    fn from(g: GrantedEnergyModifier) -> Self {
        Self {
            energy_id: g.energy_id,
            kind: g.kind,
            value: g.value,
            start_time_sec: g.start_time_sec,
            expire_time_sec: g.expire_time_sec,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyBucket {
    pub energy_id: String,
    pub current: i64,
    pub max: i64,
    pub max_overfill: i64,
    pub refill_amount: i64,
    pub refill_period_sec: i64,
    pub start_refill_time_sec: UnixSeconds,
    pub next_refill_time_sec: UnixSeconds,
    pub max_refill_time_sec: UnixSeconds,
    #[serde(default)]
    pub modifiers: Vec<ActiveEnergyModifier>,
    #[serde(default)]
    pub last_reset_time_sec: UnixSeconds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserEnergies {
    pub buckets: HashMap<String, EnergyBucket>,
}

// ---------------------------------------------------------------------
// Auctions (spec.md §3 "Auction", §4.5)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub bidder_id: UserId,
    pub currencies: HashMap<String, i64>,
    pub bid_time_sec: UnixSeconds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuctionStateFlags {
    pub has_started: bool,
    pub has_ended: bool,
    pub can_bid: bool,
    pub can_claim: bool,
    pub can_cancel: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub template_id: String,
    pub creator_user_id: UserId,
    pub reward_items: Vec<crate::reward::RewardItem>,
    #[serde(default)]
    pub bid: Option<Bid>,
    #[serde(default)]
    pub bid_first: Option<Bid>,
    #[serde(default)]
    pub bid_history: Vec<Bid>,
    pub bid_next: HashMap<String, i64>,
    pub version: String,
    pub start_time_sec: UnixSeconds,
    pub end_time_sec: UnixSeconds,
    pub original_end_time_sec: UnixSeconds,
    pub extension_threshold_sec: i64,
    pub extension_sec: i64,
    pub extension_max_sec: i64,
    pub extension_remaining_sec: i64,
    pub extension_added_sec: i64,
    pub create_time_sec: UnixSeconds,
    #[serde(default)]
    pub cancel_time_sec: UnixSeconds,
    #[serde(default)]
    pub winner_claim_sec: UnixSeconds,
    #[serde(default)]
    pub owner_claim_sec: UnixSeconds,
    pub fee_percentage: f64,
    pub fee_fixed: HashMap<String, i64>,
    #[serde(default)]
    pub state: AuctionStateFlags,
}

// ---------------------------------------------------------------------
// Streaks (spec.md §3 "Streak", §4.6)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    pub id: StreakId,
    pub count: i64,
    pub count_current_reset: i64,
    pub claim_count: i64,
    pub create_time_sec: UnixSeconds,
    pub update_time_sec: UnixSeconds,
    #[serde(default)]
    pub claim_time_sec: UnixSeconds,
    #[serde(default)]
    pub claimed_rewards: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStreaks {
    pub streaks: HashMap<String, Streak>,
}

// ---------------------------------------------------------------------
// Progression (spec.md §3 "Progression", §4.7)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressionNodeState {
    pub id: ProgressionNodeId,
    #[serde(default)]
    pub counts: HashMap<String, i64>,
    #[serde(default)]
    pub cost_paid: bool,
    #[serde(default)]
    pub completed: bool,
    pub create_time_sec: UnixSeconds,
    pub update_time_sec: UnixSeconds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProgression {
    pub nodes: HashMap<String, ProgressionNodeState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressionDeltaKind {
    Unlocked,
    Locked,
    Changed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionDelta {
    pub node_id: ProgressionNodeId,
    pub kind: ProgressionDeltaKind,
    pub count_diffs: HashMap<String, i64>,
}

// ---------------------------------------------------------------------
// Unlockables (spec.md §3 "Unlockable instance"/"Unlockables list", §4.8)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnlockableInstance {
    pub id: UnlockableId,
    pub instance_id: UnlockableInstanceId,
    pub wait_time_sec: i64,
    #[serde(default)]
    pub unlock_start_time_sec: UnixSeconds,
    #[serde(default)]
    pub unlock_complete_time_sec: UnixSeconds,
    #[serde(default)]
    pub advance_time_sec: i64,
    #[serde(default)]
    pub can_claim: bool,
    pub start_cost: HashMap<String, i64>,
    pub cost: HashMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnlockablesList {
    pub items: Vec<UnlockableInstance>,
    pub queued: Vec<UnlockableInstanceId>,
    pub slots: u32,
    pub active_slots: u32,
    pub max_active_slots: u32,
    pub slot_cost: HashMap<String, i64>,
    pub max_queued_unlocks: u32,
}

// ---------------------------------------------------------------------
// Incentives (spec.md §3 "Incentive", §4.9)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncentiveType {
    Gift,
    Invite,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Incentive {
    pub code: String,
    pub id: IncentiveId,
    pub creator_user_id: UserId,
    /// The catalogue config id this code was created from, needed to look
    /// back up its `max_global_claims`/`max_recipient_age_sec` bounds
    /// without relying on `incentive_type` as a lookup key (two configs may
    /// share a type).
    #[serde(default)]
    pub config_id: String,
    pub incentive_type: Option<IncentiveType>,
    pub expiry_time_sec: UnixSeconds,
    pub max_claims: u32,
    #[serde(default)]
    pub claims: HashMap<String, UnixSeconds>,
    #[serde(default)]
    pub unclaimed_recipients: Vec<UserId>,
    pub sender_reward: Option<Reward>,
    pub recipient_reward: Option<Reward>,
}

impl Default for IncentiveType {
    fn default() -> Self {
        IncentiveType::Gift
    }
}

// ---------------------------------------------------------------------
// Stats (spec.md §4.9 "Stats")
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatOperator {
    Set,
    Delta,
    Min,
    Max,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub count: i64,
    pub total: i64,
    pub min: i64,
    pub max: i64,
    pub first: i64,
    pub last: i64,
    pub update_time_sec: UnixSeconds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub stats: HashMap<String, Stat>,
}
