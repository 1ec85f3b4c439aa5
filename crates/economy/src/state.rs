//! Per-user persisted economy state (`spec.md` §6 storage layout:
//! `purchase_intents`, `purchase_transactions`, plus donation/placement
//! bookkeeping that has no dedicated collection of its own in §6 and so rides
//! along in the per-user `economy` blob).

use pamlogix_core::{GrantedModifier, StoreItemId, TransactionId, UnixSeconds, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseIntent {
    pub user_id: UserId,
    pub item_id: StoreItemId,
    pub create_time_sec: UnixSeconds,
    #[serde(default)]
    pub consumed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseTransaction {
    pub transaction_id: TransactionId,
    pub item_id: StoreItemId,
    pub sandbox: bool,
    pub create_time_sec: UnixSeconds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationState {
    pub donation_id: String,
    pub count: i64,
    #[serde(default)]
    pub contributions: HashMap<String, i64>,
    #[serde(default)]
    pub claimed_by: Vec<UserId>,
    pub create_time_sec: UnixSeconds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementState {
    Started,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub reference_id: String,
    pub placement_id: String,
    pub state: PlacementState,
    pub start_time_sec: UnixSeconds,
}

/// Per-user economy blob (`economy` collection, `user_economy` key).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserEconomyState {
    #[serde(default)]
    pub transactions: Vec<PurchaseTransaction>,
    #[serde(default)]
    pub placements: HashMap<String, PlacementRecord>,
    /// Generic (non-energy) reward modifiers granted to the user, recorded
    /// with their expiry (`spec.md` §4.2 Granting: "record modifier grants
    /// with their expiry"). No other subsystem owns a modifier's runtime
    /// effect, so the economy engine is their system of record; callers
    /// needing the active set (e.g. a drop-rate multiplier) read it back via
    /// `EconomySystem::active_modifiers`.
    #[serde(default)]
    pub active_modifiers: Vec<GrantedModifier>,
}

impl UserEconomyState {
    pub fn has_transaction(&self, transaction_id: &TransactionId) -> bool {
        self.transactions.iter().any(|t| &t.transaction_id == transaction_id)
    }

    pub fn prune_expired_modifiers(&mut self, now: UnixSeconds) {
        self.active_modifiers.retain(|m| m.expire_time_sec > now);
    }
}
