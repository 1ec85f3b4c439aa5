//! Per-user persisted inventory blob (`spec.md` §6 storage layout:
//! `inventory` → `user_items`).
//!
//! Kept distinct from `pamlogix_core::UserInventory` (which only models the
//! shape described in `spec.md` §3) because the engine also needs a
//! monotonic instance-id sequence so freshly granted instances get a stable,
//! collision-free id without reaching for a UUID crate the teacher's
//! workspace never pulled in — the same reason the auctions engine derives
//! its `version` token from a counter rather than external randomness.

use pamlogix_core::InventoryItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryState {
    #[serde(default)]
    pub items: Vec<InventoryItem>,
    #[serde(default)]
    pub next_instance_seq: u64,
}

impl InventoryState {
    pub fn next_instance_id(&mut self, item_id: &pamlogix_core::ItemDefId) -> pamlogix_core::InstanceId {
        let seq = self.next_instance_seq;
        self.next_instance_seq += 1;
        pamlogix_core::InstanceId::from(format!("{}:{}", item_id.0, seq))
    }
}
