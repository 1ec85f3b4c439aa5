//! Cross-subsystem call surface (`spec.md` §4.1, §9 "Cross-subsystem coupling
//! via registry").
//!
//! Economy is a sink for roll/grant calls from nearly every other subsystem,
//! and Economy itself must call back into Inventory (item grants) and Energy
//! (energy grants) to finish a grant. A direct crate dependency either way
//! would cycle, so only the *minimal* methods other subsystems actually need
//! to call live here, in `pamlogix-core`, which nothing subsystem-shaped
//! depends on. Each subsystem crate additionally exposes a much larger public
//! trait of its own (`EconomySystem`, `InventorySystem`, ...) that the
//! `registry` crate wires up directly — those full traits are not part of
//! this cycle-breaking surface.
//!
//! This plays the role `GetEconomySystem()`-style registry accessors play in
//! the distilled spec: a capability lookup that returns `None` when the
//! system was never registered, and callers are expected to degrade
//! gracefully (spec.md §9: "auctions refuse bids if Economy absent").

use crate::error::PamlogixError;
use crate::ids::{InstanceId, ItemDefId, UserId};
use crate::reward::{GrantedEnergyModifier, InventoryItem, Reward};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Result of routing a `Reward`'s item deltas through the inventory engine's
/// limits (spec.md §4.2 "Items that could not be granted under limits are
/// reported via `notGranted`").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryGrantOutcome {
    pub new_items: Vec<InventoryItem>,
    pub updated_items: Vec<InventoryItem>,
    pub not_granted: HashMap<ItemDefId, i64>,
}

/// Result of a consume-items call, grouped per def (and per instance when the
/// caller consumed by instance id) so the economy consume-reward hook can
/// attribute rolled rewards correctly (spec.md §4.3 "results are grouped per
/// def (and separately per instance...)").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumeOutcome {
    pub consumed_by_def: HashMap<ItemDefId, i64>,
    pub consumed_by_instance: HashMap<InstanceId, i64>,
    pub rewards: Vec<Reward>,
}

/// The full result of a `RewardGrant` (spec.md §4.2): new/updated inventory
/// instances plus whatever could not be granted under limits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardGrantOutcome {
    pub new_items: Vec<InventoryItem>,
    pub updated_items: Vec<InventoryItem>,
    pub not_granted: Reward,
}

#[async_trait]
pub trait EconomyApi: Send + Sync {
    async fn reward_roll(
        &self,
        user_id: &UserId,
        config: &crate::reward::RewardConfig,
    ) -> Result<Reward, PamlogixError>;

    async fn reward_grant(
        &self,
        user_id: &UserId,
        reward: Reward,
        metadata: HashMap<String, String>,
        ignore_limits: bool,
    ) -> Result<RewardGrantOutcome, PamlogixError>;
}

#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn grant_items(
        &self,
        user_id: &UserId,
        items: &[crate::reward::RewardItem],
        ignore_limits: bool,
    ) -> Result<InventoryGrantOutcome, PamlogixError>;

    async fn consume_items(
        &self,
        user_id: &UserId,
        by_def: &HashMap<ItemDefId, i64>,
        by_instance: &HashMap<InstanceId, i64>,
        over_consume: bool,
    ) -> Result<ConsumeOutcome, PamlogixError>;

    /// Current held count per def, read-only (progression's `items_min/max`
    /// preconditions, §4.7, need this without going through a consume/grant
    /// call).
    async fn item_counts(
        &self,
        user_id: &UserId,
        item_ids: &[ItemDefId],
    ) -> Result<HashMap<ItemDefId, i64>, PamlogixError>;
}

#[async_trait]
pub trait EnergyApi: Send + Sync {
    /// `modifiers` are already-rolled grants (value and expiry sampled by the
    /// caller's roll step) rather than unrolled `EnergyModifierRange`
    /// configs — the energy engine only ever stores and applies concrete
    /// modifier instances, it never samples them itself.
    async fn grant(
        &self,
        user_id: &UserId,
        amounts: &HashMap<String, i64>,
        modifiers: &[GrantedEnergyModifier],
    ) -> Result<(), PamlogixError>;

    async fn spend(&self, user_id: &UserId, amounts: &HashMap<String, i64>) -> Result<(), PamlogixError>;

    /// Current `current` amount per bucket, after running the refill pass
    /// (progression's `energy_min/max` preconditions, §4.7).
    async fn get_all(&self, user_id: &UserId) -> Result<HashMap<String, i64>, PamlogixError>;
}

/// Read-only stat snapshot (progression's `stats_min/max` preconditions,
/// §4.7; teams' membership checks never need this, only the counters
/// subsystem itself does).
#[async_trait]
pub trait StatsApi: Send + Sync {
    async fn get_all(&self, user_id: &UserId) -> Result<HashMap<String, i64>, PamlogixError>;
}

/// The registry's view from a subsystem's perspective: capability lookup by
/// tag, resolved lazily after every system has been constructed (spec.md
/// §4.1 "Cross-subsystem references are resolved lazily through the registry
/// to avoid initialization cycles").
pub trait Pamlogix: Send + Sync {
    fn get_economy(&self) -> Option<Arc<dyn EconomyApi>>;
    fn get_inventory(&self) -> Option<Arc<dyn InventoryApi>>;
    fn get_energy(&self) -> Option<Arc<dyn EnergyApi>>;
    fn get_stats(&self) -> Option<Arc<dyn StatsApi>>;
}

/// Every subsystem's minimal registry footprint (spec.md §4.1 "Each subsystem
/// exposes `{GetType, GetConfig, SetPamlogix}`"). `GetConfig` is deliberately
/// not part of this trait: its return type differs per subsystem, so each
/// crate exposes it as an inherent method on its own engine type instead of
/// forcing a trait-object-unfriendly generic here.
pub trait PamlogixSystem: Send + Sync {
    fn system_type(&self) -> crate::system::SystemType;
    fn set_pamlogix(&self, registry: Arc<dyn Pamlogix>);
}
