//! Process-wide registry assembling every gameplay subsystem behind typed,
//! lazily-resolved handles (`spec.md` §4.1).
//!
//! `PamlogixRegistryBuilder` registers one boxed system per `SystemType` tag
//! and `build()` wires every registered system's `set_pamlogix` back to the
//! finished registry — the same ordering-independence the teacher's
//! `construct_runtime!` gives pallets: no subsystem crate depends on any
//! other subsystem crate directly, only on `pamlogix-core`'s minimal
//! cross-call traits, resolved here after every system has been
//! constructed.

use pamlogix_auctions::AuctionsEngine;
use pamlogix_core::{EconomyApi, EnergyApi, InventoryApi, Pamlogix, PamlogixSystem, StatsApi, SystemType};
use pamlogix_economy::EconomyEngine;
use pamlogix_energy::EnergyEngine;
use pamlogix_inventory::InventoryEngine;
use pamlogix_progression::ProgressionEngine;
use pamlogix_social::{IncentivesEngine, StatsEngine, TeamsEngine};
use pamlogix_streaks::StreaksEngine;
use pamlogix_unlockables::UnlockablesEngine;
use std::sync::Arc;

/// The fully assembled registry. Every field is a concrete, typed handle
/// (`spec.md` §4.1 "each subsystem registers a typed handle retrievable by
/// peers") rather than a `Box<dyn Any>` + downcast — callers that already
/// know which subsystem they want get its full public surface back, not
/// just the narrow cross-call trait `pamlogix-core` defines.
pub struct PamlogixRegistry {
    economy: Option<Arc<EconomyEngine>>,
    inventory: Option<Arc<InventoryEngine>>,
    energy: Option<Arc<EnergyEngine>>,
    auctions: Option<Arc<AuctionsEngine>>,
    streaks: Option<Arc<StreaksEngine>>,
    progression: Option<Arc<ProgressionEngine>>,
    unlockables: Option<Arc<UnlockablesEngine>>,
    stats: Option<Arc<StatsEngine>>,
    teams: Option<Arc<TeamsEngine>>,
    incentives: Option<Arc<IncentivesEngine>>,
}

impl PamlogixRegistry {
    pub fn builder() -> PamlogixRegistryBuilder {
        PamlogixRegistryBuilder::default()
    }

    pub fn economy(&self) -> Option<Arc<EconomyEngine>> {
        self.economy.clone()
    }
    pub fn inventory(&self) -> Option<Arc<InventoryEngine>> {
        self.inventory.clone()
    }
    pub fn energy(&self) -> Option<Arc<EnergyEngine>> {
        self.energy.clone()
    }
    pub fn auctions(&self) -> Option<Arc<AuctionsEngine>> {
        self.auctions.clone()
    }
    pub fn streaks(&self) -> Option<Arc<StreaksEngine>> {
        self.streaks.clone()
    }
    pub fn progression(&self) -> Option<Arc<ProgressionEngine>> {
        self.progression.clone()
    }
    pub fn unlockables(&self) -> Option<Arc<UnlockablesEngine>> {
        self.unlockables.clone()
    }
    pub fn stats(&self) -> Option<Arc<StatsEngine>> {
        self.stats.clone()
    }
    pub fn teams(&self) -> Option<Arc<TeamsEngine>> {
        self.teams.clone()
    }
    pub fn incentives(&self) -> Option<Arc<IncentivesEngine>> {
        self.incentives.clone()
    }

    /// The set of `SystemType`s actually present in this build, for
    /// diagnostics/health endpoints.
    pub fn registered_types(&self) -> Vec<SystemType> {
        let mut types = Vec::new();
        if self.economy.is_some() {
            types.push(SystemType::Economy);
        }
        if self.inventory.is_some() {
            types.push(SystemType::Inventory);
        }
        if self.energy.is_some() {
            types.push(SystemType::Energy);
        }
        if self.auctions.is_some() {
            types.push(SystemType::Auctions);
        }
        if self.streaks.is_some() {
            types.push(SystemType::Streaks);
        }
        if self.progression.is_some() {
            types.push(SystemType::Progression);
        }
        if self.unlockables.is_some() {
            types.push(SystemType::Unlockables);
        }
        if self.stats.is_some() {
            types.push(SystemType::Stats);
        }
        if self.teams.is_some() {
            types.push(SystemType::Teams);
        }
        if self.incentives.is_some() {
            types.push(SystemType::Incentives);
        }
        types
    }
}

impl Pamlogix for PamlogixRegistry {
    fn get_economy(&self) -> Option<Arc<dyn EconomyApi>> {
        self.economy.clone().map(|e| e as Arc<dyn EconomyApi>)
    }

    fn get_inventory(&self) -> Option<Arc<dyn InventoryApi>> {
        self.inventory.clone().map(|e| e as Arc<dyn InventoryApi>)
    }

    fn get_energy(&self) -> Option<Arc<dyn EnergyApi>> {
        self.energy.clone().map(|e| e as Arc<dyn EnergyApi>)
    }

    fn get_stats(&self) -> Option<Arc<dyn StatsApi>> {
        self.stats.clone().map(|e| e as Arc<dyn StatsApi>)
    }
}

impl std::fmt::Debug for PamlogixRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PamlogixRegistry").field("registered", &self.registered_types()).finish()
    }
}

/// Subsystem set is fixed once `build()` runs (`spec.md` §4.1 "Registry is
/// constructed once at startup; subsystem set is fixed thereafter").
#[derive(Default)]
pub struct PamlogixRegistryBuilder {
    economy: Option<Arc<EconomyEngine>>,
    inventory: Option<Arc<InventoryEngine>>,
    energy: Option<Arc<EnergyEngine>>,
    auctions: Option<Arc<AuctionsEngine>>,
    streaks: Option<Arc<StreaksEngine>>,
    progression: Option<Arc<ProgressionEngine>>,
    unlockables: Option<Arc<UnlockablesEngine>>,
    stats: Option<Arc<StatsEngine>>,
    teams: Option<Arc<TeamsEngine>>,
    incentives: Option<Arc<IncentivesEngine>>,
}

impl PamlogixRegistryBuilder {
    pub fn with_economy(mut self, engine: Arc<EconomyEngine>) -> Self {
        self.economy = Some(engine);
        self
    }
    pub fn with_inventory(mut self, engine: Arc<InventoryEngine>) -> Self {
        self.inventory = Some(engine);
        self
    }
    pub fn with_energy(mut self, engine: Arc<EnergyEngine>) -> Self {
        self.energy = Some(engine);
        self
    }
    pub fn with_auctions(mut self, engine: Arc<AuctionsEngine>) -> Self {
        self.auctions = Some(engine);
        self
    }
    pub fn with_streaks(mut self, engine: Arc<StreaksEngine>) -> Self {
        self.streaks = Some(engine);
        self
    }
    pub fn with_progression(mut self, engine: Arc<ProgressionEngine>) -> Self {
        self.progression = Some(engine);
        self
    }
    pub fn with_unlockables(mut self, engine: Arc<UnlockablesEngine>) -> Self {
        self.unlockables = Some(engine);
        self
    }
    pub fn with_stats(mut self, engine: Arc<StatsEngine>) -> Self {
        self.stats = Some(engine);
        self
    }
    pub fn with_teams(mut self, engine: Arc<TeamsEngine>) -> Self {
        self.teams = Some(engine);
        self
    }
    pub fn with_incentives(mut self, engine: Arc<IncentivesEngine>) -> Self {
        self.incentives = Some(engine);
        self
    }

    /// Assemble the registry and resolve every registered system's
    /// cross-subsystem reference back to it (`spec.md` §4.1 "Cross-
    /// subsystem references are resolved lazily through the registry to
    /// avoid initialization cycles").
    pub fn build(self) -> Arc<PamlogixRegistry> {
        let registry = Arc::new(PamlogixRegistry {
            economy: self.economy,
            inventory: self.inventory,
            energy: self.energy,
            auctions: self.auctions,
            streaks: self.streaks,
            progression: self.progression,
            unlockables: self.unlockables,
            stats: self.stats,
            teams: self.teams,
            incentives: self.incentives,
        });
        let handle: Arc<dyn Pamlogix> = registry.clone();

        if let Some(e) = &registry.economy {
            e.set_pamlogix(handle.clone());
        }
        if let Some(e) = &registry.inventory {
            e.set_pamlogix(handle.clone());
        }
        if let Some(e) = &registry.energy {
            e.set_pamlogix(handle.clone());
        }
        if let Some(e) = &registry.auctions {
            e.set_pamlogix(handle.clone());
        }
        if let Some(e) = &registry.streaks {
            e.set_pamlogix(handle.clone());
        }
        if let Some(e) = &registry.progression {
            e.set_pamlogix(handle.clone());
        }
        if let Some(e) = &registry.unlockables {
            e.set_pamlogix(handle.clone());
        }
        if let Some(e) = &registry.stats {
            e.set_pamlogix(handle.clone());
        }
        if let Some(e) = &registry.teams {
            e.set_pamlogix(handle.clone());
        }
        if let Some(e) = &registry.incentives {
            e.set_pamlogix(handle.clone());
        }

        registry
    }
}

#[cfg(test)]
mod tests;
