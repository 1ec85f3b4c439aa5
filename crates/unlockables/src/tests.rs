use crate::config::{UnlockableDefConfig, UnlockablesConfig};
use crate::engine::{UnlockablesEngine, UnlockablesSystem};
use pamlogix_core::{EconomyApi, EnergyApi, InventoryApi, Pamlogix, PamlogixSystem, StatsApi, UserId};
use pamlogix_economy::{EconomyConfig, EconomyEngine};
use pamlogix_host::mock::InMemoryHost;
use std::collections::HashMap;
use std::sync::Arc;

struct TestRegistry {
    economy: Arc<EconomyEngine>,
}

impl Pamlogix for TestRegistry {
    fn get_economy(&self) -> Option<Arc<dyn EconomyApi>> {
        Some(self.economy.clone())
    }
    fn get_inventory(&self) -> Option<Arc<dyn InventoryApi>> {
        None
    }
    fn get_energy(&self) -> Option<Arc<dyn EnergyApi>> {
        None
    }
    fn get_stats(&self) -> Option<Arc<dyn StatsApi>> {
        None
    }
}

fn test_engine(config: UnlockablesConfig) -> (Arc<UnlockablesEngine>, Arc<InMemoryHost>) {
    let host = Arc::new(InMemoryHost::new());
    let engine = UnlockablesEngine::new(host.clone(), config);
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());
    let registry: Arc<dyn Pamlogix> = Arc::new(TestRegistry { economy: economy.clone() });
    engine.set_pamlogix(registry.clone());
    economy.set_pamlogix(registry);
    (engine, host)
}

fn three_slot_config() -> UnlockablesConfig {
    let mut defs = HashMap::new();
    for id in ["a", "b", "c"] {
        defs.insert(id.into(), UnlockableDefConfig { id: id.into(), wait_time_sec: 100, ..Default::default() });
    }
    UnlockablesConfig { defs, slots: 3, active_slots: 2, max_active_slots: 4, max_queued_unlocks: 3, ..Default::default() }
}

/// `spec.md` §8 scenario 6.
#[tokio::test]
async fn queue_auto_starts_on_claim() {
    let (engine, host) = test_engine(three_slot_config());
    host.set_now(1_000);
    let user = UserId::from("u1");

    let a = engine.create(&user, Some("a"), None).await.unwrap();
    let b = engine.create(&user, Some("b"), None).await.unwrap();
    let c = engine.create(&user, Some("c"), None).await.unwrap();

    engine.unlock_start(&user, a.instance_id.as_str()).await.unwrap();
    engine.unlock_start(&user, b.instance_id.as_str()).await.unwrap();
    let c_started = engine.unlock_start(&user, c.instance_id.as_str()).await.unwrap();
    assert_eq!(c_started.unlock_start_time_sec, 0);

    let list = engine.get(&user).await.unwrap();
    assert_eq!(list.queued.len(), 1);
    assert_eq!(list.queued[0].as_str(), c.instance_id.as_str());

    host.advance(100);
    engine.claim(&user, a.instance_id.as_str()).await.unwrap();

    let list = engine.get(&user).await.unwrap();
    assert!(list.queued.is_empty());
    let c_item = list.items.iter().find(|i| i.instance_id.as_str() == c.instance_id.as_str()).unwrap();
    assert!(c_item.unlock_start_time_sec > 0);
    let occupied = list.items.iter().filter(|i| i.unlock_start_time_sec > 0).count();
    assert_eq!(occupied, 2);
}

#[tokio::test]
async fn create_rejects_when_slots_full() {
    let mut config = three_slot_config();
    config.slots = 1;
    let (engine, host) = test_engine(config);
    host.set_now(1_000);
    let user = UserId::from("u1");

    engine.create(&user, Some("a"), None).await.unwrap();
    let err = engine.create(&user, Some("b"), None).await.unwrap_err();
    assert_eq!(err.sentinel, "UnlockableSlotsFull");
}

#[tokio::test]
async fn unlock_advance_plus_elapsed_time_flips_can_claim() {
    let (engine, host) = test_engine(three_slot_config());
    host.set_now(1_000);
    let user = UserId::from("u1");
    let a = engine.create(&user, Some("a"), None).await.unwrap();
    engine.unlock_start(&user, a.instance_id.as_str()).await.unwrap();

    host.advance(40);
    engine.unlock_advance(&user, a.instance_id.as_str(), 60).await.unwrap();

    let list = engine.get(&user).await.unwrap();
    let item = list.items.iter().find(|i| i.instance_id.as_str() == a.instance_id.as_str()).unwrap();
    assert!(item.can_claim);
}

#[tokio::test]
async fn purchase_unlock_prorates_cost_by_remaining_time() {
    let mut config = three_slot_config();
    let mut cost = HashMap::new();
    cost.insert("gold".to_string(), 100);
    config.defs.get_mut(&pamlogix_core::UnlockableId::from("a")).unwrap().cost = cost;
    let (engine, host) = test_engine(config);
    host.set_now(1_000);
    let user = UserId::from("u1");
    host.seed_wallet(&user, "gold", 1000);

    let a = engine.create(&user, Some("a"), None).await.unwrap();
    engine.unlock_start(&user, a.instance_id.as_str()).await.unwrap();
    host.advance(50); // half of wait_time_sec=100 elapsed, 50 remaining.

    let item = engine.purchase_unlock(&user, a.instance_id.as_str()).await.unwrap();
    assert!(item.can_claim);
    // Cost prorated to 100 * 50/100 = 50, not the full 100.
    assert_eq!(host.wallet_balance(&user, "gold"), 950);
}

#[tokio::test]
async fn claim_before_claimable_errors() {
    let (engine, host) = test_engine(three_slot_config());
    host.set_now(1_000);
    let user = UserId::from("u1");
    let a = engine.create(&user, Some("a"), None).await.unwrap();
    engine.unlock_start(&user, a.instance_id.as_str()).await.unwrap();

    let err = engine.claim(&user, a.instance_id.as_str()).await.unwrap_err();
    assert_eq!(err.sentinel, "UnlockableNotClaimable");
}

#[tokio::test]
async fn random_create_without_probability_weights_errors() {
    let (engine, host) = test_engine(three_slot_config());
    host.set_now(1_000);
    let user = UserId::from("u1");
    let err = engine.create(&user, None, None).await.unwrap_err();
    assert_eq!(err.sentinel, "UnlockableNoProbabilityWeights");
}

#[tokio::test]
async fn random_create_picks_a_weighted_def() {
    let mut config = three_slot_config();
    config.defs.get_mut(&pamlogix_core::UnlockableId::from("a")).unwrap().probability = 1.0;
    let (engine, host) = test_engine(config);
    host.set_now(1_000);
    let user = UserId::from("u1");
    let instance = engine.create(&user, None, None).await.unwrap();
    assert_eq!(instance.id.as_str(), "a");
}

#[tokio::test]
async fn purchase_slot_raises_active_slots_up_to_max() {
    let (engine, host) = test_engine(three_slot_config());
    host.set_now(1_000);
    let user = UserId::from("u1");

    let list = engine.purchase_slot(&user).await.unwrap();
    assert_eq!(list.active_slots, 3);
}
