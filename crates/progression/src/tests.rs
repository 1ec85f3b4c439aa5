use crate::config::{PreconditionLeaf, PreconditionNode, PreconditionOperator, ProgressionConfig, ProgressionCost, ProgressionNodeConfig};
use crate::engine::{ProgressionEngine, ProgressionSystem};
use crate::state::ProgressionKnownState;
use pamlogix_core::{
    EconomyApi, EnergyApi, InventoryApi, Pamlogix, PamlogixSystem, ProgressionDeltaKind, StatsApi, UserId,
};
use pamlogix_economy::{EconomyConfig, EconomyEngine};
use pamlogix_inventory::{InventoryConfig, InventoryEngine, ItemDef};
use pamlogix_host::mock::InMemoryHost;
use std::collections::HashMap;
use std::sync::Arc;

struct TestRegistry {
    economy: Option<Arc<EconomyEngine>>,
    inventory: Option<Arc<InventoryEngine>>,
}

impl Pamlogix for TestRegistry {
    fn get_economy(&self) -> Option<Arc<dyn EconomyApi>> {
        self.economy.clone().map(|e| e as Arc<dyn EconomyApi>)
    }
    fn get_inventory(&self) -> Option<Arc<dyn InventoryApi>> {
        self.inventory.clone().map(|e| e as Arc<dyn InventoryApi>)
    }
    fn get_energy(&self) -> Option<Arc<dyn EnergyApi>> {
        None
    }
    fn get_stats(&self) -> Option<Arc<dyn StatsApi>> {
        None
    }
}

fn test_engine(nodes: HashMap<String, ProgressionNodeConfig>) -> (Arc<ProgressionEngine>, Arc<InMemoryHost>, Arc<InventoryEngine>) {
    let host = Arc::new(InMemoryHost::new());
    let engine = ProgressionEngine::new(host.clone(), ProgressionConfig { nodes });

    let mut items = HashMap::new();
    items.insert("key".into(), ItemDef { id: "key".into(), name: "Key".into(), category: "misc".into(), stackable: true, ..Default::default() });
    let inventory = InventoryEngine::new(host.clone(), InventoryConfig { items, ..Default::default() });
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());

    let registry: Arc<dyn Pamlogix> =
        Arc::new(TestRegistry { economy: Some(economy.clone()), inventory: Some(inventory.clone()) });
    engine.set_pamlogix(registry.clone());
    inventory.set_pamlogix(registry.clone());
    economy.set_pamlogix(registry);
    (engine, host, inventory)
}

fn leaf(leaf: PreconditionLeaf) -> PreconditionNode {
    PreconditionNode { operator: PreconditionOperator::And, leaf: Some(leaf), children: Vec::new() }
}

#[tokio::test]
async fn and_node_requires_every_predicate() {
    let mut nodes = HashMap::new();
    let mut currency_min = HashMap::new();
    currency_min.insert("gold".to_string(), 100);
    let mut stats_min = HashMap::new();
    stats_min.insert("level".to_string(), 5);
    nodes.insert(
        "tier1".to_string(),
        ProgressionNodeConfig {
            preconditions: leaf(PreconditionLeaf { currency_min, stats_min, ..Default::default() }),
            ..Default::default()
        },
    );
    let (engine, host, _inventory) = test_engine(nodes);
    host.set_now(1_000);
    let user = UserId::from("u1");
    host.seed_wallet(&user, "gold", 50);

    let (views, _deltas) = engine.get(&user, &HashMap::new()).await.unwrap();
    assert!(!views["tier1"].unlocked);
}

/// `spec.md` §8 scenario 5: node unlocked by `(gold>=100 AND level>=5) OR
/// item:key>=1`.
#[tokio::test]
async fn or_node_unlocks_via_item_branch_after_grant() {
    let mut nodes = HashMap::new();
    let mut currency_min = HashMap::new();
    currency_min.insert("gold".to_string(), 100);
    let mut stats_min = HashMap::new();
    stats_min.insert("level".to_string(), 5);
    let and_branch = leaf(PreconditionLeaf { currency_min, stats_min, ..Default::default() });

    let mut items_min = HashMap::new();
    items_min.insert("key".into(), 1);
    let or_branch = leaf(PreconditionLeaf { items_min, ..Default::default() });

    nodes.insert(
        "vault".to_string(),
        ProgressionNodeConfig {
            preconditions: PreconditionNode { operator: PreconditionOperator::Or, leaf: None, children: vec![and_branch, or_branch] },
            ..Default::default()
        },
    );
    let (engine, host, inventory) = test_engine(nodes);
    host.set_now(1_000);
    let user = UserId::from("u1");
    host.seed_wallet(&user, "gold", 150);

    let mut last_known = HashMap::new();

    let (views, deltas) = engine.get(&user, &last_known).await.unwrap();
    assert!(!views["vault"].unlocked);
    assert!(deltas.is_empty());
    last_known.insert("vault".to_string(), ProgressionKnownState { unlocked: false, counts: HashMap::new() });

    inventory
        .grant_items(&user, &[pamlogix_core::RewardItem { item_id: "key".into(), count: 1, ..Default::default() }], false)
        .await
        .unwrap();

    let (views, deltas) = engine.get(&user, &last_known).await.unwrap();
    assert!(views["vault"].unlocked);
    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas[0].kind, ProgressionDeltaKind::Unlocked);
}

#[tokio::test]
async fn xor_node_is_odd_parity_over_leaf_and_children() {
    let mut nodes = HashMap::new();
    let mut counts_min = HashMap::new();
    counts_min.insert("progress".to_string(), 1);
    let leaf_predicate = PreconditionLeaf { counts_min, ..Default::default() };
    let always_true = leaf(PreconditionLeaf::default());
    let mut never_min = HashMap::new();
    never_min.insert("never".to_string(), 1);
    let always_false = leaf(PreconditionLeaf { counts_min: never_min, ..Default::default() });

    nodes.insert(
        "xor_node".to_string(),
        ProgressionNodeConfig {
            preconditions: PreconditionNode {
                operator: PreconditionOperator::Xor,
                leaf: Some(leaf_predicate),
                children: vec![always_true, always_false],
            },
            ..Default::default()
        },
    );
    let (engine, host, _inventory) = test_engine(nodes);
    host.set_now(1_000);
    let user = UserId::from("u1");

    // leaf false, always_true true, always_false false => 1 true => odd => unlocked.
    let (views, _) = engine.get(&user, &HashMap::new()).await.unwrap();
    assert!(views["xor_node"].unlocked);

    // bump the leaf's own counter so leaf is also true: 2 true inputs => even => locked.
    engine.update(&user, "xor_node", &{
        let mut m = HashMap::new();
        m.insert("progress".to_string(), 1);
        m
    }).await.unwrap();
    let (views, _) = engine.get(&user, &HashMap::new()).await.unwrap();
    assert!(!views["xor_node"].unlocked);
}

#[tokio::test]
async fn purchase_deducts_cost_and_marks_paid() {
    let mut nodes = HashMap::new();
    let mut currencies = HashMap::new();
    currencies.insert("gold".to_string(), 50);
    let mut require_cost_paid_leaf = PreconditionLeaf::default();
    require_cost_paid_leaf.require_cost_paid = true;
    nodes.insert(
        "shop_unlock".to_string(),
        ProgressionNodeConfig {
            preconditions: leaf(require_cost_paid_leaf),
            cost: Some(ProgressionCost { currencies, items: HashMap::new() }),
            ..Default::default()
        },
    );
    let (engine, host, _inventory) = test_engine(nodes);
    host.set_now(1_000);
    let user = UserId::from("u1");
    host.seed_wallet(&user, "gold", 100);

    let view = engine.purchase(&user, "shop_unlock").await.unwrap();
    assert!(view.state.cost_paid);
    assert!(view.unlocked);
    assert_eq!(host.wallet_balance(&user, "gold"), 50);

    let err = engine.purchase(&user, "shop_unlock").await.unwrap_err();
    assert_eq!(err.sentinel, "ProgressionAlreadyUnlocked");
}

#[tokio::test]
async fn purchase_insufficient_currency_errors() {
    let mut nodes = HashMap::new();
    let mut currencies = HashMap::new();
    currencies.insert("gold".to_string(), 500);
    nodes.insert(
        "shop_unlock".to_string(),
        ProgressionNodeConfig {
            preconditions: leaf(PreconditionLeaf { require_cost_paid: true, ..Default::default() }),
            cost: Some(ProgressionCost { currencies, items: HashMap::new() }),
            ..Default::default()
        },
    );
    let (engine, host, _inventory) = test_engine(nodes);
    host.set_now(1_000);
    let user = UserId::from("u1");
    host.seed_wallet(&user, "gold", 10);

    let err = engine.purchase(&user, "shop_unlock").await.unwrap_err();
    assert_eq!(err.sentinel, "ProgressionInsufficientCurrency");
}

#[tokio::test]
async fn complete_requires_unlocked_node_and_grants_once() {
    let mut nodes = HashMap::new();
    nodes.insert(
        "finale".to_string(),
        ProgressionNodeConfig {
            preconditions: leaf(PreconditionLeaf::default()),
            reward: pamlogix_core::RewardConfig {
                guaranteed: Some(pamlogix_core::RewardBundle {
                    currencies: vec![pamlogix_core::CurrencyRange { currency_id: "gold".to_string(), range: pamlogix_core::AmountRange::exact(25) }],
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        },
    );
    let (engine, host, _inventory) = test_engine(nodes);
    host.set_now(1_000);
    let user = UserId::from("u1");

    let view = engine.complete(&user, "finale").await.unwrap();
    assert!(view.state.completed);
    assert_eq!(host.wallet_balance(&user, "gold"), 25);

    // Completing again is idempotent, no second grant.
    engine.complete(&user, "finale").await.unwrap();
    assert_eq!(host.wallet_balance(&user, "gold"), 25);
}

#[tokio::test]
async fn reset_clears_counts_and_cost_paid() {
    let mut nodes = HashMap::new();
    nodes.insert(
        "grindy".to_string(),
        ProgressionNodeConfig { preconditions: leaf(PreconditionLeaf::default()), ..Default::default() },
    );
    let (engine, host, _inventory) = test_engine(nodes);
    host.set_now(1_000);
    let user = UserId::from("u1");

    let mut counts = HashMap::new();
    counts.insert("kills".to_string(), 10);
    engine.update(&user, "grindy", &counts).await.unwrap();

    let result = engine.reset(&user, &["grindy".to_string()]).await.unwrap();
    assert_eq!(result["grindy"].state.counts.get("kills").copied().unwrap_or(0), 0);
    assert!(!result["grindy"].state.cost_paid);
}

#[tokio::test]
async fn unknown_node_errors() {
    let (engine, host, _inventory) = test_engine(HashMap::new());
    host.set_now(1_000);
    let user = UserId::from("u1");
    let err = engine.purchase(&user, "nope").await.unwrap_err();
    assert_eq!(err.sentinel, "ProgressionUnknownNode");
}
