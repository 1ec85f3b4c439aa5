use crate::config::{AuctionTemplate, AuctionsConfig, BidIncrementConfig, FeeConfig, ListingCost};
use crate::engine::{AuctionQuery, AuctionSort, AuctionsEngine, AuctionsSystem};
use pamlogix_core::{
    EconomyApi, EnergyApi, InventoryApi, ItemDefId, Pamlogix, PamlogixSystem, RewardItem, StatsApi, UserId,
};
use pamlogix_economy::{EconomyConfig, EconomyEngine};
use pamlogix_energy::{EnergyConfig, EnergyEngine};
use pamlogix_host::mock::InMemoryHost;
use pamlogix_inventory::{InventoryConfig, InventoryEngine, ItemDef};
use std::collections::HashMap;
use std::sync::Arc;

/// Minimal stand-in for the `pamlogix-registry` crate's wiring, enough to
/// exercise the cross-subsystem calls (`spec.md` §4.1) auctions makes for
/// listing costs, bid escrow, and claim payouts.
struct TestRegistry {
    economy: Arc<EconomyEngine>,
    inventory: Arc<InventoryEngine>,
    energy: Arc<EnergyEngine>,
}

impl Pamlogix for TestRegistry {
    fn get_economy(&self) -> Option<Arc<dyn EconomyApi>> {
        Some(self.economy.clone())
    }
    fn get_inventory(&self) -> Option<Arc<dyn InventoryApi>> {
        Some(self.inventory.clone())
    }
    fn get_energy(&self) -> Option<Arc<dyn EnergyApi>> {
        Some(self.energy.clone())
    }
    fn get_stats(&self) -> Option<Arc<dyn StatsApi>> {
        None
    }
}

fn template(id: &str) -> AuctionTemplate {
    AuctionTemplate {
        id: id.to_string(),
        allowed_item_ids: Vec::new(),
        allowed_item_sets: Vec::new(),
        bid_history_count: 3,
        listing_cost: ListingCost::default(),
        fee: FeeConfig { percentage: 0.1, fixed: HashMap::new() },
        duration_sec: 3600,
        extension_threshold_sec: 60,
        extension_sec: 30,
        extension_max_sec: 120,
        bid_start: HashMap::new(),
        bid_increment: BidIncrementConfig::default(),
    }
}

fn test_engine(templates: Vec<AuctionTemplate>) -> (Arc<AuctionsEngine>, Arc<InMemoryHost>) {
    let host = Arc::new(InMemoryHost::new());
    let templates = templates.into_iter().map(|t| (t.id.clone(), t)).collect();
    let engine = AuctionsEngine::new(host.clone(), AuctionsConfig { templates });
    (engine, host)
}

/// Wires a full registry (economy + inventory + energy) on top of the same
/// host, the way `pamlogix-registry` would, so listing costs and bid escrow
/// actually move currency.
fn test_engine_with_registry(
    templates: Vec<AuctionTemplate>,
    items: Vec<ItemDef>,
) -> (Arc<AuctionsEngine>, Arc<InMemoryHost>) {
    let host = Arc::new(InMemoryHost::new());
    let templates = templates.into_iter().map(|t| (t.id.clone(), t)).collect();
    let auctions = AuctionsEngine::new(host.clone(), AuctionsConfig { templates });
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());
    let items = items.into_iter().map(|i| (i.id.clone(), i)).collect();
    let inventory = InventoryEngine::new(host.clone(), InventoryConfig { items, ..Default::default() });
    let energy = EnergyEngine::new(host.clone(), EnergyConfig::default());

    let registry: Arc<dyn Pamlogix> =
        Arc::new(TestRegistry { economy: economy.clone(), inventory: inventory.clone(), energy: energy.clone() });
    auctions.set_pamlogix(registry.clone());
    economy.set_pamlogix(registry.clone());
    inventory.set_pamlogix(registry.clone());
    energy.set_pamlogix(registry);
    (auctions, host)
}

fn reward_items(item_id: &str, count: i64) -> Vec<RewardItem> {
    vec![RewardItem { item_id: ItemDefId::from(item_id), count, instances: Vec::new() }]
}

#[tokio::test]
async fn create_without_listing_cost_succeeds_and_indexes() {
    let (engine, _host) = test_engine(vec![template("sword")]);
    let creator = UserId::from("creator");
    let auction = engine.create(&creator, "sword", reward_items("sword_1", 1)).await.unwrap();
    assert!(!auction.state.has_ended);
    assert_eq!(auction.bid, None);

    let created = engine.list_created(&creator, 10, None).await.unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].id, auction.id);
}

#[tokio::test]
async fn create_unknown_template_errors() {
    let (engine, _host) = test_engine(vec![]);
    let creator = UserId::from("creator");
    let err = engine.create(&creator, "nope", Vec::new()).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionUnknownTemplate");
}

#[tokio::test]
async fn create_requires_economy_when_listing_cost_set() {
    let mut t = template("sword");
    t.listing_cost.currencies.insert("gold".to_string(), 10);
    let (engine, _host) = test_engine(vec![t]);
    let creator = UserId::from("creator");
    let err = engine.create(&creator, "sword", Vec::new()).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionEconomyUnavailable");
}

#[tokio::test]
async fn create_charges_listing_cost_via_economy() {
    let mut t = template("sword");
    t.listing_cost.currencies.insert("gold".to_string(), 10);
    let (engine, host) = test_engine_with_registry(vec![t], Vec::new());
    let creator = UserId::from("creator");
    host.seed_wallet(&creator, "gold", 50);

    engine.create(&creator, "sword", Vec::new()).await.unwrap();
    assert_eq!(host.wallet_balance(&creator, "gold"), 40);
}

#[tokio::test]
async fn create_item_not_allowed_by_template_errors() {
    let mut t = template("sword");
    t.allowed_item_ids.push(ItemDefId::from("sword_1"));
    let (engine, _host) = test_engine(vec![t]);
    let creator = UserId::from("creator");
    let err = engine.create(&creator, "sword", reward_items("shield_1", 1)).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionItemNotAllowed");
}

/// `spec.md` §4.5 full bid protocol: version check, creator exclusion,
/// refund of the previous high bidder, `bid_next` recomputation, and the
/// extension window.
#[tokio::test]
async fn bid_protocol_refunds_previous_bidder_and_recomputes_bid_next() {
    let t = template("sword");
    let (engine, host) = test_engine_with_registry(vec![t], Vec::new());
    let creator = UserId::from("creator");
    let alice = UserId::from("alice");
    let bob = UserId::from("bob");
    host.seed_wallet(&alice, "gold", 100);
    host.seed_wallet(&bob, "gold", 100);

    host.set_now(0);
    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();

    let mut first = HashMap::new();
    first.insert("gold".to_string(), 10);
    let auction = engine.bid(&alice, &auction.id, &auction.version, first).await.unwrap();
    assert_eq!(host.wallet_balance(&alice, "gold"), 90);
    assert_eq!(auction.bid.as_ref().unwrap().bidder_id, alice);
    assert_eq!(auction.bid_next["gold"], 11, "bid(10) + max(10/10,1) default increment");

    let mut second = HashMap::new();
    second.insert("gold".to_string(), auction.bid_next["gold"]);
    let auction = engine.bid(&bob, &auction.id, &auction.version, second).await.unwrap();
    assert_eq!(host.wallet_balance(&alice, "gold"), 100, "outbid alice must be refunded");
    assert_eq!(auction.bid.as_ref().unwrap().bidder_id, bob);
    assert_eq!(auction.bid_history.len(), 2);
}

#[tokio::test]
async fn bid_stale_version_is_rejected() {
    let t = template("sword");
    let (engine, host) = test_engine_with_registry(vec![t], Vec::new());
    let creator = UserId::from("creator");
    let alice = UserId::from("alice");
    host.seed_wallet(&alice, "gold", 100);

    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    let mut bid = HashMap::new();
    bid.insert("gold".to_string(), 10);
    let err = engine.bid(&alice, &auction.id, "stale-version", bid).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionVersionMismatch");
}

#[tokio::test]
async fn creator_cannot_bid_on_own_auction() {
    let t = template("sword");
    let (engine, _host) = test_engine_with_registry(vec![t], Vec::new());
    let creator = UserId::from("creator");
    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    let mut bid = HashMap::new();
    bid.insert("gold".to_string(), 10);
    let err = engine.bid(&creator, &auction.id, &auction.version, bid).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionCreatorCannotBid");
}

#[tokio::test]
async fn bid_below_bid_next_is_rejected() {
    let mut t = template("sword");
    t.bid_increment.fixed.insert("gold".to_string(), 50);
    let (engine, host) = test_engine_with_registry(vec![t], Vec::new());
    let creator = UserId::from("creator");
    let alice = UserId::from("alice");
    let bob = UserId::from("bob");
    host.seed_wallet(&alice, "gold", 100);
    host.seed_wallet(&bob, "gold", 100);

    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    let mut first = HashMap::new();
    first.insert("gold".to_string(), 10);
    let auction = engine.bid(&alice, &auction.id, &auction.version, first).await.unwrap();
    assert_eq!(auction.bid_next["gold"], 60, "bid(10) + fixed increment(50) wins when no percentage is configured");

    let mut too_low = HashMap::new();
    too_low.insert("gold".to_string(), 10);
    let err = engine.bid(&bob, &auction.id, &auction.version, too_low).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionBidTooLow");
}

#[tokio::test]
async fn bid_after_end_time_is_rejected() {
    let t = template("sword");
    let (engine, host) = test_engine_with_registry(vec![t], Vec::new());
    let creator = UserId::from("creator");
    let alice = UserId::from("alice");
    host.seed_wallet(&alice, "gold", 100);

    host.set_now(0);
    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    host.set_now(10_000);
    let mut bid = HashMap::new();
    bid.insert("gold".to_string(), 10);
    let err = engine.bid(&alice, &auction.id, &auction.version, bid).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionEnded");
}

/// `spec.md` §4.5 "extension window": a bid placed within
/// `extension_threshold_sec` of `end_time_sec` pushes the end time out by
/// `extension_sec`, up to `extension_max_sec` total across the auction.
#[tokio::test]
async fn bid_within_extension_threshold_extends_end_time() {
    let t = template("sword");
    let (engine, host) = test_engine_with_registry(vec![t], Vec::new());
    let creator = UserId::from("creator");
    let alice = UserId::from("alice");
    host.seed_wallet(&alice, "gold", 100);

    host.set_now(0);
    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    let original_end = auction.end_time_sec;

    host.set_now(original_end - 30);
    let mut bid = HashMap::new();
    bid.insert("gold".to_string(), 10);
    let auction = engine.bid(&alice, &auction.id, &auction.version, bid).await.unwrap();
    assert_eq!(auction.end_time_sec, original_end + 30);
    assert_eq!(auction.extension_added_sec, 30);
}

#[tokio::test]
async fn claim_bid_is_idempotent_and_grants_items() {
    let mut t = template("sword");
    t.duration_sec = 100;
    let (engine, host) =
        test_engine_with_registry(vec![t], vec![ItemDef { id: ItemDefId::from("sword_1"), name: "Sword".into(), category: "weapon".into(), stackable: false, max_count: 0, string_properties: HashMap::new(), numeric_properties: HashMap::new(), consume_reward: None, keep_zero: false }]);
    let creator = UserId::from("creator");
    let alice = UserId::from("alice");
    host.seed_wallet(&alice, "gold", 100);

    host.set_now(0);
    let auction = engine.create(&creator, "sword", reward_items("sword_1", 1)).await.unwrap();
    let mut bid = HashMap::new();
    bid.insert("gold".to_string(), 10);
    engine.bid(&alice, &auction.id, &auction.version, bid).await.unwrap();

    host.set_now(1_000);
    let items = engine.claim_bid(&alice, &auction.id).await.unwrap();
    assert_eq!(items[0].item_id, ItemDefId::from("sword_1"));

    let items_again = engine.claim_bid(&alice, &auction.id).await.unwrap();
    assert_eq!(items_again, items, "second claim must be a no-op, not a double grant");
}

#[tokio::test]
async fn claim_bid_before_auction_ends_is_rejected() {
    let mut t = template("sword");
    t.duration_sec = 100;
    let (engine, host) = test_engine_with_registry(vec![t], Vec::new());
    let creator = UserId::from("creator");
    let alice = UserId::from("alice");
    host.seed_wallet(&alice, "gold", 100);

    host.set_now(0);
    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    let mut bid = HashMap::new();
    bid.insert("gold".to_string(), 10);
    engine.bid(&alice, &auction.id, &auction.version, bid).await.unwrap();

    let err = engine.claim_bid(&alice, &auction.id).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionNotEnded");
}

#[tokio::test]
async fn claim_created_pays_out_net_of_fee() {
    let mut t = template("sword");
    t.duration_sec = 100;
    t.fee = FeeConfig { percentage: 0.1, fixed: HashMap::new() };
    let (engine, host) = test_engine_with_registry(vec![t], Vec::new());
    let creator = UserId::from("creator");
    let alice = UserId::from("alice");
    host.seed_wallet(&alice, "gold", 100);

    host.set_now(0);
    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    let mut bid = HashMap::new();
    bid.insert("gold".to_string(), 100);
    engine.bid(&alice, &auction.id, &auction.version, bid).await.unwrap();

    host.set_now(1_000);
    let proceeds = engine.claim_created(&creator, &auction.id).await.unwrap();
    assert_eq!(proceeds["gold"], 90);
    assert_eq!(host.wallet_balance(&creator, "gold"), 90);

    let again = engine.claim_created(&creator, &auction.id).await.unwrap();
    assert!(again.is_empty(), "second claim must be a no-op");
}

#[tokio::test]
async fn claim_created_without_a_bid_refunds_items_to_creator() {
    let mut t = template("sword");
    t.duration_sec = 100;
    let item_def = ItemDef {
        id: ItemDefId::from("sword_1"),
        name: "Sword".into(),
        category: "weapon".into(),
        stackable: false,
        max_count: 0,
        string_properties: HashMap::new(),
        numeric_properties: HashMap::new(),
        consume_reward: None,
        keep_zero: false,
    };
    let (engine, host) = test_engine_with_registry(vec![t], vec![item_def]);
    let creator = UserId::from("creator");

    host.set_now(0);
    let auction = engine.create(&creator, "sword", reward_items("sword_1", 1)).await.unwrap();
    host.set_now(1_000);
    let proceeds = engine.claim_created(&creator, &auction.id).await.unwrap();
    assert!(proceeds.is_empty());
}

#[tokio::test]
async fn cancel_before_any_bid_removes_from_global_index() {
    let (engine, _host) = test_engine(vec![template("sword")]);
    let creator = UserId::from("creator");
    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    let cancelled = engine.cancel(&creator, &auction.id).await.unwrap();
    assert!(cancelled.state.has_ended);

    let page = engine.list(AuctionQuery::default(), AuctionSort::EndTimeAsc, 10, None).await.unwrap();
    assert!(page.auctions.is_empty());
}

#[tokio::test]
async fn cancel_after_a_bid_is_forbidden() {
    let t = template("sword");
    let (engine, host) = test_engine_with_registry(vec![t], Vec::new());
    let creator = UserId::from("creator");
    let alice = UserId::from("alice");
    host.seed_wallet(&alice, "gold", 100);

    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    let mut bid = HashMap::new();
    bid.insert("gold".to_string(), 10);
    engine.bid(&alice, &auction.id, &auction.version, bid).await.unwrap();

    let err = engine.cancel(&creator, &auction.id).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionCancelForbidden");
}

#[tokio::test]
async fn cancel_by_non_creator_is_rejected() {
    let (engine, _host) = test_engine(vec![template("sword")]);
    let creator = UserId::from("creator");
    let bystander = UserId::from("bystander");
    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    let err = engine.cancel(&bystander, &auction.id).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionNotCreator");
}

#[tokio::test]
async fn follow_joins_the_auction_topic_stream() {
    let (engine, host) = test_engine(vec![template("sword")]);
    let creator = UserId::from("creator");
    let watcher = UserId::from("watcher");
    let auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    engine.follow(&watcher, &[auction.id.clone()]).await.unwrap();
    let topic = format!("auction:{}", auction.id.0);
    assert!(host.stream_members(&topic).contains(&watcher));
}

#[tokio::test]
async fn list_filters_by_template_and_active_only() {
    let (engine, host) = test_engine(vec![template("sword"), template("shield")]);
    let creator = UserId::from("creator");
    host.set_now(0);
    let sword_auction = engine.create(&creator, "sword", Vec::new()).await.unwrap();
    engine.create(&creator, "shield", Vec::new()).await.unwrap();

    let page = engine
        .list(
            AuctionQuery { template_id: Some("sword".to_string()), active_only: true },
            AuctionSort::CreateTimeDesc,
            10,
            None,
        )
        .await
        .unwrap();
    assert_eq!(page.auctions.len(), 1);
    assert_eq!(page.auctions[0].id, sword_auction.id);
}
