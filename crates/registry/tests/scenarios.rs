//! End-to-end scenarios spanning more than one subsystem, run against a real
//! `PamlogixRegistry` rather than a hand-rolled stand-in (`spec.md` §8).

use pamlogix_auctions::{AuctionTemplate, AuctionsConfig, AuctionsEngine, AuctionsSystem, BidIncrementConfig, FeeConfig, ListingCost};
use pamlogix_core::{ProgressionDeltaKind, RewardItem, UserId};
use pamlogix_economy::{EconomyConfig, EconomyEngine};
use pamlogix_energy::{EnergyBucketConfig, EnergyConfig, EnergyEngine, EnergySystem};
use pamlogix_host::mock::InMemoryHost;
use pamlogix_inventory::{InventoryConfig, InventoryEngine, ItemDef};
use pamlogix_progression::{
    PreconditionLeaf, PreconditionNode, PreconditionOperator, ProgressionConfig, ProgressionEngine, ProgressionKnownState,
    ProgressionNodeConfig, ProgressionSystem,
};
use pamlogix_registry::PamlogixRegistry;
use pamlogix_streaks::{StreakConfig, StreakRewardTier, StreaksConfig, StreaksEngine, StreaksSystem};
use pamlogix_unlockables::{UnlockableDefConfig, UnlockablesConfig, UnlockablesEngine, UnlockablesSystem};
use std::collections::HashMap;
use std::sync::Arc;

fn auction_template() -> AuctionTemplate {
    AuctionTemplate {
        id: "sword".to_string(),
        allowed_item_ids: Vec::new(),
        allowed_item_sets: Vec::new(),
        bid_history_count: 10,
        listing_cost: ListingCost::default(),
        fee: FeeConfig { percentage: 0.1, fixed: HashMap::new() },
        duration_sec: 60,
        extension_threshold_sec: 5,
        extension_sec: 10,
        extension_max_sec: 30,
        bid_start: [("gold".to_string(), 10)].into_iter().collect(),
        bid_increment: BidIncrementConfig { percentage: [("gold".to_string(), 0.1)].into_iter().collect(), fixed: HashMap::new() },
    }
}

/// Scenario 1: bid inside the extension window extends `end_time` and caps
/// `extension_remaining_sec` at `extension_max_sec`.
#[tokio::test]
async fn scenario_1_bid_within_extension_window_extends_auction() {
    let host = Arc::new(InMemoryHost::new());
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());
    let inventory = InventoryEngine::new(host.clone(), InventoryConfig::default());
    let energy = EnergyEngine::new(host.clone(), EnergyConfig::default());
    let auctions = AuctionsEngine::new(
        host.clone(),
        AuctionsConfig { templates: [("sword".to_string(), auction_template())].into_iter().collect() },
    );
    let registry = PamlogixRegistry::builder()
        .with_economy(economy)
        .with_inventory(inventory)
        .with_energy(energy)
        .with_auctions(auctions.clone())
        .build();
    let _ = registry;

    let creator = UserId::from("creator");
    let alice = UserId::from("alice");
    host.seed_wallet(&alice, "gold", 100);

    host.set_now(0);
    let auction = auctions.create(&creator, "sword", Vec::new()).await.unwrap();
    assert_eq!(auction.end_time_sec, 60);

    host.set_now(55);
    let bid = HashMap::from([("gold".to_string(), 10)]);
    let auction = auctions.bid(&alice, &auction.id, &auction.version, bid).await.unwrap();

    assert_eq!(auction.end_time_sec, 70, "extended by extension_sec=10");
    assert_eq!(auction.extension_remaining_sec, 20, "extension_max=30 minus the 10 just spent");
    assert_eq!(auction.bid_next["gold"], 11, "bid(10) + round(10 * 0.1) increment");
}

/// Scenario 2: stale-version bid fails, retry at current version succeeds,
/// and the outbid prior bidder is refunded.
#[tokio::test]
async fn scenario_2_version_race_rejects_stale_write_and_refunds_loser() {
    let host = Arc::new(InMemoryHost::new());
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());
    let inventory = InventoryEngine::new(host.clone(), InventoryConfig::default());
    let energy = EnergyEngine::new(host.clone(), EnergyConfig::default());
    let auctions = AuctionsEngine::new(
        host.clone(),
        AuctionsConfig { templates: [("sword".to_string(), auction_template())].into_iter().collect() },
    );
    let _registry = PamlogixRegistry::builder()
        .with_economy(economy)
        .with_inventory(inventory)
        .with_energy(energy)
        .with_auctions(auctions.clone())
        .build();

    let creator = UserId::from("creator");
    let a = UserId::from("a");
    let b = UserId::from("b");
    host.seed_wallet(&a, "gold", 200);
    host.seed_wallet(&b, "gold", 200);

    host.set_now(0);
    let auction = auctions.create(&creator, "sword", Vec::new()).await.unwrap();
    let v1 = auction.version.clone();

    let bid_a_100 = HashMap::from([("gold".to_string(), 100)]);
    let auction = auctions.bid(&a, &auction.id, &v1, bid_a_100).await.unwrap();
    assert_eq!(auction.version, v1, "bidding is accepted at the version it read, producing the next version");

    let bid_b_110 = HashMap::from([("gold".to_string(), 110)]);
    let auction = auctions.bid(&b, &auction.id, &auction.version, bid_b_110).await.unwrap();
    let v2 = auction.version.clone();
    assert_eq!(host.wallet_balance(&a, "gold"), 200, "a's 100 was refunded when b outbid");

    let bid_a_120_stale = HashMap::from([("gold".to_string(), 120)]);
    let err = auctions.bid(&a, &auction.id, &v1, bid_a_120_stale).await.unwrap_err();
    assert_eq!(err.sentinel, "AuctionVersionMismatch");

    let bid_a_120_fresh = HashMap::from([("gold".to_string(), 120)]);
    let auction = auctions.bid(&a, &auction.id, &v2, bid_a_120_fresh).await.unwrap();
    assert_eq!(auction.bid.unwrap().bidder_id, a);
    assert_eq!(host.wallet_balance(&b, "gold"), 200, "b's 110 was refunded when a retried successfully");
}

/// Scenario 3: energy refills monotonically between spend and a later read.
#[tokio::test]
async fn scenario_3_energy_refills_at_configured_rate() {
    let host = Arc::new(InMemoryHost::new());
    let mut buckets = HashMap::new();
    buckets.insert(
        "stamina".to_string(),
        EnergyBucketConfig { energy_id: "stamina".to_string(), max: 10, max_overfill: 0, refill_amount: 1, refill_period_sec: 60, start_current: None },
    );
    let energy = EnergyEngine::new(host.clone(), EnergyConfig { buckets });

    host.set_now(0);
    energy.spend(&UserId::from("u1"), &HashMap::from([("stamina".to_string(), 5)])).await.unwrap();

    host.set_now(121);
    let buckets = energy.get_all(&UserId::from("u1")).await.unwrap();
    let stamina = &buckets["stamina"];
    assert_eq!(stamina.current, 7, "5 remaining plus two 60s refill periods");
    assert_eq!(stamina.next_refill_time_sec, 180);
}

/// Scenario 4: a streak idle for 5 days past its last update decays by
/// `idle_count_decay_reset` per elapsed period, capped at `max_idle_count_decay`,
/// and `count_current_reset` is zeroed alongside it.
#[tokio::test]
async fn scenario_4_idle_streak_decays_and_resets_current_tally() {
    let host = Arc::new(InMemoryHost::new());
    let mut streaks = HashMap::new();
    streaks.insert(
        "daily".to_string(),
        StreakConfig {
            max_count: i64::MAX,
            max_count_current_reset: i64::MAX,
            reset_cron: Some("0 0 * * *".to_string()),
            idle_count_decay_reset: 1,
            max_idle_count_decay: 3,
            reward_tiers: vec![StreakRewardTier { count_min: 0, count_max: i64::MAX, reward: Default::default() }],
            disabled: false,
            start_time_sec: None,
            end_time_sec: None,
        },
    );
    let engine = StreaksEngine::new(host.clone(), StreaksConfig { streaks });
    let user = UserId::from("u1");

    host.set_now(0);
    engine.update(&user, &HashMap::from([("daily".to_string(), 10)])).await.unwrap();

    const FIVE_DAYS: i64 = 5 * 24 * 3600;
    host.set_now(FIVE_DAYS);
    let result = engine.list(&user).await.unwrap();
    let daily = &result["daily"];
    assert_eq!(daily.count, 7, "decay caps at max_idle_count_decay=3, so 10-3=7");
    assert_eq!(daily.count_current_reset, 0);
}

/// Scenario 5: `(gold>=100 AND level>=5) OR item:key>=1`, resolved through the
/// same registry economy/inventory use for reward grants elsewhere.
#[tokio::test]
async fn scenario_5_or_branch_unlocks_node_and_emits_unlocked_delta() {
    let host = Arc::new(InMemoryHost::new());
    let mut items = HashMap::new();
    items.insert("key".into(), ItemDef { id: "key".into(), name: "Key".into(), category: "misc".into(), stackable: true, ..Default::default() });
    let inventory = InventoryEngine::new(host.clone(), InventoryConfig { items, ..Default::default() });
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());

    let and_branch = PreconditionNode {
        operator: PreconditionOperator::And,
        leaf: Some(PreconditionLeaf {
            currency_min: HashMap::from([("gold".to_string(), 100)]),
            stats_min: HashMap::from([("level".to_string(), 5)]),
            ..Default::default()
        }),
        children: Vec::new(),
    };
    let item_branch = PreconditionNode {
        operator: PreconditionOperator::And,
        leaf: Some(PreconditionLeaf { items_min: HashMap::from([("key".into(), 1)]), ..Default::default() }),
        children: Vec::new(),
    };
    let mut nodes = HashMap::new();
    nodes.insert(
        "vault".to_string(),
        ProgressionNodeConfig {
            preconditions: PreconditionNode { operator: PreconditionOperator::Or, leaf: None, children: vec![and_branch, item_branch] },
            cost: None,
            reward: Default::default(),
        },
    );
    let progression = ProgressionEngine::new(host.clone(), ProgressionConfig { nodes });

    let registry = PamlogixRegistry::builder().with_economy(economy).with_inventory(inventory.clone()).with_progression(progression.clone()).build();
    let _ = registry;

    let user = UserId::from("u1");
    host.set_now(1_000);
    host.seed_wallet(&user, "gold", 150);

    let mut last_known = HashMap::new();
    let (views, _deltas) = progression.get(&user, &last_known).await.unwrap();
    assert!(!views["vault"].unlocked, "gold=150,level=4,key=0: locked");
    last_known.insert("vault".to_string(), ProgressionKnownState { unlocked: false, counts: HashMap::new() });

    inventory.grant_items(&user, &[RewardItem { item_id: "key".into(), count: 1, ..Default::default() }], false).await.unwrap();

    let (views, deltas) = progression.get(&user, &last_known).await.unwrap();
    assert!(views["vault"].unlocked, "item:key>=1 satisfies the OR branch");
    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas[0].kind, ProgressionDeltaKind::Unlocked);
}

/// Scenario 6: with 2 active slots, claiming a running unlockable frees a
/// slot the FIFO queue immediately fills.
#[tokio::test]
async fn scenario_6_claim_auto_starts_next_queued_unlockable() {
    let host = Arc::new(InMemoryHost::new());
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());
    let mut defs = HashMap::new();
    for id in ["a", "b", "c"] {
        defs.insert(
            pamlogix_core::UnlockableId::from(id),
            UnlockableDefConfig { id: id.into(), wait_time_sec: 100, start_cost: HashMap::new(), cost: HashMap::new(), probability: 0.0, reward: Default::default() },
        );
    }
    let unlockables = UnlockablesEngine::new(
        host.clone(),
        UnlockablesConfig { defs, slots: 3, active_slots: 2, max_active_slots: 2, slot_cost: HashMap::new(), max_queued_unlocks: 5 },
    );
    let registry = PamlogixRegistry::builder().with_economy(economy).with_unlockables(unlockables.clone()).build();
    let _ = registry;

    let user = UserId::from("u1");
    host.set_now(0);

    let a = unlockables.create(&user, Some("a"), None).await.unwrap();
    let b = unlockables.create(&user, Some("b"), None).await.unwrap();
    let c = unlockables.create(&user, Some("c"), None).await.unwrap();

    unlockables.unlock_start(&user, a.instance_id.as_str()).await.unwrap();
    unlockables.unlock_start(&user, b.instance_id.as_str()).await.unwrap();
    let list = unlockables.queue_add(&user, c.instance_id.as_str()).await.unwrap();
    assert_eq!(list.queued.len(), 1, "both active slots are already occupied by a and b");

    host.set_now(200);
    let reward_config_applies = unlockables.claim(&user, a.instance_id.as_str()).await;
    assert!(reward_config_applies.is_ok());

    let list = unlockables.get(&user).await.unwrap();
    assert!(list.queued.is_empty(), "c was pulled off the queue into a's freed slot");
    let active = list.items.iter().filter(|i| i.unlock_start_time_sec > 0).count();
    assert_eq!(active, 2, "b keeps running, c now runs alongside it");
    let c_item = list.items.iter().find(|i| i.instance_id == c.instance_id).unwrap();
    assert!(c_item.unlock_start_time_sec > 0, "c auto-started once a's slot freed");
}
