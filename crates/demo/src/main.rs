//! Standalone CLI wiring every gameplay subsystem behind one
//! [`pamlogix_registry::PamlogixRegistry`] against an in-memory host, the
//! same way the teacher's own node binary wires `construct_runtime!` pallets
//! against a dev chain spec for local exploration — here there is no chain,
//! just one simulated player driving each engine end to end.

use clap::{Parser, ValueEnum};
use pamlogix_auctions::{AuctionTemplate, AuctionsConfig, AuctionsEngine, BidIncrementConfig, FeeConfig, ListingCost};
use pamlogix_core::{AmountRange, CurrencyRange, ItemDefId, RewardBundle, RewardConfig, UnlockableId, UserId};
use pamlogix_economy::{EconomyConfig, EconomyEngine};
use pamlogix_energy::{EnergyBucketConfig, EnergyConfig, EnergyEngine};
use pamlogix_inventory::{InventoryConfig, InventoryEngine, ItemDef};
use pamlogix_progression::{ProgressionConfig, ProgressionEngine};
use pamlogix_registry::PamlogixRegistry;
use pamlogix_rpc::PamlogixRpc;
use pamlogix_social::{IncentivesConfig, IncentivesEngine, StatsConfig, StatsEngine, TeamsConfig, TeamsEngine};
use pamlogix_streaks::{StreakConfig, StreakRewardTier, StreaksConfig, StreaksEngine};
use pamlogix_unlockables::{UnlockableDefConfig, UnlockablesConfig, UnlockablesEngine};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "pamlogix-demo", version, about = "Drive the core gameplay subsystems against an in-memory host")]
struct Cli {
    #[arg(long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,

    /// Unix seconds the simulated host clock starts at.
    #[arg(long, default_value_t = 0)]
    start_time: i64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Scenario {
    Auction,
    Energy,
    All,
}

fn build_registry(host: &pamlogix_host::DynHost) -> Arc<PamlogixRegistry> {
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());
    let inventory = InventoryEngine::new(
        host.clone(),
        InventoryConfig {
            items: [(
                ItemDefId::from("sword"),
                ItemDef { id: ItemDefId::from("sword"), name: "Sword".into(), category: "weapon".into(), stackable: false, ..Default::default() },
            )]
            .into_iter()
            .collect(),
            ..Default::default()
        },
    );
    let energy = EnergyEngine::new(
        host.clone(),
        EnergyConfig {
            buckets: [(
                "stamina".to_string(),
                EnergyBucketConfig { energy_id: "stamina".into(), max: 10, refill_amount: 1, refill_period_sec: 60, ..Default::default() },
            )]
            .into_iter()
            .collect(),
        },
    );
    let auction_template = AuctionTemplate {
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
    };
    let auctions = AuctionsEngine::new(
        host.clone(),
        AuctionsConfig { templates: [("sword".to_string(), auction_template)].into_iter().collect() },
    );
    let streaks = StreaksEngine::new(
        host.clone(),
        StreaksConfig {
            streaks: [(
                "daily_login".to_string(),
                StreakConfig {
                    reward_tiers: vec![StreakRewardTier {
                        count_min: 3,
                        count_max: 3,
                        reward: RewardConfig {
                            guaranteed: Some(RewardBundle {
                                currencies: vec![CurrencyRange { currency_id: "gold".into(), range: AmountRange { min: 50, max: 50, multiple: 0 } }],
                                ..Default::default()
                            }),
                            ..Default::default()
                        },
                    }],
                    ..Default::default()
                },
            )]
            .into_iter()
            .collect(),
        },
    );
    let progression = ProgressionEngine::new(host.clone(), ProgressionConfig::default());
    let unlockables = UnlockablesEngine::new(
        host.clone(),
        UnlockablesConfig {
            defs: [(
                UnlockableId::from("vault"),
                UnlockableDefConfig { id: UnlockableId::from("vault"), wait_time_sec: 120, probability: 1.0, ..Default::default() },
            )]
            .into_iter()
            .collect(),
            slots: 3,
            active_slots: 2,
            max_active_slots: 2,
            max_queued_unlocks: 5,
            ..Default::default()
        },
    );
    let stats = StatsEngine::new(host.clone(), StatsConfig::default());
    let teams = TeamsEngine::new(host.clone(), TeamsConfig::default());
    let incentives = IncentivesEngine::new(host.clone(), IncentivesConfig::default());

    PamlogixRegistry::builder()
        .with_economy(economy)
        .with_inventory(inventory)
        .with_energy(energy)
        .with_auctions(auctions)
        .with_streaks(streaks)
        .with_progression(progression)
        .with_unlockables(unlockables)
        .with_stats(stats)
        .with_teams(teams)
        .with_incentives(incentives)
        .build()
}

async fn run_auction_scenario(rpc: &PamlogixRpc, host: &Arc<pamlogix_host::mock::InMemoryHost>) {
    let creator = UserId::from("creator");
    let bidder = UserId::from("alice");
    host.seed_wallet(&bidder, "gold", 100);

    let auction = rpc.auctions_create(&creator, "sword", Vec::new()).await.expect("create auction");
    tracing::info!(auction_id = %auction.id.0, end_time = auction.end_time_sec, "auction created");

    host.advance(55);
    let bid = HashMap::from([("gold".to_string(), 10)]);
    let auction = rpc.auctions_bid(&bidder, &auction.id, &auction.version, bid).await.expect("place bid");
    tracing::info!(
        end_time = auction.end_time_sec,
        extension_remaining = auction.extension_remaining_sec,
        bid_next = ?auction.bid_next,
        "bid accepted inside extension window"
    );
}

async fn run_energy_scenario(rpc: &PamlogixRpc, host: &Arc<pamlogix_host::mock::InMemoryHost>) {
    let player = UserId::from("alice");
    let spent = rpc.energy_spend(&player, &HashMap::from([("stamina".to_string(), 5)])).await.expect("spend stamina");
    tracing::info!(current = spent["stamina"].current, "spent 5 stamina");

    host.advance(121);
    let bucket = rpc.energy_get(&player, "stamina").await.expect("read stamina");
    tracing::info!(current = bucket.current, next_refill = bucket.next_refill_time_sec, "stamina after 121s");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let host = Arc::new(pamlogix_host::mock::InMemoryHost::new());
    host.set_now(cli.start_time);
    let dyn_host: pamlogix_host::DynHost = host.clone();
    let registry = build_registry(&dyn_host);
    let rpc = PamlogixRpc::new(registry);

    match cli.scenario {
        Scenario::Auction => run_auction_scenario(&rpc, &host).await,
        Scenario::Energy => run_energy_scenario(&rpc, &host).await,
        Scenario::All => {
            run_auction_scenario(&rpc, &host).await;
            run_energy_scenario(&rpc, &host).await;
        }
    }
}
