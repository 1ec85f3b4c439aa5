use crate::config::{StreakConfig, StreakRewardTier, StreaksConfig};
use crate::engine::{StreaksEngine, StreaksSystem};
use pamlogix_core::{EconomyApi, EnergyApi, InventoryApi, Pamlogix, PamlogixSystem, RewardConfig, StatsApi, UserId};
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

fn test_engine(streaks: HashMap<String, StreakConfig>) -> (Arc<StreaksEngine>, Arc<InMemoryHost>) {
    let host = Arc::new(InMemoryHost::new());
    let engine = StreaksEngine::new(host.clone(), StreaksConfig { streaks });
    (engine, host)
}

fn test_engine_with_economy(streaks: HashMap<String, StreakConfig>) -> (Arc<StreaksEngine>, Arc<InMemoryHost>) {
    let host = Arc::new(InMemoryHost::new());
    let engine = StreaksEngine::new(host.clone(), StreaksConfig { streaks });
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());
    let registry: Arc<dyn Pamlogix> = Arc::new(TestRegistry { economy: economy.clone() });
    engine.set_pamlogix(registry.clone());
    economy.set_pamlogix(registry);
    (engine, host)
}

fn daily_streak() -> StreakConfig {
    StreakConfig {
        max_count: 1000,
        max_count_current_reset: 1000,
        reset_cron: Some("0 0 * * *".to_string()),
        idle_count_decay_reset: 1,
        max_idle_count_decay: 3,
        ..Default::default()
    }
}

#[tokio::test]
async fn update_accumulates_count_and_current_reset() {
    let mut streaks = HashMap::new();
    streaks.insert("login".to_string(), StreakConfig { max_count: 10, max_count_current_reset: 5, ..Default::default() });
    let (engine, host) = test_engine(streaks);
    host.set_now(1_000);
    let user = UserId::from("u1");

    let mut deltas = HashMap::new();
    deltas.insert("login".to_string(), 1);
    let result = engine.update(&user, &deltas).await.unwrap();
    assert_eq!(result["login"].count, 1);
    assert_eq!(result["login"].count_current_reset, 1);

    let result = engine.update(&user, &deltas).await.unwrap();
    assert_eq!(result["login"].count, 2);
}

#[tokio::test]
async fn update_clamps_to_max_count() {
    let mut streaks = HashMap::new();
    streaks.insert("login".to_string(), StreakConfig { max_count: 3, max_count_current_reset: 3, ..Default::default() });
    let (engine, host) = test_engine(streaks);
    host.set_now(1_000);
    let user = UserId::from("u1");

    let mut deltas = HashMap::new();
    deltas.insert("login".to_string(), 5);
    let result = engine.update(&user, &deltas).await.unwrap();
    assert_eq!(result["login"].count, 3);
}

#[tokio::test]
async fn update_unknown_streak_errors() {
    let (engine, host) = test_engine(HashMap::new());
    host.set_now(1_000);
    let user = UserId::from("u1");
    let mut deltas = HashMap::new();
    deltas.insert("nope".to_string(), 1);
    let err = engine.update(&user, &deltas).await.unwrap_err();
    assert_eq!(err.sentinel, "StreakUnknown");
}

#[tokio::test]
async fn update_disabled_streak_errors() {
    let mut streaks = HashMap::new();
    streaks.insert("login".to_string(), StreakConfig { disabled: true, ..Default::default() });
    let (engine, host) = test_engine(streaks);
    host.set_now(1_000);
    let user = UserId::from("u1");
    let mut deltas = HashMap::new();
    deltas.insert("login".to_string(), 1);
    let err = engine.update(&user, &deltas).await.unwrap_err();
    assert_eq!(err.sentinel, "StreakDisabled");
}

/// `spec.md` §8 scenario 4: 5 days of idle decay against a daily-midnight
/// CRON with `idle_count_decay_reset=1`, `max_idle_count_decay=3`.
#[tokio::test]
async fn idle_decay_caps_at_max_idle_count_decay() {
    let mut streaks = HashMap::new();
    streaks.insert("login".to_string(), daily_streak());
    let (engine, host) = test_engine(streaks);

    // First update establishes update_time_sec at a known instant.
    host.set_now(1_000);
    let user = UserId::from("u1");
    let mut deltas = HashMap::new();
    deltas.insert("login".to_string(), 10);
    let result = engine.update(&user, &deltas).await.unwrap();
    assert_eq!(result["login"].count, 10);

    // 5 days later, with no intervening updates.
    host.advance(5 * 86_400);
    let listed = engine.list(&user).await.unwrap();
    assert_eq!(listed["login"].count, 7);
    assert_eq!(listed["login"].count_current_reset, 0);
}

#[tokio::test]
async fn idle_decay_is_idempotent_within_the_same_access() {
    let mut streaks = HashMap::new();
    streaks.insert("login".to_string(), daily_streak());
    let (engine, host) = test_engine(streaks);
    host.set_now(1_000);
    let user = UserId::from("u1");
    let mut deltas = HashMap::new();
    deltas.insert("login".to_string(), 10);
    engine.update(&user, &deltas).await.unwrap();

    host.advance(5 * 86_400);
    let first = engine.list(&user).await.unwrap();
    let second = engine.list(&user).await.unwrap();
    assert_eq!(first["login"].count, second["login"].count);
}

#[tokio::test]
async fn claim_grants_tier_once_and_marks_claimed() {
    let mut streaks = HashMap::new();
    streaks.insert(
        "login".to_string(),
        StreakConfig {
            max_count: 100,
            reward_tiers: vec![StreakRewardTier {
                count_min: 3,
                count_max: 100,
                reward: RewardConfig {
                    guaranteed: Some(pamlogix_core::RewardBundle {
                        currencies: vec![pamlogix_core::CurrencyRange {
                            currency_id: "gold".to_string(),
                            range: pamlogix_core::AmountRange::exact(50),
                        }],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            }],
            ..Default::default()
        },
    );
    let (engine, host) = test_engine_with_economy(streaks);
    host.set_now(1_000);
    let user = UserId::from("u1");

    let mut deltas = HashMap::new();
    deltas.insert("login".to_string(), 3);
    engine.update(&user, &deltas).await.unwrap();

    let ids = vec!["login".to_string()];
    let first = engine.claim(&user, &ids).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(host.wallet_balance(&user, "gold"), 50);

    // spec.md §8: "Streak claim idempotence" — a second Claim at the same
    // count produces no further reward.
    let second = engine.claim(&user, &ids).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(host.wallet_balance(&user, "gold"), 50);
}

#[tokio::test]
async fn reset_clears_count_and_claimed_rewards() {
    let mut streaks = HashMap::new();
    streaks.insert("login".to_string(), StreakConfig { max_count: 100, ..Default::default() });
    let (engine, host) = test_engine(streaks);
    host.set_now(1_000);
    let user = UserId::from("u1");

    let mut deltas = HashMap::new();
    deltas.insert("login".to_string(), 10);
    engine.update(&user, &deltas).await.unwrap();

    let ids = vec!["login".to_string()];
    let result = engine.reset(&user, &ids).await.unwrap();
    assert_eq!(result["login"].count, 0);
}
