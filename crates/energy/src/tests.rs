use crate::config::{DailyResetConfig, EnergyBucketConfig, EnergyConfig};
use crate::engine::{EnergyEngine, EnergySystem};
use pamlogix_core::{EnergyModifierKind, GrantedEnergyModifier, ModifierOperator, UserId};
use pamlogix_host::mock::InMemoryHost;
use std::collections::HashMap;
use std::sync::Arc;

fn bucket_cfg(energy_id: &str, max: i64, refill_amount: i64, refill_period_sec: i64) -> EnergyBucketConfig {
    EnergyBucketConfig {
        energy_id: energy_id.to_string(),
        max,
        max_overfill: 0,
        refill_amount,
        refill_period_sec,
        start_current: None,
    }
}

fn test_engine(buckets: Vec<EnergyBucketConfig>) -> (Arc<EnergyEngine>, Arc<InMemoryHost>) {
    let host = Arc::new(InMemoryHost::new());
    let buckets = buckets.into_iter().map(|b| (b.energy_id.clone(), b)).collect();
    let engine = EnergyEngine::new(host.clone(), EnergyConfig { buckets });
    (engine, host)
}

#[tokio::test]
async fn fresh_bucket_starts_full() {
    let (engine, _host) = test_engine(vec![bucket_cfg("stamina", 10, 1, 60)]);
    let user = UserId::from("u1");
    let bucket = engine.get(&user, "stamina").await.unwrap();
    assert_eq!(bucket.current, 10);
    assert_eq!(bucket.next_refill_time_sec, 0);
}

/// `spec.md` §8 scenario 3: max=10, refill_amount=1, refill_period=60s.
/// Spend 5 at t=0. At t=121: current=7 (5 + 2 refills), next_refill_time=180.
#[tokio::test]
async fn refill_scenario_matches_spec() {
    let (engine, host) = test_engine(vec![bucket_cfg("stamina", 10, 1, 60)]);
    let user = UserId::from("u1");
    host.set_now(0);

    let mut spend = HashMap::new();
    spend.insert("stamina".to_string(), 5);
    let result = engine.spend(&user, &spend).await.unwrap();
    assert_eq!(result["stamina"].current, 5);

    host.set_now(121);
    let bucket = engine.get(&user, "stamina").await.unwrap();
    assert_eq!(bucket.current, 7);
    assert_eq!(bucket.next_refill_time_sec, 180);
}

#[tokio::test]
async fn refill_never_exceeds_max() {
    let (engine, host) = test_engine(vec![bucket_cfg("stamina", 10, 1, 60)]);
    let user = UserId::from("u1");
    host.set_now(0);
    let mut spend = HashMap::new();
    spend.insert("stamina".to_string(), 2);
    engine.spend(&user, &spend).await.unwrap();

    host.set_now(100_000);
    let bucket = engine.get(&user, "stamina").await.unwrap();
    assert_eq!(bucket.current, 10);
    assert_eq!(bucket.next_refill_time_sec, 0);
}

/// Refill monotonicity invariant (`spec.md` §9): without intervening
/// spend/grant, `current` at a later time never drops and never exceeds max.
#[tokio::test]
async fn refill_is_monotonic() {
    let (engine, host) = test_engine(vec![bucket_cfg("stamina", 20, 3, 30)]);
    let user = UserId::from("u1");
    host.set_now(0);
    let mut spend = HashMap::new();
    spend.insert("stamina".to_string(), 15);
    engine.spend(&user, &spend).await.unwrap();

    let mut last = engine.get(&user, "stamina").await.unwrap().current;
    for t in [10, 35, 61, 95, 140, 500] {
        host.set_now(t);
        let current = engine.get(&user, "stamina").await.unwrap().current;
        assert!(current >= last, "current regressed at t={t}");
        assert!(current <= 20);
        last = current;
    }
}

#[tokio::test]
async fn spend_insufficient_energy_errors_and_does_not_mutate() {
    let (engine, host) = test_engine(vec![bucket_cfg("stamina", 10, 1, 60)]);
    let user = UserId::from("u1");
    host.set_now(0);
    let mut spend = HashMap::new();
    spend.insert("stamina".to_string(), 50);
    let err = engine.spend(&user, &spend).await.unwrap_err();
    assert_eq!(err.sentinel, "EnergyInsufficient");

    let bucket = engine.get(&user, "stamina").await.unwrap();
    assert_eq!(bucket.current, 10);
}

#[tokio::test]
async fn grant_max_energy_modifier_raises_cap() {
    let (engine, host) = test_engine(vec![bucket_cfg("stamina", 10, 1, 60)]);
    let user = UserId::from("u1");
    host.set_now(0);

    let modifiers = vec![GrantedEnergyModifier {
        energy_id: "stamina".to_string(),
        kind: EnergyModifierKind::MaxEnergy,
        value: 5.0,
        start_time_sec: 0,
        expire_time_sec: 1_000,
    }];
    engine.grant(&user, &HashMap::new(), &modifiers).await.unwrap();

    let mut spend = HashMap::new();
    spend.insert("stamina".to_string(), 10);
    engine.spend(&user, &spend).await.unwrap();

    host.set_now(900);
    let bucket = engine.get(&user, "stamina").await.unwrap();
    assert_eq!(bucket.current, 15, "effective max should be 10 + 5 while the modifier is active");
}

#[tokio::test]
async fn grant_modifier_expires_and_stops_applying() {
    let (engine, host) = test_engine(vec![bucket_cfg("stamina", 10, 1, 60)]);
    let user = UserId::from("u1");
    host.set_now(0);

    let modifiers = vec![GrantedEnergyModifier {
        energy_id: "stamina".to_string(),
        kind: EnergyModifierKind::MaxEnergy,
        value: 5.0,
        start_time_sec: 0,
        expire_time_sec: 50,
    }];
    engine.grant(&user, &HashMap::new(), &modifiers).await.unwrap();

    host.set_now(100);
    let bucket = engine.get(&user, "stamina").await.unwrap();
    assert_eq!(bucket.current, 10, "expired modifier must no longer widen the cap");
}

#[tokio::test]
async fn grant_amount_modifier_doubles_raw_grant() {
    let (engine, host) = test_engine(vec![bucket_cfg("stamina", 100, 1, 60)]);
    let user = UserId::from("u1");
    host.set_now(0);

    let mut spend = HashMap::new();
    spend.insert("stamina".to_string(), 50);
    engine.spend(&user, &spend).await.unwrap();

    let modifiers = vec![GrantedEnergyModifier {
        energy_id: "stamina".to_string(),
        kind: EnergyModifierKind::Basic(ModifierOperator::Multiply),
        value: 2.0,
        start_time_sec: 0,
        expire_time_sec: 1_000,
    }];
    let mut grant = HashMap::new();
    grant.insert("stamina".to_string(), 10);
    let result = engine.grant(&user, &grant, &modifiers).await.unwrap();
    assert_eq!(result["stamina"].current, 70, "10 raw * 2.0 operator = 20 applied on top of 50");
}

#[tokio::test]
async fn infinite_energy_modifier_fills_to_max() {
    let (engine, host) = test_engine(vec![bucket_cfg("stamina", 10, 1, 60)]);
    let user = UserId::from("u1");
    host.set_now(0);
    let mut spend = HashMap::new();
    spend.insert("stamina".to_string(), 9);
    engine.spend(&user, &spend).await.unwrap();

    let modifiers = vec![GrantedEnergyModifier {
        energy_id: "stamina".to_string(),
        kind: EnergyModifierKind::InfiniteEnergy,
        value: 1.0,
        start_time_sec: 0,
        expire_time_sec: 1_000,
    }];
    engine.grant(&user, &HashMap::new(), &modifiers).await.unwrap();

    let bucket = engine.get(&user, "stamina").await.unwrap();
    assert_eq!(bucket.current, 10);
    assert_eq!(bucket.next_refill_time_sec, 0);
}

#[tokio::test]
async fn daily_reset_fills_bucket_and_is_idempotent() {
    let (engine, host) = test_engine(vec![bucket_cfg("stamina", 10, 1, 3600)]);
    let user = UserId::from("u1");
    host.set_now(0);
    let mut spend = HashMap::new();
    spend.insert("stamina".to_string(), 8);
    engine.spend(&user, &spend).await.unwrap();

    let reset = DailyResetConfig { hour: 4, minute: 0 };
    host.set_now(4 * 3600 + 5);
    let bucket = engine.reset_energy_at_utc(&user, "stamina", reset).await.unwrap();
    assert_eq!(bucket.current, 10);

    let mut spend2 = HashMap::new();
    spend2.insert("stamina".to_string(), 3);
    engine.spend(&user, &spend2).await.unwrap();

    host.set_now(4 * 3600 + 30);
    let bucket = engine.reset_energy_at_utc(&user, "stamina", reset).await.unwrap();
    assert_eq!(bucket.current, 7, "same boundary already applied; reset must be idempotent");
}

#[tokio::test]
async fn get_with_daily_reset_picks_most_recent_of_several_configs() {
    let (engine, host) = test_engine(vec![bucket_cfg("stamina", 10, 1, 3600)]);
    let user = UserId::from("u1");
    host.set_now(0);
    let mut spend = HashMap::new();
    spend.insert("stamina".to_string(), 10);
    engine.spend(&user, &spend).await.unwrap();

    let resets = vec![DailyResetConfig { hour: 2, minute: 0 }, DailyResetConfig { hour: 5, minute: 0 }];
    host.set_now(5 * 3600 + 1);
    let bucket = engine.get_with_daily_reset(&user, "stamina", &resets).await.unwrap();
    assert_eq!(bucket.current, 10);
}

#[tokio::test]
async fn unknown_bucket_errors() {
    let (engine, _host) = test_engine(vec![]);
    let user = UserId::from("u1");
    let err = engine.get(&user, "nope").await.unwrap_err();
    assert_eq!(err.sentinel, "EnergyUnknownBucket");
}
