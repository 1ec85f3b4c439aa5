use crate::config::{IncentiveConfig, IncentivesConfig, StatsConfig, TeamsConfig};
use crate::incentives::{IncentivesEngine, IncentivesSystem};
use crate::stats::{StatsEngine, StatsSystem};
use crate::teams::{TeamsEngine, TeamsSystem};
use pamlogix_core::{
    EconomyApi, EnergyApi, IncentiveType, InventoryApi, Pamlogix, PamlogixSystem, RewardConfig, StatOperator,
    StatsApi, UserId,
};
use pamlogix_economy::{EconomyConfig, EconomyEngine};
use pamlogix_host::mock::InMemoryHost;
use pamlogix_host::{GroupMembership, GroupMembershipState};
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

#[tokio::test]
async fn stats_set_operator_overwrites_last() {
    let host = Arc::new(InMemoryHost::new());
    let engine = StatsEngine::new(host.clone(), StatsConfig::default());
    host.set_now(100);
    let user = UserId::from("u1");

    let result = engine.update(&user, &[("wins".to_string(), StatOperator::Set, 5)]).await.unwrap();
    assert_eq!(result["wins"].last, 5);
    assert_eq!(result["wins"].first, 5);
    assert_eq!(result["wins"].count, 1);

    let result = engine.update(&user, &[("wins".to_string(), StatOperator::Delta, 3)]).await.unwrap();
    assert_eq!(result["wins"].last, 8);
    assert_eq!(result["wins"].total, 13);
    assert_eq!(result["wins"].min, 5);
    assert_eq!(result["wins"].max, 8);
}

#[tokio::test]
async fn stats_min_max_operators_track_extremes() {
    let host = Arc::new(InMemoryHost::new());
    let engine = StatsEngine::new(host.clone(), StatsConfig::default());
    host.set_now(100);
    let user = UserId::from("u1");

    engine.update(&user, &[("best_time".to_string(), StatOperator::Set, 50)]).await.unwrap();
    let result = engine.update(&user, &[("best_time".to_string(), StatOperator::Min, 30)]).await.unwrap();
    assert_eq!(result["best_time"].last, 30);
    let result = engine.update(&user, &[("best_time".to_string(), StatOperator::Min, 40)]).await.unwrap();
    assert_eq!(result["best_time"].last, 30, "min(30, 40) stays 30");
}

#[tokio::test]
async fn teams_rejects_message_when_not_a_member() {
    let host = Arc::new(InMemoryHost::new());
    let engine = TeamsEngine::new(host.clone(), TeamsConfig::default());
    let user = UserId::from("u1");
    let group = pamlogix_core::GroupId::from("guild-1");

    let err = engine.write_chat_message(&user, &group, "hi").await.unwrap_err();
    assert_eq!(err.sentinel, "TeamsNotAMember");
}

#[tokio::test]
async fn teams_rejects_message_for_pending_join_request() {
    let host = Arc::new(InMemoryHost::new());
    let engine = TeamsEngine::new(host.clone(), TeamsConfig::default());
    let user = UserId::from("u1");
    let group = pamlogix_core::GroupId::from("guild-1");
    host.set_group_memberships(
        &user,
        vec![GroupMembership { group_id: group.clone(), state: GroupMembershipState::JoinRequest }],
    );

    let err = engine.write_chat_message(&user, &group, "hi").await.unwrap_err();
    assert_eq!(err.sentinel, "TeamsPendingJoinRequest");
}

#[tokio::test]
async fn teams_sends_message_for_confirmed_member() {
    let host = Arc::new(InMemoryHost::new());
    let engine = TeamsEngine::new(host.clone(), TeamsConfig::default());
    let user = UserId::from("u1");
    let group = pamlogix_core::GroupId::from("guild-1");
    host.set_group_memberships(
        &user,
        vec![GroupMembership { group_id: group.clone(), state: GroupMembershipState::Member }],
    );

    engine.write_chat_message(&user, &group, "hi").await.unwrap();
    let messages = host.channel_messages.lock();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].2, "hi");
}

fn incentives_engine(config: IncentivesConfig) -> (Arc<IncentivesEngine>, Arc<InMemoryHost>) {
    let host = Arc::new(InMemoryHost::new());
    let engine = IncentivesEngine::new(host.clone(), config);
    let economy = EconomyEngine::new(host.clone(), EconomyConfig::default());
    let registry: Arc<dyn Pamlogix> = Arc::new(TestRegistry { economy: economy.clone() });
    engine.set_pamlogix(registry.clone());
    economy.set_pamlogix(registry);
    (engine, host)
}

fn gift_config() -> IncentivesConfig {
    let mut incentives = HashMap::new();
    incentives.insert(
        "friend_gift".to_string(),
        IncentiveConfig {
            incentive_type: IncentiveType::Gift,
            max_concurrent: 2,
            max_claims: 1,
            max_global_claims: 0,
            max_recipient_age_sec: 0,
            expiry_sec: 0,
            sender_reward: RewardConfig::default(),
            recipient_reward: RewardConfig::default(),
        },
    );
    IncentivesConfig { incentives }
}

#[tokio::test]
async fn sender_create_enforces_max_concurrent() {
    let (engine, host) = incentives_engine(gift_config());
    host.set_now(1_000);
    let sender = UserId::from("sender");

    engine.sender_create(&sender, "friend_gift", vec![]).await.unwrap();
    engine.sender_create(&sender, "friend_gift", vec![]).await.unwrap();
    let err = engine.sender_create(&sender, "friend_gift", vec![]).await.unwrap_err();
    assert_eq!(err.sentinel, "IncentiveTooManyConcurrent");
}

#[tokio::test]
async fn recipient_claim_is_rejected_for_creator_and_repeat_claims() {
    let (engine, host) = incentives_engine(gift_config());
    host.set_now(1_000);
    let sender = UserId::from("sender");
    let recipient = UserId::from("recipient");

    let incentive = engine.sender_create(&sender, "friend_gift", vec![]).await.unwrap();

    let err = engine.recipient_claim(&sender, &incentive.code).await.unwrap_err();
    assert_eq!(err.sentinel, "IncentiveSelfClaim");

    engine.recipient_claim(&recipient, &incentive.code).await.unwrap();
    let err = engine.recipient_claim(&recipient, &incentive.code).await.unwrap_err();
    assert_eq!(err.sentinel, "IncentiveAlreadyClaimed");
}

#[tokio::test]
async fn recipient_claim_enforces_max_claims() {
    let (engine, host) = incentives_engine(gift_config());
    host.set_now(1_000);
    let sender = UserId::from("sender");
    let r1 = UserId::from("r1");
    let r2 = UserId::from("r2");

    let incentive = engine.sender_create(&sender, "friend_gift", vec![]).await.unwrap();
    engine.recipient_claim(&r1, &incentive.code).await.unwrap();
    let err = engine.recipient_claim(&r2, &incentive.code).await.unwrap_err();
    assert_eq!(err.sentinel, "IncentiveMaxClaimsReached");
}

#[tokio::test]
async fn sender_delete_fails_once_claimed() {
    let (engine, host) = incentives_engine(gift_config());
    host.set_now(1_000);
    let sender = UserId::from("sender");
    let recipient = UserId::from("recipient");

    let incentive = engine.sender_create(&sender, "friend_gift", vec![]).await.unwrap();
    engine.recipient_claim(&recipient, &incentive.code).await.unwrap();
    let err = engine.sender_delete(&sender, &incentive.code).await.unwrap_err();
    assert_eq!(err.sentinel, "IncentiveHasClaims");
}

#[tokio::test]
async fn sender_delete_succeeds_before_any_claim() {
    let (engine, host) = incentives_engine(gift_config());
    host.set_now(1_000);
    let sender = UserId::from("sender");

    let incentive = engine.sender_create(&sender, "friend_gift", vec![]).await.unwrap();
    engine.sender_delete(&sender, &incentive.code).await.unwrap();
    let err = engine.recipient_get(&incentive.code).await.unwrap_err();
    assert_eq!(err.sentinel, "IncentiveUnknownCode");
}

#[tokio::test]
async fn recipient_claim_enforces_account_age() {
    let mut config = gift_config();
    config.incentives.get_mut("friend_gift").unwrap().max_recipient_age_sec = 3600;
    let (engine, host) = incentives_engine(config);
    host.set_now(10_000);
    let sender = UserId::from("sender");
    let recipient = UserId::from("recipient");
    host.set_account_create_time(&recipient, 9_999);

    let incentive = engine.sender_create(&sender, "friend_gift", vec![]).await.unwrap();
    let err = engine.recipient_claim(&recipient, &incentive.code).await.unwrap_err();
    assert_eq!(err.sentinel, "IncentiveRecipientTooNew");
}

#[tokio::test]
async fn invite_type_restricts_claims_to_named_recipients() {
    let mut incentives = HashMap::new();
    incentives.insert(
        "guild_invite".to_string(),
        IncentiveConfig {
            incentive_type: IncentiveType::Invite,
            max_concurrent: 0,
            max_claims: 0,
            max_global_claims: 0,
            max_recipient_age_sec: 0,
            expiry_sec: 0,
            sender_reward: RewardConfig::default(),
            recipient_reward: RewardConfig::default(),
        },
    );
    let (engine, host) = incentives_engine(IncentivesConfig { incentives });
    host.set_now(1_000);
    let sender = UserId::from("sender");
    let invited = UserId::from("invited");
    let stranger = UserId::from("stranger");

    let incentive = engine.sender_create(&sender, "guild_invite", vec![invited.clone()]).await.unwrap();
    let err = engine.recipient_claim(&stranger, &incentive.code).await.unwrap_err();
    assert_eq!(err.sentinel, "IncentiveNotOwner");
    engine.recipient_claim(&invited, &incentive.code).await.unwrap();
}
