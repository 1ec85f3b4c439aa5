//! The economy engine: rewards, purchases, donations, ad placements
//! (`spec.md` §4.2). Holds no in-process cache — every call is a
//! read-modify-write against the host's storage (spec.md §5).

use crate::config::EconomyConfig;
use crate::errors;
use crate::grant::{grant_reward, unmarshal_wallet, GrantCollaborators};
use crate::roll::roll_reward_config;
use crate::state::{DonationState, PlacementRecord, PlacementState, PurchaseIntent, PurchaseTransaction, UserEconomyState};
use async_trait::async_trait;
use pamlogix_core::{
    internal, precondition_failed, AvailableRewards, EconomyApi, ItemDefId,
    ModifierRange, PamlogixError, PamlogixSystem, RewardConfig, RewardGrantOutcome, StoreItemId,
    SystemType, TransactionId, UserId,
};
use pamlogix_host::{Clock, DynHost, Iap, IapStore, Storage, Wallet};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;

type Hooks = RwLock<EconomyHooks>;

#[derive(Default)]
struct EconomyHooks {
    on_reward_create: Option<Box<dyn Fn(&mut RewardConfig) + Send + Sync>>,
    on_reward_roll: Option<Box<dyn Fn(&UserId, &mut pamlogix_core::Reward) + Send + Sync>>,
    on_reward_grant: Option<Box<dyn Fn(&UserId, &mut RewardGrantOutcome) + Send + Sync>>,
    on_purchase_reward: Option<Box<dyn Fn(&UserId, &mut pamlogix_core::Reward) + Send + Sync>>,
}

pub struct EconomyEngine {
    host: DynHost,
    config: EconomyConfig,
    registry: RwLock<Option<Arc<dyn pamlogix_core::Pamlogix>>>,
    hooks: Hooks,
}

impl EconomyEngine {
    pub fn new(host: DynHost, config: EconomyConfig) -> Arc<Self> {
        Arc::new(Self { host, config, registry: RwLock::new(None), hooks: RwLock::new(EconomyHooks::default()) })
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn set_on_reward_create(&self, f: impl Fn(&mut RewardConfig) + Send + Sync + 'static) {
        self.hooks.write().on_reward_create = Some(Box::new(f));
    }

    pub fn set_on_reward_roll(&self, f: impl Fn(&UserId, &mut pamlogix_core::Reward) + Send + Sync + 'static) {
        self.hooks.write().on_reward_roll = Some(Box::new(f));
    }

    pub fn set_on_reward_grant(&self, f: impl Fn(&UserId, &mut RewardGrantOutcome) + Send + Sync + 'static) {
        self.hooks.write().on_reward_grant = Some(Box::new(f));
    }

    pub fn set_on_purchase_reward(&self, f: impl Fn(&UserId, &mut pamlogix_core::Reward) + Send + Sync + 'static) {
        self.hooks.write().on_purchase_reward = Some(Box::new(f));
    }

    fn rng(&self) -> StdRng {
        // Seeded from the clock rather than OS entropy so property tests can
        // replay a roll deterministically by pinning the mock clock; callers
        // needing cryptographic unpredictability are expected to sit behind a
        // host that seeds real entropy into the clock channel.
        StdRng::seed_from_u64(self.host.now_unix_sec() as u64 ^ 0x9E3779B97F4A7C15)
    }

    async fn collaborators(&self) -> GrantCollaborators<'_> {
        let registry = self.registry.read().clone();
        GrantCollaborators {
            wallet: self.host.as_ref(),
            energy: registry.as_ref().and_then(|r| r.get_energy()),
            inventory: registry.as_ref().and_then(|r| r.get_inventory()),
        }
    }

    async fn read_user_state(&self, user_id: &UserId) -> Result<UserEconomyState, PamlogixError> {
        match self.host.read("economy", "user_economy", Some(user_id)).await? {
            Some(record) => serde_json::from_str(&record.value)
                .map_err(|e| internal("EconomyStateCorrupt", e.to_string())),
            None => Ok(UserEconomyState::default()),
        }
    }

    async fn write_user_state(&self, user_id: &UserId, state: &UserEconomyState) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(state).map_err(|e| internal("EconomyStateSerialize", e.to_string()))?;
        self.host.write("economy", "user_economy", Some(user_id), value, None).await?;
        Ok(())
    }

    async fn read_intent(&self, user_id: &UserId, item_id: &StoreItemId) -> Result<Option<PurchaseIntent>, PamlogixError> {
        let key = format!("purchase_intent:{}:{}", user_id.0, item_id.0);
        match self.host.read("purchase_intents", &key, None).await? {
            Some(record) => Ok(Some(
                serde_json::from_str(&record.value).map_err(|e| internal("EconomyIntentCorrupt", e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    async fn write_intent(&self, intent: &PurchaseIntent) -> Result<(), PamlogixError> {
        let key = format!("purchase_intent:{}:{}", intent.user_id.0, intent.item_id.0);
        let value = serde_json::to_string(intent).map_err(|e| internal("EconomyIntentSerialize", e.to_string()))?;
        self.host.write("purchase_intents", &key, None, value, None).await?;
        Ok(())
    }

    async fn read_donation(&self, donation_id: &str) -> Result<DonationState, PamlogixError> {
        let key = format!("donation:{donation_id}");
        match self.host.read("economy", &key, None).await? {
            Some(record) => serde_json::from_str(&record.value).map_err(|e| internal("EconomyDonationCorrupt", e.to_string())),
            None => Ok(DonationState { donation_id: donation_id.to_string(), create_time_sec: self.host.now_unix_sec(), ..Default::default() }),
        }
    }

    async fn write_donation(&self, donation: &DonationState) -> Result<(), PamlogixError> {
        let key = format!("donation:{}", donation.donation_id);
        let value = serde_json::to_string(donation).map_err(|e| internal("EconomyDonationSerialize", e.to_string()))?;
        self.host.write("economy", &key, None, value, None).await?;
        Ok(())
    }

    fn store_item(&self, item_id: &StoreItemId) -> Result<&crate::config::StoreItemConfig, PamlogixError> {
        self.config.store_items.get(item_id).ok_or_else(|| errors::unknown_store_item(&item_id.0))
    }

    fn donation_config(&self, donation_id: &str) -> Result<&crate::config::DonationConfig, PamlogixError> {
        self.config.donations.get(donation_id).ok_or_else(|| errors::unknown_donation(donation_id))
    }

    fn placement_config(&self, placement_id: &str) -> Result<&crate::config::PlacementConfig, PamlogixError> {
        self.config.placements.get(placement_id).ok_or_else(|| errors::unknown_placement(placement_id))
    }
}

/// Full public surface named in `spec.md` §4.2.
#[async_trait]
pub trait EconomySystem: Send + Sync {
    fn reward_create(&self, config: RewardConfig) -> Result<RewardConfig, PamlogixError>;
    fn reward_convert(&self, config: &RewardConfig) -> AvailableRewards;
    async fn reward_roll(&self, user_id: &UserId, config: &RewardConfig) -> Result<pamlogix_core::Reward, PamlogixError>;
    async fn reward_grant(
        &self,
        user_id: &UserId,
        reward: pamlogix_core::Reward,
        metadata: HashMap<String, String>,
        ignore_limits: bool,
    ) -> Result<RewardGrantOutcome, PamlogixError>;
    /// Currently active (non-expired) generic reward modifiers for `user_id`.
    async fn active_modifiers(&self, user_id: &UserId) -> Result<Vec<pamlogix_core::GrantedModifier>, PamlogixError>;
    fn list(&self) -> Vec<StoreItemId>;
    async fn grant(
        &self,
        user_id: &UserId,
        currencies: HashMap<String, i64>,
        items: HashMap<ItemDefId, i64>,
        modifiers: Vec<ModifierRange>,
        metadata: HashMap<String, String>,
    ) -> Result<RewardGrantOutcome, PamlogixError>;
    async fn unmarshal_wallet(&self, user_id: &UserId) -> Result<HashMap<String, i64>, PamlogixError>;

    async fn donation_request(&self, donation_id: &str) -> Result<DonationState, PamlogixError>;
    async fn donation_give(&self, user_id: &UserId, donation_id: &str) -> Result<DonationState, PamlogixError>;
    async fn donation_claim(&self, user_id: &UserId, donation_id: &str) -> Result<pamlogix_core::Reward, PamlogixError>;
    async fn donation_get(&self, donation_id: &str) -> Result<DonationState, PamlogixError>;

    async fn purchase_intent(&self, user_id: &UserId, item_id: &StoreItemId) -> Result<(), PamlogixError>;
    async fn purchase_item(
        &self,
        user_id: &UserId,
        item_id: &StoreItemId,
        store: IapStore,
        receipt: &str,
    ) -> Result<RewardGrantOutcome, PamlogixError>;
    async fn purchase_restore(
        &self,
        user_id: &UserId,
        store: IapStore,
        receipts: Vec<String>,
    ) -> Result<Vec<TransactionId>, PamlogixError>;

    async fn placement_start(&self, user_id: &UserId, placement_id: &str) -> Result<String, PamlogixError>;
    async fn placement_status(&self, user_id: &UserId, reference_id: &str) -> Result<String, PamlogixError>;
    async fn placement_success(
        &self,
        user_id: &UserId,
        reference_id: &str,
    ) -> Result<RewardGrantOutcome, PamlogixError>;
    async fn placement_fail(&self, user_id: &UserId, reference_id: &str) -> Result<(), PamlogixError>;
}

#[async_trait]
impl EconomySystem for EconomyEngine {
    fn reward_create(&self, mut config: RewardConfig) -> Result<RewardConfig, PamlogixError> {
        if config.weighted.iter().any(|w| w.weight == 0) {
            return Err(errors::invalid_reward_config("weighted bundle with zero weight"));
        }
        if let Some(f) = &self.hooks.read().on_reward_create {
            f(&mut config);
        }
        Ok(config)
    }

    fn reward_convert(&self, config: &RewardConfig) -> AvailableRewards {
        AvailableRewards::from(config)
    }

    async fn reward_roll(&self, user_id: &UserId, config: &RewardConfig) -> Result<pamlogix_core::Reward, PamlogixError> {
        let now = self.host.now_unix_sec();
        let mut rng = self.rng();
        let mut reward = roll_reward_config(&mut rng, config, now);
        if let Some(f) = &self.hooks.read().on_reward_roll {
            f(user_id, &mut reward);
        }
        Ok(reward)
    }

    async fn reward_grant(
        &self,
        user_id: &UserId,
        reward: pamlogix_core::Reward,
        metadata: HashMap<String, String>,
        ignore_limits: bool,
    ) -> Result<RewardGrantOutcome, PamlogixError> {
        let granted_modifiers = reward.modifiers.clone();
        let mut outcome =
            grant_reward(user_id, reward, metadata, ignore_limits, self.collaborators().await).await?;
        if !granted_modifiers.is_empty() {
            let mut state = self.read_user_state(user_id).await?;
            let now = self.host.now_unix_sec();
            state.prune_expired_modifiers(now);
            state.active_modifiers.extend(granted_modifiers);
            self.write_user_state(user_id, &state).await?;
        }
        if let Some(f) = &self.hooks.read().on_reward_grant {
            f(user_id, &mut outcome);
        }
        Ok(outcome)
    }

    async fn active_modifiers(&self, user_id: &UserId) -> Result<Vec<pamlogix_core::GrantedModifier>, PamlogixError> {
        let mut state = self.read_user_state(user_id).await?;
        let now = self.host.now_unix_sec();
        state.prune_expired_modifiers(now);
        Ok(state.active_modifiers)
    }

    fn list(&self) -> Vec<StoreItemId> {
        self.config.store_items.keys().cloned().collect()
    }

    async fn grant(
        &self,
        user_id: &UserId,
        currencies: HashMap<String, i64>,
        items: HashMap<ItemDefId, i64>,
        modifiers: Vec<ModifierRange>,
        metadata: HashMap<String, String>,
    ) -> Result<RewardGrantOutcome, PamlogixError> {
        let now = self.host.now_unix_sec();
        let mut reward = pamlogix_core::Reward::empty(now);
        reward.currencies = currencies;
        reward.items = items
            .into_iter()
            .map(|(item_id, count)| pamlogix_core::RewardItem { item_id, count, instances: Vec::new() })
            .collect();
        reward.modifiers = modifiers
            .into_iter()
            .map(|m| pamlogix_core::GrantedModifier {
                modifier_id: m.modifier_id,
                operator: m.operator,
                value: m.value.min as f64,
                start_time_sec: now,
                expire_time_sec: now + m.duration_sec.min,
            })
            .collect();
        self.reward_grant(user_id, reward, metadata, false).await
    }

    async fn unmarshal_wallet(&self, user_id: &UserId) -> Result<HashMap<String, i64>, PamlogixError> {
        unmarshal_wallet(self.host.get(user_id).await?)
    }

    async fn donation_request(&self, donation_id: &str) -> Result<DonationState, PamlogixError> {
        self.donation_config(donation_id)?;
        self.read_donation(donation_id).await
    }

    async fn donation_give(&self, user_id: &UserId, donation_id: &str) -> Result<DonationState, PamlogixError> {
        let cfg = self.donation_config(donation_id)?.clone();
        let mut donation = self.read_donation(donation_id).await?;
        if donation.count >= cfg.max_count {
            return Err(errors::donation_full(donation_id));
        }
        let contributed = donation.contributions.get(&user_id.0).copied().unwrap_or(0);
        if cfg.user_contribution_max_count > 0 && contributed >= cfg.user_contribution_max_count {
            return Err(errors::donation_contribution_cap(donation_id));
        }
        if !cfg.cost_currencies.is_empty() {
            let mut deltas = HashMap::new();
            for (currency, cost) in &cfg.cost_currencies {
                deltas.insert(currency.clone(), -*cost);
            }
            self.host.update(user_id, &deltas, HashMap::new(), true).await?;
        }
        donation.count += 1;
        *donation.contributions.entry(user_id.0.clone()).or_insert(0) += 1;
        self.write_donation(&donation).await?;

        if cfg.contributor_reward.guaranteed.is_none() && cfg.contributor_reward.weighted.is_empty() {
            return Ok(donation);
        }
        let reward = self.reward_roll(user_id, &cfg.contributor_reward).await?;
        self.reward_grant(user_id, reward, HashMap::new(), false).await?;
        Ok(donation)
    }

    async fn donation_claim(&self, user_id: &UserId, donation_id: &str) -> Result<pamlogix_core::Reward, PamlogixError> {
        let cfg = self.donation_config(donation_id)?.clone();
        let mut donation = self.read_donation(donation_id).await?;
        if donation.claimed_by.contains(user_id) {
            return Err(errors::donation_already_claimed(donation_id));
        }
        let reward = self.reward_roll(user_id, &cfg.recipient_reward).await?;
        self.reward_grant(user_id, reward.clone(), HashMap::new(), false).await?;
        donation.claimed_by.push(user_id.clone());
        self.write_donation(&donation).await?;
        Ok(reward)
    }

    async fn donation_get(&self, donation_id: &str) -> Result<DonationState, PamlogixError> {
        self.donation_config(donation_id)?;
        self.read_donation(donation_id).await
    }

    async fn purchase_intent(&self, user_id: &UserId, item_id: &StoreItemId) -> Result<(), PamlogixError> {
        self.store_item(item_id)?;
        let intent = PurchaseIntent {
            user_id: user_id.clone(),
            item_id: item_id.clone(),
            create_time_sec: self.host.now_unix_sec(),
            consumed: false,
        };
        self.write_intent(&intent).await
    }

    async fn purchase_item(
        &self,
        user_id: &UserId,
        item_id: &StoreItemId,
        store: IapStore,
        receipt: &str,
    ) -> Result<RewardGrantOutcome, PamlogixError> {
        let item_cfg = self.store_item(item_id)?.clone();
        let mut intent = self
            .read_intent(user_id, item_id)
            .await?
            .ok_or_else(|| errors::no_pending_intent(&item_id.0))?;
        if intent.consumed {
            return Err(errors::no_pending_intent(&item_id.0));
        }

        let validation = self.host.validate_receipt(store, user_id, receipt).await?;
        let mut state = self.read_user_state(user_id).await?;
        if state.has_transaction(&validation.transaction_id) {
            return Err(errors::duplicate_transaction(&validation.transaction_id.0));
        }

        intent.consumed = true;
        self.write_intent(&intent).await?;
        state.transactions.push(PurchaseTransaction {
            transaction_id: validation.transaction_id,
            item_id: item_id.clone(),
            sandbox: validation.sandbox,
            create_time_sec: self.host.now_unix_sec(),
        });
        self.write_user_state(user_id, &state).await?;

        // IAP purchases bypass the in-game cost path entirely; cost maps on a
        // store item exist for non-IAP "soft currency" store items reusing
        // the same catalogue, not for purchases validated here.
        let mut reward = self.reward_roll(user_id, &item_cfg.reward).await?;
        if let Some(f) = &self.hooks.read().on_purchase_reward {
            f(user_id, &mut reward);
        }
        self.reward_grant(user_id, reward, HashMap::new(), false).await
    }

    async fn purchase_restore(
        &self,
        user_id: &UserId,
        _store: IapStore,
        receipts: Vec<String>,
    ) -> Result<Vec<TransactionId>, PamlogixError> {
        let state = self.read_user_state(user_id).await?;
        // Receipts already recorded as processed transactions are reported
        // back verbatim; unknown receipts are silently ignored (the host's
        // IAP validator, not this engine, is the source of truth for whether
        // a receipt is legitimate at all).
        Ok(state.transactions.iter().filter(|t| receipts.is_empty() || receipts.contains(&t.transaction_id.0)).map(|t| t.transaction_id.clone()).collect())
    }

    async fn placement_start(&self, user_id: &UserId, placement_id: &str) -> Result<String, PamlogixError> {
        self.placement_config(placement_id)?;
        let mut state = self.read_user_state(user_id).await?;
        let reference_id = format!("{placement_id}:{}", self.host.now_unix_sec());
        state.placements.insert(
            reference_id.clone(),
            PlacementRecord {
                reference_id: reference_id.clone(),
                placement_id: placement_id.to_string(),
                state: PlacementState::Started,
                start_time_sec: self.host.now_unix_sec(),
            },
        );
        self.write_user_state(user_id, &state).await?;
        Ok(reference_id)
    }

    async fn placement_status(&self, user_id: &UserId, reference_id: &str) -> Result<String, PamlogixError> {
        let state = self.read_user_state(user_id).await?;
        let record = state.placements.get(reference_id).ok_or_else(|| errors::placement_not_started(reference_id))?;
        Ok(match record.state {
            PlacementState::Started => "started".to_string(),
            PlacementState::Succeeded => "succeeded".to_string(),
            PlacementState::Failed => "failed".to_string(),
        })
    }

    async fn placement_success(&self, user_id: &UserId, reference_id: &str) -> Result<RewardGrantOutcome, PamlogixError> {
        let mut state = self.read_user_state(user_id).await?;
        let record = state.placements.get_mut(reference_id).ok_or_else(|| errors::placement_not_started(reference_id))?;
        if record.state != PlacementState::Started {
            return Err(precondition_failed("EconomyPlacementAlreadyResolved", reference_id.to_string()));
        }
        let placement_id = record.placement_id.clone();
        record.state = PlacementState::Succeeded;
        self.write_user_state(user_id, &state).await?;

        let cfg = self.placement_config(&placement_id)?.clone();
        let reward = self.reward_roll(user_id, &cfg.reward).await?;
        self.reward_grant(user_id, reward, HashMap::new(), false).await
    }

    async fn placement_fail(&self, user_id: &UserId, reference_id: &str) -> Result<(), PamlogixError> {
        let mut state = self.read_user_state(user_id).await?;
        let record = state.placements.get_mut(reference_id).ok_or_else(|| errors::placement_not_started(reference_id))?;
        record.state = PlacementState::Failed;
        self.write_user_state(user_id, &state).await?;
        Ok(())
    }
}

#[async_trait]
impl EconomyApi for EconomyEngine {
    async fn reward_roll(&self, user_id: &UserId, config: &RewardConfig) -> Result<pamlogix_core::Reward, PamlogixError> {
        EconomySystem::reward_roll(self, user_id, config).await
    }

    async fn reward_grant(
        &self,
        user_id: &UserId,
        reward: pamlogix_core::Reward,
        metadata: HashMap<String, String>,
        ignore_limits: bool,
    ) -> Result<RewardGrantOutcome, PamlogixError> {
        EconomySystem::reward_grant(self, user_id, reward, metadata, ignore_limits).await
    }
}

impl PamlogixSystem for EconomyEngine {
    fn system_type(&self) -> SystemType {
        SystemType::Economy
    }

    fn set_pamlogix(&self, registry: Arc<dyn pamlogix_core::Pamlogix>) {
        *self.registry.write() = Some(registry);
    }
}

impl std::fmt::Debug for EconomyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EconomyEngine").finish_non_exhaustive()
    }
}
