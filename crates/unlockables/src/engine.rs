//! The unlockables engine: fixed active-slot scheduler, FIFO waiting queue,
//! pro-rated purchase cost, random weighted creation (`spec.md` §4.8).

use crate::config::{UnlockableDefConfig, UnlockablesConfig};
use crate::errors;
use crate::state::{UnlockableInstance, UnlockablesList, UserUnlockablesState};
use async_trait::async_trait;
use pamlogix_core::{PamlogixError, PamlogixSystem, SystemType, UnlockableId, UnlockableInstanceId, UserId};
use pamlogix_host::{Clock, DynHost, Storage, Wallet};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type ConfigSource = Box<dyn Fn() -> UnlockablesConfig + Send + Sync>;

#[derive(Default)]
struct UnlockablesHooks {
    on_claim_reward: Option<Box<dyn Fn(&UserId, &mut pamlogix_core::Reward) + Send + Sync>>,
}

pub struct UnlockablesEngine {
    host: DynHost,
    base_config: UnlockablesConfig,
    config_source: RwLock<Option<ConfigSource>>,
    registry: RwLock<Option<Arc<dyn pamlogix_core::Pamlogix>>>,
    hooks: RwLock<UnlockablesHooks>,
    id_seed: AtomicU64,
}

impl UnlockablesEngine {
    pub fn new(host: DynHost, config: UnlockablesConfig) -> Arc<Self> {
        Arc::new(Self {
            host,
            base_config: config,
            config_source: RwLock::new(None),
            registry: RwLock::new(None),
            hooks: RwLock::new(UnlockablesHooks::default()),
            id_seed: AtomicU64::new(0),
        })
    }

    pub fn set_config_source(&self, f: impl Fn() -> UnlockablesConfig + Send + Sync + 'static) {
        *self.config_source.write() = Some(Box::new(f));
    }

    /// `spec.md` §4.8 `SetOnClaimReward(fn)`.
    pub fn set_on_claim_reward(&self, f: impl Fn(&UserId, &mut pamlogix_core::Reward) + Send + Sync + 'static) {
        self.hooks.write().on_claim_reward = Some(Box::new(f));
    }

    fn config(&self) -> UnlockablesConfig {
        match self.config_source.read().as_ref() {
            Some(f) => f(),
            None => self.base_config.clone(),
        }
    }

    fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.host.now_unix_sec() as u64 ^ self.id_seed.fetch_add(1, Ordering::SeqCst) ^ 0xA24BAED4963EE407)
    }

    fn next_instance_id(&self, unlockable_id: &UnlockableId) -> UnlockableInstanceId {
        let seed = self.id_seed.fetch_add(1, Ordering::SeqCst);
        UnlockableInstanceId::from(format!("unlockable:{}:{}:{}", unlockable_id, self.host.now_unix_sec(), seed))
    }

    async fn read_state(&self, user_id: &UserId) -> Result<UserUnlockablesState, PamlogixError> {
        match self.host.read("unlockables", "user_unlockables", Some(user_id)).await? {
            Some(record) => {
                serde_json::from_str(&record.value).map_err(|e| errors::state_corrupt(e.to_string()))
            }
            None => Ok(UserUnlockablesState::default()),
        }
    }

    async fn write_state(&self, user_id: &UserId, state: &UserUnlockablesState) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(state).map_err(|e| errors::state_corrupt(e.to_string()))?;
        self.host.write("unlockables", "user_unlockables", Some(user_id), value, None).await?;
        Ok(())
    }

    fn ensure_scheduler_params(config: &UnlockablesConfig, list: &mut UnlockablesList) {
        if list.slots == 0 {
            list.slots = config.slots;
        }
        if list.active_slots == 0 {
            list.active_slots = config.active_slots;
        }
        if list.max_active_slots == 0 {
            list.max_active_slots = config.max_active_slots;
        }
        if list.max_queued_unlocks == 0 {
            list.max_queued_unlocks = config.max_queued_unlocks;
        }
        if list.slot_cost.is_empty() {
            list.slot_cost = config.slot_cost.clone();
        }
    }

    /// Marks any instance whose unlock timer has elapsed as claimable, then
    /// drains the FIFO queue into any slot a `Claim` has freed (`spec.md`
    /// §4.8 "Scheduler"; §8 scenario 6 ties queue auto-start to `Claim`, not
    /// to a timer merely elapsing — a completed-but-unclaimed instance
    /// still occupies its slot).
    fn run_scheduler(list: &mut UnlockablesList, now: i64) {
        for item in list.items.iter_mut() {
            if item.unlock_start_time_sec > 0 && !item.can_claim {
                let elapsed = (now - item.unlock_start_time_sec) + item.advance_time_sec;
                if elapsed >= item.wait_time_sec {
                    item.can_claim = true;
                    item.unlock_complete_time_sec = item.unlock_start_time_sec + item.wait_time_sec;
                }
            }
        }

        loop {
            let occupied = list.items.iter().filter(|i| i.unlock_start_time_sec > 0).count() as u32;
            if occupied >= list.active_slots {
                break;
            }
            let Some(next_id) = list.queued.first().cloned() else { break };
            list.queued.remove(0);
            if let Some(item) = list.items.iter_mut().find(|i| i.instance_id == next_id) {
                item.unlock_start_time_sec = now;
                item.advance_time_sec = 0;
            }
        }
    }

    fn pick_random_def<'a>(config: &'a UnlockablesConfig, rng: &mut impl Rng) -> Result<&'a UnlockableDefConfig, PamlogixError> {
        let weighted: Vec<&UnlockableDefConfig> = config.defs.values().filter(|d| d.probability > 0.0).collect();
        let total: f64 = weighted.iter().map(|d| d.probability).sum();
        if weighted.is_empty() || total <= 0.0 {
            return Err(errors::no_probability_weights());
        }
        let mut roll = rng.gen_range(0.0..total);
        for def in &weighted {
            if roll < def.probability {
                return Ok(def);
            }
            roll -= def.probability;
        }
        Ok(weighted[weighted.len() - 1])
    }

    async fn spend_currencies(&self, user_id: &UserId, cost: &HashMap<String, i64>) -> Result<(), PamlogixError> {
        if cost.is_empty() {
            return Ok(());
        }
        let wallet = self.host.get(user_id).await?;
        for (currency_id, amount) in cost {
            if wallet.get(currency_id).copied().unwrap_or(0) < *amount {
                return Err(errors::insufficient_currency(currency_id));
            }
        }
        let deltas: HashMap<String, i64> = cost.iter().map(|(k, v)| (k.clone(), -v)).collect();
        self.host.update(user_id, &deltas, HashMap::new(), true).await?;
        Ok(())
    }
}

/// Full public surface named in `spec.md` §4.8.
#[async_trait]
pub trait UnlockablesSystem: Send + Sync {
    async fn create(
        &self,
        user_id: &UserId,
        unlockable_id: Option<&str>,
        override_config: Option<UnlockableDefConfig>,
    ) -> Result<UnlockableInstance, PamlogixError>;
    async fn get(&self, user_id: &UserId) -> Result<UnlockablesList, PamlogixError>;
    async fn unlock_start(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockableInstance, PamlogixError>;
    async fn unlock_advance(&self, user_id: &UserId, instance_id: &str, seconds: i64) -> Result<UnlockableInstance, PamlogixError>;
    async fn purchase_unlock(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockableInstance, PamlogixError>;
    async fn purchase_slot(&self, user_id: &UserId) -> Result<UnlockablesList, PamlogixError>;
    async fn claim(&self, user_id: &UserId, instance_id: &str) -> Result<pamlogix_core::Reward, PamlogixError>;
    async fn queue_add(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockablesList, PamlogixError>;
    async fn queue_remove(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockablesList, PamlogixError>;
    async fn queue_set(&self, user_id: &UserId, instance_ids: &[String]) -> Result<UnlockablesList, PamlogixError>;
}

#[async_trait]
impl UnlockablesSystem for UnlockablesEngine {
    async fn create(
        &self,
        user_id: &UserId,
        unlockable_id: Option<&str>,
        override_config: Option<UnlockableDefConfig>,
    ) -> Result<UnlockableInstance, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::ensure_scheduler_params(&config, &mut state.list);

        if state.list.items.len() as u32 >= state.list.slots {
            return Err(errors::slots_full());
        }

        let def = match (unlockable_id, &override_config) {
            (_, Some(cfg)) => cfg.clone(),
            (Some(id), None) => config.defs.get(&UnlockableId::from(id)).cloned().ok_or_else(|| errors::unknown_def(id))?,
            (None, None) => {
                let mut rng = self.rng();
                Self::pick_random_def(&config, &mut rng)?.clone()
            }
        };

        let instance_id = self.next_instance_id(&def.id);
        let instance = UnlockableInstance {
            id: def.id.clone(),
            instance_id: instance_id.clone(),
            wait_time_sec: def.wait_time_sec,
            unlock_start_time_sec: 0,
            unlock_complete_time_sec: 0,
            advance_time_sec: 0,
            can_claim: false,
            start_cost: def.start_cost.clone(),
            cost: def.cost.clone(),
        };
        state.list.items.push(instance.clone());
        state.rewards.insert(instance_id.to_string(), def.reward.clone());
        Self::run_scheduler(&mut state.list, now);
        self.write_state(user_id, &state).await?;
        Ok(instance)
    }

    async fn get(&self, user_id: &UserId) -> Result<UnlockablesList, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::ensure_scheduler_params(&config, &mut state.list);
        Self::run_scheduler(&mut state.list, now);
        let result = state.list.clone();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn unlock_start(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockableInstance, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::ensure_scheduler_params(&config, &mut state.list);
        Self::run_scheduler(&mut state.list, now);

        let start_cost = {
            let item = state.list.items.iter().find(|i| i.instance_id.as_str() == instance_id).ok_or_else(|| errors::unknown_instance(instance_id))?;
            if item.unlock_start_time_sec > 0 {
                return Err(errors::already_unlocking(instance_id));
            }
            item.start_cost.clone()
        };

        let occupied = state.list.items.iter().filter(|i| i.unlock_start_time_sec > 0).count() as u32;
        if occupied >= state.list.active_slots {
            if state.list.queued.len() as u32 >= state.list.max_queued_unlocks {
                return Err(errors::queue_full());
            }
            self.spend_currencies(user_id, &start_cost).await?;
            state.list.queued.push(UnlockableInstanceId::from(instance_id));
            self.write_state(user_id, &state).await?;
            let item = state.list.items.iter().find(|i| i.instance_id.as_str() == instance_id).expect("present").clone();
            return Ok(item);
        }

        self.spend_currencies(user_id, &start_cost).await?;
        let item = state.list.items.iter_mut().find(|i| i.instance_id.as_str() == instance_id).expect("present");
        item.unlock_start_time_sec = now;
        item.advance_time_sec = 0;
        let result = item.clone();
        Self::run_scheduler(&mut state.list, now);
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn unlock_advance(&self, user_id: &UserId, instance_id: &str, seconds: i64) -> Result<UnlockableInstance, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::ensure_scheduler_params(&config, &mut state.list);
        Self::run_scheduler(&mut state.list, now);

        {
            let item = state.list.items.iter_mut().find(|i| i.instance_id.as_str() == instance_id).ok_or_else(|| errors::unknown_instance(instance_id))?;
            if item.unlock_start_time_sec == 0 {
                return Err(errors::not_unlocking(instance_id));
            }
            item.advance_time_sec += seconds.max(0);
        }

        Self::run_scheduler(&mut state.list, now);
        let result = state.list.items.iter().find(|i| i.instance_id.as_str() == instance_id).expect("present").clone();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn purchase_unlock(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockableInstance, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::ensure_scheduler_params(&config, &mut state.list);
        Self::run_scheduler(&mut state.list, now);

        let pro_rated = {
            let item = state.list.items.iter().find(|i| i.instance_id.as_str() == instance_id).ok_or_else(|| errors::unknown_instance(instance_id))?;
            if item.unlock_start_time_sec == 0 {
                return Err(errors::not_unlocking(instance_id));
            }
            if item.can_claim {
                return Err(errors::already_claimable(instance_id));
            }
            let elapsed = (now - item.unlock_start_time_sec) + item.advance_time_sec;
            let remaining = (item.wait_time_sec - elapsed).max(0);
            item.cost
                .iter()
                .map(|(currency_id, amount)| {
                    let prorated = ((*amount as i128 * remaining as i128) / item.wait_time_sec.max(1) as i128) as i64;
                    (currency_id.clone(), prorated.max(1))
                })
                .collect::<HashMap<String, i64>>()
        };

        self.spend_currencies(user_id, &pro_rated).await?;

        let item = state.list.items.iter_mut().find(|i| i.instance_id.as_str() == instance_id).expect("present");
        item.can_claim = true;
        item.unlock_complete_time_sec = now;
        let result = item.clone();
        Self::run_scheduler(&mut state.list, now);
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn purchase_slot(&self, user_id: &UserId) -> Result<UnlockablesList, PamlogixError> {
        let config = self.config();
        let mut state = self.read_state(user_id).await?;
        Self::ensure_scheduler_params(&config, &mut state.list);

        if state.list.active_slots >= state.list.max_active_slots {
            return Err(errors::max_active_slots_reached());
        }
        self.spend_currencies(user_id, &state.list.slot_cost.clone()).await?;
        state.list.active_slots += 1;

        let now = self.host.now_unix_sec();
        Self::run_scheduler(&mut state.list, now);
        let result = state.list.clone();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn claim(&self, user_id: &UserId, instance_id: &str) -> Result<pamlogix_core::Reward, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::ensure_scheduler_params(&config, &mut state.list);
        Self::run_scheduler(&mut state.list, now);

        let position = state.list.items.iter().position(|i| i.instance_id.as_str() == instance_id).ok_or_else(|| errors::unknown_instance(instance_id))?;
        if !state.list.items[position].can_claim {
            return Err(errors::not_claimable(instance_id));
        }
        let instance = state.list.items.remove(position);
        let reward_config =
            state.rewards.remove(instance.instance_id.as_str()).unwrap_or_default();

        let registry = self.registry.read().clone();
        let economy = registry.as_ref().and_then(|r| r.get_economy()).ok_or_else(errors::economy_unavailable)?;
        let mut reward = economy.reward_roll(user_id, &reward_config).await?;
        if let Some(f) = &self.hooks.read().on_claim_reward {
            f(user_id, &mut reward);
        }
        economy.reward_grant(user_id, reward.clone(), HashMap::new(), false).await?;

        Self::run_scheduler(&mut state.list, now);
        self.write_state(user_id, &state).await?;
        Ok(reward)
    }

    async fn queue_add(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockablesList, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::ensure_scheduler_params(&config, &mut state.list);
        Self::run_scheduler(&mut state.list, now);

        if !state.list.items.iter().any(|i| i.instance_id.as_str() == instance_id) {
            return Err(errors::unknown_instance(instance_id));
        }
        if state.list.queued.iter().any(|id| id.as_str() == instance_id) {
            return Err(errors::already_queued(instance_id));
        }
        if state.list.queued.len() as u32 >= state.list.max_queued_unlocks {
            return Err(errors::queue_full());
        }
        state.list.queued.push(UnlockableInstanceId::from(instance_id));
        Self::run_scheduler(&mut state.list, now);
        let result = state.list.clone();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn queue_remove(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockablesList, PamlogixError> {
        let mut state = self.read_state(user_id).await?;
        state.list.queued.retain(|id| id.as_str() != instance_id);
        let result = state.list.clone();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn queue_set(&self, user_id: &UserId, instance_ids: &[String]) -> Result<UnlockablesList, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::ensure_scheduler_params(&config, &mut state.list);

        if instance_ids.len() as u32 > state.list.max_queued_unlocks {
            return Err(errors::queue_full());
        }
        state.list.queued = instance_ids.iter().map(|id| UnlockableInstanceId::from(id.as_str())).collect();
        Self::run_scheduler(&mut state.list, now);
        let result = state.list.clone();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }
}

impl PamlogixSystem for UnlockablesEngine {
    fn system_type(&self) -> SystemType {
        SystemType::Unlockables
    }

    fn set_pamlogix(&self, registry: Arc<dyn pamlogix_core::Pamlogix>) {
        *self.registry.write() = Some(registry);
    }
}

impl std::fmt::Debug for UnlockablesEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockablesEngine").finish_non_exhaustive()
    }
}
