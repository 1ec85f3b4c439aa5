//! The energy engine: timed refills, grant-amount/bucket-parameter
//! modifiers, and daily-UTC scheduled resets (`spec.md` §4.4).

use crate::config::{DailyResetConfig, EnergyConfig};
use crate::errors;
use crate::refill;
use async_trait::async_trait;
use pamlogix_core::{
    internal, ActiveEnergyModifier, EnergyApi, EnergyBucket, GrantedEnergyModifier, PamlogixError,
    PamlogixSystem, SystemType, UserEnergies, UserId,
};
use pamlogix_host::{Clock, DynHost, Storage};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type ConfigSource = Box<dyn Fn() -> EnergyConfig + Send + Sync>;

#[derive(Default)]
struct EnergyHooks {
    on_spend_reward: Option<Box<dyn Fn(&UserId, &str, i64) + Send + Sync>>,
}

pub struct EnergyEngine {
    host: DynHost,
    base_config: EnergyConfig,
    config_source: RwLock<Option<ConfigSource>>,
    registry: RwLock<Option<Arc<dyn pamlogix_core::Pamlogix>>>,
    hooks: RwLock<EnergyHooks>,
}

impl EnergyEngine {
    pub fn new(host: DynHost, config: EnergyConfig) -> Arc<Self> {
        Arc::new(Self {
            host,
            base_config: config,
            config_source: RwLock::new(None),
            registry: RwLock::new(None),
            hooks: RwLock::new(EnergyHooks::default()),
        })
    }

    pub fn set_config_source(&self, f: impl Fn() -> EnergyConfig + Send + Sync + 'static) {
        *self.config_source.write() = Some(Box::new(f));
    }

    /// `spec.md` §4.4 `SetOnSpendReward(fn)`: invoked after a successful
    /// spend with the energy id and the amount actually deducted.
    pub fn set_on_spend_reward(&self, f: impl Fn(&UserId, &str, i64) + Send + Sync + 'static) {
        self.hooks.write().on_spend_reward = Some(Box::new(f));
    }

    fn config(&self) -> EnergyConfig {
        match self.config_source.read().as_ref() {
            Some(f) => f(),
            None => self.base_config.clone(),
        }
    }

    async fn read_state(&self, user_id: &UserId) -> Result<UserEnergies, PamlogixError> {
        match self.host.read("energy", "user_energies", Some(user_id)).await? {
            Some(record) => {
                serde_json::from_str(&record.value).map_err(|e| internal("EnergyStateCorrupt", e.to_string()))
            }
            None => Ok(UserEnergies::default()),
        }
    }

    async fn write_state(&self, user_id: &UserId, state: &UserEnergies) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(state).map_err(|e| internal("EnergyStateSerialize", e.to_string()))?;
        self.host.write("energy", "user_energies", Some(user_id), value, None).await?;
        Ok(())
    }

    fn bucket_or_new(config: &EnergyConfig, state: &mut UserEnergies, energy_id: &str, now: i64) -> Result<(), PamlogixError> {
        if state.buckets.contains_key(energy_id) {
            return Ok(());
        }
        let cfg = config.buckets.get(energy_id).ok_or_else(|| errors::unknown_bucket(energy_id))?;
        let start = cfg.start_current.unwrap_or(cfg.max);
        state.buckets.insert(
            energy_id.to_string(),
            EnergyBucket {
                energy_id: energy_id.to_string(),
                current: start.clamp(0, cfg.max + cfg.max_overfill.max(0)),
                max: cfg.max,
                max_overfill: cfg.max_overfill,
                refill_amount: cfg.refill_amount,
                refill_period_sec: cfg.refill_period_sec,
                start_refill_time_sec: now,
                next_refill_time_sec: if start >= cfg.max { 0 } else { now + cfg.refill_period_sec },
                max_refill_time_sec: now,
                modifiers: Vec::new(),
                last_reset_time_sec: 0,
            },
        );
        Ok(())
    }

    /// Re-sync a bucket's static parameters from the catalogue (config can
    /// change under a hot-reloaded `config_source`) and run the refill pass.
    fn sync_and_refill(config: &EnergyConfig, bucket: &mut EnergyBucket, now: i64) {
        if let Some(cfg) = config.buckets.get(&bucket.energy_id) {
            bucket.max = cfg.max;
            bucket.max_overfill = cfg.max_overfill;
            bucket.refill_amount = cfg.refill_amount;
            bucket.refill_period_sec = cfg.refill_period_sec;
        }
        refill::apply_refill(bucket, now);
    }
}

/// Full public surface named in `spec.md` §4.4.
#[async_trait]
pub trait EnergySystem: Send + Sync {
    async fn get(&self, user_id: &UserId, energy_id: &str) -> Result<EnergyBucket, PamlogixError>;
    async fn get_all(&self, user_id: &UserId) -> Result<HashMap<String, EnergyBucket>, PamlogixError>;
    async fn spend(
        &self,
        user_id: &UserId,
        amounts: &HashMap<String, i64>,
    ) -> Result<HashMap<String, EnergyBucket>, PamlogixError>;
    async fn grant(
        &self,
        user_id: &UserId,
        amounts: &HashMap<String, i64>,
        modifiers: &[GrantedEnergyModifier],
    ) -> Result<HashMap<String, EnergyBucket>, PamlogixError>;
    /// `spec.md` §4.4 `ResetEnergyAtUTC(hour,min)`: idempotent daily reset —
    /// no-op if the next boundary since `last_reset_time_sec` has not passed.
    async fn reset_energy_at_utc(
        &self,
        user_id: &UserId,
        energy_id: &str,
        reset: DailyResetConfig,
    ) -> Result<EnergyBucket, PamlogixError>;
    /// `spec.md` §4.4 `GetWithDailyReset(resetConfigs)`, pluralized per
    /// `SPEC_FULL.md` §4.4: apply every configured reset boundary that has
    /// passed since `last_reset_time_sec` before returning the bucket.
    async fn get_with_daily_reset(
        &self,
        user_id: &UserId,
        energy_id: &str,
        resets: &[DailyResetConfig],
    ) -> Result<EnergyBucket, PamlogixError>;
}

/// The most recent daily reset boundary (unix seconds) at or before `now`
/// for a given UTC `(hour, minute)` slot, using plain day arithmetic (no
/// `chrono` dependency in this crate — the energy crate only ever needs this
/// one calendar computation).
fn last_boundary_before(now: i64, reset: DailyResetConfig) -> i64 {
    const DAY: i64 = 86_400;
    let day_start = now.div_euclid(DAY) * DAY;
    let boundary = day_start + reset.hour as i64 * 3600 + reset.minute as i64 * 60;
    if boundary <= now {
        boundary
    } else {
        boundary - DAY
    }
}

fn apply_daily_resets(bucket: &mut EnergyBucket, config: &EnergyConfig, resets: &[DailyResetConfig], now: i64) {
    let most_recent = resets.iter().map(|r| last_boundary_before(now, *r)).max();
    if let Some(boundary) = most_recent {
        if boundary > bucket.last_reset_time_sec {
            let max = config.buckets.get(&bucket.energy_id).map(|c| c.max).unwrap_or(bucket.max);
            bucket.current = max;
            bucket.last_reset_time_sec = boundary;
        }
    }
}

#[async_trait]
impl EnergySystem for EnergyEngine {
    async fn get(&self, user_id: &UserId, energy_id: &str) -> Result<EnergyBucket, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::bucket_or_new(&config, &mut state, energy_id, now)?;
        let bucket = state.buckets.get_mut(energy_id).expect("just inserted");
        Self::sync_and_refill(&config, bucket, now);
        let result = bucket.clone();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn get_all(&self, user_id: &UserId) -> Result<HashMap<String, EnergyBucket>, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        for energy_id in config.buckets.keys() {
            Self::bucket_or_new(&config, &mut state, energy_id, now)?;
        }
        for bucket in state.buckets.values_mut() {
            Self::sync_and_refill(&config, bucket, now);
        }
        let result = state.buckets.clone();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn spend(
        &self,
        user_id: &UserId,
        amounts: &HashMap<String, i64>,
    ) -> Result<HashMap<String, EnergyBucket>, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;

        for energy_id in amounts.keys() {
            Self::bucket_or_new(&config, &mut state, energy_id, now)?;
        }
        for (energy_id, bucket) in state.buckets.iter_mut() {
            if amounts.contains_key(energy_id) {
                Self::sync_and_refill(&config, bucket, now);
            }
        }
        for (energy_id, &amount) in amounts {
            if amount <= 0 {
                continue;
            }
            let bucket = state.buckets.get(energy_id).expect("synced above");
            if bucket.current < amount {
                return Err(errors::insufficient_energy(energy_id, amount, bucket.current));
            }
        }
        for (energy_id, &amount) in amounts {
            if amount <= 0 {
                continue;
            }
            let bucket = state.buckets.get_mut(energy_id).expect("synced above");
            bucket.current -= amount;
            refill::apply_refill(bucket, now);
            if let Some(f) = &self.hooks.read().on_spend_reward {
                f(user_id, energy_id, amount);
            }
        }

        let result: HashMap<String, EnergyBucket> =
            amounts.keys().filter_map(|id| state.buckets.get(id).map(|b| (id.clone(), b.clone()))).collect();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn grant(
        &self,
        user_id: &UserId,
        amounts: &HashMap<String, i64>,
        modifiers: &[GrantedEnergyModifier],
    ) -> Result<HashMap<String, EnergyBucket>, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;

        let mut touched: Vec<String> = amounts.keys().cloned().collect();
        for m in modifiers {
            if !touched.contains(&m.energy_id) {
                touched.push(m.energy_id.clone());
            }
        }
        for energy_id in &touched {
            Self::bucket_or_new(&config, &mut state, energy_id, now)?;
        }
        for energy_id in &touched {
            let bucket = state.buckets.get_mut(energy_id).expect("just inserted");
            Self::sync_and_refill(&config, bucket, now);
        }

        for (energy_id, &amount) in amounts {
            if amount <= 0 {
                continue;
            }
            let bucket = state.buckets.get_mut(energy_id).expect("synced above");
            let raw = refill::apply_grant_modifiers(bucket, amount, now);
            let cap = bucket.max + bucket.max_overfill.max(0);
            bucket.current = (bucket.current + raw).min(cap).max(0);
            refill::apply_refill(bucket, now);
        }

        for m in modifiers {
            let bucket = state.buckets.get_mut(&m.energy_id).expect("synced above");
            refill::push_modifier(bucket, ActiveEnergyModifier::from(m.clone()));
            refill::apply_refill(bucket, now);
        }

        let result: HashMap<String, EnergyBucket> =
            touched.iter().filter_map(|id| state.buckets.get(id).map(|b| (id.clone(), b.clone()))).collect();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn reset_energy_at_utc(
        &self,
        user_id: &UserId,
        energy_id: &str,
        reset: DailyResetConfig,
    ) -> Result<EnergyBucket, PamlogixError> {
        self.get_with_daily_reset(user_id, energy_id, &[reset]).await
    }

    async fn get_with_daily_reset(
        &self,
        user_id: &UserId,
        energy_id: &str,
        resets: &[DailyResetConfig],
    ) -> Result<EnergyBucket, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::bucket_or_new(&config, &mut state, energy_id, now)?;
        let bucket = state.buckets.get_mut(energy_id).expect("just inserted");
        Self::sync_and_refill(&config, bucket, now);
        apply_daily_resets(bucket, &config, resets, now);
        refill::apply_refill(bucket, now);
        let result = bucket.clone();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }
}

#[async_trait]
impl EnergyApi for EnergyEngine {
    async fn grant(
        &self,
        user_id: &UserId,
        amounts: &HashMap<String, i64>,
        modifiers: &[GrantedEnergyModifier],
    ) -> Result<(), PamlogixError> {
        EnergySystem::grant(self, user_id, amounts, modifiers).await?;
        Ok(())
    }

    async fn spend(&self, user_id: &UserId, amounts: &HashMap<String, i64>) -> Result<(), PamlogixError> {
        EnergySystem::spend(self, user_id, amounts).await?;
        Ok(())
    }

    async fn get_all(&self, user_id: &UserId) -> Result<HashMap<String, i64>, PamlogixError> {
        let buckets = EnergySystem::get_all(self, user_id).await?;
        Ok(buckets.into_iter().map(|(id, b)| (id, b.current)).collect())
    }
}

impl PamlogixSystem for EnergyEngine {
    fn system_type(&self) -> SystemType {
        SystemType::Energy
    }

    fn set_pamlogix(&self, registry: Arc<dyn pamlogix_core::Pamlogix>) {
        *self.registry.write() = Some(registry);
    }
}

impl std::fmt::Debug for EnergyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnergyEngine").finish_non_exhaustive()
    }
}
