//! The streaks engine: CRON-scheduled idle decay and tiered reward claims
//! (`spec.md` §4.6).

use crate::config::{StreakConfig, StreaksConfig};
use crate::errors;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use cron::Schedule;
use pamlogix_core::{EconomyApi, PamlogixError, PamlogixSystem, Reward, Streak, SystemType, UserId, UserStreaks};
use pamlogix_host::{Clock, DynHost, Storage};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

type ConfigSource = Box<dyn Fn() -> StreaksConfig + Send + Sync>;

/// The reward granted for a single claimed tier, surfaced so callers and
/// `SetOnClaimReward` both see the tier that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreakClaimResult {
    pub streak_id: String,
    pub tier_index: usize,
    pub reward: Reward,
}

#[derive(Default)]
struct StreakHooks {
    on_claim_reward: Option<Box<dyn Fn(&UserId, &str, usize, &mut Reward) + Send + Sync>>,
}

pub struct StreaksEngine {
    host: DynHost,
    base_config: StreaksConfig,
    config_source: RwLock<Option<ConfigSource>>,
    registry: RwLock<Option<Arc<dyn pamlogix_core::Pamlogix>>>,
    hooks: RwLock<StreakHooks>,
}

impl StreaksEngine {
    pub fn new(host: DynHost, config: StreaksConfig) -> Arc<Self> {
        Arc::new(Self {
            host,
            base_config: config,
            config_source: RwLock::new(None),
            registry: RwLock::new(None),
            hooks: RwLock::new(StreakHooks::default()),
        })
    }

    pub fn set_config_source(&self, f: impl Fn() -> StreaksConfig + Send + Sync + 'static) {
        *self.config_source.write() = Some(Box::new(f));
    }

    /// `spec.md` §4.6 `SetOnClaimReward(fn)`: invoked with the rolled reward
    /// before it is granted, so callers may adjust it in place.
    pub fn set_on_claim_reward(&self, f: impl Fn(&UserId, &str, usize, &mut Reward) + Send + Sync + 'static) {
        self.hooks.write().on_claim_reward = Some(Box::new(f));
    }

    fn config(&self) -> StreaksConfig {
        match self.config_source.read().as_ref() {
            Some(f) => f(),
            None => self.base_config.clone(),
        }
    }

    async fn read_state(&self, user_id: &UserId) -> Result<UserStreaks, PamlogixError> {
        match self.host.read("streaks", "user_streaks", Some(user_id)).await? {
            Some(record) => {
                serde_json::from_str(&record.value).map_err(|e| errors::state_corrupt(e.to_string()))
            }
            None => Ok(UserStreaks::default()),
        }
    }

    async fn write_state(&self, user_id: &UserId, state: &UserStreaks) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(state).map_err(|e| errors::state_corrupt(e.to_string()))?;
        self.host.write("streaks", "user_streaks", Some(user_id), value, None).await?;
        Ok(())
    }

    fn streak_or_new(state: &mut UserStreaks, streak_id: &str, now: i64) {
        state.streaks.entry(streak_id.to_string()).or_insert_with(|| Streak {
            id: streak_id.into(),
            create_time_sec: now,
            update_time_sec: now,
            ..Default::default()
        });
    }

    /// Apply every CRON boundary that has passed since `update_time_sec`,
    /// decaying `count` and zeroing the current-reset counter (`spec.md`
    /// §4.6 "On any access, if the next scheduled boundary since
    /// update_time_sec has passed, apply idle decay"). Leaves
    /// `update_time_sec` at `now` once decay has been applied so a second
    /// access at the same wall time never double-decays.
    fn apply_idle_decay(cfg: &StreakConfig, streak_id: &str, streak: &mut Streak, now: i64) -> Result<(), PamlogixError> {
        let Some(expr) = &cfg.reset_cron else {
            return Ok(());
        };
        if cfg.idle_count_decay_reset <= 0 || streak.update_time_sec <= 0 || now <= streak.update_time_sec {
            return Ok(());
        }
        let schedule = parse_schedule(streak_id, expr)?;
        let cap = (cfg.max_idle_count_decay / cfg.idle_count_decay_reset).max(0) as usize + 1;
        let periods = count_periods_passed(&schedule, streak.update_time_sec, now, cap);
        if periods > 0 {
            let decay = (periods as i64 * cfg.idle_count_decay_reset).min(cfg.max_idle_count_decay.max(0));
            streak.count = (streak.count - decay).max(0);
            streak.count_current_reset = 0;
            streak.update_time_sec = now;
        }
        Ok(())
    }
}

fn normalize_cron(expr: &str) -> String {
    if expr.split_whitespace().count() == 5 {
        format!("0 {expr}")
    } else {
        expr.to_string()
    }
}

fn parse_schedule(streak_id: &str, expr: &str) -> Result<Schedule, PamlogixError> {
    Schedule::from_str(&normalize_cron(expr)).map_err(|e| errors::invalid_cron(streak_id, e.to_string()))
}

/// How many scheduled boundaries fall in `(since, now]`, capped at `cap`
/// iterations — beyond `cap` the decay formula has already saturated at
/// `max_idle_count_decay`, so counting further buys nothing and would risk
/// an unbounded loop for a cold user who returns after years of absence.
fn count_periods_passed(schedule: &Schedule, since: i64, now: i64, cap: usize) -> usize {
    let Some(since_dt) = Utc.timestamp_opt(since, 0).single() else {
        return 0;
    };
    let Some(now_dt) = Utc.timestamp_opt(now, 0).single() else {
        return 0;
    };
    let mut count = 0usize;
    for boundary in schedule.after(&since_dt) {
        if boundary > now_dt || count >= cap {
            break;
        }
        count += 1;
    }
    count
}

/// Full public surface named in `spec.md` §4.6.
#[async_trait]
pub trait StreaksSystem: Send + Sync {
    async fn list(&self, user_id: &UserId) -> Result<HashMap<String, Streak>, PamlogixError>;
    async fn update(
        &self,
        user_id: &UserId,
        deltas: &HashMap<String, i64>,
    ) -> Result<HashMap<String, Streak>, PamlogixError>;
    async fn claim(&self, user_id: &UserId, ids: &[String]) -> Result<Vec<StreakClaimResult>, PamlogixError>;
    async fn reset(&self, user_id: &UserId, ids: &[String]) -> Result<HashMap<String, Streak>, PamlogixError>;
}

fn check_window(streak_id: &str, cfg: &StreakConfig, now: i64) -> Result<(), PamlogixError> {
    if cfg.disabled {
        return Err(errors::disabled_streak(streak_id));
    }
    if cfg.start_time_sec.is_some_and(|s| now < s) || cfg.end_time_sec.is_some_and(|e| now > e) {
        return Err(errors::out_of_window(streak_id));
    }
    Ok(())
}

#[async_trait]
impl StreaksSystem for StreaksEngine {
    async fn list(&self, user_id: &UserId) -> Result<HashMap<String, Streak>, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        for (streak_id, cfg) in &config.streaks {
            Self::streak_or_new(&mut state, streak_id, now);
            let streak = state.streaks.get_mut(streak_id).expect("just inserted");
            Self::apply_idle_decay(cfg, streak_id, streak, now)?;
        }
        let result = state.streaks.clone();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn update(
        &self,
        user_id: &UserId,
        deltas: &HashMap<String, i64>,
    ) -> Result<HashMap<String, Streak>, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;

        for streak_id in deltas.keys() {
            let cfg = config.streaks.get(streak_id).ok_or_else(|| errors::unknown_streak(streak_id))?;
            check_window(streak_id, cfg, now)?;
        }

        for (streak_id, &delta) in deltas {
            let cfg = config.streaks.get(streak_id).expect("validated above");
            Self::streak_or_new(&mut state, streak_id, now);
            let streak = state.streaks.get_mut(streak_id).expect("just inserted");
            Self::apply_idle_decay(cfg, streak_id, streak, now)?;
            streak.count = (streak.count + delta).clamp(0, cfg.max_count.max(0));
            streak.count_current_reset = (streak.count_current_reset + delta).clamp(0, cfg.max_count_current_reset.max(0));
            streak.update_time_sec = now;
        }

        let result: HashMap<String, Streak> =
            deltas.keys().filter_map(|id| state.streaks.get(id).map(|s| (id.clone(), s.clone()))).collect();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }

    async fn claim(&self, user_id: &UserId, ids: &[String]) -> Result<Vec<StreakClaimResult>, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;

        let economy = {
            let registry = self.registry.read().clone();
            registry.as_ref().and_then(|r| r.get_economy())
        };

        let mut results = Vec::new();
        for streak_id in ids {
            let cfg = config.streaks.get(streak_id).ok_or_else(|| errors::unknown_streak(streak_id))?;
            check_window(streak_id, cfg, now)?;
            Self::streak_or_new(&mut state, streak_id, now);
            {
                let streak = state.streaks.get_mut(streak_id).expect("just inserted");
                Self::apply_idle_decay(cfg, streak_id, streak, now)?;
            }

            let claimable: Vec<usize> = cfg
                .reward_tiers
                .iter()
                .enumerate()
                .filter(|(idx, tier)| {
                    let streak = &state.streaks[streak_id];
                    streak.count >= tier.count_min
                        && streak.count <= tier.count_max
                        && !streak.claimed_rewards.contains(idx)
                })
                .map(|(idx, _)| idx)
                .collect();

            if claimable.is_empty() {
                continue;
            }

            let economy = economy.as_ref().ok_or_else(errors::economy_unavailable)?;
            for tier_idx in claimable {
                let tier = &cfg.reward_tiers[tier_idx];
                let mut reward = economy.reward_roll(user_id, &tier.reward).await?;
                if let Some(hook) = &self.hooks.read().on_claim_reward {
                    hook(user_id, streak_id, tier_idx, &mut reward);
                }
                economy.reward_grant(user_id, reward.clone(), HashMap::new(), false).await?;

                let streak = state.streaks.get_mut(streak_id).expect("present");
                streak.claimed_rewards.push(tier_idx);
                streak.claim_count += 1;
                streak.claim_time_sec = now;

                results.push(StreakClaimResult { streak_id: streak_id.clone(), tier_index: tier_idx, reward });
            }
        }

        self.write_state(user_id, &state).await?;
        Ok(results)
    }

    async fn reset(&self, user_id: &UserId, ids: &[String]) -> Result<HashMap<String, Streak>, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;

        for streak_id in ids {
            if !config.streaks.contains_key(streak_id) {
                return Err(errors::unknown_streak(streak_id));
            }
            Self::streak_or_new(&mut state, streak_id, now);
            let streak = state.streaks.get_mut(streak_id).expect("just inserted");
            streak.count = 0;
            streak.count_current_reset = 0;
            streak.claim_count = 0;
            streak.claimed_rewards.clear();
            streak.update_time_sec = now;
        }

        let result: HashMap<String, Streak> =
            ids.iter().filter_map(|id| state.streaks.get(id).map(|s| (id.clone(), s.clone()))).collect();
        self.write_state(user_id, &state).await?;
        Ok(result)
    }
}

impl PamlogixSystem for StreaksEngine {
    fn system_type(&self) -> SystemType {
        SystemType::Streaks
    }

    fn set_pamlogix(&self, registry: Arc<dyn pamlogix_core::Pamlogix>) {
        *self.registry.write() = Some(registry);
    }
}

impl std::fmt::Debug for StreaksEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreaksEngine").finish_non_exhaustive()
    }
}
