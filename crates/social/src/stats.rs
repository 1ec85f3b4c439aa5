//! The stats engine: per-user named counters with a `{SET, DELTA, MIN, MAX}`
//! update operator (`spec.md` §4.9 "Stats").

use crate::config::StatsConfig;
use crate::errors;
use async_trait::async_trait;
use pamlogix_core::{PamlogixError, PamlogixSystem, Stat, StatOperator, StatsApi, SystemType, UserId, UserStats};
use pamlogix_host::{Clock, DynHost, Storage};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type ConfigSource = Box<dyn Fn() -> StatsConfig + Send + Sync>;

pub struct StatsEngine {
    host: DynHost,
    base_config: StatsConfig,
    config_source: RwLock<Option<ConfigSource>>,
    registry: RwLock<Option<Arc<dyn pamlogix_core::Pamlogix>>>,
}

impl StatsEngine {
    pub fn new(host: DynHost, config: StatsConfig) -> Arc<Self> {
        Arc::new(Self { host, base_config: config, config_source: RwLock::new(None), registry: RwLock::new(None) })
    }

    pub fn set_config_source(&self, f: impl Fn() -> StatsConfig + Send + Sync + 'static) {
        *self.config_source.write() = Some(Box::new(f));
    }

    fn config(&self) -> StatsConfig {
        match self.config_source.read().as_ref() {
            Some(f) => f(),
            None => self.base_config.clone(),
        }
    }

    async fn read_state(&self, user_id: &UserId) -> Result<UserStats, PamlogixError> {
        match self.host.read("stats", "user_stats", Some(user_id)).await? {
            Some(record) => serde_json::from_str(&record.value).map_err(|e| errors::state_corrupt(e.to_string())),
            None => Ok(UserStats::default()),
        }
    }

    async fn write_state(&self, user_id: &UserId, state: &UserStats) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(state).map_err(|e| errors::state_corrupt(e.to_string()))?;
        self.host.write("stats", "user_stats", Some(user_id), value, None).await?;
        Ok(())
    }

    /// Apply one `(name, operator, value)` update to a stat, creating it on
    /// first touch (spec.md §4.9 "applies per-stat operator then refreshes
    /// count, total, min, max, first, last, update_time_sec").
    fn apply(stat: &mut Stat, operator: StatOperator, value: i64, now: i64) {
        let new_value = match operator {
            StatOperator::Set => value,
            StatOperator::Delta => stat.last + value,
            StatOperator::Min => stat.last.min(value),
            StatOperator::Max => stat.last.max(value),
        };
        if stat.count == 0 {
            stat.first = new_value;
            stat.min = new_value;
            stat.max = new_value;
        } else {
            stat.min = stat.min.min(new_value);
            stat.max = stat.max.max(new_value);
        }
        stat.total += new_value;
        stat.last = new_value;
        stat.count += 1;
        stat.update_time_sec = now;
    }
}

/// Full public surface named in `spec.md` §4.9.
#[async_trait]
pub trait StatsSystem: Send + Sync {
    async fn list(&self, user_id: &UserId) -> Result<HashMap<String, Stat>, PamlogixError>;
    async fn update(
        &self,
        user_id: &UserId,
        updates: &[(String, StatOperator, i64)],
    ) -> Result<HashMap<String, Stat>, PamlogixError>;
}

#[async_trait]
impl StatsSystem for StatsEngine {
    async fn list(&self, user_id: &UserId) -> Result<HashMap<String, Stat>, PamlogixError> {
        Ok(self.read_state(user_id).await?.stats)
    }

    async fn update(
        &self,
        user_id: &UserId,
        updates: &[(String, StatOperator, i64)],
    ) -> Result<HashMap<String, Stat>, PamlogixError> {
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        let mut touched = Vec::new();
        for (name, operator, value) in updates {
            let stat = state.stats.entry(name.clone()).or_insert_with(|| Stat { name: name.clone(), ..Default::default() });
            Self::apply(stat, *operator, *value, now);
            touched.push(name.clone());
        }
        self.write_state(user_id, &state).await?;
        let _ = self.config();
        Ok(touched.into_iter().filter_map(|n| state.stats.get(&n).map(|s| (n, s.clone()))).collect())
    }
}

#[async_trait]
impl StatsApi for StatsEngine {
    async fn get_all(&self, user_id: &UserId) -> Result<HashMap<String, i64>, PamlogixError> {
        Ok(self.read_state(user_id).await?.stats.into_iter().map(|(k, v)| (k, v.last)).collect())
    }
}

impl PamlogixSystem for StatsEngine {
    fn system_type(&self) -> SystemType {
        SystemType::Stats
    }

    fn set_pamlogix(&self, registry: Arc<dyn pamlogix_core::Pamlogix>) {
        *self.registry.write() = Some(registry);
    }
}

impl std::fmt::Debug for StatsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsEngine").finish_non_exhaustive()
    }
}
