//! The inventory engine: stackable/non-stackable granting, per-item/category/
//! set limits, and def+instance consumption (`spec.md` §4.3).

use crate::config::{InventoryConfig, ItemDef};
use crate::errors;
use crate::state::InventoryState;
use async_trait::async_trait;
use pamlogix_core::{
    internal, ConsumeOutcome, InstanceId, InventoryApi, InventoryGrantOutcome, ItemDefId, PamlogixError,
    PamlogixSystem, Reward, RewardItem, SystemType, UserId,
};
use pamlogix_core::InventoryItem;
use pamlogix_host::{Clock, DynHost, Storage};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PropertyPatch {
    #[serde(default)]
    pub string_properties: HashMap<String, String>,
    #[serde(default)]
    pub numeric_properties: HashMap<String, f64>,
    #[serde(default)]
    pub remove_string_properties: Vec<String>,
    #[serde(default)]
    pub remove_numeric_properties: Vec<String>,
}

type ConfigSource = Box<dyn Fn() -> InventoryConfig + Send + Sync>;

#[derive(Default)]
struct InventoryHooks {
    on_consume_reward: Option<Box<dyn Fn(&UserId, &ItemDefId, &mut Reward) + Send + Sync>>,
}

pub struct InventoryEngine {
    host: DynHost,
    base_config: InventoryConfig,
    config_source: RwLock<Option<ConfigSource>>,
    registry: RwLock<Option<Arc<dyn pamlogix_core::Pamlogix>>>,
    hooks: RwLock<InventoryHooks>,
}

impl InventoryEngine {
    pub fn new(host: DynHost, config: InventoryConfig) -> Arc<Self> {
        Arc::new(Self {
            host,
            base_config: config,
            config_source: RwLock::new(None),
            registry: RwLock::new(None),
            hooks: RwLock::new(InventoryHooks::default()),
        })
    }

    /// `spec.md` §4.3 `SetConfigSource(fn)`: swap the catalogue the engine
    /// reads for every subsequent call (e.g. to hot-reload item defs without
    /// rebuilding the registry).
    pub fn set_config_source(&self, f: impl Fn() -> InventoryConfig + Send + Sync + 'static) {
        *self.config_source.write() = Some(Box::new(f));
    }

    pub fn set_on_consume_reward(&self, f: impl Fn(&UserId, &ItemDefId, &mut Reward) + Send + Sync + 'static) {
        self.hooks.write().on_consume_reward = Some(Box::new(f));
    }

    fn config(&self) -> InventoryConfig {
        match self.config_source.read().as_ref() {
            Some(f) => f(),
            None => self.base_config.clone(),
        }
    }

    async fn read_state(&self, user_id: &UserId) -> Result<InventoryState, PamlogixError> {
        match self.host.read("inventory", "user_items", Some(user_id)).await? {
            Some(record) => {
                serde_json::from_str(&record.value).map_err(|e| internal("InventoryStateCorrupt", e.to_string()))
            }
            None => Ok(InventoryState::default()),
        }
    }

    async fn write_state(&self, user_id: &UserId, state: &InventoryState) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(state).map_err(|e| internal("InventoryStateSerialize", e.to_string()))?;
        self.host.write("inventory", "user_items", Some(user_id), value, None).await?;
        Ok(())
    }

    fn def<'a>(config: &'a InventoryConfig, item_id: &ItemDefId) -> Result<&'a ItemDef, PamlogixError> {
        config.items.get(item_id).ok_or_else(|| errors::unknown_item_def(&item_id.0))
    }

    fn count_for_def(state: &InventoryState, item_id: &ItemDefId) -> i64 {
        state.items.iter().filter(|i| &i.item_id == item_id).map(|i| i.count).sum()
    }

    fn count_for_category(state: &InventoryState, config: &InventoryConfig, category: &str) -> i64 {
        state
            .items
            .iter()
            .filter(|i| config.items.get(&i.item_id).map(|d| d.category.as_str()) == Some(category))
            .map(|i| i.count)
            .sum()
    }

    fn count_for_set(state: &InventoryState, set_item_ids: &[ItemDefId]) -> i64 {
        state.items.iter().filter(|i| set_item_ids.contains(&i.item_id)).map(|i| i.count).sum()
    }

    /// Clip `desired` by the def's own cap, its category's cap, and every
    /// item-set cap it belongs to, taking the tightest one (`spec.md` §9:
    /// "the source reduces the grantable amount by the tightest set
    /// simultaneously; implementers should preserve this").
    fn grantable_amount(state: &InventoryState, config: &InventoryConfig, def: &ItemDef, desired: i64) -> i64 {
        let mut cap = desired;
        if def.max_count > 0 {
            let current = Self::count_for_def(state, &def.id);
            cap = cap.min((def.max_count - current).max(0));
        }
        if !def.category.is_empty() {
            if let Some(limit) = config.category_limits.get(&def.category) {
                if *limit > 0 {
                    let current = Self::count_for_category(state, config, &def.category);
                    cap = cap.min((limit - current).max(0));
                }
            }
        }
        for (_, set) in config.sets_containing(&def.id) {
            if set.max_count > 0 {
                let current = Self::count_for_set(state, &set.item_ids);
                cap = cap.min((set.max_count - current).max(0));
            }
        }
        cap.max(0)
    }

    fn grant_one_def(
        state: &mut InventoryState,
        config: &InventoryConfig,
        def: &ItemDef,
        reward_item: &RewardItem,
        ignore_limits: bool,
        now: i64,
    ) -> (i64, Vec<InventoryItem>, Vec<InventoryItem>) {
        let desired = reward_item.count.max(0);
        let grantable = if ignore_limits { desired } else { Self::grantable_amount(state, config, def, desired) };
        if grantable <= 0 {
            return (desired, Vec::new(), Vec::new());
        }

        let mut new_items = Vec::new();
        let mut updated_items = Vec::new();

        if def.stackable {
            if let Some(existing) = state.items.iter_mut().find(|i| i.item_id == def.id) {
                existing.count += grantable;
                existing.update_time_sec = now;
                updated_items.push(existing.clone());
            } else {
                let instance_id = state.next_instance_id(&def.id);
                let item = InventoryItem {
                    item_id: def.id.clone(),
                    instance_id,
                    count: grantable,
                    stackable: true,
                    string_properties: def.string_properties.clone(),
                    numeric_properties: def.numeric_properties.clone(),
                    create_time_sec: now,
                    update_time_sec: now,
                };
                state.items.push(item.clone());
                new_items.push(item);
            }
        } else {
            for i in 0..grantable {
                let spec = reward_item.instances.get(i as usize);
                let instance_id = state.next_instance_id(&def.id);
                let mut string_properties = def.string_properties.clone();
                let mut numeric_properties = def.numeric_properties.clone();
                if let Some(spec) = spec {
                    string_properties.extend(spec.string_properties.clone());
                    numeric_properties.extend(spec.numeric_properties.clone());
                }
                let item = InventoryItem {
                    item_id: def.id.clone(),
                    instance_id,
                    count: 1,
                    stackable: false,
                    string_properties,
                    numeric_properties,
                    create_time_sec: now,
                    update_time_sec: now,
                };
                state.items.push(item.clone());
                new_items.push(item);
            }
        }

        (desired - grantable, new_items, updated_items)
    }
}

/// Full public surface named in `spec.md` §4.3.
#[async_trait]
pub trait InventorySystem: Send + Sync {
    fn list(&self, category: Option<&str>) -> Vec<ItemDef>;
    async fn list_inventory_items(
        &self,
        user_id: &UserId,
        category: Option<&str>,
    ) -> Result<Vec<InventoryItem>, PamlogixError>;
    async fn consume_items(
        &self,
        user_id: &UserId,
        by_def: &HashMap<ItemDefId, i64>,
        by_instance: &HashMap<InstanceId, i64>,
        over_consume: bool,
    ) -> Result<ConsumeOutcome, PamlogixError>;
    async fn grant_items(
        &self,
        user_id: &UserId,
        items: &[RewardItem],
        ignore_limits: bool,
    ) -> Result<InventoryGrantOutcome, PamlogixError>;
    async fn update_items(
        &self,
        user_id: &UserId,
        patches: HashMap<InstanceId, PropertyPatch>,
    ) -> Result<Vec<InventoryItem>, PamlogixError>;
}

#[async_trait]
impl InventorySystem for InventoryEngine {
    fn list(&self, category: Option<&str>) -> Vec<ItemDef> {
        let config = self.config();
        config
            .items
            .into_values()
            .filter(|d| category.map(|c| d.category == c).unwrap_or(true))
            .collect()
    }

    async fn list_inventory_items(
        &self,
        user_id: &UserId,
        category: Option<&str>,
    ) -> Result<Vec<InventoryItem>, PamlogixError> {
        let config = self.config();
        let state = self.read_state(user_id).await?;
        Ok(state
            .items
            .into_iter()
            .filter(|i| match category {
                Some(c) => config.items.get(&i.item_id).map(|d| d.category == c).unwrap_or(false),
                None => true,
            })
            .collect())
    }

    async fn consume_items(
        &self,
        user_id: &UserId,
        by_def: &HashMap<ItemDefId, i64>,
        by_instance: &HashMap<InstanceId, i64>,
        over_consume: bool,
    ) -> Result<ConsumeOutcome, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        let mut outcome = ConsumeOutcome::default();

        for (item_id, &requested) in by_def {
            if requested <= 0 {
                continue;
            }
            let available: i64 = Self::count_for_def(&state, item_id);
            if !over_consume && available < requested {
                return Err(errors::over_consume_rejected(&item_id.0, requested, available));
            }
            let mut remaining = requested;
            let mut drained_indices = Vec::new();
            for (idx, item) in state.items.iter_mut().enumerate() {
                if remaining <= 0 {
                    break;
                }
                if &item.item_id != item_id {
                    continue;
                }
                let take = remaining.min(item.count);
                item.count -= take;
                item.update_time_sec = now;
                remaining -= take;
                let keep_zero = config.items.get(item_id).map(|d| d.keep_zero).unwrap_or(false);
                if item.count == 0 && !keep_zero {
                    drained_indices.push(idx);
                }
            }
            for idx in drained_indices.into_iter().rev() {
                state.items.remove(idx);
            }
            let actually_consumed = requested - remaining.max(0);
            *outcome.consumed_by_def.entry(item_id.clone()).or_insert(0) += actually_consumed;

            if let Some(def) = config.items.get(item_id) {
                if let Some(reward_cfg) = &def.consume_reward {
                    if let Some(economy) = self.registry.read().as_ref().and_then(|r| r.get_economy()) {
                        let mut reward = economy.reward_roll(user_id, reward_cfg).await?;
                        if let Some(f) = &self.hooks.read().on_consume_reward {
                            f(user_id, item_id, &mut reward);
                        }
                        economy.reward_grant(user_id, reward.clone(), HashMap::new(), false).await?;
                        outcome.rewards.push(reward);
                    }
                }
            }
        }

        for (instance_id, &requested) in by_instance {
            if requested <= 0 {
                continue;
            }
            let idx = state
                .items
                .iter()
                .position(|i| &i.instance_id == instance_id)
                .ok_or_else(|| errors::unknown_instance(&instance_id.0))?;
            let available = state.items[idx].count;
            if !over_consume && available < requested {
                return Err(errors::over_consume_rejected(&instance_id.0, requested, available));
            }
            let take = requested.min(available);
            let item_id = state.items[idx].item_id.clone();
            state.items[idx].count -= take;
            state.items[idx].update_time_sec = now;
            let keep_zero = config.items.get(&item_id).map(|d| d.keep_zero).unwrap_or(false);
            if state.items[idx].count == 0 && !keep_zero {
                state.items.remove(idx);
            }
            outcome.consumed_by_instance.insert(instance_id.clone(), take);

            if let Some(def) = config.items.get(&item_id) {
                if let Some(reward_cfg) = &def.consume_reward {
                    if let Some(economy) = self.registry.read().as_ref().and_then(|r| r.get_economy()) {
                        let mut reward = economy.reward_roll(user_id, reward_cfg).await?;
                        if let Some(f) = &self.hooks.read().on_consume_reward {
                            f(user_id, &item_id, &mut reward);
                        }
                        economy.reward_grant(user_id, reward.clone(), HashMap::new(), false).await?;
                        outcome.rewards.push(reward);
                    }
                }
            }
        }

        self.write_state(user_id, &state).await?;
        Ok(outcome)
    }

    async fn grant_items(
        &self,
        user_id: &UserId,
        items: &[RewardItem],
        ignore_limits: bool,
    ) -> Result<InventoryGrantOutcome, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        let mut outcome = InventoryGrantOutcome::default();

        for reward_item in items {
            if reward_item.count <= 0 {
                continue;
            }
            let def = Self::def(&config, &reward_item.item_id)?;
            let (not_granted, new_items, updated_items) =
                Self::grant_one_def(&mut state, &config, def, reward_item, ignore_limits, now);
            outcome.new_items.extend(new_items);
            outcome.updated_items.extend(updated_items);
            if not_granted > 0 {
                *outcome.not_granted.entry(reward_item.item_id.clone()).or_insert(0) += not_granted;
            }
        }

        self.write_state(user_id, &state).await?;
        Ok(outcome)
    }

    async fn update_items(
        &self,
        user_id: &UserId,
        patches: HashMap<InstanceId, PropertyPatch>,
    ) -> Result<Vec<InventoryItem>, PamlogixError> {
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        let mut updated = Vec::new();
        for (instance_id, patch) in patches {
            let item = state
                .items
                .iter_mut()
                .find(|i| i.instance_id == instance_id)
                .ok_or_else(|| errors::unknown_instance(&instance_id.0))?;
            for key in patch.remove_string_properties {
                item.string_properties.remove(&key);
            }
            for key in patch.remove_numeric_properties {
                item.numeric_properties.remove(&key);
            }
            item.string_properties.extend(patch.string_properties);
            item.numeric_properties.extend(patch.numeric_properties);
            item.update_time_sec = now;
            updated.push(item.clone());
        }
        self.write_state(user_id, &state).await?;
        Ok(updated)
    }
}

#[async_trait]
impl InventoryApi for InventoryEngine {
    async fn grant_items(
        &self,
        user_id: &UserId,
        items: &[RewardItem],
        ignore_limits: bool,
    ) -> Result<InventoryGrantOutcome, PamlogixError> {
        InventorySystem::grant_items(self, user_id, items, ignore_limits).await
    }

    async fn consume_items(
        &self,
        user_id: &UserId,
        by_def: &HashMap<ItemDefId, i64>,
        by_instance: &HashMap<InstanceId, i64>,
        over_consume: bool,
    ) -> Result<ConsumeOutcome, PamlogixError> {
        InventorySystem::consume_items(self, user_id, by_def, by_instance, over_consume).await
    }

    async fn item_counts(
        &self,
        user_id: &UserId,
        item_ids: &[ItemDefId],
    ) -> Result<HashMap<ItemDefId, i64>, PamlogixError> {
        let state = self.read_state(user_id).await?;
        Ok(item_ids.iter().map(|id| (id.clone(), Self::count_for_def(&state, id))).collect())
    }
}

impl PamlogixSystem for InventoryEngine {
    fn system_type(&self) -> SystemType {
        SystemType::Inventory
    }

    fn set_pamlogix(&self, registry: Arc<dyn pamlogix_core::Pamlogix>) {
        *self.registry.write() = Some(registry);
    }
}

impl std::fmt::Debug for InventoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryEngine").finish_non_exhaustive()
    }
}
