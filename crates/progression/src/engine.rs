//! The progression engine: recursive AND/OR/XOR precondition evaluation,
//! purchase/update/complete/reset (`spec.md` §4.7).

use crate::config::{PreconditionLeaf, PreconditionNode, PreconditionOperator, ProgressionConfig};
use crate::errors;
use crate::state::{ProgressionKnownState, ProgressionView};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use pamlogix_core::{
    EconomyApi, EnergyApi, InventoryApi, ItemDefId, PamlogixError, PamlogixSystem, ProgressionDelta,
    ProgressionDeltaKind, ProgressionNodeState, StatsApi, SystemType, UserId, UserProgression,
};
use pamlogix_host::{Clock, DynHost, Storage, Wallet};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Bounds both nesting depth of a single precondition tree and the
/// transitive fan-out through `progressions[]` cross-references — without
/// this, a misconfigured cyclic reference between two nodes would recurse
/// forever.
const MAX_PRECONDITION_DEPTH: u32 = 64;

type ConfigSource = Box<dyn Fn() -> ProgressionConfig + Send + Sync>;

pub struct ProgressionEngine {
    host: DynHost,
    base_config: ProgressionConfig,
    config_source: RwLock<Option<ConfigSource>>,
    registry: RwLock<Option<Arc<dyn pamlogix_core::Pamlogix>>>,
}

impl ProgressionEngine {
    pub fn new(host: DynHost, config: ProgressionConfig) -> Arc<Self> {
        Arc::new(Self { host, base_config: config, config_source: RwLock::new(None), registry: RwLock::new(None) })
    }

    pub fn set_config_source(&self, f: impl Fn() -> ProgressionConfig + Send + Sync + 'static) {
        *self.config_source.write() = Some(Box::new(f));
    }

    fn config(&self) -> ProgressionConfig {
        match self.config_source.read().as_ref() {
            Some(f) => f(),
            None => self.base_config.clone(),
        }
    }

    async fn read_state(&self, user_id: &UserId) -> Result<UserProgression, PamlogixError> {
        match self.host.read("progression", "user_progression", Some(user_id)).await? {
            Some(record) => {
                serde_json::from_str(&record.value).map_err(|e| errors::state_corrupt(e.to_string()))
            }
            None => Ok(UserProgression::default()),
        }
    }

    async fn write_state(&self, user_id: &UserId, state: &UserProgression) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(state).map_err(|e| errors::state_corrupt(e.to_string()))?;
        self.host.write("progression", "user_progression", Some(user_id), value, None).await?;
        Ok(())
    }

    fn node_or_new(state: &mut UserProgression, node_id: &str, now: i64) {
        state.nodes.entry(node_id.to_string()).or_insert_with(|| ProgressionNodeState {
            id: node_id.into(),
            create_time_sec: now,
            update_time_sec: now,
            ..Default::default()
        });
    }

    async fn build_ctx<'a>(&'a self, user_id: &'a UserId) -> Result<EvalContext<'a>, PamlogixError> {
        let wallet = self.host.get(user_id).await?;
        let registry = self.registry.read().clone();
        Ok(EvalContext {
            user_id,
            wallet,
            inventory: registry.as_ref().and_then(|r| r.get_inventory()),
            energy: registry.as_ref().and_then(|r| r.get_energy()),
            stats: registry.as_ref().and_then(|r| r.get_stats()),
        })
    }

    async fn evaluate_node(
        &self,
        config: &ProgressionConfig,
        prog_state: &UserProgression,
        node_id: &str,
        ctx: &EvalContext<'_>,
    ) -> Result<bool, PamlogixError> {
        let node_cfg = config.nodes.get(node_id).ok_or_else(|| errors::unknown_node(node_id))?;
        let default_state = ProgressionNodeState::default();
        let node_state = prog_state.nodes.get(node_id).unwrap_or(&default_state);
        evaluate_tree(&node_cfg.preconditions, node_state, ctx, prog_state, config, 0).await
    }
}

/// Cross-subsystem handles plus the caller's wallet snapshot, threaded
/// through every leaf/tree evaluation so a single `Get`/`Update`/etc. call
/// only fetches each collaborator once.
struct EvalContext<'a> {
    user_id: &'a UserId,
    wallet: HashMap<String, i64>,
    inventory: Option<Arc<dyn InventoryApi>>,
    energy: Option<Arc<dyn EnergyApi>>,
    stats: Option<Arc<dyn StatsApi>>,
}

async fn evaluate_leaf(leaf: &PreconditionLeaf, node_state: &ProgressionNodeState, ctx: &EvalContext<'_>) -> Result<bool, PamlogixError> {
    if leaf.require_cost_paid && !node_state.cost_paid {
        return Ok(false);
    }
    for (key, min) in &leaf.counts_min {
        if node_state.counts.get(key).copied().unwrap_or(0) < *min {
            return Ok(false);
        }
    }
    for (key, max) in &leaf.counts_max {
        if node_state.counts.get(key).copied().unwrap_or(0) > *max {
            return Ok(false);
        }
    }
    for (key, min) in &leaf.currency_min {
        if ctx.wallet.get(key).copied().unwrap_or(0) < *min {
            return Ok(false);
        }
    }
    for (key, max) in &leaf.currency_max {
        if ctx.wallet.get(key).copied().unwrap_or(0) > *max {
            return Ok(false);
        }
    }

    if !leaf.items_min.is_empty() || !leaf.items_max.is_empty() {
        let ids: Vec<ItemDefId> = leaf.items_min.keys().chain(leaf.items_max.keys()).cloned().collect();
        let counts = match &ctx.inventory {
            Some(api) => api.item_counts(ctx.user_id, &ids).await?,
            None => HashMap::new(),
        };
        for (key, min) in &leaf.items_min {
            if counts.get(key).copied().unwrap_or(0) < *min {
                return Ok(false);
            }
        }
        for (key, max) in &leaf.items_max {
            if counts.get(key).copied().unwrap_or(0) > *max {
                return Ok(false);
            }
        }
    }

    if !leaf.energy_min.is_empty() || !leaf.energy_max.is_empty() {
        let energy = match &ctx.energy {
            Some(api) => api.get_all(ctx.user_id).await?,
            None => HashMap::new(),
        };
        for (key, min) in &leaf.energy_min {
            if energy.get(key).copied().unwrap_or(0) < *min {
                return Ok(false);
            }
        }
        for (key, max) in &leaf.energy_max {
            if energy.get(key).copied().unwrap_or(0) > *max {
                return Ok(false);
            }
        }
    }

    if !leaf.stats_min.is_empty() || !leaf.stats_max.is_empty() || !leaf.achievements.is_empty() {
        let stats = match &ctx.stats {
            Some(api) => api.get_all(ctx.user_id).await?,
            None => HashMap::new(),
        };
        for (key, min) in &leaf.stats_min {
            if stats.get(key).copied().unwrap_or(0) < *min {
                return Ok(false);
            }
        }
        for (key, max) in &leaf.stats_max {
            if stats.get(key).copied().unwrap_or(0) > *max {
                return Ok(false);
            }
        }
        for achievement_id in &leaf.achievements {
            if stats.get(&format!("achievement:{achievement_id}")).copied().unwrap_or(0) < 1 {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

/// Evaluates a leaf's own predicate, then (only if that already holds) the
/// leaf's `progressions[]` cross-references against each referenced node's
/// own precondition tree.
async fn evaluate_leaf_with_progressions(
    leaf: &PreconditionLeaf,
    node_state: &ProgressionNodeState,
    ctx: &EvalContext<'_>,
    prog_state: &UserProgression,
    config: &ProgressionConfig,
    depth: u32,
) -> Result<bool, PamlogixError> {
    if !evaluate_leaf(leaf, node_state, ctx).await? {
        return Ok(false);
    }
    for dep_id in &leaf.progressions {
        let dep_cfg = config.nodes.get(dep_id).ok_or_else(|| errors::unknown_node(dep_id))?;
        let default_state = ProgressionNodeState::default();
        let dep_state = prog_state.nodes.get(dep_id).unwrap_or(&default_state);
        if !evaluate_tree(&dep_cfg.preconditions, dep_state, ctx, prog_state, config, depth + 1).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Recursive AND/OR/XOR evaluation over a node's own leaf plus its nested
/// `children` blocks (`spec.md` §4.7). AND/OR short-circuit; XOR folds
/// every input (leaf plus every child) to odd parity, so it never
/// short-circuits by construction.
fn evaluate_tree<'a>(
    tree: &'a PreconditionNode,
    node_state: &'a ProgressionNodeState,
    ctx: &'a EvalContext<'a>,
    prog_state: &'a UserProgression,
    config: &'a ProgressionConfig,
    depth: u32,
) -> BoxFuture<'a, Result<bool, PamlogixError>> {
    async move {
        if depth > MAX_PRECONDITION_DEPTH {
            return Err(errors::precondition_too_deep(&node_state.id.to_string()));
        }
        match tree.operator {
            PreconditionOperator::And => {
                if let Some(leaf) = &tree.leaf {
                    if !evaluate_leaf_with_progressions(leaf, node_state, ctx, prog_state, config, depth).await? {
                        return Ok(false);
                    }
                }
                for child in &tree.children {
                    if !evaluate_tree(child, node_state, ctx, prog_state, config, depth + 1).await? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            PreconditionOperator::Or => {
                if let Some(leaf) = &tree.leaf {
                    if evaluate_leaf_with_progressions(leaf, node_state, ctx, prog_state, config, depth).await? {
                        return Ok(true);
                    }
                }
                for child in &tree.children {
                    if evaluate_tree(child, node_state, ctx, prog_state, config, depth + 1).await? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            PreconditionOperator::Xor => {
                let mut true_count = 0u32;
                if let Some(leaf) = &tree.leaf {
                    if evaluate_leaf_with_progressions(leaf, node_state, ctx, prog_state, config, depth).await? {
                        true_count += 1;
                    }
                }
                for child in &tree.children {
                    if evaluate_tree(child, node_state, ctx, prog_state, config, depth + 1).await? {
                        true_count += 1;
                    }
                }
                Ok(true_count % 2 == 1)
            }
        }
    }
    .boxed()
}

fn count_diff(prev: &HashMap<String, i64>, now: &HashMap<String, i64>) -> HashMap<String, i64> {
    let keys: HashSet<&String> = prev.keys().chain(now.keys()).collect();
    keys.into_iter()
        .filter_map(|k| {
            let diff = now.get(k).copied().unwrap_or(0) - prev.get(k).copied().unwrap_or(0);
            if diff != 0 {
                Some((k.clone(), diff))
            } else {
                None
            }
        })
        .collect()
}

fn delta_for(
    node_id: &str,
    prev_unlocked: bool,
    prev_counts: &HashMap<String, i64>,
    now_unlocked: bool,
    now_counts: &HashMap<String, i64>,
) -> Option<ProgressionDelta> {
    let count_diffs = count_diff(prev_counts, now_counts);
    let kind = if prev_unlocked != now_unlocked {
        if now_unlocked {
            ProgressionDeltaKind::Unlocked
        } else {
            ProgressionDeltaKind::Locked
        }
    } else if !count_diffs.is_empty() {
        ProgressionDeltaKind::Changed
    } else {
        return None;
    };
    Some(ProgressionDelta { node_id: node_id.into(), kind, count_diffs })
}

/// Full public surface named in `spec.md` §4.7.
#[async_trait]
pub trait ProgressionSystem: Send + Sync {
    async fn get(
        &self,
        user_id: &UserId,
        last_known: &HashMap<String, ProgressionKnownState>,
    ) -> Result<(HashMap<String, ProgressionView>, Vec<ProgressionDelta>), PamlogixError>;
    async fn purchase(&self, user_id: &UserId, node_id: &str) -> Result<ProgressionView, PamlogixError>;
    async fn update(
        &self,
        user_id: &UserId,
        node_id: &str,
        counts: &HashMap<String, i64>,
    ) -> Result<(ProgressionView, Vec<ProgressionDelta>), PamlogixError>;
    async fn reset(&self, user_id: &UserId, node_ids: &[String]) -> Result<HashMap<String, ProgressionView>, PamlogixError>;
    async fn complete(&self, user_id: &UserId, node_id: &str) -> Result<ProgressionView, PamlogixError>;
}

#[async_trait]
impl ProgressionSystem for ProgressionEngine {
    async fn get(
        &self,
        user_id: &UserId,
        last_known: &HashMap<String, ProgressionKnownState>,
    ) -> Result<(HashMap<String, ProgressionView>, Vec<ProgressionDelta>), PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        for node_id in config.nodes.keys() {
            Self::node_or_new(&mut state, node_id, now);
        }
        let ctx = self.build_ctx(user_id).await?;

        let mut result = HashMap::new();
        let mut deltas = Vec::new();
        for node_id in config.nodes.keys() {
            let unlocked = self.evaluate_node(&config, &state, node_id, &ctx).await?;
            let node_state = state.nodes.get(node_id).expect("just inserted").clone();
            let (prev_unlocked, prev_counts) = match last_known.get(node_id) {
                Some(known) => (known.unlocked, known.counts.clone()),
                None => (false, HashMap::new()),
            };
            if let Some(delta) = delta_for(node_id, prev_unlocked, &prev_counts, unlocked, &node_state.counts) {
                deltas.push(delta);
            }
            result.insert(node_id.clone(), ProgressionView { state: node_state, unlocked });
        }
        self.write_state(user_id, &state).await?;
        Ok((result, deltas))
    }

    async fn purchase(&self, user_id: &UserId, node_id: &str) -> Result<ProgressionView, PamlogixError> {
        let config = self.config();
        let node_cfg = config.nodes.get(node_id).ok_or_else(|| errors::unknown_node(node_id))?;
        let cost = node_cfg.cost.as_ref().ok_or_else(|| errors::no_cost(node_id))?;
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::node_or_new(&mut state, node_id, now);

        if state.nodes[node_id].cost_paid {
            return Err(errors::already_unlocked(node_id));
        }
        let ctx = self.build_ctx(user_id).await?;
        if self.evaluate_node(&config, &state, node_id, &ctx).await? {
            return Err(errors::already_unlocked(node_id));
        }

        for (currency_id, amount) in &cost.currencies {
            if ctx.wallet.get(currency_id).copied().unwrap_or(0) < *amount {
                return Err(errors::insufficient_currency(node_id, currency_id));
            }
        }
        if !cost.items.is_empty() {
            let inventory = ctx.inventory.clone().ok_or_else(errors::inventory_unavailable)?;
            let held = inventory.item_counts(user_id, &cost.items.keys().cloned().collect::<Vec<_>>()).await?;
            for (item_id, amount) in &cost.items {
                if held.get(item_id).copied().unwrap_or(0) < *amount {
                    return Err(errors::insufficient_inventory(node_id, item_id.as_str()));
                }
            }
        }

        if !cost.currencies.is_empty() {
            let deltas: HashMap<String, i64> = cost.currencies.iter().map(|(k, v)| (k.clone(), -v)).collect();
            self.host.update(user_id, &deltas, HashMap::new(), true).await?;
        }
        if !cost.items.is_empty() {
            let inventory = ctx.inventory.clone().ok_or_else(errors::inventory_unavailable)?;
            inventory.consume_items(user_id, &cost.items, &HashMap::new(), false).await?;
        }

        let node_state = state.nodes.get_mut(node_id).expect("just inserted");
        node_state.cost_paid = true;
        node_state.update_time_sec = now;
        let node_state = node_state.clone();
        self.write_state(user_id, &state).await?;

        let unlocked = self.evaluate_node(&config, &state, node_id, &ctx).await?;
        Ok(ProgressionView { state: node_state, unlocked })
    }

    async fn update(
        &self,
        user_id: &UserId,
        node_id: &str,
        counts: &HashMap<String, i64>,
    ) -> Result<(ProgressionView, Vec<ProgressionDelta>), PamlogixError> {
        let config = self.config();
        config.nodes.get(node_id).ok_or_else(|| errors::unknown_node(node_id))?;
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::node_or_new(&mut state, node_id, now);

        let ctx = self.build_ctx(user_id).await?;
        let prev_unlocked = self.evaluate_node(&config, &state, node_id, &ctx).await?;
        let prev_counts = state.nodes[node_id].counts.clone();

        let node_state = state.nodes.get_mut(node_id).expect("just inserted");
        for (key, delta) in counts {
            *node_state.counts.entry(key.clone()).or_insert(0) += delta;
        }
        node_state.update_time_sec = now;
        let node_state_out = node_state.clone();
        self.write_state(user_id, &state).await?;

        let now_unlocked = self.evaluate_node(&config, &state, node_id, &ctx).await?;
        let deltas = delta_for(node_id, prev_unlocked, &prev_counts, now_unlocked, &node_state_out.counts)
            .into_iter()
            .collect();

        Ok((ProgressionView { state: node_state_out, unlocked: now_unlocked }, deltas))
    }

    async fn reset(&self, user_id: &UserId, node_ids: &[String]) -> Result<HashMap<String, ProgressionView>, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;

        for node_id in node_ids {
            config.nodes.get(node_id).ok_or_else(|| errors::unknown_node(node_id))?;
            Self::node_or_new(&mut state, node_id, now);
            let node_state = state.nodes.get_mut(node_id).expect("just inserted");
            node_state.counts.clear();
            node_state.cost_paid = false;
            node_state.update_time_sec = now;
        }
        self.write_state(user_id, &state).await?;

        let ctx = self.build_ctx(user_id).await?;
        let mut result = HashMap::new();
        for node_id in node_ids {
            let unlocked = self.evaluate_node(&config, &state, node_id, &ctx).await?;
            result.insert(node_id.clone(), ProgressionView { state: state.nodes[node_id].clone(), unlocked });
        }
        Ok(result)
    }

    async fn complete(&self, user_id: &UserId, node_id: &str) -> Result<ProgressionView, PamlogixError> {
        let config = self.config();
        let node_cfg = config.nodes.get(node_id).ok_or_else(|| errors::unknown_node(node_id))?;
        let now = self.host.now_unix_sec();
        let mut state = self.read_state(user_id).await?;
        Self::node_or_new(&mut state, node_id, now);

        if state.nodes[node_id].completed {
            let node_state = state.nodes[node_id].clone();
            return Ok(ProgressionView { state: node_state, unlocked: true });
        }

        let ctx = self.build_ctx(user_id).await?;
        if !self.evaluate_node(&config, &state, node_id, &ctx).await? {
            return Err(errors::not_unlocked(node_id));
        }

        let registry = self.registry.read().clone();
        let economy = registry.as_ref().and_then(|r| r.get_economy()).ok_or_else(errors::economy_unavailable)?;
        let reward = economy.reward_roll(user_id, &node_cfg.reward).await?;
        economy.reward_grant(user_id, reward, HashMap::new(), false).await?;

        let node_state = state.nodes.get_mut(node_id).expect("just inserted");
        node_state.completed = true;
        node_state.update_time_sec = now;
        let node_state = node_state.clone();
        self.write_state(user_id, &state).await?;

        Ok(ProgressionView { state: node_state, unlocked: true })
    }
}

impl PamlogixSystem for ProgressionEngine {
    fn system_type(&self) -> SystemType {
        SystemType::Progression
    }

    fn set_pamlogix(&self, registry: Arc<dyn pamlogix_core::Pamlogix>) {
        *self.registry.write() = Some(registry);
    }
}

impl std::fmt::Debug for ProgressionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionEngine").finish_non_exhaustive()
    }
}
