//! Declarative precondition-gated node catalogue (`spec.md` §4.7).

use pamlogix_core::{ItemDefId, RewardConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Combinator joining a leaf's own predicate result with its nested
/// `children` blocks (`spec.md` §4.7 "an operator in {AND, OR, XOR}
/// combining with a nested block"). `Xor` generalizes to odd-parity across
/// however many boolean inputs this node has (leaf plus every child),
/// rather than being restricted to exactly two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreconditionOperator {
    And,
    Or,
    Xor,
}

impl Default for PreconditionOperator {
    fn default() -> Self {
        PreconditionOperator::And
    }
}

/// The direct leaf predicate named in `spec.md` §4.7. `counts_min/max`
/// compare against the owning node's own `counts` map; `currency_min/max`,
/// `stats_min/max`, `items_min/max`, `energy_min/max` compare against
/// cross-subsystem state fetched through the registry.
/// `require_cost_paid` realizes the leaf's bare `cost` field: the source
/// text names `cost` alongside the other min/max predicates, which only
/// makes sense as "has this node's own cost already been paid", since an
/// amount wouldn't have a single comparison direction the way `counts` does.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreconditionLeaf {
    #[serde(default)]
    pub require_cost_paid: bool,
    #[serde(default)]
    pub counts_min: HashMap<String, i64>,
    #[serde(default)]
    pub counts_max: HashMap<String, i64>,
    #[serde(default)]
    pub currency_min: HashMap<String, i64>,
    #[serde(default)]
    pub currency_max: HashMap<String, i64>,
    #[serde(default)]
    pub stats_min: HashMap<String, i64>,
    #[serde(default)]
    pub stats_max: HashMap<String, i64>,
    #[serde(default)]
    pub items_min: HashMap<ItemDefId, i64>,
    #[serde(default)]
    pub items_max: HashMap<ItemDefId, i64>,
    #[serde(default)]
    pub energy_min: HashMap<String, i64>,
    #[serde(default)]
    pub energy_max: HashMap<String, i64>,
    /// Other node ids that must themselves be unlocked.
    #[serde(default)]
    pub progressions: Vec<String>,
    /// Backed by `stats` entries named `achievement:<id>` (spec.md does not
    /// name a standalone achievements subsystem; see `DESIGN.md`).
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreconditionNode {
    #[serde(default)]
    pub operator: PreconditionOperator,
    #[serde(default)]
    pub leaf: Option<PreconditionLeaf>,
    #[serde(default)]
    pub children: Vec<PreconditionNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressionCost {
    #[serde(default)]
    pub currencies: HashMap<String, i64>,
    #[serde(default)]
    pub items: HashMap<ItemDefId, i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressionNodeConfig {
    #[serde(default)]
    pub preconditions: PreconditionNode,
    #[serde(default)]
    pub cost: Option<ProgressionCost>,
    #[serde(default)]
    pub reward: RewardConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default)]
    pub nodes: HashMap<String, ProgressionNodeConfig>,
}
