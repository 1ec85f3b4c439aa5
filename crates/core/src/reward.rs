//! Reward configuration and rolled-reward value types (`spec.md` §3, §4.2).
//!
//! These types are deliberately storage-and-host agnostic: `pamlogix-economy`
//! owns the rolling/granting *algorithm*, but the shapes themselves are
//! shared because `pamlogix-inventory`, `pamlogix-energy`, `pamlogix-auctions`,
//! `pamlogix-streaks`, `pamlogix-progression` and `pamlogix-unlockables` all
//! produce or consume a `RewardConfig`/`Reward` at their own call sites
//! (consume-on-use rewards, claim-tier rewards, completion rewards, ...).

use crate::ids::{ItemDefId, UnixSeconds};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An inclusive `[min, max]` range sampled uniformly, then floored to the
/// nearest `multiple` (spec.md §4.2: "round down to the nearest multiple of
/// `multiple` (if >0)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: i64,
    pub max: i64,
    #[serde(default)]
    pub multiple: i64,
}

impl AmountRange {
    pub fn exact(value: i64) -> Self {
        Self { min: value, max: value, multiple: 0 }
    }

    /// Apply the multiple-flooring rule to an already-sampled raw value.
    pub fn floor_to_multiple(&self, raw: i64) -> i64 {
        if self.multiple > 0 {
            (raw / self.multiple) * self.multiple
        } else {
            raw
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRange {
    pub currency_id: String,
    pub range: AmountRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyRange {
    pub energy_id: String,
    pub range: AmountRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRange {
    pub item_id: ItemDefId,
    pub range: AmountRange,
}

/// Pick `count` distinct item ids from `set_ids`, with optional repeats up to
/// `max_repeats` (spec.md §4.2: "pick N distinct item IDs from the set, with
/// optional max-repeats permitting duplicates up to that cap").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSetRange {
    pub set_id: String,
    pub set_item_ids: Vec<ItemDefId>,
    pub count: AmountRange,
    #[serde(default)]
    pub max_repeats: Option<u32>,
}

/// Basic modifier operators shared by reward modifiers and energy modifiers
/// (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Set,
    Min,
    Max,
    Mod,
    Pow,
}

impl ModifierOperator {
    /// Apply this operator to `base` using `operand`, matching the teacher's
    /// saturating-arithmetic convention for anything currency/energy-shaped.
    pub fn apply_f64(&self, base: f64, operand: f64) -> f64 {
        match self {
            ModifierOperator::Add => base + operand,
            ModifierOperator::Subtract => base - operand,
            ModifierOperator::Multiply => base * operand,
            ModifierOperator::Divide => {
                if operand == 0.0 {
                    base
                } else {
                    base / operand
                }
            }
            ModifierOperator::Set => operand,
            ModifierOperator::Min => base.min(operand),
            ModifierOperator::Max => base.max(operand),
            ModifierOperator::Mod => {
                if operand == 0.0 {
                    base
                } else {
                    base % operand
                }
            }
            ModifierOperator::Pow => base.powf(operand),
        }
    }
}

/// Special operators that target the energy bucket's own parameters rather
/// than a grant amount (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyModifierKind {
    Basic(ModifierOperator),
    MaxEnergy,
    RefillRate,
    RefillSpeed,
    InfiniteEnergy,
}

/// A configured, not-yet-rolled modifier on a reward bundle: a value range
/// and a duration range (spec.md §3 "reward modifiers ... energy modifiers
/// (each with a value range and duration range)").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierRange {
    pub modifier_id: String,
    pub operator: ModifierOperator,
    pub value: AmountRange,
    pub duration_sec: AmountRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyModifierRange {
    pub energy_id: String,
    pub kind: EnergyModifierKind,
    pub value: AmountRange,
    pub duration_sec: AmountRange,
}

/// A single weighted or guaranteed reward bundle (spec.md §3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBundle {
    #[serde(default)]
    pub currencies: Vec<CurrencyRange>,
    #[serde(default)]
    pub energies: Vec<EnergyRange>,
    #[serde(default)]
    pub items: Vec<ItemRange>,
    #[serde(default)]
    pub item_sets: Vec<ItemSetRange>,
    #[serde(default)]
    pub reward_modifiers: Vec<ModifierRange>,
    #[serde(default)]
    pub energy_modifiers: Vec<EnergyModifierRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedRewardBundle {
    pub bundle: RewardBundle,
    pub weight: u32,
}

/// The declarative recipe a subsystem rolls against (spec.md §3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default)]
    pub guaranteed: Option<RewardBundle>,
    #[serde(default)]
    pub weighted: Vec<WeightedRewardBundle>,
    #[serde(default)]
    pub max_rolls: u32,
    #[serde(default)]
    pub max_repeat_rolls: u32,
}

impl RewardConfig {
    pub fn total_weight(&self) -> u64 {
        self.weighted.iter().map(|w| w.weight as u64).sum()
    }
}

/// Concrete per-instance properties carried by a granted item instance
/// (spec.md §3 "InventoryItem ... Carries string/numeric properties").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemInstanceSpec {
    #[serde(default)]
    pub string_properties: HashMap<String, String>,
    #[serde(default)]
    pub numeric_properties: HashMap<String, f64>,
}

/// The rolled delta for one item def: how many units, and (for
/// non-stackable defs) the per-instance spec for each unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardItem {
    pub item_id: ItemDefId,
    pub count: i64,
    #[serde(default)]
    pub instances: Vec<ItemInstanceSpec>,
}

/// A modifier grant produced by a roll, with its concrete sampled value and
/// absolute expiry time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantedModifier {
    pub modifier_id: String,
    pub operator: ModifierOperator,
    pub value: f64,
    pub start_time_sec: UnixSeconds,
    pub expire_time_sec: UnixSeconds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantedEnergyModifier {
    pub energy_id: String,
    pub kind: EnergyModifierKind,
    pub value: f64,
    pub start_time_sec: UnixSeconds,
    pub expire_time_sec: UnixSeconds,
}

/// The concrete result of rolling a `RewardConfig` (spec.md §3).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    #[serde(default)]
    pub currencies: HashMap<String, i64>,
    #[serde(default)]
    pub energies: HashMap<String, i64>,
    #[serde(default)]
    pub items: Vec<RewardItem>,
    #[serde(default)]
    pub modifiers: Vec<GrantedModifier>,
    #[serde(default)]
    pub energy_modifiers: Vec<GrantedEnergyModifier>,
    pub grant_time_sec: UnixSeconds,
}

impl Reward {
    pub fn empty(grant_time_sec: UnixSeconds) -> Self {
        Self { grant_time_sec, ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.values().all(|v| *v == 0)
            && self.energies.values().all(|v| *v == 0)
            && self.items.iter().all(|i| i.count == 0)
            && self.modifiers.is_empty()
            && self.energy_modifiers.is_empty()
    }

    /// Merge another reward's deltas into this one (used when rolling
    /// guaranteed + N weighted picks into one concrete `Reward`).
    pub fn merge(&mut self, other: Reward) {
        for (k, v) in other.currencies {
            *self.currencies.entry(k).or_insert(0) += v;
        }
        for (k, v) in other.energies {
            *self.energies.entry(k).or_insert(0) += v;
        }
        for item in other.items {
            if let Some(existing) = self.items.iter_mut().find(|i| i.item_id == item.item_id) {
                existing.count += item.count;
                existing.instances.extend(item.instances);
            } else {
                self.items.push(item);
            }
        }
        self.modifiers.extend(other.modifiers);
        self.energy_modifiers.extend(other.energy_modifiers);
    }
}

/// The client-facing, purely descriptive mirror of a `RewardConfig`
/// (spec.md §4.2 `RewardConvert`; §9 notes round-trip is not guaranteed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableRewards {
    pub guaranteed: Option<RewardBundle>,
    pub weighted: Vec<WeightedRewardBundle>,
    pub max_rolls: u32,
    pub max_repeat_rolls: u32,
    pub total_weight: u64,
}

impl From<&RewardConfig> for AvailableRewards {
    fn from(cfg: &RewardConfig) -> Self {
        Self {
            guaranteed: cfg.guaranteed.clone(),
            weighted: cfg.weighted.clone(),
            max_rolls: cfg.max_rolls,
            max_repeat_rolls: cfg.max_repeat_rolls,
            total_weight: cfg.total_weight(),
        }
    }
}
