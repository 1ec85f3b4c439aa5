//! Reward rolling algorithm (`spec.md` §4.2 "Rolling algorithm").

use pamlogix_core::{
    AmountRange, GrantedEnergyModifier, GrantedModifier, ItemInstanceSpec, Reward, RewardBundle,
    RewardConfig, RewardItem, UnixSeconds, WeightedRewardBundle,
};
use rand::Rng;
use std::collections::HashMap;

fn sample_range(rng: &mut impl Rng, range: &AmountRange) -> i64 {
    let raw = if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    };
    range.floor_to_multiple(raw)
}

/// Pick one bundle index from `weighted` by weight, skipping any index whose
/// selection count has already hit `max_repeat_rolls` (spec.md §4.2
/// "choose a bundle with probability proportional to its `Weight` without
/// exceeding `MaxRepeatRolls` selections of the same bundle").
fn pick_weighted_index(
    rng: &mut impl Rng,
    weighted: &[WeightedRewardBundle],
    picks_so_far: &[u32],
    max_repeat_rolls: u32,
) -> Option<usize> {
    let eligible: Vec<(usize, u64)> = weighted
        .iter()
        .enumerate()
        .filter(|(i, w)| max_repeat_rolls == 0 || picks_so_far[*i] < max_repeat_rolls)
        .map(|(i, w)| (i, w.weight as u64))
        .collect();
    let total: u64 = eligible.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for (idx, weight) in eligible {
        if roll < weight {
            return Some(idx);
        }
        roll -= weight;
    }
    None
}

fn roll_bundle(rng: &mut impl Rng, bundle: &RewardBundle, grant_time_sec: UnixSeconds) -> Reward {
    let mut reward = Reward::empty(grant_time_sec);

    for c in &bundle.currencies {
        *reward.currencies.entry(c.currency_id.clone()).or_insert(0) += sample_range(rng, &c.range);
    }
    for e in &bundle.energies {
        *reward.energies.entry(e.energy_id.clone()).or_insert(0) += sample_range(rng, &e.range);
    }
    for i in &bundle.items {
        let count = sample_range(rng, &i.range);
        if count <= 0 {
            continue;
        }
        if let Some(existing) = reward.items.iter_mut().find(|r| r.item_id == i.item_id) {
            existing.count += count;
        } else {
            reward.items.push(RewardItem { item_id: i.item_id.clone(), count, instances: Vec::new() });
        }
    }
    for set in &bundle.item_sets {
        let count = sample_range(rng, &set.count).max(0) as usize;
        if set.set_item_ids.is_empty() || count == 0 {
            continue;
        }
        let max_repeats = set.max_repeats.unwrap_or(1).max(1);
        let mut picked_counts: HashMap<usize, u32> = HashMap::new();
        let mut picks = Vec::with_capacity(count);
        let mut attempts = 0;
        // Pick up to `count` items, honoring max_repeats; stop early if the
        // set is exhausted (every item at its repeat cap).
        while picks.len() < count && attempts < count * 8 + 32 {
            attempts += 1;
            let idx = rng.gen_range(0..set.set_item_ids.len());
            let used = picked_counts.entry(idx).or_insert(0);
            if *used >= max_repeats {
                continue;
            }
            *used += 1;
            picks.push(idx);
        }
        for idx in picks {
            let item_id = &set.set_item_ids[idx];
            if let Some(existing) = reward.items.iter_mut().find(|r| r.item_id == *item_id) {
                existing.count += 1;
            } else {
                reward.items.push(RewardItem { item_id: item_id.clone(), count: 1, instances: Vec::new() });
            }
        }
    }
    for m in &bundle.reward_modifiers {
        let value = sample_range(rng, &m.value) as f64;
        let duration = sample_range(rng, &m.duration_sec);
        reward.modifiers.push(GrantedModifier {
            modifier_id: m.modifier_id.clone(),
            operator: m.operator,
            value,
            start_time_sec: grant_time_sec,
            expire_time_sec: grant_time_sec + duration,
        });
    }
    for m in &bundle.energy_modifiers {
        let value = sample_range(rng, &m.value) as f64;
        let duration = sample_range(rng, &m.duration_sec);
        reward.energy_modifiers.push(GrantedEnergyModifier {
            energy_id: m.energy_id.clone(),
            kind: m.kind,
            value,
            start_time_sec: grant_time_sec,
            expire_time_sec: grant_time_sec + duration,
        });
    }
    reward
}

/// Roll a `RewardConfig` into a concrete `Reward` (`spec.md` §4.2).
///
/// Always produces the guaranteed bundle first, then performs `max_rolls`
/// weighted picks, each constrained by `max_repeat_rolls`.
pub fn roll_reward_config(
    rng: &mut impl Rng,
    config: &RewardConfig,
    grant_time_sec: UnixSeconds,
) -> Reward {
    let mut reward = Reward::empty(grant_time_sec);
    if let Some(guaranteed) = &config.guaranteed {
        reward.merge(roll_bundle(rng, guaranteed, grant_time_sec));
    }
    if config.weighted.is_empty() || config.max_rolls == 0 {
        return reward;
    }
    let mut picks_so_far = vec![0u32; config.weighted.len()];
    for _ in 0..config.max_rolls {
        match pick_weighted_index(rng, &config.weighted, &picks_so_far, config.max_repeat_rolls) {
            Some(idx) => {
                picks_so_far[idx] += 1;
                reward.merge(roll_bundle(rng, &config.weighted[idx].bundle, grant_time_sec));
            }
            None => break,
        }
    }
    reward
}

/// Copy default item-def properties onto a freshly rolled item's instances.
/// Stackable item rolls never carry per-instance specs (the inventory engine
/// creates/merges a single stack); non-stackable rolls get one spec per unit.
pub fn fill_instance_specs(reward: &mut Reward, is_stackable: impl Fn(&pamlogix_core::ItemDefId) -> bool) {
    for item in &mut reward.items {
        if is_stackable(&item.item_id) {
            item.instances.clear();
            continue;
        }
        if item.instances.len() as i64 != item.count {
            item.instances = (0..item.count.max(0)).map(|_| ItemInstanceSpec::default()).collect();
        }
    }
}
