//! Refill protocol and modifier application (`spec.md` §4.4).
//!
//! Every bucket access (`Get`, `Spend`, `Grant`) runs this pass first, the
//! same "recompute on read" approach the teacher's pallets use for
//! `block_number()`-driven state instead of a background timer task — there
//! is no scheduled job here, only a pure function of `now` applied lazily.

use pamlogix_core::{ActiveEnergyModifier, EnergyBucket, EnergyModifierKind};

/// Bucket parameters after special modifiers (`max_energy`, `refill_rate`,
/// `refill_speed`, `infinite_energy`) are folded in. These are recomputed at
/// every access; none of them are persisted back onto the bucket's own
/// `max`/`refill_amount`/`refill_period_sec` fields.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveParams {
    pub max: i64,
    pub refill_amount: i64,
    pub refill_period_sec: i64,
    pub infinite: bool,
}

fn effective_params(bucket: &EnergyBucket, now: i64) -> EffectiveParams {
    let mut max = bucket.max;
    let mut refill_amount = bucket.refill_amount.max(1);
    let mut refill_period_sec = bucket.refill_period_sec.max(1);
    let mut infinite = false;

    for m in &bucket.modifiers {
        if m.expire_time_sec <= now {
            continue;
        }
        match m.kind {
            EnergyModifierKind::MaxEnergy => max += m.value as i64,
            EnergyModifierKind::RefillRate => {
                refill_amount = ((refill_amount as f64) * m.value).round().max(1.0) as i64
            }
            EnergyModifierKind::RefillSpeed => {
                if m.value > 0.0 {
                    refill_period_sec = ((refill_period_sec as f64) / m.value).round().max(1.0) as i64
                }
            }
            EnergyModifierKind::InfiniteEnergy => infinite = infinite || m.value != 0.0,
            EnergyModifierKind::Basic(_) => {}
        }
    }

    EffectiveParams { max: max.max(0), refill_amount, refill_period_sec, infinite }
}

pub fn prune_expired_modifiers(bucket: &mut EnergyBucket, now: i64) {
    bucket.modifiers.retain(|m| m.expire_time_sec > now);
}

/// Apply the refill protocol (`spec.md` §4.4 "Refill protocol") and
/// recompute `next_refill_time_sec`/`max_refill_time_sec` per the invariants
/// in `spec.md` §3.
pub fn apply_refill(bucket: &mut EnergyBucket, now: i64) {
    prune_expired_modifiers(bucket, now);
    let params = effective_params(bucket, now);

    if params.infinite {
        bucket.current = params.max;
        bucket.next_refill_time_sec = 0;
        bucket.max_refill_time_sec = now;
        return;
    }

    if bucket.current < params.max {
        let elapsed = now - bucket.start_refill_time_sec;
        if elapsed > 0 {
            let periods = elapsed / params.refill_period_sec;
            if periods > 0 {
                let gained = periods * params.refill_amount;
                bucket.current = (bucket.current + gained).min(params.max);
                bucket.start_refill_time_sec += periods * params.refill_period_sec;
            }
        }
    }

    if bucket.current >= params.max {
        bucket.next_refill_time_sec = 0;
        bucket.max_refill_time_sec = now;
    } else {
        bucket.next_refill_time_sec = bucket.start_refill_time_sec + params.refill_period_sec;
        let remaining = params.max - bucket.current;
        let periods_needed = (remaining + params.refill_amount - 1) / params.refill_amount;
        bucket.max_refill_time_sec = bucket.start_refill_time_sec + periods_needed * params.refill_period_sec;
    }
}

/// Apply a basic grant-amount modifier operator chain to a raw grant amount
/// (`spec.md` §4.4: "Named operators ... for grant-amount transformation").
pub fn apply_grant_modifiers(bucket: &EnergyBucket, raw_amount: i64, now: i64) -> i64 {
    let mut value = raw_amount as f64;
    for m in &bucket.modifiers {
        if m.expire_time_sec <= now {
            continue;
        }
        if let EnergyModifierKind::Basic(op) = m.kind {
            value = op.apply_f64(value, m.value);
        }
    }
    value.round() as i64
}

pub fn push_modifier(bucket: &mut EnergyBucket, modifier: ActiveEnergyModifier) {
    bucket.modifiers.push(modifier);
}
