//! Stable sentinel constructors for the unlockables engine (`spec.md` §7).

use pamlogix_core::{insufficient_funds, internal, not_found, precondition_failed, unavailable, PamlogixError};

pub fn unknown_def(unlockable_id: &str) -> PamlogixError {
    not_found("UnlockableUnknownDef", format!("no unlockable config {unlockable_id}"))
}

pub fn no_probability_weights() -> PamlogixError {
    precondition_failed("UnlockableNoProbabilityWeights", "no catalogue entry carries a positive probability weight")
}

pub fn unknown_instance(instance_id: &str) -> PamlogixError {
    not_found("UnlockableUnknownInstance", format!("no unlockable instance {instance_id}"))
}

pub fn slots_full() -> PamlogixError {
    precondition_failed("UnlockableSlotsFull", "user has no free unlockable slots")
}

pub fn already_unlocking(instance_id: &str) -> PamlogixError {
    precondition_failed("UnlockableAlreadyUnlocking", format!("instance {instance_id} is already unlocking"))
}

pub fn already_claimable(instance_id: &str) -> PamlogixError {
    precondition_failed("UnlockableAlreadyClaimable", format!("instance {instance_id} is already claimable"))
}

pub fn already_queued(instance_id: &str) -> PamlogixError {
    precondition_failed("UnlockableAlreadyQueued", format!("instance {instance_id} is already queued"))
}

pub fn not_unlocking(instance_id: &str) -> PamlogixError {
    precondition_failed("UnlockableNotUnlocking", format!("instance {instance_id} is not currently unlocking"))
}

pub fn not_claimable(instance_id: &str) -> PamlogixError {
    precondition_failed("UnlockableNotClaimable", format!("instance {instance_id} is not yet claimable"))
}

pub fn queue_full() -> PamlogixError {
    precondition_failed("UnlockableQueueFull", "max_queued_unlocks reached")
}

pub fn max_active_slots_reached() -> PamlogixError {
    precondition_failed("UnlockableMaxActiveSlots", "active_slots already at max_active_slots")
}

pub fn insufficient_currency(currency_id: &str) -> PamlogixError {
    insufficient_funds("UnlockableInsufficientCurrency", format!("cost requires more {currency_id}"))
}

pub fn economy_unavailable() -> PamlogixError {
    unavailable("UnlockableEconomyUnavailable", "economy system not registered")
}

pub fn state_corrupt(detail: impl Into<String>) -> PamlogixError {
    internal("UnlockableStateCorrupt", detail.into())
}
