//! Stable sentinel constructors for the streaks engine (`spec.md` §7).

use pamlogix_core::{internal, invalid_input, not_found, precondition_failed, unavailable, PamlogixError};

pub fn unknown_streak(streak_id: &str) -> PamlogixError {
    not_found("StreakUnknown", format!("no streak config {streak_id}"))
}

pub fn disabled_streak(streak_id: &str) -> PamlogixError {
    precondition_failed("StreakDisabled", format!("streak {streak_id} is disabled"))
}

pub fn out_of_window(streak_id: &str) -> PamlogixError {
    precondition_failed("StreakOutOfWindow", format!("streak {streak_id} is outside its active window"))
}

pub fn unknown_tier(streak_id: &str, tier: usize) -> PamlogixError {
    not_found("StreakUnknownTier", format!("streak {streak_id} has no reward tier {tier}"))
}

pub fn no_claimable_tiers(streak_id: &str) -> PamlogixError {
    precondition_failed("StreakNothingToClaim", format!("no unclaimed reward tier is satisfied for streak {streak_id}"))
}

pub fn invalid_cron(streak_id: &str, detail: impl Into<String>) -> PamlogixError {
    invalid_input("StreakInvalidCron", format!("streak {streak_id}: {}", detail.into()))
}

pub fn economy_unavailable() -> PamlogixError {
    unavailable("StreakEconomyUnavailable", "economy system not registered")
}

pub fn state_corrupt(detail: impl Into<String>) -> PamlogixError {
    internal("StreakStateCorrupt", detail.into())
}
