//! Stable sentinel constructors for stats, teams, and incentives
//! (`spec.md` §7).

use pamlogix_core::{internal, invalid_input, not_found, precondition_failed, unauthorized, PamlogixError};

pub fn state_corrupt(detail: impl Into<String>) -> PamlogixError {
    internal("SocialStateCorrupt", detail.into())
}

pub fn pending_join_request(group_id: &str) -> PamlogixError {
    precondition_failed("TeamsPendingJoinRequest", format!("membership in group {group_id} is a pending join request"))
}

pub fn not_a_member(group_id: &str) -> PamlogixError {
    precondition_failed("TeamsNotAMember", format!("caller is not a member of group {group_id}"))
}

pub fn unknown_incentive_config(id: &str) -> PamlogixError {
    not_found("IncentiveUnknownConfig", format!("no incentive config {id}"))
}

pub fn unknown_incentive_code(code: &str) -> PamlogixError {
    not_found("IncentiveUnknownCode", format!("no incentive record for code {code}"))
}

pub fn too_many_concurrent(id: &str) -> PamlogixError {
    precondition_failed("IncentiveTooManyConcurrent", format!("sender already has max_concurrent active incentives of type {id}"))
}

pub fn expired(code: &str) -> PamlogixError {
    precondition_failed("IncentiveExpired", format!("incentive {code} has expired"))
}

pub fn already_claimed(code: &str) -> PamlogixError {
    precondition_failed("IncentiveAlreadyClaimed", format!("recipient already claimed incentive {code}"))
}

pub fn max_claims_reached(code: &str) -> PamlogixError {
    precondition_failed("IncentiveMaxClaimsReached", format!("incentive {code} has reached max_claims"))
}

pub fn max_global_claims_reached(id: &str) -> PamlogixError {
    precondition_failed("IncentiveMaxGlobalClaimsReached", format!("incentive config {id} has reached max_global_claims"))
}

pub fn recipient_too_new(code: &str) -> PamlogixError {
    precondition_failed("IncentiveRecipientTooNew", format!("recipient account is younger than incentive {code}'s max_recipient_age_sec"))
}

pub fn self_claim(code: &str) -> PamlogixError {
    invalid_input("IncentiveSelfClaim", format!("creator may not claim their own incentive {code}"))
}

pub fn not_owner(code: &str) -> PamlogixError {
    unauthorized("IncentiveNotOwner", format!("caller did not create incentive {code}"))
}

pub fn has_claims(code: &str) -> PamlogixError {
    precondition_failed("IncentiveHasClaims", format!("incentive {code} already has claims and may not be deleted"))
}

pub fn economy_unavailable() -> PamlogixError {
    pamlogix_core::unavailable("SocialEconomyUnavailable", "economy system not registered")
}
