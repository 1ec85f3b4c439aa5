//! Stable sentinel constructors for the economy engine (`spec.md` §7).

use pamlogix_core::{insufficient_funds, insufficient_items, invalid_input, not_found, precondition_failed, unavailable, PamlogixError};

pub fn unknown_reward_config(id: &str) -> PamlogixError {
    not_found("EconomyUnknownRewardConfig", format!("no reward config {id}"))
}

pub fn unknown_store_item(id: &str) -> PamlogixError {
    not_found("EconomyUnknownStoreItem", format!("no store item {id}"))
}

pub fn unknown_donation(id: &str) -> PamlogixError {
    not_found("EconomyUnknownDonation", format!("no donation {id}"))
}

pub fn unknown_placement(id: &str) -> PamlogixError {
    not_found("EconomyUnknownPlacement", format!("no placement {id}"))
}

pub fn no_pending_intent(item_id: &str) -> PamlogixError {
    precondition_failed("EconomyNoPendingIntent", format!("no pending purchase intent for {item_id}"))
}

pub fn duplicate_transaction(transaction_id: &str) -> PamlogixError {
    invalid_input("EconomyDuplicateTransaction", format!("transaction {transaction_id} already processed"))
}

pub fn donation_full(id: &str) -> PamlogixError {
    precondition_failed("EconomyDonationFull", format!("donation {id} reached max_count"))
}

pub fn donation_contribution_cap(id: &str) -> PamlogixError {
    precondition_failed(
        "EconomyDonationContributionCap",
        format!("caller already reached user_contribution_max_count for donation {id}"),
    )
}

pub fn donation_already_claimed(id: &str) -> PamlogixError {
    precondition_failed("EconomyDonationAlreadyClaimed", format!("donation {id} already claimed by caller"))
}

pub fn placement_not_started(reference_id: &str) -> PamlogixError {
    precondition_failed("EconomyPlacementNotStarted", format!("placement reference {reference_id} not started"))
}

pub fn insufficient_currency(currency: &str) -> PamlogixError {
    insufficient_funds("EconomyInsufficientCurrency", format!("insufficient {currency}"))
}

pub fn insufficient_item(item: &str) -> PamlogixError {
    insufficient_items("EconomyInsufficientItem", format!("insufficient {item}"))
}

pub fn inventory_unavailable() -> PamlogixError {
    unavailable("EconomyInventoryUnavailable", "inventory system not registered")
}

pub fn invalid_reward_config(detail: impl Into<String>) -> PamlogixError {
    invalid_input("EconomyInvalidRewardConfig", detail)
}
