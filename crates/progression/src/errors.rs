//! Stable sentinel constructors for the progression engine (`spec.md` §7).

use pamlogix_core::{
    insufficient_funds, insufficient_items, internal, not_found, precondition_failed, unavailable, PamlogixError,
};

pub fn unknown_node(node_id: &str) -> PamlogixError {
    not_found("ProgressionUnknownNode", format!("no progression node config {node_id}"))
}

pub fn no_cost(node_id: &str) -> PamlogixError {
    precondition_failed("ProgressionNoCost", format!("node {node_id} has no purchasable cost"))
}

pub fn already_unlocked(node_id: &str) -> PamlogixError {
    precondition_failed("ProgressionAlreadyUnlocked", format!("node {node_id} is already unlocked"))
}

pub fn not_unlocked(node_id: &str) -> PamlogixError {
    precondition_failed("ProgressionNotUnlocked", format!("node {node_id} is not yet unlocked"))
}

pub fn insufficient_currency(node_id: &str, currency_id: &str) -> PamlogixError {
    insufficient_funds("ProgressionInsufficientCurrency", format!("node {node_id} cost requires more {currency_id}"))
}

pub fn insufficient_inventory(node_id: &str, item_id: &str) -> PamlogixError {
    insufficient_items("ProgressionInsufficientItems", format!("node {node_id} cost requires more {item_id}"))
}

pub fn inventory_unavailable() -> PamlogixError {
    unavailable("ProgressionInventoryUnavailable", "inventory system not registered")
}

pub fn economy_unavailable() -> PamlogixError {
    unavailable("ProgressionEconomyUnavailable", "economy system not registered")
}

pub fn precondition_too_deep(node_id: &str) -> PamlogixError {
    internal(
        "ProgressionPreconditionCycle",
        format!("precondition evaluation for {node_id} exceeded max nesting/reference depth"),
    )
}

pub fn state_corrupt(detail: impl Into<String>) -> PamlogixError {
    internal("ProgressionStateCorrupt", detail.into())
}
