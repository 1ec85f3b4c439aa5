//! Stable sentinel constructors for the inventory engine (`spec.md` §7).

use pamlogix_core::{insufficient_items, invalid_input, not_found, PamlogixError};

pub fn unknown_item_def(id: &str) -> PamlogixError {
    not_found("InventoryUnknownItemDef", format!("no item def {id}"))
}

pub fn unknown_instance(id: &str) -> PamlogixError {
    not_found("InventoryUnknownInstance", format!("no instance {id}"))
}

pub fn over_consume_rejected(item_id: &str, requested: i64, available: i64) -> PamlogixError {
    insufficient_items(
        "InventoryOverConsumeRejected",
        format!("requested {requested} of {item_id}, only {available} available"),
    )
}

pub fn invalid_patch(detail: impl Into<String>) -> PamlogixError {
    invalid_input("InventoryInvalidPatch", detail)
}
