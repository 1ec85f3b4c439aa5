//! Stable sentinel constructors for the energy engine (`spec.md` §7).

use pamlogix_core::{insufficient_items, not_found, PamlogixError};

pub fn unknown_bucket(energy_id: &str) -> PamlogixError {
    not_found("EnergyUnknownBucket", format!("no energy bucket config {energy_id}"))
}

pub fn insufficient_energy(energy_id: &str, requested: i64, available: i64) -> PamlogixError {
    insufficient_items(
        "EnergyInsufficient",
        format!("requested {requested} of {energy_id}, only {available} available"),
    )
}
