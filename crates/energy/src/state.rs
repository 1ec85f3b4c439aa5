//! Per-user persisted energy state (`spec.md` §6 storage layout: `energy`
//! collection, `user_energies` key).

pub use pamlogix_core::{EnergyBucket, UserEnergies};
