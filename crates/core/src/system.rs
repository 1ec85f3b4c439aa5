//! System discovery tag for the Pamlogix registry (spec.md §4.1).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemType {
    Economy,
    Inventory,
    Energy,
    Auctions,
    Streaks,
    Progression,
    Unlockables,
    Stats,
    Teams,
    Incentives,
}
