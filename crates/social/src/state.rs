//! Per-user index kept alongside the globally-owned `Incentive` records
//! (`spec.md` §3 "Incentive" is sender-created and globally addressable by
//! `code`, the same ownership shape auctions use for their own
//! globally-owned entity — see `pamlogix_auctions::state`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserIncentives {
    /// Codes this user created, for `max_concurrent` enforcement and
    /// listing the sender's own incentives.
    #[serde(default)]
    pub sent_codes: Vec<String>,
    /// Codes this user has successfully claimed as recipient.
    #[serde(default)]
    pub claimed_codes: Vec<String>,
}
