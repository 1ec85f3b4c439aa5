//! Newtype ids. The host's storage/wallet primitives key everything by plain
//! strings; these wrappers exist so subsystem signatures read as what they
//! are instead of `String` soup, the same motivation the teacher has for
//! `T::AccountId` instead of passing raw bytes around.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(UserId, "The host's authenticated user identifier.");
string_id!(ItemDefId, "An item definition id from the inventory config catalogue.");
string_id!(InstanceId, "A unique instance id for one inventory item stack/unit.");
string_id!(AuctionId, "A globally unique auction id.");
string_id!(StreakId, "A configured streak id.");
string_id!(ProgressionNodeId, "A configured progression node id.");
string_id!(UnlockableId, "A configured unlockable definition id.");
string_id!(UnlockableInstanceId, "A per-user unlockable instance id.");
string_id!(IncentiveId, "A sender-created incentive record id.");
string_id!(TransactionId, "An IAP store transaction id.");
string_id!(StoreItemId, "A configured store catalogue item id.");
string_id!(GroupId, "A host group/team id.");

/// Unix seconds. Kept as a transparent alias (not a newtype) because every
/// subsystem does arithmetic on it constantly; wrapping it would make every
/// `+`/`-` call site noisy for no safety benefit (the host's clock is the
/// only source of truth, injected via `pamlogix_host::Clock`).
pub type UnixSeconds = i64;
