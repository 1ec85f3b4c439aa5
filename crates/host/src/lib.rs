//! The host contract every Pamlogix subsystem is written against
//! (`spec.md` §6 "Host contract (consumed)"). Out of scope for this
//! workspace: the concrete implementations of these traits live in the
//! embedding game backend. What we own is the interface plus `mock`, an
//! in-memory implementation used by every subsystem crate's own tests —
//! the non-blockchain analogue of the teacher's shared `mock.rs` /
//! `TestExternalities` construction.

pub mod accounts;
pub mod clock;
pub mod groups;
pub mod iap;
pub mod mock;
pub mod notifications;
pub mod storage;
pub mod streams;
pub mod wallet;

#[cfg(test)]
mod tests;

pub use accounts::Accounts;
pub use clock::Clock;
pub use groups::{Groups, GroupMembershipState, GroupsListPage};
pub use iap::{Iap, IapStore, IapValidation};
pub use notifications::Notifications;
pub use storage::{Storage, StorageListPage, StorageRecord};
pub use streams::Streams;
pub use wallet::{Wallet, WalletUpdateResult};

use std::sync::Arc;

/// Every collaborator a subsystem might need, bundled so a registry only has
/// to carry one `Arc<dyn Host>` instead of seven. Any individual trait can
/// still be used standalone (most unit tests only need `Storage` + `Clock`).
pub trait Host: Storage + Wallet + Clock + Streams + Notifications + Groups + Iap + Accounts {}

impl<T> Host for T where
    T: Storage + Wallet + Clock + Streams + Notifications + Groups + Iap + Accounts
{
}

pub type DynHost = Arc<dyn Host>;
