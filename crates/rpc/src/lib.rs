//! Thin one-RPC-per-verb dispatch table over a [`PamlogixRegistry`]
//! (`spec.md` §6), analogous to the teacher's `pallets/airdrop/rpc` crate
//! exposing a pallet's calls over `jsonrpsee` to the node's RPC server.
//!
//! [`PamlogixRpc`] holds one `Arc<PamlogixRegistry>` and exposes one method
//! per subsystem verb, translating [`PamlogixError`] into the five boundary
//! codes named in `spec.md` §6 via [`RpcErrorCode`]'s `From` impl. A missing
//! subsystem maps to `UNIMPLEMENTED` rather than panicking — the registry's
//! nil-is-valid contract (`spec.md` §9) extends all the way to the RPC
//! boundary.

mod error;

pub mod auctions;
pub mod economy;
pub mod energy;
pub mod inventory;
pub mod progression;
pub mod social;
pub mod streaks;
pub mod unlockables;

pub use error::RpcErrorCode;

use pamlogix_registry::PamlogixRegistry;
use std::sync::Arc;

/// Dispatch entry point. Each subsystem's verbs live in their own module as
/// an `impl PamlogixRpc` block, mirroring how the registry groups typed
/// handles rather than flattening everything into one giant trait.
pub struct PamlogixRpc {
    registry: Arc<PamlogixRegistry>,
}

impl PamlogixRpc {
    pub fn new(registry: Arc<PamlogixRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<PamlogixRegistry> {
        &self.registry
    }
}
