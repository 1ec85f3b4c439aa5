//! Per-user persisted progression state (`spec.md` §6 storage layout).
//!
//! There is no dedicated `progressions` collection named in `spec.md` §6 —
//! it is folded into the `stats`-style per-user blob convention the other
//! small subsystems use, under its own collection name.

pub use pamlogix_core::{ProgressionDelta, ProgressionDeltaKind, ProgressionNodeState, UserProgression};

/// The client's last-observed view of one node, passed back into `Get` so
/// the engine can compute which nodes changed since (`spec.md` §4.7 `Get
/// (lastKnown)→(progressions, deltas)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressionKnownState {
    pub unlocked: bool,
    pub counts: std::collections::HashMap<String, i64>,
}

/// A node's state plus its currently-computed unlock status — `unlocked` is
/// never persisted, it is recomputed from `preconditions` on every access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressionView {
    pub state: ProgressionNodeState,
    pub unlocked: bool,
}
