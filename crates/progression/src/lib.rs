//! Precondition-gated progression graph: recursive AND/OR/XOR unlock trees,
//! purchase, counter updates and completion rewards (`spec.md` §4.7).

pub mod config;
pub mod engine;
pub mod errors;
pub mod state;

#[cfg(test)]
mod tests;

pub use config::{PreconditionLeaf, PreconditionNode, PreconditionOperator, ProgressionConfig, ProgressionCost, ProgressionNodeConfig};
pub use engine::{ProgressionEngine, ProgressionSystem};
pub use state::{ProgressionDelta, ProgressionDeltaKind, ProgressionKnownState, ProgressionNodeState, ProgressionView, UserProgression};
