//! Per-user persisted streak state (`spec.md` §6 storage layout: `streaks`
//! collection, `user_streaks` key).

pub use pamlogix_core::{Streak, UserStreaks};
