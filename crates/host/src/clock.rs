//! Wall-clock time source (`spec.md` §6 "Time source").
//!
//! Every subsystem reads time exclusively through this trait — never
//! `SystemTime::now()` directly — so refill, CRON-reset and extension-window
//! logic is deterministic under test. This plays the role the teacher fills
//! with `frame_system::Pallet::<T>::block_number()`.

use pamlogix_core::UnixSeconds;

pub trait Clock: Send + Sync {
    fn now_unix_sec(&self) -> UnixSeconds;
}
