//! Economy reward-rolling and granting engine (`spec.md` §4.2).

pub mod config;
pub mod engine;
pub mod errors;
pub mod grant;
pub mod roll;
pub mod state;


pub use config::{DonationConfig, EconomyConfig, PlacementConfig, StoreItemConfig};
pub use engine::{EconomyEngine, EconomySystem};
pub use state::{DonationState, PlacementRecord, PlacementState, PurchaseIntent, PurchaseTransaction, UserEconomyState};
