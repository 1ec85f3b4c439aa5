//! Player-to-player auctions: listings, the bid protocol, claims, and
//! cancellation (`spec.md` §4.5).

pub mod config;
pub mod engine;
pub mod errors;
pub mod state;

#[cfg(test)]
mod tests;

pub use config::{AuctionTemplate, AuctionsConfig, BidIncrementConfig, FeeConfig, ListingCost};
pub use engine::{AuctionListPage, AuctionQuery, AuctionSort, AuctionsEngine, AuctionsSystem};
pub use state::{Auction, AuctionIndex, UserAuctionIndex};
