//! Auction storage layout (`spec.md` §6): the auction record itself, a
//! global active-set index, and per-user created/bids secondary indexes —
//! each its own storage blob rather than one big table, matching the
//! teacher's preference for narrow, independently-versioned storage items
//! over a monolithic map.

pub use pamlogix_core::Auction;
use pamlogix_core::AuctionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuctionIndex {
    pub auction_ids: Vec<AuctionId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAuctionIndex {
    pub auction_ids: Vec<AuctionId>,
}

impl UserAuctionIndex {
    pub fn add(&mut self, id: AuctionId) {
        if !self.auction_ids.contains(&id) {
            self.auction_ids.push(id);
        }
    }

    pub fn remove(&mut self, id: &AuctionId) {
        self.auction_ids.retain(|existing| existing != id);
    }
}
