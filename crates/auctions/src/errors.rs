//! Stable sentinel constructors for the auctions engine (`spec.md` §7).

use pamlogix_core::{conflict, invalid_input, not_found, precondition_failed, unauthorized, unavailable, PamlogixError};

pub fn unknown_template(template_id: &str) -> PamlogixError {
    not_found("AuctionUnknownTemplate", format!("no auction template {template_id}"))
}

pub fn unknown_auction(auction_id: &str) -> PamlogixError {
    not_found("AuctionNotFound", format!("no auction {auction_id}"))
}

pub fn version_mismatch(auction_id: &str) -> PamlogixError {
    conflict("AuctionVersionMismatch", format!("stale version presented for auction {auction_id}"))
}

pub fn creator_cannot_bid(auction_id: &str) -> PamlogixError {
    unauthorized("AuctionCreatorCannotBid", format!("creator may not bid on auction {auction_id}"))
}

pub fn already_highest_bidder(auction_id: &str) -> PamlogixError {
    precondition_failed("AuctionAlreadyHighestBidder", format!("caller is already the highest bidder on {auction_id}"))
}

pub fn not_started(auction_id: &str) -> PamlogixError {
    precondition_failed("AuctionNotStarted", format!("auction {auction_id} has not started"))
}

pub fn already_ended(auction_id: &str) -> PamlogixError {
    precondition_failed("AuctionEnded", format!("auction {auction_id} has already ended"))
}

pub fn not_ended(auction_id: &str) -> PamlogixError {
    precondition_failed("AuctionNotEnded", format!("auction {auction_id} has not ended yet"))
}

pub fn bid_too_low(auction_id: &str) -> PamlogixError {
    invalid_input("AuctionBidTooLow", format!("bid does not meet bid_next for auction {auction_id}"))
}

pub fn invalid_bid_amount(auction_id: &str) -> PamlogixError {
    invalid_input("AuctionInvalidBidAmount", format!("bid currency entries must be > 0 for auction {auction_id}"))
}

pub fn item_not_allowed(item_id: &str, template_id: &str) -> PamlogixError {
    invalid_input("AuctionItemNotAllowed", format!("item {item_id} not allowed by template {template_id}"))
}

pub fn cancel_forbidden(auction_id: &str) -> PamlogixError {
    precondition_failed("AuctionCancelForbidden", format!("auction {auction_id} cannot be cancelled"))
}

pub fn not_creator(auction_id: &str) -> PamlogixError {
    unauthorized("AuctionNotCreator", format!("caller is not the creator of auction {auction_id}"))
}

pub fn not_winner(auction_id: &str) -> PamlogixError {
    unauthorized("AuctionNotWinner", format!("caller is not the winning bidder of auction {auction_id}"))
}

pub fn economy_unavailable() -> PamlogixError {
    unavailable("AuctionEconomyUnavailable", "economy system not registered")
}

pub fn energy_unavailable() -> PamlogixError {
    unavailable("AuctionEnergyUnavailable", "energy system not registered")
}

pub fn inventory_unavailable() -> PamlogixError {
    unavailable("AuctionInventoryUnavailable", "inventory system not registered")
}
