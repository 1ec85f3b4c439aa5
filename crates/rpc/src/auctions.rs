//! `auctions.*` RPC verbs (`spec.md` §4.5).

use crate::error::{unimplemented, RpcError};
use crate::PamlogixRpc;
use pamlogix_auctions::{AuctionListPage, AuctionQuery, AuctionSort, AuctionTemplate, AuctionsSystem};
use pamlogix_core::{Auction, AuctionId, RewardItem, UserId};
use std::collections::HashMap;

impl PamlogixRpc {
    pub fn auctions_get_templates(&self) -> Result<Vec<AuctionTemplate>, RpcError> {
        let auctions = self.registry.auctions().ok_or_else(|| unimplemented("AuctionsUnavailable", "auctions not registered"))?;
        Ok(auctions.get_templates())
    }

    pub async fn auctions_list(
        &self,
        query: AuctionQuery,
        sort: AuctionSort,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<AuctionListPage, RpcError> {
        let auctions = self.registry.auctions().ok_or_else(|| unimplemented("AuctionsUnavailable", "auctions not registered"))?;
        Ok(auctions.list(query, sort, limit, cursor).await?)
    }

    pub async fn auctions_create(
        &self,
        user_id: &UserId,
        template_id: &str,
        reward_items: Vec<RewardItem>,
    ) -> Result<Auction, RpcError> {
        let auctions = self.registry.auctions().ok_or_else(|| unimplemented("AuctionsUnavailable", "auctions not registered"))?;
        Ok(auctions.create(user_id, template_id, reward_items).await?)
    }

    pub async fn auctions_bid(
        &self,
        user_id: &UserId,
        auction_id: &AuctionId,
        version: &str,
        currencies: HashMap<String, i64>,
    ) -> Result<Auction, RpcError> {
        let auctions = self.registry.auctions().ok_or_else(|| unimplemented("AuctionsUnavailable", "auctions not registered"))?;
        Ok(auctions.bid(user_id, auction_id, version, currencies).await?)
    }

    pub async fn auctions_claim_bid(&self, user_id: &UserId, auction_id: &AuctionId) -> Result<Vec<RewardItem>, RpcError> {
        let auctions = self.registry.auctions().ok_or_else(|| unimplemented("AuctionsUnavailable", "auctions not registered"))?;
        Ok(auctions.claim_bid(user_id, auction_id).await?)
    }

    pub async fn auctions_claim_created(
        &self,
        user_id: &UserId,
        auction_id: &AuctionId,
    ) -> Result<HashMap<String, i64>, RpcError> {
        let auctions = self.registry.auctions().ok_or_else(|| unimplemented("AuctionsUnavailable", "auctions not registered"))?;
        Ok(auctions.claim_created(user_id, auction_id).await?)
    }

    pub async fn auctions_cancel(&self, user_id: &UserId, auction_id: &AuctionId) -> Result<Auction, RpcError> {
        let auctions = self.registry.auctions().ok_or_else(|| unimplemented("AuctionsUnavailable", "auctions not registered"))?;
        Ok(auctions.cancel(user_id, auction_id).await?)
    }

    pub async fn auctions_list_bids(&self, user_id: &UserId, limit: usize, cursor: Option<&str>) -> Result<Vec<Auction>, RpcError> {
        let auctions = self.registry.auctions().ok_or_else(|| unimplemented("AuctionsUnavailable", "auctions not registered"))?;
        Ok(auctions.list_bids(user_id, limit, cursor).await?)
    }

    pub async fn auctions_list_created(&self, user_id: &UserId, limit: usize, cursor: Option<&str>) -> Result<Vec<Auction>, RpcError> {
        let auctions = self.registry.auctions().ok_or_else(|| unimplemented("AuctionsUnavailable", "auctions not registered"))?;
        Ok(auctions.list_created(user_id, limit, cursor).await?)
    }

    pub async fn auctions_follow(&self, user_id: &UserId, auction_ids: &[AuctionId]) -> Result<(), RpcError> {
        let auctions = self.registry.auctions().ok_or_else(|| unimplemented("AuctionsUnavailable", "auctions not registered"))?;
        Ok(auctions.follow(user_id, auction_ids).await?)
    }
}
