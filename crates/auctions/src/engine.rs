//! The auctions engine: listings, the bid protocol, claims, cancellation,
//! and per-user secondary indexes (`spec.md` §4.5).

use crate::config::{AuctionTemplate, AuctionsConfig};
use crate::errors;
use crate::state::{AuctionIndex, UserAuctionIndex};
use async_trait::async_trait;
use pamlogix_core::{
    internal, Auction, AuctionId, AuctionStateFlags, Bid, EconomyApi, EnergyApi, InventoryApi, PamlogixError,
    PamlogixSystem, Reward, RewardItem, SystemType, UserId,
};
use pamlogix_host::{Clock, DynHost, Notifications, Storage, Streams};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type ConfigSource = Box<dyn Fn() -> AuctionsConfig + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionSort {
    EndTimeAsc,
    EndTimeDesc,
    CreateTimeDesc,
}

#[derive(Debug, Clone, Default)]
pub struct AuctionQuery {
    pub template_id: Option<String>,
    pub active_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AuctionListPage {
    pub auctions: Vec<Auction>,
    pub cursor: Option<String>,
}

#[derive(Default)]
struct AuctionHooks {
    on_create_reward: Option<Box<dyn Fn(&UserId, &mut Auction) + Send + Sync>>,
    on_bid_reward: Option<Box<dyn Fn(&UserId, &mut Auction) + Send + Sync>>,
    on_claim_bid_reward: Option<Box<dyn Fn(&UserId, &mut Vec<RewardItem>) + Send + Sync>>,
    on_claim_created_reward: Option<Box<dyn Fn(&UserId, &mut HashMap<String, i64>) + Send + Sync>>,
}

pub struct AuctionsEngine {
    host: DynHost,
    base_config: AuctionsConfig,
    config_source: RwLock<Option<ConfigSource>>,
    registry: RwLock<Option<Arc<dyn pamlogix_core::Pamlogix>>>,
    hooks: RwLock<AuctionHooks>,
    id_counter: AtomicU64,
    version_counter: AtomicU64,
}

impl AuctionsEngine {
    pub fn new(host: DynHost, config: AuctionsConfig) -> Arc<Self> {
        Arc::new(Self {
            host,
            base_config: config,
            config_source: RwLock::new(None),
            registry: RwLock::new(None),
            hooks: RwLock::new(AuctionHooks::default()),
            id_counter: AtomicU64::new(0),
            version_counter: AtomicU64::new(0),
        })
    }

    pub fn set_config_source(&self, f: impl Fn() -> AuctionsConfig + Send + Sync + 'static) {
        *self.config_source.write() = Some(Box::new(f));
    }

    pub fn set_on_create_reward(&self, f: impl Fn(&UserId, &mut Auction) + Send + Sync + 'static) {
        self.hooks.write().on_create_reward = Some(Box::new(f));
    }

    pub fn set_on_bid_reward(&self, f: impl Fn(&UserId, &mut Auction) + Send + Sync + 'static) {
        self.hooks.write().on_bid_reward = Some(Box::new(f));
    }

    pub fn set_on_claim_bid_reward(&self, f: impl Fn(&UserId, &mut Vec<RewardItem>) + Send + Sync + 'static) {
        self.hooks.write().on_claim_bid_reward = Some(Box::new(f));
    }

    pub fn set_on_claim_created_reward(&self, f: impl Fn(&UserId, &mut HashMap<String, i64>) + Send + Sync + 'static) {
        self.hooks.write().on_claim_created_reward = Some(Box::new(f));
    }

    fn config(&self) -> AuctionsConfig {
        match self.config_source.read().as_ref() {
            Some(f) => f(),
            None => self.base_config.clone(),
        }
    }

    /// `spec.md` §4.5 "Every write mutation increments an opaque `version`
    /// (derived from a high-resolution clock hash)". There is no sub-second
    /// clock here, so a monotonic counter folded into the hash stands in for
    /// the "high-resolution" part while still changing on every call.
    fn next_version(&self) -> String {
        let seed = self.version_counter.fetch_add(1, Ordering::SeqCst);
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.host.now_unix_sec().hash(&mut hasher);
        seed.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    fn next_id(&self) -> AuctionId {
        let seed = self.id_counter.fetch_add(1, Ordering::SeqCst);
        AuctionId::from(format!("auction:{}:{seed}", self.host.now_unix_sec()))
    }

    fn topic(auction_id: &AuctionId) -> String {
        format!("auction:{}", auction_id.0)
    }

    async fn read_auction(&self, auction_id: &AuctionId) -> Result<Option<Auction>, PamlogixError> {
        match self.host.read("auctions", &auction_id.0, None).await? {
            Some(record) => Ok(Some(
                serde_json::from_str(&record.value).map_err(|e| internal("AuctionStateCorrupt", e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    async fn write_auction(&self, auction: &Auction) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(auction).map_err(|e| internal("AuctionStateSerialize", e.to_string()))?;
        self.host.write("auctions", &auction.id.0, None, value, None).await?;
        Ok(())
    }

    async fn read_index(&self, key: &str) -> Result<AuctionIndex, PamlogixError> {
        match self.host.read("auctions", key, None).await? {
            Some(record) => {
                serde_json::from_str(&record.value).map_err(|e| internal("AuctionIndexCorrupt", e.to_string()))
            }
            None => Ok(AuctionIndex::default()),
        }
    }

    async fn write_index(&self, key: &str, index: &AuctionIndex) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(index).map_err(|e| internal("AuctionIndexSerialize", e.to_string()))?;
        self.host.write("auctions", key, None, value, None).await?;
        Ok(())
    }

    async fn read_user_index(&self, key: &str) -> Result<UserAuctionIndex, PamlogixError> {
        match self.host.read("auctions", key, None).await? {
            Some(record) => {
                serde_json::from_str(&record.value).map_err(|e| internal("AuctionUserIndexCorrupt", e.to_string()))
            }
            None => Ok(UserAuctionIndex::default()),
        }
    }

    async fn write_user_index(&self, key: &str, index: &UserAuctionIndex) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(index).map_err(|e| internal("AuctionUserIndexSerialize", e.to_string()))?;
        self.host.write("auctions", key, None, value, None).await?;
        Ok(())
    }

    fn created_index_key(user_id: &UserId) -> String {
        format!("auction_user_created_{}", user_id.0)
    }

    fn bids_index_key(user_id: &UserId) -> String {
        format!("auction_user_bids_{}", user_id.0)
    }

    async fn add_to_global_index(&self, auction_id: &AuctionId) -> Result<(), PamlogixError> {
        let mut index = self.read_index("auction_index").await?;
        if !index.auction_ids.contains(auction_id) {
            index.auction_ids.push(auction_id.clone());
        }
        self.write_index("auction_index", &index).await
    }

    async fn remove_from_global_index(&self, auction_id: &AuctionId) -> Result<(), PamlogixError> {
        let mut index = self.read_index("auction_index").await?;
        index.auction_ids.retain(|id| id != auction_id);
        self.write_index("auction_index", &index).await
    }

    async fn add_to_created_index(&self, user_id: &UserId, auction_id: &AuctionId) -> Result<(), PamlogixError> {
        let key = Self::created_index_key(user_id);
        let mut index = self.read_user_index(&key).await?;
        index.add(auction_id.clone());
        self.write_user_index(&key, &index).await
    }

    async fn add_to_bids_index(&self, user_id: &UserId, auction_id: &AuctionId) -> Result<(), PamlogixError> {
        let key = Self::bids_index_key(user_id);
        let mut index = self.read_user_index(&key).await?;
        index.add(auction_id.clone());
        self.write_user_index(&key, &index).await
    }

    async fn remove_from_bids_index(&self, user_id: &UserId, auction_id: &AuctionId) -> Result<(), PamlogixError> {
        let key = Self::bids_index_key(user_id);
        let mut index = self.read_user_index(&key).await?;
        index.remove(auction_id);
        self.write_user_index(&key, &index).await
    }

    fn recompute_state(auction: &mut Auction, now: i64) {
        let cancelled = auction.cancel_time_sec > 0;
        let has_started = now >= auction.start_time_sec;
        let has_ended = cancelled || now >= auction.end_time_sec;
        auction.state = AuctionStateFlags {
            has_started,
            has_ended,
            can_bid: has_started && !has_ended,
            can_claim: has_ended && !cancelled,
            can_cancel: !has_ended && !cancelled && auction.bid.is_none(),
        };
    }

    /// `spec.md` §4.5 step 6 / §8 scenario 1: the next bidder's floor is the
    /// current bid plus an increment of `max(percentage * bid, fixed)` per
    /// currency, defaulting to `max(bid/10, 1)` if neither is configured for
    /// that currency. `bid_next` is the minimum a future bid must meet or
    /// exceed, not the increment alone.
    fn compute_bid_next(template: &AuctionTemplate, bid: &HashMap<String, i64>) -> HashMap<String, i64> {
        bid.iter()
            .map(|(currency, &amount)| {
                let pct = template.bid_increment.percentage.get(currency).copied();
                let fixed = template.bid_increment.fixed.get(currency).copied();
                let increment = match (pct, fixed) {
                    (Some(p), Some(f)) => (((amount as f64) * p).round() as i64).max(f),
                    (Some(p), None) => ((amount as f64) * p).round() as i64,
                    (None, Some(f)) => f,
                    (None, None) => (amount / 10).max(1),
                };
                (currency.clone(), amount + increment)
            })
            .collect()
    }

    async fn notify(&self, user_id: &UserId, subject: &str, payload: &str) {
        let _ = Notifications::send(self.host.as_ref(), user_id, subject, payload, 0, true).await;
    }
}

/// Full public surface named in `spec.md` §4.5.
#[async_trait]
pub trait AuctionsSystem: Send + Sync {
    fn get_templates(&self) -> Vec<AuctionTemplate>;
    async fn list(
        &self,
        query: AuctionQuery,
        sort: AuctionSort,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<AuctionListPage, PamlogixError>;
    async fn create(
        &self,
        user_id: &UserId,
        template_id: &str,
        reward_items: Vec<RewardItem>,
    ) -> Result<Auction, PamlogixError>;
    async fn bid(
        &self,
        user_id: &UserId,
        auction_id: &AuctionId,
        version: &str,
        currencies: HashMap<String, i64>,
    ) -> Result<Auction, PamlogixError>;
    async fn claim_bid(&self, user_id: &UserId, auction_id: &AuctionId) -> Result<Vec<RewardItem>, PamlogixError>;
    async fn claim_created(&self, user_id: &UserId, auction_id: &AuctionId) -> Result<HashMap<String, i64>, PamlogixError>;
    async fn cancel(&self, user_id: &UserId, auction_id: &AuctionId) -> Result<Auction, PamlogixError>;
    async fn list_bids(&self, user_id: &UserId, limit: usize, cursor: Option<&str>) -> Result<Vec<Auction>, PamlogixError>;
    async fn list_created(&self, user_id: &UserId, limit: usize, cursor: Option<&str>) -> Result<Vec<Auction>, PamlogixError>;
    async fn follow(&self, user_id: &UserId, auction_ids: &[AuctionId]) -> Result<(), PamlogixError>;
}

#[async_trait]
impl AuctionsSystem for AuctionsEngine {
    fn get_templates(&self) -> Vec<AuctionTemplate> {
        self.config().templates.into_values().collect()
    }

    async fn list(
        &self,
        query: AuctionQuery,
        sort: AuctionSort,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<AuctionListPage, PamlogixError> {
        let now = self.host.now_unix_sec();
        let index = self.read_index("auction_index").await?;
        let mut auctions = Vec::new();
        for id in &index.auction_ids {
            if let Some(mut auction) = self.read_auction(id).await? {
                Self::recompute_state(&mut auction, now);
                if let Some(template_id) = &query.template_id {
                    if &auction.template_id != template_id {
                        continue;
                    }
                }
                if query.active_only && auction.state.has_ended {
                    continue;
                }
                auctions.push(auction);
            }
        }
        match sort {
            AuctionSort::EndTimeAsc => auctions.sort_by_key(|a| a.end_time_sec),
            AuctionSort::EndTimeDesc => auctions.sort_by_key(|a| std::cmp::Reverse(a.end_time_sec)),
            AuctionSort::CreateTimeDesc => auctions.sort_by_key(|a| std::cmp::Reverse(a.create_time_sec)),
        }
        let start = match cursor {
            Some(c) => auctions.iter().position(|a| a.id.0 == c).map(|p| p + 1).unwrap_or(0),
            None => 0,
        };
        let page: Vec<Auction> = auctions.iter().skip(start).take(limit).cloned().collect();
        let next_cursor = if start + page.len() < auctions.len() { page.last().map(|a| a.id.0.clone()) } else { None };
        Ok(AuctionListPage { auctions: page, cursor: next_cursor })
    }

    async fn create(
        &self,
        user_id: &UserId,
        template_id: &str,
        reward_items: Vec<RewardItem>,
    ) -> Result<Auction, PamlogixError> {
        let config = self.config();
        let template = config.templates.get(template_id).cloned().ok_or_else(|| errors::unknown_template(template_id))?;

        for item in &reward_items {
            if !template.allowed_item_ids.is_empty() && !template.allowed_item_ids.contains(&item.item_id) {
                return Err(errors::item_not_allowed(&item.item_id.0, template_id));
            }
        }

        let now = self.host.now_unix_sec();
        let registry = self.registry.read().clone();

        if !template.listing_cost.currencies.is_empty() {
            let economy: Arc<dyn EconomyApi> =
                registry.as_ref().and_then(|r| r.get_economy()).ok_or_else(errors::economy_unavailable)?;
            let debit: HashMap<String, i64> =
                template.listing_cost.currencies.iter().map(|(k, v)| (k.clone(), -*v)).collect();
            economy
                .reward_grant(user_id, Reward { currencies: debit, grant_time_sec: now, ..Default::default() }, HashMap::new(), true)
                .await?;
        }
        if !template.listing_cost.energies.is_empty() {
            let energy: Arc<dyn EnergyApi> =
                registry.as_ref().and_then(|r| r.get_energy()).ok_or_else(errors::energy_unavailable)?;
            energy.spend(user_id, &template.listing_cost.energies).await?;
        }
        if !template.listing_cost.items.is_empty() {
            let inventory: Arc<dyn InventoryApi> =
                registry.as_ref().and_then(|r| r.get_inventory()).ok_or_else(errors::inventory_unavailable)?;
            inventory.consume_items(user_id, &template.listing_cost.items, &HashMap::new(), false).await?;
        }

        let id = self.next_id();
        let mut auction = Auction {
            id: id.clone(),
            template_id: template_id.to_string(),
            creator_user_id: user_id.clone(),
            reward_items,
            bid: None,
            bid_first: None,
            bid_history: Vec::new(),
            bid_next: template.bid_start.clone(),
            version: self.next_version(),
            start_time_sec: now,
            end_time_sec: now + template.duration_sec,
            original_end_time_sec: now + template.duration_sec,
            extension_threshold_sec: template.extension_threshold_sec,
            extension_sec: template.extension_sec,
            extension_max_sec: template.extension_max_sec,
            extension_remaining_sec: template.extension_max_sec,
            extension_added_sec: 0,
            create_time_sec: now,
            cancel_time_sec: 0,
            winner_claim_sec: 0,
            owner_claim_sec: 0,
            fee_percentage: template.fee.percentage,
            fee_fixed: template.fee.fixed.clone(),
            state: AuctionStateFlags::default(),
        };
        Self::recompute_state(&mut auction, now);
        if let Some(f) = &self.hooks.read().on_create_reward {
            f(user_id, &mut auction);
        }

        self.write_auction(&auction).await?;
        self.add_to_global_index(&id).await?;
        self.add_to_created_index(user_id, &id).await?;
        Ok(auction)
    }

    async fn bid(
        &self,
        user_id: &UserId,
        auction_id: &AuctionId,
        version: &str,
        currencies: HashMap<String, i64>,
    ) -> Result<Auction, PamlogixError> {
        let config = self.config();
        let now = self.host.now_unix_sec();
        let mut auction = self.read_auction(auction_id).await?.ok_or_else(|| errors::unknown_auction(&auction_id.0))?;
        Self::recompute_state(&mut auction, now);

        if auction.version != version {
            return Err(errors::version_mismatch(&auction_id.0));
        }
        if &auction.creator_user_id == user_id {
            return Err(errors::creator_cannot_bid(&auction_id.0));
        }
        if let Some(bid) = &auction.bid {
            if &bid.bidder_id == user_id {
                return Err(errors::already_highest_bidder(&auction_id.0));
            }
        }
        if !auction.state.has_started {
            return Err(errors::not_started(&auction_id.0));
        }
        if auction.state.has_ended {
            return Err(errors::already_ended(&auction_id.0));
        }
        if currencies.is_empty() || currencies.values().any(|&v| v <= 0) {
            return Err(errors::invalid_bid_amount(&auction_id.0));
        }
        for (currency, &min) in &auction.bid_next {
            if currencies.get(currency).copied().unwrap_or(0) < min {
                return Err(errors::bid_too_low(&auction_id.0));
            }
        }

        let template = config.templates.get(&auction.template_id).cloned();
        let economy: Arc<dyn EconomyApi> =
            self.registry.read().as_ref().and_then(|r| r.get_economy()).ok_or_else(errors::economy_unavailable)?;

        let debit: HashMap<String, i64> = currencies.iter().map(|(k, v)| (k.clone(), -*v)).collect();
        economy
            .reward_grant(user_id, Reward { currencies: debit, grant_time_sec: now, ..Default::default() }, HashMap::new(), true)
            .await?;
        log::info!("auction {}: debited {:?} from bidder {:?} for operator reconciliation", auction_id.0, currencies, user_id);

        if let Some(prev) = auction.bid.clone() {
            economy
                .reward_grant(
                    &prev.bidder_id,
                    Reward { currencies: prev.currencies.clone(), grant_time_sec: now, ..Default::default() },
                    HashMap::new(),
                    true,
                )
                .await?;
            log::info!(
                "auction {}: refunded {:?} to outbid bidder {:?} for operator reconciliation",
                auction_id.0,
                prev.currencies,
                prev.bidder_id
            );
            self.remove_from_bids_index(&prev.bidder_id, auction_id).await?;
            self.notify(&prev.bidder_id, "auction_outbid", &auction_id.0).await;
        }

        let new_bid = Bid { bidder_id: user_id.clone(), currencies: currencies.clone(), bid_time_sec: now };
        if auction.bid_first.is_none() {
            auction.bid_first = Some(new_bid.clone());
        }
        auction.bid_history.insert(0, new_bid.clone());
        let keep = template.as_ref().map(|t| t.bid_history_count.max(1)).unwrap_or(10);
        auction.bid_history.truncate(keep);
        auction.bid = Some(new_bid);

        if let Some(template) = &template {
            auction.bid_next = Self::compute_bid_next(template, &currencies);
            if auction.extension_threshold_sec > 0 && auction.end_time_sec - now <= auction.extension_threshold_sec {
                let extend = auction.extension_sec.min(auction.extension_remaining_sec);
                if extend > 0 {
                    auction.end_time_sec += extend;
                    auction.extension_remaining_sec -= extend;
                    auction.extension_added_sec += extend;
                }
            }
        }

        auction.version = self.next_version();
        Self::recompute_state(&mut auction, now);

        if let Some(f) = &self.hooks.read().on_bid_reward {
            f(user_id, &mut auction);
        }

        if let Err(e) = self.write_auction(&auction).await {
            log::error!(
                "auction {}: failed to persist bid state after currency debit/credit already settled: {e}",
                auction_id.0
            );
            return Err(e);
        }
        self.add_to_bids_index(user_id, auction_id).await?;
        let _ = self.host.user_join(user_id, &Self::topic(auction_id)).await;
        let _ = Streams::send(self.host.as_ref(), &Self::topic(auction_id), &auction.version).await;
        self.notify(&auction.creator_user_id, "auction_bid", &auction_id.0).await;

        Ok(auction)
    }

    async fn claim_bid(&self, user_id: &UserId, auction_id: &AuctionId) -> Result<Vec<RewardItem>, PamlogixError> {
        let now = self.host.now_unix_sec();
        let mut auction = self.read_auction(auction_id).await?.ok_or_else(|| errors::unknown_auction(&auction_id.0))?;
        Self::recompute_state(&mut auction, now);

        let bid = auction.bid.clone().ok_or_else(|| errors::not_winner(&auction_id.0))?;
        if &bid.bidder_id != user_id {
            return Err(errors::not_winner(&auction_id.0));
        }
        if !auction.state.has_ended {
            return Err(errors::not_ended(&auction_id.0));
        }
        if auction.winner_claim_sec > 0 {
            return Ok(auction.reward_items.clone());
        }

        let mut items = auction.reward_items.clone();
        if let Some(f) = &self.hooks.read().on_claim_bid_reward {
            f(user_id, &mut items);
        }
        if !items.is_empty() {
            if let Some(inventory) = self.registry.read().as_ref().and_then(|r| r.get_inventory()) {
                inventory.grant_items(user_id, &items, true).await?;
            }
        }

        auction.winner_claim_sec = now;
        auction.version = self.next_version();
        Self::recompute_state(&mut auction, now);
        self.write_auction(&auction).await?;
        Ok(items)
    }

    async fn claim_created(
        &self,
        user_id: &UserId,
        auction_id: &AuctionId,
    ) -> Result<HashMap<String, i64>, PamlogixError> {
        let now = self.host.now_unix_sec();
        let mut auction = self.read_auction(auction_id).await?.ok_or_else(|| errors::unknown_auction(&auction_id.0))?;
        Self::recompute_state(&mut auction, now);

        if &auction.creator_user_id != user_id {
            return Err(errors::not_creator(&auction_id.0));
        }
        if !auction.state.has_ended {
            return Err(errors::not_ended(&auction_id.0));
        }
        if auction.owner_claim_sec > 0 {
            return Ok(HashMap::new());
        }

        let proceeds = if let Some(bid) = auction.bid.clone() {
            let mut net = HashMap::new();
            for (currency, amount) in &bid.currencies {
                let fee_fixed = auction.fee_fixed.get(currency).copied().unwrap_or(0);
                let fee = (((*amount) as f64) * auction.fee_percentage).round() as i64 + fee_fixed;
                net.insert(currency.clone(), (*amount - fee).max(0));
            }
            if let Some(f) = &self.hooks.read().on_claim_created_reward {
                f(user_id, &mut net);
            }
            if !net.is_empty() {
                let economy: Arc<dyn EconomyApi> =
                    self.registry.read().as_ref().and_then(|r| r.get_economy()).ok_or_else(errors::economy_unavailable)?;
                economy
                    .reward_grant(user_id, Reward { currencies: net.clone(), grant_time_sec: now, ..Default::default() }, HashMap::new(), true)
                    .await?;
            }
            net
        } else {
            if !auction.reward_items.is_empty() {
                if let Some(inventory) = self.registry.read().as_ref().and_then(|r| r.get_inventory()) {
                    inventory.grant_items(user_id, &auction.reward_items, true).await?;
                }
            }
            HashMap::new()
        };

        auction.owner_claim_sec = now;
        auction.version = self.next_version();
        Self::recompute_state(&mut auction, now);
        self.write_auction(&auction).await?;
        Ok(proceeds)
    }

    async fn cancel(&self, user_id: &UserId, auction_id: &AuctionId) -> Result<Auction, PamlogixError> {
        let now = self.host.now_unix_sec();
        let mut auction = self.read_auction(auction_id).await?.ok_or_else(|| errors::unknown_auction(&auction_id.0))?;
        Self::recompute_state(&mut auction, now);

        if &auction.creator_user_id != user_id {
            return Err(errors::not_creator(&auction_id.0));
        }
        if auction.state.has_ended {
            return Err(errors::already_ended(&auction_id.0));
        }
        if auction.bid.is_some() {
            return Err(errors::cancel_forbidden(&auction_id.0));
        }

        auction.cancel_time_sec = now;
        auction.version = self.next_version();
        Self::recompute_state(&mut auction, now);
        self.write_auction(&auction).await?;
        self.remove_from_global_index(auction_id).await?;
        Ok(auction)
    }

    async fn list_bids(&self, user_id: &UserId, limit: usize, cursor: Option<&str>) -> Result<Vec<Auction>, PamlogixError> {
        let key = Self::bids_index_key(user_id);
        let index = self.read_user_index(&key).await?;
        let start = match cursor {
            Some(c) => index.auction_ids.iter().position(|id| id.0 == c).map(|p| p + 1).unwrap_or(0),
            None => 0,
        };
        let mut out = Vec::new();
        for id in index.auction_ids.iter().skip(start).take(limit) {
            if let Some(auction) = self.read_auction(id).await? {
                out.push(auction);
            }
        }
        Ok(out)
    }

    async fn list_created(&self, user_id: &UserId, limit: usize, cursor: Option<&str>) -> Result<Vec<Auction>, PamlogixError> {
        let key = Self::created_index_key(user_id);
        let index = self.read_user_index(&key).await?;
        let start = match cursor {
            Some(c) => index.auction_ids.iter().position(|id| id.0 == c).map(|p| p + 1).unwrap_or(0),
            None => 0,
        };
        let mut out = Vec::new();
        for id in index.auction_ids.iter().skip(start).take(limit) {
            if let Some(auction) = self.read_auction(id).await? {
                out.push(auction);
            }
        }
        Ok(out)
    }

    async fn follow(&self, user_id: &UserId, auction_ids: &[AuctionId]) -> Result<(), PamlogixError> {
        for id in auction_ids {
            self.host.user_join(user_id, &Self::topic(id)).await?;
        }
        Ok(())
    }
}

impl PamlogixSystem for AuctionsEngine {
    fn system_type(&self) -> SystemType {
        SystemType::Auctions
    }

    fn set_pamlogix(&self, registry: Arc<dyn pamlogix_core::Pamlogix>) {
        *self.registry.write() = Some(registry);
    }
}

impl std::fmt::Debug for AuctionsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuctionsEngine").finish_non_exhaustive()
    }
}
