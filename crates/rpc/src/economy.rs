//! `economy.*` RPC verbs (`spec.md` §4.2).

use crate::error::{unimplemented, RpcError};
use crate::PamlogixRpc;
use pamlogix_core::{GrantedModifier, ItemDefId, ModifierRange, Reward, RewardConfig, RewardGrantOutcome, StoreItemId, UserId};
use pamlogix_economy::{AvailableRewards, DonationState};
use pamlogix_host::IapStore;
use std::collections::HashMap;

impl PamlogixRpc {
    pub fn economy_reward_create(&self, config: RewardConfig) -> Result<RewardConfig, RpcError> {
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.reward_create(config)?)
    }

    pub fn economy_reward_convert(&self, config: &RewardConfig) -> Result<AvailableRewards, RpcError> {
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.reward_convert(config))
    }

    pub async fn economy_reward_roll(&self, user_id: &UserId, config: &RewardConfig) -> Result<Reward, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.reward_roll(user_id, config).await?)
    }

    pub async fn economy_reward_grant(
        &self,
        user_id: &UserId,
        reward: Reward,
        metadata: HashMap<String, String>,
        ignore_limits: bool,
    ) -> Result<RewardGrantOutcome, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.reward_grant(user_id, reward, metadata, ignore_limits).await?)
    }

    pub async fn economy_active_modifiers(&self, user_id: &UserId) -> Result<Vec<GrantedModifier>, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.active_modifiers(user_id).await?)
    }

    pub fn economy_list(&self) -> Result<Vec<StoreItemId>, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.list())
    }

    pub async fn economy_grant(
        &self,
        user_id: &UserId,
        currencies: HashMap<String, i64>,
        items: HashMap<ItemDefId, i64>,
        modifiers: Vec<ModifierRange>,
        metadata: HashMap<String, String>,
    ) -> Result<RewardGrantOutcome, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.grant(user_id, currencies, items, modifiers, metadata).await?)
    }

    pub async fn economy_unmarshal_wallet(&self, user_id: &UserId) -> Result<HashMap<String, i64>, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.unmarshal_wallet(user_id).await?)
    }

    pub async fn economy_donation_request(&self, donation_id: &str) -> Result<DonationState, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.donation_request(donation_id).await?)
    }

    pub async fn economy_donation_give(&self, user_id: &UserId, donation_id: &str) -> Result<DonationState, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.donation_give(user_id, donation_id).await?)
    }

    pub async fn economy_donation_claim(&self, user_id: &UserId, donation_id: &str) -> Result<Reward, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.donation_claim(user_id, donation_id).await?)
    }

    pub async fn economy_donation_get(&self, donation_id: &str) -> Result<DonationState, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.donation_get(donation_id).await?)
    }

    pub async fn economy_purchase_intent(&self, user_id: &UserId, item_id: &StoreItemId) -> Result<(), RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.purchase_intent(user_id, item_id).await?)
    }

    pub async fn economy_purchase_item(
        &self,
        user_id: &UserId,
        item_id: &StoreItemId,
        store: IapStore,
        receipt: &str,
    ) -> Result<RewardGrantOutcome, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.purchase_item(user_id, item_id, store, receipt).await?)
    }

    pub async fn economy_purchase_restore(
        &self,
        user_id: &UserId,
        store: IapStore,
        receipts: Vec<String>,
    ) -> Result<Vec<pamlogix_core::TransactionId>, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.purchase_restore(user_id, store, receipts).await?)
    }

    pub async fn economy_placement_start(&self, user_id: &UserId, placement_id: &str) -> Result<String, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.placement_start(user_id, placement_id).await?)
    }

    pub async fn economy_placement_status(&self, user_id: &UserId, reference_id: &str) -> Result<String, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.placement_status(user_id, reference_id).await?)
    }

    pub async fn economy_placement_success(&self, user_id: &UserId, reference_id: &str) -> Result<RewardGrantOutcome, RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.placement_success(user_id, reference_id).await?)
    }

    pub async fn economy_placement_fail(&self, user_id: &UserId, reference_id: &str) -> Result<(), RpcError> {
        use pamlogix_economy::EconomySystem;
        let economy = self.registry.economy().ok_or_else(|| unimplemented("EconomyUnavailable", "economy not registered"))?;
        Ok(economy.placement_fail(user_id, reference_id).await?)
    }
}
