//! `stats.*`, `teams.*`, and `incentives.*` RPC verbs (`spec.md` §4.9).

use crate::error::{unimplemented, RpcError};
use crate::PamlogixRpc;
use pamlogix_core::{GroupId, Incentive, Reward, Stat, StatOperator, UserId};
use pamlogix_social::{IncentivesSystem, StatsSystem, TeamsSystem};
use std::collections::HashMap;

impl PamlogixRpc {
    pub async fn stats_list(&self, user_id: &UserId) -> Result<HashMap<String, Stat>, RpcError> {
        let stats = self.registry.stats().ok_or_else(|| unimplemented("StatsUnavailable", "stats not registered"))?;
        Ok(stats.list(user_id).await?)
    }

    pub async fn stats_update(
        &self,
        user_id: &UserId,
        updates: &[(String, StatOperator, i64)],
    ) -> Result<HashMap<String, Stat>, RpcError> {
        let stats = self.registry.stats().ok_or_else(|| unimplemented("StatsUnavailable", "stats not registered"))?;
        Ok(stats.update(user_id, updates).await?)
    }

    pub async fn teams_write_chat_message(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
        content: &str,
    ) -> Result<(), RpcError> {
        let teams = self.registry.teams().ok_or_else(|| unimplemented("TeamsUnavailable", "teams not registered"))?;
        Ok(teams.write_chat_message(user_id, group_id, content).await?)
    }

    pub async fn incentives_sender_create(
        &self,
        user_id: &UserId,
        config_id: &str,
        recipient_ids: Vec<UserId>,
    ) -> Result<Incentive, RpcError> {
        let incentives = self.registry.incentives().ok_or_else(|| unimplemented("IncentivesUnavailable", "incentives not registered"))?;
        Ok(incentives.sender_create(user_id, config_id, recipient_ids).await?)
    }

    pub async fn incentives_sender_list(&self, user_id: &UserId) -> Result<Vec<Incentive>, RpcError> {
        let incentives = self.registry.incentives().ok_or_else(|| unimplemented("IncentivesUnavailable", "incentives not registered"))?;
        Ok(incentives.sender_list(user_id).await?)
    }

    pub async fn incentives_sender_delete(&self, user_id: &UserId, code: &str) -> Result<(), RpcError> {
        let incentives = self.registry.incentives().ok_or_else(|| unimplemented("IncentivesUnavailable", "incentives not registered"))?;
        Ok(incentives.sender_delete(user_id, code).await?)
    }

    pub async fn incentives_recipient_get(&self, code: &str) -> Result<Incentive, RpcError> {
        let incentives = self.registry.incentives().ok_or_else(|| unimplemented("IncentivesUnavailable", "incentives not registered"))?;
        Ok(incentives.recipient_get(code).await?)
    }

    pub async fn incentives_recipient_claim(&self, user_id: &UserId, code: &str) -> Result<Reward, RpcError> {
        let incentives = self.registry.incentives().ok_or_else(|| unimplemented("IncentivesUnavailable", "incentives not registered"))?;
        Ok(incentives.recipient_claim(user_id, code).await?)
    }
}
