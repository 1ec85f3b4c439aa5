//! `streaks.*` RPC verbs (`spec.md` §4.6).

use crate::error::{unimplemented, RpcError};
use crate::PamlogixRpc;
use pamlogix_core::UserId;
use pamlogix_streaks::{Streak, StreakClaimResult, StreaksSystem};
use std::collections::HashMap;

impl PamlogixRpc {
    pub async fn streaks_list(&self, user_id: &UserId) -> Result<HashMap<String, Streak>, RpcError> {
        let streaks = self.registry.streaks().ok_or_else(|| unimplemented("StreaksUnavailable", "streaks not registered"))?;
        Ok(streaks.list(user_id).await?)
    }

    pub async fn streaks_update(&self, user_id: &UserId, deltas: &HashMap<String, i64>) -> Result<HashMap<String, Streak>, RpcError> {
        let streaks = self.registry.streaks().ok_or_else(|| unimplemented("StreaksUnavailable", "streaks not registered"))?;
        Ok(streaks.update(user_id, deltas).await?)
    }

    pub async fn streaks_claim(&self, user_id: &UserId, ids: &[String]) -> Result<Vec<StreakClaimResult>, RpcError> {
        let streaks = self.registry.streaks().ok_or_else(|| unimplemented("StreaksUnavailable", "streaks not registered"))?;
        Ok(streaks.claim(user_id, ids).await?)
    }

    pub async fn streaks_reset(&self, user_id: &UserId, ids: &[String]) -> Result<HashMap<String, Streak>, RpcError> {
        let streaks = self.registry.streaks().ok_or_else(|| unimplemented("StreaksUnavailable", "streaks not registered"))?;
        Ok(streaks.reset(user_id, ids).await?)
    }
}
