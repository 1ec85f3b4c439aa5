//! `progression.*` RPC verbs (`spec.md` §4.7).

use crate::error::{unimplemented, RpcError};
use crate::PamlogixRpc;
use pamlogix_core::UserId;
use pamlogix_progression::{ProgressionDelta, ProgressionKnownState, ProgressionSystem, ProgressionView};
use std::collections::HashMap;

impl PamlogixRpc {
    pub async fn progression_get(
        &self,
        user_id: &UserId,
        last_known: &HashMap<String, ProgressionKnownState>,
    ) -> Result<(HashMap<String, ProgressionView>, Vec<ProgressionDelta>), RpcError> {
        let progression = self.registry.progression().ok_or_else(|| unimplemented("ProgressionUnavailable", "progression not registered"))?;
        Ok(progression.get(user_id, last_known).await?)
    }

    pub async fn progression_purchase(&self, user_id: &UserId, node_id: &str) -> Result<ProgressionView, RpcError> {
        let progression = self.registry.progression().ok_or_else(|| unimplemented("ProgressionUnavailable", "progression not registered"))?;
        Ok(progression.purchase(user_id, node_id).await?)
    }

    pub async fn progression_update(
        &self,
        user_id: &UserId,
        node_id: &str,
        counts: &HashMap<String, i64>,
    ) -> Result<(ProgressionView, Vec<ProgressionDelta>), RpcError> {
        let progression = self.registry.progression().ok_or_else(|| unimplemented("ProgressionUnavailable", "progression not registered"))?;
        Ok(progression.update(user_id, node_id, counts).await?)
    }

    pub async fn progression_reset(&self, user_id: &UserId, node_ids: &[String]) -> Result<HashMap<String, ProgressionView>, RpcError> {
        let progression = self.registry.progression().ok_or_else(|| unimplemented("ProgressionUnavailable", "progression not registered"))?;
        Ok(progression.reset(user_id, node_ids).await?)
    }

    pub async fn progression_complete(&self, user_id: &UserId, node_id: &str) -> Result<ProgressionView, RpcError> {
        let progression = self.registry.progression().ok_or_else(|| unimplemented("ProgressionUnavailable", "progression not registered"))?;
        Ok(progression.complete(user_id, node_id).await?)
    }
}
