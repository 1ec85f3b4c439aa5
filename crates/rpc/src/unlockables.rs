//! `unlockables.*` RPC verbs (`spec.md` §4.8).

use crate::error::{unimplemented, RpcError};
use crate::PamlogixRpc;
use pamlogix_core::{Reward, UserId};
use pamlogix_unlockables::{UnlockableDefConfig, UnlockableInstance, UnlockablesList, UnlockablesSystem};

impl PamlogixRpc {
    pub async fn unlockables_create(
        &self,
        user_id: &UserId,
        unlockable_id: Option<&str>,
        override_config: Option<UnlockableDefConfig>,
    ) -> Result<UnlockableInstance, RpcError> {
        let unlockables = self.registry.unlockables().ok_or_else(|| unimplemented("UnlockablesUnavailable", "unlockables not registered"))?;
        Ok(unlockables.create(user_id, unlockable_id, override_config).await?)
    }

    pub async fn unlockables_get(&self, user_id: &UserId) -> Result<UnlockablesList, RpcError> {
        let unlockables = self.registry.unlockables().ok_or_else(|| unimplemented("UnlockablesUnavailable", "unlockables not registered"))?;
        Ok(unlockables.get(user_id).await?)
    }

    pub async fn unlockables_unlock_start(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockableInstance, RpcError> {
        let unlockables = self.registry.unlockables().ok_or_else(|| unimplemented("UnlockablesUnavailable", "unlockables not registered"))?;
        Ok(unlockables.unlock_start(user_id, instance_id).await?)
    }

    pub async fn unlockables_unlock_advance(
        &self,
        user_id: &UserId,
        instance_id: &str,
        seconds: i64,
    ) -> Result<UnlockableInstance, RpcError> {
        let unlockables = self.registry.unlockables().ok_or_else(|| unimplemented("UnlockablesUnavailable", "unlockables not registered"))?;
        Ok(unlockables.unlock_advance(user_id, instance_id, seconds).await?)
    }

    pub async fn unlockables_purchase_unlock(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockableInstance, RpcError> {
        let unlockables = self.registry.unlockables().ok_or_else(|| unimplemented("UnlockablesUnavailable", "unlockables not registered"))?;
        Ok(unlockables.purchase_unlock(user_id, instance_id).await?)
    }

    pub async fn unlockables_purchase_slot(&self, user_id: &UserId) -> Result<UnlockablesList, RpcError> {
        let unlockables = self.registry.unlockables().ok_or_else(|| unimplemented("UnlockablesUnavailable", "unlockables not registered"))?;
        Ok(unlockables.purchase_slot(user_id).await?)
    }

    pub async fn unlockables_claim(&self, user_id: &UserId, instance_id: &str) -> Result<Reward, RpcError> {
        let unlockables = self.registry.unlockables().ok_or_else(|| unimplemented("UnlockablesUnavailable", "unlockables not registered"))?;
        Ok(unlockables.claim(user_id, instance_id).await?)
    }

    pub async fn unlockables_queue_add(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockablesList, RpcError> {
        let unlockables = self.registry.unlockables().ok_or_else(|| unimplemented("UnlockablesUnavailable", "unlockables not registered"))?;
        Ok(unlockables.queue_add(user_id, instance_id).await?)
    }

    pub async fn unlockables_queue_remove(&self, user_id: &UserId, instance_id: &str) -> Result<UnlockablesList, RpcError> {
        let unlockables = self.registry.unlockables().ok_or_else(|| unimplemented("UnlockablesUnavailable", "unlockables not registered"))?;
        Ok(unlockables.queue_remove(user_id, instance_id).await?)
    }

    pub async fn unlockables_queue_set(&self, user_id: &UserId, instance_ids: &[String]) -> Result<UnlockablesList, RpcError> {
        let unlockables = self.registry.unlockables().ok_or_else(|| unimplemented("UnlockablesUnavailable", "unlockables not registered"))?;
        Ok(unlockables.queue_set(user_id, instance_ids).await?)
    }
}
