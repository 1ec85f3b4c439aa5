//! `energy.*` RPC verbs (`spec.md` §4.4).

use crate::error::{unimplemented, RpcError};
use crate::PamlogixRpc;
use pamlogix_core::{GrantedEnergyModifier, UserId};
use pamlogix_energy::{DailyResetConfig, EnergyBucket, EnergySystem};
use std::collections::HashMap;

impl PamlogixRpc {
    pub async fn energy_get(&self, user_id: &UserId, energy_id: &str) -> Result<EnergyBucket, RpcError> {
        let energy = self.registry.energy().ok_or_else(|| unimplemented("EnergyUnavailable", "energy not registered"))?;
        Ok(energy.get(user_id, energy_id).await?)
    }

    pub async fn energy_get_all(&self, user_id: &UserId) -> Result<HashMap<String, EnergyBucket>, RpcError> {
        let energy = self.registry.energy().ok_or_else(|| unimplemented("EnergyUnavailable", "energy not registered"))?;
        Ok(energy.get_all(user_id).await?)
    }

    pub async fn energy_spend(
        &self,
        user_id: &UserId,
        amounts: &HashMap<String, i64>,
    ) -> Result<HashMap<String, EnergyBucket>, RpcError> {
        let energy = self.registry.energy().ok_or_else(|| unimplemented("EnergyUnavailable", "energy not registered"))?;
        Ok(energy.spend(user_id, amounts).await?)
    }

    pub async fn energy_grant(
        &self,
        user_id: &UserId,
        amounts: &HashMap<String, i64>,
        modifiers: &[GrantedEnergyModifier],
    ) -> Result<HashMap<String, EnergyBucket>, RpcError> {
        let energy = self.registry.energy().ok_or_else(|| unimplemented("EnergyUnavailable", "energy not registered"))?;
        Ok(energy.grant(user_id, amounts, modifiers).await?)
    }

    pub async fn energy_reset_at_utc(
        &self,
        user_id: &UserId,
        energy_id: &str,
        reset: DailyResetConfig,
    ) -> Result<EnergyBucket, RpcError> {
        let energy = self.registry.energy().ok_or_else(|| unimplemented("EnergyUnavailable", "energy not registered"))?;
        Ok(energy.reset_energy_at_utc(user_id, energy_id, reset).await?)
    }

    pub async fn energy_get_with_daily_reset(
        &self,
        user_id: &UserId,
        energy_id: &str,
        resets: &[DailyResetConfig],
    ) -> Result<EnergyBucket, RpcError> {
        let energy = self.registry.energy().ok_or_else(|| unimplemented("EnergyUnavailable", "energy not registered"))?;
        Ok(energy.get_with_daily_reset(user_id, energy_id, resets).await?)
    }
}
