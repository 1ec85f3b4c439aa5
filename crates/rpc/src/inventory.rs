//! `inventory.*` RPC verbs (`spec.md` §4.3).

use crate::error::{unimplemented, RpcError};
use crate::PamlogixRpc;
use pamlogix_core::{ConsumeOutcome, InstanceId, InventoryGrantOutcome, InventoryItem, ItemDefId, RewardItem, UserId};
use pamlogix_inventory::{ItemDef, PropertyPatch};
use std::collections::HashMap;

impl PamlogixRpc {
    pub fn inventory_list(&self, category: Option<&str>) -> Result<Vec<ItemDef>, RpcError> {
        use pamlogix_inventory::InventorySystem;
        let inventory = self.registry.inventory().ok_or_else(|| unimplemented("InventoryUnavailable", "inventory not registered"))?;
        Ok(inventory.list(category))
    }

    pub async fn inventory_list_items(&self, user_id: &UserId, category: Option<&str>) -> Result<Vec<InventoryItem>, RpcError> {
        use pamlogix_inventory::InventorySystem;
        let inventory = self.registry.inventory().ok_or_else(|| unimplemented("InventoryUnavailable", "inventory not registered"))?;
        Ok(inventory.list_inventory_items(user_id, category).await?)
    }

    pub async fn inventory_consume_items(
        &self,
        user_id: &UserId,
        by_def: &HashMap<ItemDefId, i64>,
        by_instance: &HashMap<InstanceId, i64>,
        over_consume: bool,
    ) -> Result<ConsumeOutcome, RpcError> {
        use pamlogix_inventory::InventorySystem;
        let inventory = self.registry.inventory().ok_or_else(|| unimplemented("InventoryUnavailable", "inventory not registered"))?;
        Ok(inventory.consume_items(user_id, by_def, by_instance, over_consume).await?)
    }

    pub async fn inventory_grant_items(
        &self,
        user_id: &UserId,
        items: &[RewardItem],
        ignore_limits: bool,
    ) -> Result<InventoryGrantOutcome, RpcError> {
        use pamlogix_inventory::InventorySystem;
        let inventory = self.registry.inventory().ok_or_else(|| unimplemented("InventoryUnavailable", "inventory not registered"))?;
        Ok(inventory.grant_items(user_id, items, ignore_limits).await?)
    }

    pub async fn inventory_update_items(
        &self,
        user_id: &UserId,
        patches: HashMap<InstanceId, PropertyPatch>,
    ) -> Result<Vec<InventoryItem>, RpcError> {
        use pamlogix_inventory::InventorySystem;
        let inventory = self.registry.inventory().ok_or_else(|| unimplemented("InventoryUnavailable", "inventory not registered"))?;
        Ok(inventory.update_items(user_id, patches).await?)
    }
}
