//! Reward granting algorithm (`spec.md` §4.2 "Granting").
//!
//! Order is fixed: wallet currency deltas (atomic, with ledger metadata),
//! then energy deltas, then item deltas honoring inventory limits unless
//! `ignore_limits`. This is not two-phase — a later stage failing does not
//! roll back an earlier one (spec.md: "report-and-continue for post-wallet
//! stages"), so the wallet mutation goes first precisely so only harder-to-
//! reverse currency state is ever left ahead of a failed write (§9).

use pamlogix_core::{internal, EnergyApi, InventoryApi, PamlogixError, Reward, RewardGrantOutcome, UserId};
use pamlogix_host::Wallet;
use std::collections::HashMap;
use std::sync::Arc;

pub struct GrantCollaborators<'a> {
    pub wallet: &'a dyn Wallet,
    pub energy: Option<Arc<dyn EnergyApi>>,
    pub inventory: Option<Arc<dyn InventoryApi>>,
}

pub async fn grant_reward(
    user_id: &UserId,
    reward: Reward,
    metadata: HashMap<String, String>,
    ignore_limits: bool,
    collaborators: GrantCollaborators<'_>,
) -> Result<RewardGrantOutcome, PamlogixError> {
    let mut not_granted = Reward::empty(reward.grant_time_sec);

    if !reward.currencies.is_empty() {
        let nonzero: HashMap<String, i64> =
            reward.currencies.iter().filter(|(_, v)| **v != 0).map(|(k, v)| (k.clone(), *v)).collect();
        if !nonzero.is_empty() {
            collaborators.wallet.update(user_id, &nonzero, metadata, true).await?;
        }
    }

    if !reward.energies.is_empty() || !reward.energy_modifiers.is_empty() {
        let nonzero: HashMap<String, i64> =
            reward.energies.iter().filter(|(_, v)| **v != 0).map(|(k, v)| (k.clone(), *v)).collect();
        match &collaborators.energy {
            Some(energy) => {
                if let Err(e) = energy.grant(user_id, &nonzero, &reward.energy_modifiers).await {
                    log::error!("energy grant failed for {user_id:?} after wallet currencies were already debited/credited: {e}");
                    return Err(e);
                }
            }
            None => {
                for (k, v) in nonzero {
                    not_granted.energies.insert(k, v);
                }
                not_granted.energy_modifiers = reward.energy_modifiers.clone();
            }
        }
    }

    let (new_items, updated_items) = if !reward.items.is_empty() {
        match &collaborators.inventory {
            Some(inventory) => {
                let outcome = match inventory.grant_items(user_id, &reward.items, ignore_limits).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        log::error!("item grant failed for {user_id:?} after wallet currencies were already debited/credited: {e}");
                        return Err(e);
                    }
                };
                for (item_id, count) in outcome.not_granted {
                    if count != 0 {
                        not_granted
                            .items
                            .push(pamlogix_core::RewardItem { item_id, count, instances: Vec::new() });
                    }
                }
                (outcome.new_items, outcome.updated_items)
            }
            None => {
                not_granted.items.extend(reward.items.clone());
                (Vec::new(), Vec::new())
            }
        }
    } else {
        (Vec::new(), Vec::new())
    };

    not_granted.modifiers = Vec::new();
    not_granted.energy_modifiers = Vec::new();

    Ok(RewardGrantOutcome { new_items, updated_items, not_granted })
}

/// `spec.md` §4.2 `UnmarshalWallet(account)`: parse the host wallet's raw
/// currency map back into the typed shape economy callers expect. The host
/// already hands back `HashMap<String,i64>`, so this is a thin validating
/// pass-through kept as its own function so a future host wire format change
/// has exactly one call site to update.
pub fn unmarshal_wallet(raw: HashMap<String, i64>) -> Result<HashMap<String, i64>, PamlogixError> {
    for (currency, amount) in &raw {
        if currency.is_empty() {
            return Err(internal("EconomyWalletMalformed", "empty currency id in wallet"));
        }
        let _ = amount;
    }
    Ok(raw)
}
