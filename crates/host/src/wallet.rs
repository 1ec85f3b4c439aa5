//! Atomic currency-wallet updates with a ledger trail (`spec.md` §6
//! "Wallet").

use async_trait::async_trait;
use pamlogix_core::{PamlogixError, UserId};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletUpdateResult {
    pub previous: HashMap<String, i64>,
    pub updated: HashMap<String, i64>,
}

#[async_trait]
pub trait Wallet: Send + Sync {
    /// Apply `deltas` atomically, recording `metadata` against the ledger
    /// entry when `update_ledger` is set. Fails with `InsufficientFunds` if
    /// any resulting balance would go negative.
    async fn update(
        &self,
        user_id: &UserId,
        deltas: &HashMap<String, i64>,
        metadata: HashMap<String, String>,
        update_ledger: bool,
    ) -> Result<WalletUpdateResult, PamlogixError>;

    async fn get(&self, user_id: &UserId) -> Result<HashMap<String, i64>, PamlogixError>;
}
