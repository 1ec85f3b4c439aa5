//! Account metadata (`spec.md` §6 `AccountGetId`), extended with creation
//! time since the incentives subsystem needs account age
//! (`max_recipient_age_sec`, spec.md §4.9).

use async_trait::async_trait;
use pamlogix_core::{PamlogixError, UnixSeconds, UserId};

#[async_trait]
pub trait Accounts: Send + Sync {
    async fn get_id(&self, user_id: &UserId) -> Result<UserId, PamlogixError>;
    async fn get_create_time_sec(&self, user_id: &UserId) -> Result<UnixSeconds, PamlogixError>;
}
