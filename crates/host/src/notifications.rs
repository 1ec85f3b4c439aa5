//! Persistent, per-user notifications (`spec.md` §6 `NotificationSend`).

use async_trait::async_trait;
use pamlogix_core::{PamlogixError, UserId};

#[async_trait]
pub trait Notifications: Send + Sync {
    async fn send(
        &self,
        user_id: &UserId,
        subject: &str,
        payload: &str,
        code: i32,
        persistent: bool,
    ) -> Result<(), PamlogixError>;
}
