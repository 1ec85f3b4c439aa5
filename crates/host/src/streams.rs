//! Realtime stream primitives (`spec.md` §6 "Streams"), used by the
//! auctions engine to auto-subscribe bidders and fan out bid notifications.

use async_trait::async_trait;
use pamlogix_core::{PamlogixError, UserId};

#[async_trait]
pub trait Streams: Send + Sync {
    async fn user_join(&self, user_id: &UserId, topic: &str) -> Result<(), PamlogixError>;
    async fn user_list(&self, topic: &str) -> Result<Vec<UserId>, PamlogixError>;
    async fn send(&self, topic: &str, payload: &str) -> Result<(), PamlogixError>;
}
