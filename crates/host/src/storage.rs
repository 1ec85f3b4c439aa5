//! Per-user durable key-value storage (`spec.md` §6 "Storage").

use async_trait::async_trait;
use pamlogix_core::{PamlogixError, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRecord {
    pub value: String,
    /// Opaque version token bumped on every write. `None` means the record
    /// did not exist. Callers that need optimistic concurrency (the
    /// auctions engine) pass the observed version back on write.
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StorageListPage {
    pub keys: Vec<String>,
    pub cursor: Option<String>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn read(
        &self,
        collection: &str,
        key: &str,
        user_id: Option<&UserId>,
    ) -> Result<Option<StorageRecord>, PamlogixError>;

    /// Write `value` to `(collection, key, user_id)`. If `version_check` is
    /// `Some`, the write fails with a `Conflict` error unless the record's
    /// current version matches. Returns the new version.
    async fn write(
        &self,
        collection: &str,
        key: &str,
        user_id: Option<&UserId>,
        value: String,
        version_check: Option<&str>,
    ) -> Result<String, PamlogixError>;

    async fn delete(
        &self,
        collection: &str,
        key: &str,
        user_id: Option<&UserId>,
    ) -> Result<(), PamlogixError>;

    async fn list(
        &self,
        collection: &str,
        user_id: Option<&UserId>,
        prefix: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<StorageListPage, PamlogixError>;
}
