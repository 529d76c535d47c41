//! Key-value store abstraction for basket records.
//!
//! The backing table keys records on `(userId, basketId)` and carries a
//! local secondary index on `(userId, lastUpdated)` so per-user listings
//! come back in write order without a scan. Expiry is the store's job:
//! items whose `expiresAt` has passed are deleted lazily server-side, so
//! readers may still see a record shortly after it expires.

#[cfg(feature = "dynamo")]
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(feature = "dynamo")]
use tracing::info;

#[cfg(feature = "dynamo")]
pub mod dynamo;
pub mod mock;

#[cfg(feature = "dynamo")]
pub use dynamo::DynamoStore;
pub use mock::MockStore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend call failed. Network, throttling, and permission
    /// failures are deliberately not distinguished; the caller retries
    /// at the transport layer or not at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An item came back missing an attribute the table schema requires.
    #[error("malformed item: {0}")]
    MalformedItem(String),
}

/// A persisted basket record, keyed on `(user_id, basket_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketRecord {
    /// Partition key; session identity.
    pub user_id: String,
    /// Sort key within the partition; the basket slot name.
    pub basket_id: String,
    /// Caller-supplied payload, stored and returned verbatim.
    pub data: String,
    /// Set once the session is linked to an authenticated account.
    pub login_id: Option<String>,
    /// Milliseconds since epoch, refreshed on every write. Sort attribute
    /// of the secondary index.
    pub last_updated: i64,
    /// Seconds since epoch; the store deletes the item past this time.
    pub expires_at: i64,
}

/// Point-read projection: `userId, data, loginId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketHead {
    pub user_id: String,
    pub data: String,
    pub login_id: Option<String>,
}

/// Index-query projection: `userId, basketId, data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketSummary {
    pub user_id: String,
    pub basket_id: String,
    pub data: String,
}

/// Interface for basket persistence.
///
/// Point writes and updates are atomic per item; there are no multi-item
/// transactions. `query` returns the whole partition in ascending
/// `last_updated` order, guaranteed by the index, not by client-side
/// sorting.
///
/// Implementations:
/// - `DynamoStore`: Amazon DynamoDB storage
/// - `MockStore`: In-memory mock for testing
#[async_trait]
pub trait Store: Send + Sync {
    /// Point lookup, head projection. `None` when no record exists.
    async fn get(&self, user_id: &str, basket_id: &str) -> Result<Option<BasketHead>>;

    /// List every record under `user_id` via the secondary index,
    /// ascending by `last_updated`.
    async fn query(&self, user_id: &str) -> Result<Vec<BasketSummary>>;

    /// Full-item replace, upsert semantics. Attributes absent from
    /// `record` are dropped from any existing item.
    async fn put(&self, record: BasketRecord) -> Result<()>;

    /// Partial update, upsert semantics: set `loginId` and `lastUpdated`
    /// on one record, creating it with only those attributes if absent.
    async fn update_login(
        &self,
        user_id: &str,
        basket_id: &str,
        login_id: &str,
        last_updated: i64,
    ) -> Result<()>;
}

/// Build the configured store backend.
#[cfg(feature = "dynamo")]
pub async fn init_store(config: &crate::config::StorageConfig) -> Arc<dyn Store> {
    let store = DynamoStore::new(config).await;
    info!(table = %config.table, index = %config.index, "Storage initialized");
    Arc::new(store)
}
