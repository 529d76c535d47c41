//! Mock Store implementation for testing.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::storage::{BasketHead, BasketRecord, BasketSummary, Result, Store, StoreError};

#[cfg(test)]
mod tests;

/// Per-primitive call counts, for asserting that an operation issued no
/// store call at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get: usize,
    pub query: usize,
    pub put: usize,
    pub update: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.get + self.query + self.put + self.update
    }
}

/// Mock store keeping records in memory.
///
/// Failure injection mirrors the backend failing wholesale
/// (`set_fail_on_*`) or a single record's update failing mid fan-out
/// (`fail_update_for`). Every trait call is counted, including ones that
/// fail.
#[derive(Default)]
pub struct MockStore {
    records: RwLock<BTreeMap<(String, String), BasketRecord>>,
    fail_on_get: RwLock<bool>,
    fail_on_query: RwLock<bool>,
    fail_on_put: RwLock<bool>,
    fail_on_update: RwLock<bool>,
    fail_update_for: RwLock<HashSet<String>>,
    get_calls: AtomicUsize,
    query_calls: AtomicUsize,
    put_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_get(&self, fail: bool) {
        *self.fail_on_get.write().await = fail;
    }

    pub async fn set_fail_on_query(&self, fail: bool) {
        *self.fail_on_query.write().await = fail;
    }

    pub async fn set_fail_on_put(&self, fail: bool) {
        *self.fail_on_put.write().await = fail;
    }

    pub async fn set_fail_on_update(&self, fail: bool) {
        *self.fail_on_update.write().await = fail;
    }

    /// Arm a failure for `update_login` on one specific basket.
    pub async fn fail_update_for(&self, basket_id: impl Into<String>) {
        self.fail_update_for.write().await.insert(basket_id.into());
    }

    /// Insert a record directly, bypassing the trait (not counted).
    pub async fn seed(&self, record: BasketRecord) {
        let key = (record.user_id.clone(), record.basket_id.clone());
        self.records.write().await.insert(key, record);
    }

    /// Read a record directly, bypassing the trait (not counted).
    pub async fn record(&self, user_id: &str, basket_id: &str) -> Option<BasketRecord> {
        let key = (user_id.to_string(), basket_id.to_string());
        self.records.read().await.get(&key).cloned()
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            get: self.get_calls.load(Ordering::Relaxed),
            query: self.query_calls.load(Ordering::Relaxed),
            put: self.put_calls.load(Ordering::Relaxed),
            update: self.update_calls.load(Ordering::Relaxed),
        }
    }

    fn unavailable(primitive: &str) -> StoreError {
        StoreError::Unavailable(format!("injected {primitive} failure"))
    }
}

#[async_trait]
impl Store for MockStore {
    async fn get(&self, user_id: &str, basket_id: &str) -> Result<Option<BasketHead>> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        if *self.fail_on_get.read().await {
            return Err(Self::unavailable("get"));
        }

        let key = (user_id.to_string(), basket_id.to_string());
        Ok(self.records.read().await.get(&key).map(|r| BasketHead {
            user_id: r.user_id.clone(),
            data: r.data.clone(),
            login_id: r.login_id.clone(),
        }))
    }

    async fn query(&self, user_id: &str) -> Result<Vec<BasketSummary>> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        if *self.fail_on_query.read().await {
            return Err(Self::unavailable("query"));
        }

        let records = self.records.read().await;
        let mut partition: Vec<&BasketRecord> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .collect();
        // The real index orders by lastUpdated; the map orders by key.
        partition.sort_by_key(|r| r.last_updated);

        Ok(partition
            .into_iter()
            .map(|r| BasketSummary {
                user_id: r.user_id.clone(),
                basket_id: r.basket_id.clone(),
                data: r.data.clone(),
            })
            .collect())
    }

    async fn put(&self, record: BasketRecord) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::Relaxed);
        if *self.fail_on_put.read().await {
            return Err(Self::unavailable("put"));
        }

        let key = (record.user_id.clone(), record.basket_id.clone());
        self.records.write().await.insert(key, record);
        Ok(())
    }

    async fn update_login(
        &self,
        user_id: &str,
        basket_id: &str,
        login_id: &str,
        last_updated: i64,
    ) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::Relaxed);
        if *self.fail_on_update.read().await {
            return Err(Self::unavailable("update"));
        }
        if self.fail_update_for.read().await.contains(basket_id) {
            return Err(Self::unavailable("update"));
        }

        let key = (user_id.to_string(), basket_id.to_string());
        let mut records = self.records.write().await;
        match records.entry(key) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                record.login_id = Some(login_id.to_string());
                record.last_updated = last_updated;
            }
            // Update is an upsert: absent records come into existence
            // holding only the assigned attributes.
            Entry::Vacant(vacant) => {
                vacant.insert(BasketRecord {
                    user_id: user_id.to_string(),
                    basket_id: basket_id.to_string(),
                    data: String::new(),
                    login_id: Some(login_id.to_string()),
                    last_updated,
                    expires_at: 0,
                });
            }
        }
        Ok(())
    }
}
