//! Basket persistence core.
//!
//! Four operations over an injected [`Store`]: point read, most-recent
//! selection, full-replace upsert, and the anonymous-to-authenticated
//! login reassignment. The core is stateless per request; the store is
//! the only shared resource.

use std::sync::Arc;

use futures::future;
use tracing::{debug, info};

use crate::diagnostics::Diagnostics;
use crate::session;
use crate::storage::{BasketHead, BasketRecord, BasketSummary, Store, StoreError};


/// Result type for basket operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required identifier was missing or empty. Raised before any
    /// store access.
    #[error("{0} not present")]
    Validation(&'static str),

    /// Well-formed request, no matching record.
    #[error("no matching basket")]
    NotFound,

    /// The backend failed; opaque to the caller.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sort-key value reserved for the recently-viewed auxiliary record. It
/// shares the keyspace but is not a basket: most-recent selection skips
/// it, login reassignment includes it.
pub const RECENTLY_VIEWED: &str = "recentlyViewed";

/// Basket lifetime; `expiresAt` is stamped this far ahead on every write.
const BASKET_TTL_SECS: i64 = 86_400;

/// Wall clock seam, injected so tests control `lastUpdated` ordering.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// System wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Outcome of a basket upsert: the resolved session identity, for the
/// transport layer to persist when freshly minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertReceipt {
    pub user_id: String,
    pub basket_id: String,
    /// True when the identity was minted by this call.
    pub newly_minted: bool,
}

/// Outcome of a login reassignment. The per-record updates carry no
/// cross-record atomicity, so partial failure is ordinary data here, not
/// an all-or-nothing error.
#[derive(Debug, Default)]
pub struct ReassignOutcome {
    /// Baskets stamped with the new login, in index order.
    pub updated: Vec<String>,
    /// Baskets whose update failed, with the per-record error.
    pub failed: Vec<ReassignFailure>,
}

/// A single failed update within a reassignment fan-out.
#[derive(Debug)]
pub struct ReassignFailure {
    pub basket_id: String,
    pub error: StoreError,
}

/// The basket persistence component.
pub struct BasketStore {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl BasketStore {
    /// Create a basket store over the given backend, with the system
    /// clock and no diagnostics hook.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_config(store, Arc::new(SystemClock), None)
    }

    /// Create a basket store with an explicit clock and optional
    /// diagnostics hook.
    pub fn with_config(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        diagnostics: Option<Arc<dyn Diagnostics>>,
    ) -> Self {
        Self {
            store,
            clock,
            diagnostics,
        }
    }

    /// Fetch one basket by its full key.
    pub async fn get_basket(&self, user_id: &str, basket_id: &str) -> Result<BasketHead> {
        require("userId", user_id)?;
        require("basketId", basket_id)?;

        debug!(user_id = %user_id, basket_id = %basket_id, "Fetching basket");

        match self.store.get(user_id, basket_id).await? {
            Some(head) => Ok(head),
            None => Err(Error::NotFound),
        }
    }

    /// Fetch the most recently written basket for a user.
    ///
    /// Scans the user's partition once in ascending index order and takes
    /// the last non-reserved entry; the index supplies the ordering, not a
    /// client-side sort.
    pub async fn get_most_recent_basket(&self, user_id: &str) -> Result<BasketSummary> {
        require("userId", user_id)?;

        debug!(user_id = %user_id, "Selecting most recent basket");
        self.spawn_diagnostics();

        let summaries = self.store.query(user_id).await?;
        summaries
            .into_iter()
            .filter(|s| s.basket_id != RECENTLY_VIEWED)
            .last()
            .ok_or(Error::NotFound)
    }

    /// Create or fully replace a basket.
    ///
    /// A missing session identity is minted here; the receipt carries it
    /// back so the transport layer can persist it. Replacement drops any
    /// attribute not written by this call, a prior login link included —
    /// that is what distinguishes it from the partial update in
    /// [`reassign_login`](Self::reassign_login).
    pub async fn upsert_basket(
        &self,
        user_id: Option<&str>,
        basket_id: &str,
        data: &str,
    ) -> Result<UpsertReceipt> {
        require("basketId", basket_id)?;
        require("data", data)?;

        let (user_id, newly_minted) = session::resolve(user_id);
        let now = self.clock.now_millis();

        self.store
            .put(BasketRecord {
                user_id: user_id.clone(),
                basket_id: basket_id.to_string(),
                data: data.to_string(),
                login_id: None,
                last_updated: now,
                expires_at: now / 1000 + BASKET_TTL_SECS,
            })
            .await?;

        info!(
            user_id = %user_id,
            basket_id = %basket_id,
            newly_minted,
            "Stored basket"
        );

        Ok(UpsertReceipt {
            user_id,
            basket_id: basket_id.to_string(),
            newly_minted,
        })
    }

    /// Stamp every record owned by `user_id` — the reserved slot
    /// included — with the authenticated `login_id`.
    ///
    /// The store updates one item at a time, so the per-record updates
    /// fan out concurrently over disjoint keys and the outcome reports
    /// exactly which records were stamped and which were not.
    pub async fn reassign_login(&self, user_id: &str, login_id: &str) -> Result<ReassignOutcome> {
        require("userId", user_id)?;
        require("loginId", login_id)?;

        let summaries = self.store.query(user_id).await?;
        let last_updated = self.clock.now_millis();

        let updates = summaries.into_iter().map(|summary| {
            let store = Arc::clone(&self.store);
            let user_id = user_id.to_string();
            let login_id = login_id.to_string();
            async move {
                let result = store
                    .update_login(&user_id, &summary.basket_id, &login_id, last_updated)
                    .await;
                (summary.basket_id, result)
            }
        });

        let mut outcome = ReassignOutcome::default();
        for (basket_id, result) in future::join_all(updates).await {
            match result {
                Ok(()) => outcome.updated.push(basket_id),
                Err(error) => outcome.failed.push(ReassignFailure { basket_id, error }),
            }
        }

        info!(
            user_id = %user_id,
            updated = outcome.updated.len(),
            failed = outcome.failed.len(),
            "Reassigned login"
        );

        Ok(outcome)
    }

    /// Fire the diagnostics hook on its own task. Nothing on the request
    /// path waits for it or sees its outcome.
    fn spawn_diagnostics(&self) {
        if let Some(diagnostics) = &self.diagnostics {
            let diagnostics = Arc::clone(diagnostics);
            tokio::spawn(async move {
                diagnostics.probe().await;
            });
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Validation(field));
    }
    Ok(())
}
