//! basket-store - Session-scoped basket persistence
//!
//! Anonymous clients identified by an opaque session token persist and
//! retrieve opaque basket documents with one-day expiry, then reconcile
//! them onto an authenticated login. Storage is an external key-value
//! service behind the [`storage::Store`] trait; DynamoDB is the shipped
//! backend.

pub mod basket;
pub mod config;
pub mod diagnostics;
pub mod session;
pub mod storage;
pub mod utils;

pub use basket::{
    BasketStore, Clock, Error, ReassignFailure, ReassignOutcome, SystemClock, UpsertReceipt,
    RECENTLY_VIEWED,
};
pub use storage::{BasketHead, BasketRecord, BasketSummary, Store, StoreError};
