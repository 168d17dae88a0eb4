//! Persisted rate records and the store abstraction

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

/// One persisted bid observation.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    pub id: i64,
    pub bid: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("write cancelled before commit")]
    Cancelled,
}

/// Append-only storage for rate records.
///
/// Dropping an `insert_bid` future before the write commits must not leave
/// a record behind. A drop that lands after the commit started keeps the
/// record, so a caller timing out in that window sees a failure for a row
/// that exists.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn insert_bid(&self, bid: &str) -> Result<RateRecord, StoreError>;

    /// All records in ascending id order.
    async fn records(&self) -> Result<Vec<RateRecord>, StoreError>;
}
