use crate::core::record::{RateRecord, RateStore, StoreError};
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory store with the same id and timestamp rules as the sqlite one.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Vec<RateRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn insert_bid(&self, bid: &str) -> Result<RateRecord, StoreError> {
        let mut records = self.inner.lock().await;
        let id = records.last().map_or(1, |r| r.id + 1);
        let record = RateRecord {
            id,
            bid: bid.to_string(),
            timestamp: Utc::now().naive_utc().trunc_subsecs(0),
        };
        debug!(id, "Memory store INSERT");
        records.push(record.clone());
        Ok(record)
    }

    async fn records(&self) -> Result<Vec<RateRecord>, StoreError> {
        Ok(self.inner.lock().await.clone())
    }
}
