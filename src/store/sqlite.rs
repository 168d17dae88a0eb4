use crate::core::record::{RateRecord, RateStore, StoreError};
use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{InterruptHandle, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

pub type DbPool = Pool<SqliteConnectionManager>;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS exchange (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bid TEXT NOT NULL,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
)";

const INSERT_SQL: &str = "INSERT INTO exchange (bid) VALUES (?1) RETURNING id, bid, timestamp";

const SELECT_ALL_SQL: &str = "SELECT id, bid, timestamp FROM exchange ORDER BY id";

/// SQLite-backed store for the `exchange` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Opens (or creates) the database file. The schema is not touched,
    /// see [`SqliteStore::bootstrap`].
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.busy_timeout(Duration::from_secs(1)));
        let pool = Pool::builder()
            .max_size(8)
            .connection_timeout(Duration::from_secs(2))
            .build(manager)?;

        debug!(path = %path.display(), "Opened sqlite pool");
        Ok(Self { pool })
    }

    /// Creates the `exchange` table when absent. Safe to run repeatedly.
    pub fn bootstrap(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(CREATE_TABLE_SQL, [])?;
        Ok(())
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<RateRecord> {
    Ok(RateRecord {
        id: row.get(0)?,
        bid: row.get(1)?,
        timestamp: row.get(2)?,
    })
}

#[derive(Default)]
struct WriteState {
    cancelled: bool,
    finished: bool,
    handle: Option<InterruptHandle>,
}

/// Interrupts the in-flight statement when the owning future is dropped.
struct WriteGuard(Arc<Mutex<WriteState>>);

impl Drop for WriteGuard {
    fn drop(&mut self) {
        let mut state = self.0.lock().unwrap_or_else(|e| e.into_inner());
        if state.finished {
            return;
        }
        state.cancelled = true;
        if let Some(handle) = state.handle.take() {
            warn!("Interrupting pending insert");
            handle.interrupt();
        }
    }
}

#[async_trait]
impl RateStore for SqliteStore {
    async fn insert_bid(&self, bid: &str) -> Result<RateRecord, StoreError> {
        let pool = self.pool.clone();
        let bid = bid.to_string();
        let state = Arc::new(Mutex::new(WriteState::default()));
        let _guard = WriteGuard(Arc::clone(&state));

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            {
                let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
                if state.cancelled {
                    return Err(StoreError::Cancelled);
                }
                state.handle = Some(conn.get_interrupt_handle());
            }

            let tx = conn.transaction()?;
            let record = tx.query_row(INSERT_SQL, params![bid], record_from_row)?;

            // Commit only if the caller is still waiting; dropping `tx` rolls back
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            if state.cancelled {
                return Err(StoreError::Cancelled);
            }
            state.finished = true;
            tx.commit()?;
            Ok(record)
        })
        .await?
    }

    async fn records(&self) -> Result<Vec<RateRecord>, StoreError> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(SELECT_ALL_SQL)?;
            let records = stmt
                .query_map([], record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok::<_, StoreError>(records)
        })
        .await?
    }
}
