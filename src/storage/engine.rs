//! SQLite-Backed Text Store
//!
//! This module implements the core storage engine for textdrop.
//! It maps short codes to text blobs in a single SQLite table shared by every
//! request task and by the background sweeper.
//!
//! ## Design Decisions
//!
//! 1. **Constraint-Enforced Uniqueness**: The `code` column is `UNIQUE`. Code
//!    allocation checks for a free candidate, but only the insert decides.
//! 2. **Lazy Expiry**: Expired rows are detected and deleted when read.
//! 3. **Active Expiry**: [`TextStore::purge_expired`] deletes every expired row
//!    in one statement; the sweeper calls it periodically.
//! 4. **Pooled Connections**: Each operation borrows one pooled connection and
//!    returns it when the query future completes or is dropped.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//! │ request task │ │ request task │ │ ExpirySweeper│
//! └──────┬───────┘ └──────┬───────┘ └──────┬───────┘
//!        │                │                │
//!        ▼                ▼                ▼
//! ┌─────────────────────────────────────────────────┐
//! │          SqlitePool (acquire_timeout)           │
//! │   conn 0    conn 1    conn 2   ...   conn N     │
//! └────────────────────────┬────────────────────────┘
//!                          ▼
//!              texts.db (WAL, busy_timeout)
//! ```
//!
//! SQLite admits one writer at a time. Writers that find the database locked
//! wait up to `busy_timeout` before failing.
//!
//! An in-memory database (`sqlite::memory:`) gives every pooled connection
//! its own empty database, so the store should always be pointed at a file.

use crate::storage::{Clock, Code, StoreError, SystemClock};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long a record stays readable (24 hours).
pub const RETENTION_SECS: i64 = 86_400;

/// Candidate codes tried before giving up on allocation.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 10;

/// Largest accepted text, in bytes.
pub const DEFAULT_MAX_TEXT_BYTES: usize = 100_000;

/// Configuration for the text store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// `sqlite:` URL or plain path of the database file
    pub database_url: String,

    /// Pool size (default: 5)
    pub max_connections: u32,

    /// Longest wait for a free pooled connection (default: 10s)
    pub acquire_timeout: Duration,

    /// Longest wait on a locked database (default: 10s)
    pub busy_timeout: Duration,

    /// Record lifetime in seconds (default: 86400)
    pub retention_secs: i64,

    /// Allocation attempts per create (default: 10)
    pub max_allocation_attempts: u32,

    /// Text size cap in bytes (default: 100 000)
    pub max_text_bytes: usize,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(10),
            retention_secs: RETENTION_SECS,
            max_allocation_attempts: MAX_ALLOCATION_ATTEMPTS,
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    pub fn with_acquire_timeout(mut self, acquire_timeout: Duration) -> Self {
        self.acquire_timeout = acquire_timeout;
        self
    }

    pub fn with_max_text_bytes(mut self, max_text_bytes: usize) -> Self {
        self.max_text_bytes = max_text_bytes;
        self
    }

    /// Builds the SQLite connection options for this configuration.
    fn connect_options(&self) -> Result<SqliteConnectOptions, StoreError> {
        let options = if self.database_url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(&self.database_url)?
        } else {
            SqliteConnectOptions::new().filename(&self.database_url)
        };

        Ok(options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout))
    }
}

/// Bounded retry schedule for the initial storage connection.
///
/// The wait before retry `n` (1-based) is `initial_backoff * 2^(n-1)`, so the
/// defaults wait 1s, 2s, 4s and 8s between five attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total connection attempts, including the first
    pub max_attempts: u32,

    /// Wait after the first failure
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Returns the wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// The code-backed ephemeral text store.
///
/// This struct is designed to be wrapped in an `Arc` and shared across all
/// request handlers and the expiry sweeper. All operations take `&self`.
///
/// # Example
///
/// ```no_run
/// use textdrop::storage::{StoreConfig, TextStore};
///
/// # async fn demo() -> Result<(), textdrop::storage::StoreError> {
/// let store = TextStore::connect(StoreConfig::new("texts.db")).await?;
///
/// let code = store.create("hello world").await?;
/// assert_eq!(store.retrieve(code.as_str()).await?, "hello world");
/// # Ok(())
/// # }
/// ```
pub struct TextStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
}

impl std::fmt::Debug for TextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextStore")
            .field("database_url", &self.config.database_url)
            .field("pool_size", &self.pool.size())
            .field("idle", &self.pool.num_idle())
            .finish()
    }
}

impl TextStore {
    /// Opens the pool against wall-clock time and installs the schema.
    pub async fn connect(config: StoreConfig) -> Result<Self, StoreError> {
        Self::connect_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Opens the pool with a custom time source and installs the schema.
    pub async fn connect_with_clock(
        config: StoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let options = config.connect_options()?;
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            clock,
            config,
        };
        store.migrate().await?;

        debug!(
            database = %store.config.database_url,
            max_connections = store.config.max_connections,
            "Text store ready"
        );
        Ok(store)
    }

    /// Connects, retrying with exponential backoff per `policy`.
    ///
    /// Returns the last error once every attempt has failed.
    pub async fn connect_with_retry(
        config: StoreConfig,
        policy: &RetryPolicy,
    ) -> Result<Self, StoreError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            info!(attempt, max_attempts = policy.max_attempts, "Connecting to storage");

            match Self::connect(config.clone()).await {
                Ok(store) => return Ok(store),
                Err(e) if attempt < policy.max_attempts => {
                    let delay = policy.backoff(attempt);
                    warn!(
                        attempt,
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Storage connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(attempts = attempt, error = %e, "Storage connection failed");
                    return Err(e);
                }
            }
        }
    }

    /// Creates the table and indexes if they don't exist.
    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS texts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                text TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| storage_failure("migrate", e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_texts_created_at ON texts (created_at)")
            .execute(&self.pool)
            .await
            .map_err(|e| storage_failure("migrate", e))?;

        Ok(())
    }

    /// Returns the store's time source.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Oldest `created_at` that is still live.
    fn cutoff(&self) -> i64 {
        self.clock.now() - self.config.retention_secs
    }

    /// Picks a code no live record currently holds.
    ///
    /// The result is not reserved: a concurrent create may claim it before
    /// this caller inserts, which the insert reports as a duplicate.
    pub async fn allocate_code(&self) -> Result<Code, StoreError> {
        let attempts = self.config.max_allocation_attempts;

        for attempt in 1..=attempts {
            let candidate = Code::random();
            let taken: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM texts WHERE code = ? AND created_at >= ?")
                    .bind(candidate.as_str())
                    .bind(self.cutoff())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| storage_failure("allocate_code", e))?;

            if taken.is_none() {
                return Ok(candidate);
            }
            debug!(code = %candidate, attempt, "Code collision");
        }

        warn!(attempts, "Code space exhausted");
        Err(StoreError::CodeSpaceExhausted { attempts })
    }

    /// Inserts a record, replacing an expired record that holds the same code.
    ///
    /// Fails with [`StoreError::DuplicateCode`] if a live record holds `code`.
    async fn insert(&self, code: &Code, text: &str, created_at: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO texts (code, text, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(code) DO UPDATE
                SET text = excluded.text, created_at = excluded.created_at
                WHERE texts.created_at < ?4",
        )
        .bind(code.as_str())
        .bind(text)
        .bind(created_at)
        .bind(created_at - self.config.retention_secs)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(StoreError::DuplicateCode),
            Ok(_) => Ok(()),
            Err(e) => Err(storage_failure("insert", e)),
        }
    }

    /// Stores `text` under a fresh code and returns the code.
    ///
    /// The text is stored verbatim; it only has to be non-blank and within
    /// the configured size cap.
    pub async fn create(&self, text: &str) -> Result<Code, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::InvalidInput("Text cannot be empty"));
        }
        if text.len() > self.config.max_text_bytes {
            return Err(StoreError::InvalidInput("Text is too long"));
        }

        let rounds = self.config.max_allocation_attempts;
        for _ in 0..rounds {
            let code = self.allocate_code().await?;

            match self.insert(&code, text, self.clock.now()).await {
                Ok(()) => {
                    info!(code = %code, bytes = text.len(), "Text created");
                    return Ok(code);
                }
                Err(StoreError::DuplicateCode) => {
                    // Race: another create claimed the code after the check
                    debug!(code = %code, "Code claimed concurrently, reallocating");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(rounds, "Every allocated code was claimed concurrently");
        Err(StoreError::CodeSpaceExhausted { attempts: rounds })
    }

    /// Returns the text stored under `code`.
    ///
    /// The code format is checked before storage is touched. Missing and
    /// expired codes both yield [`StoreError::NotFound`]; an expired record is
    /// deleted on the way out.
    pub async fn retrieve(&self, code: &str) -> Result<String, StoreError> {
        let code = Code::parse(code)?;

        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT text, created_at FROM texts WHERE code = ?")
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage_failure("retrieve", e))?;

        let Some((text, created_at)) = row else {
            debug!(code = %code, "Code not found");
            return Err(StoreError::NotFound);
        };

        if self.clock.now() - created_at > self.config.retention_secs {
            // Only the row we saw: the code may have been reissued since
            let evicted = sqlx::query("DELETE FROM texts WHERE code = ? AND created_at = ?")
                .bind(code.as_str())
                .bind(created_at)
                .execute(&self.pool)
                .await;

            match evicted {
                Ok(_) => info!(code = %code, "Expired text evicted"),
                Err(e) => warn!(code = %code, error = %e, "Failed to evict expired text"),
            }
            return Err(StoreError::NotFound);
        }

        info!(code = %code, "Text retrieved");
        Ok(text)
    }

    /// Deletes every expired record and returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM texts WHERE created_at < ?")
            .bind(self.cutoff())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_failure("purge_expired", e))?;

        Ok(result.rows_affected())
    }

    /// Runs a trivial query to prove the database is reachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_failure("ping", e))?;
        Ok(())
    }

    /// Number of rows physically present, expired or not.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM texts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_failure("count", e))?;
        Ok(count as u64)
    }

    /// Closes the pool. Later storage operations fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Logs a backend failure with its operation and wraps it.
fn storage_failure(operation: &'static str, err: sqlx::Error) -> StoreError {
    error!(operation, error = %err, "Storage operation failed");
    StoreError::StorageUnavailable(err)
}
