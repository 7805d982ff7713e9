//! Background Expiry Sweeper
//!
//! This module implements a background task that periodically deletes
//! expired records. This is "active expiry" as opposed to the "lazy expiry"
//! that [`TextStore::retrieve`] performs when it reads an expired record.
//!
//! ## Why Do We Need This?
//!
//! Most codes are redeemed once and never looked up again, so lazy expiry
//! alone would leave their rows in the table forever.
//!
//! ## Design
//!
//! The sweeper runs as a Tokio task and:
//! 1. Sleeps for a fixed interval (default: 1 hour)
//! 2. Deletes every expired row in a single statement
//! 3. Logs how many rows were removed
//!
//! A failed sweep is logged and absorbed; the next tick tries again. Request
//! handling never depends on the sweeper having run.

use crate::storage::TextStore;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone)]
pub struct ExpiryConfig {
    /// Interval between sweeps (default: 1 hour)
    pub interval: Duration,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
        }
    }
}

/// Counters describing the sweeper's work so far.
#[derive(Debug, Default)]
pub struct SweepStats {
    /// Sweeps attempted
    pub runs: AtomicU64,
    /// Rows deleted across all sweeps
    pub removed: AtomicU64,
    /// Sweeps that failed
    pub failures: AtomicU64,
    /// Store time of the last successful sweep (0 = never)
    pub last_swept_at: AtomicI64,
}

impl SweepStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub fn removed(&self) -> u64 {
        self.removed.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn last_swept_at(&self) -> Option<i64> {
        match self.last_swept_at.load(Ordering::Relaxed) {
            0 => None,
            at => Some(at),
        }
    }
}

/// A handle to the running expiry sweeper.
///
/// When this handle is dropped, the sweeper task is told to stop.
#[derive(Debug)]
pub struct ExpirySweeper {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    stats: Arc<SweepStats>,
}

impl ExpirySweeper {
    /// Starts the expiry sweeper as a background task.
    ///
    /// The first sweep happens one `interval` after start.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use textdrop::storage::{ExpiryConfig, ExpirySweeper, StoreConfig, TextStore};
    /// use std::sync::Arc;
    ///
    /// let store = Arc::new(TextStore::connect(StoreConfig::new("texts.db")).await?);
    /// let sweeper = ExpirySweeper::start(store, ExpiryConfig::default());
    ///
    /// // Sweeper runs in the background...
    ///
    /// sweeper.shutdown().await;
    /// ```
    pub fn start(store: Arc<TextStore>, config: ExpiryConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(SweepStats::new());

        let task = tokio::spawn(sweeper_loop(
            store,
            config.clone(),
            Arc::clone(&stats),
            shutdown_rx,
        ));

        info!(
            interval_secs = config.interval.as_secs(),
            "Background expiry sweeper started"
        );

        Self {
            shutdown_tx,
            task: Some(task),
            stats,
        }
    }

    pub fn stats(&self) -> &SweepStats {
        &self.stats
    }

    /// Signals the sweeper to stop without waiting for it.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Stops the sweeper and waits for an in-flight sweep to finish.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "Expiry sweeper task failed");
            }
        }
        info!("Background expiry sweeper stopped");
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop.
async fn sweeper_loop(
    store: Arc<TextStore>,
    config: ExpiryConfig,
    stats: Arc<SweepStats>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        // Wait for the interval or shutdown signal
        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        sweep_once(&store, &stats).await;
    }
}

/// Runs one sweep, recording the outcome in `stats`.
///
/// Errors are logged and never returned.
pub async fn sweep_once(store: &TextStore, stats: &SweepStats) {
    stats.runs.fetch_add(1, Ordering::Relaxed);

    match store.purge_expired().await {
        Ok(removed) => {
            stats.removed.fetch_add(removed, Ordering::Relaxed);
            stats
                .last_swept_at
                .store(store.clock().now(), Ordering::Relaxed);

            if removed > 0 {
                info!(removed, "Deleted expired texts");
            } else {
                debug!("Sweep found no expired texts");
            }
        }
        Err(e) => {
            stats.failures.fetch_add(1, Ordering::Relaxed);
            error!(error = %e, "Expiry sweep failed");
        }
    }
}
