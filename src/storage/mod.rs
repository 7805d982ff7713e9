//! Storage Module
//!
//! This module provides the core storage functionality for textdrop: a
//! SQLite table of `(code, text, created_at)` records with unique short-code
//! allocation, 24-hour expiry, and a background expiry sweeper.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TextStore                             │
//! │   allocate_code · create · retrieve · purge_expired         │
//! │                          │                                  │
//! │                  SqlitePool ──> texts (code UNIQUE)         │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │
//!              ┌─────────────┴─────────────┐
//!              │     ExpirySweeper         │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Short Codes**: 3 decimal digits, drawn at random with bounded retries
//! - **Unique Constraint**: The database, not the process, guarantees uniqueness
//! - **Lazy Expiry**: Expired records are deleted when read
//! - **Active Expiry**: Background sweeper deletes records nobody reads
//!
//! ## Example
//!
//! ```no_run
//! use textdrop::storage::{ExpiryConfig, ExpirySweeper, StoreConfig, TextStore};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), textdrop::storage::StoreError> {
//! let store = Arc::new(TextStore::connect(StoreConfig::new("texts.db")).await?);
//! let sweeper = ExpirySweeper::start(Arc::clone(&store), ExpiryConfig::default());
//!
//! let code = store.create("meet at noon").await?;
//! let text = store.retrieve(code.as_str()).await?;
//! assert_eq!(text, "meet at noon");
//!
//! sweeper.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod code;
pub mod engine;
pub mod error;
pub mod expiry;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use code::{Code, CODE_ALPHABET, CODE_LENGTH, CODE_SPACE};
pub use engine::{
    RetryPolicy, StoreConfig, TextStore, DEFAULT_MAX_TEXT_BYTES, MAX_ALLOCATION_ATTEMPTS,
    RETENTION_SECS,
};
pub use error::StoreError;
pub use expiry::{sweep_once, ExpiryConfig, ExpirySweeper, SweepStats};
