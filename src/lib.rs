//! # textdrop - Ephemeral Anonymous Text Sharing
//!
//! textdrop lets one client post a piece of text and get back a three-digit
//! code; anyone holding the code can read the text back for the next 24 hours.
//! There are no accounts. Texts vanish once the retention window passes.
//!
//! ## Features
//!
//! - **Short Codes**: 3 decimal digits, unique among live texts
//! - **Shared SQLite Table**: Uniqueness enforced by a `UNIQUE` constraint, so
//!   several server processes can share one database file
//! - **24h Expiry**: Checked on every read, plus a background sweeper
//! - **Async I/O**: Built on Tokio and axum
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              textdrop                                   │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────────────────┐  │
//! │  │ axum Router │───>│  Handlers   │───>│          TextStore          │  │
//! │  │ (no-cache)  │    │ (ApiError)  │    │  allocate · create ·        │  │
//! │  └─────────────┘    └─────────────┘    │  retrieve · purge_expired   │  │
//! │                                        └──────────────┬──────────────┘  │
//! │                                                       │                 │
//! │                                                       ▼                 │
//! │  ┌─────────────────────────────┐       ┌─────────────────────────────┐  │
//! │  │        ExpirySweeper        │──────>│   SqlitePool -> texts.db    │  │
//! │  │   (Background Tokio Task)   │       └─────────────────────────────┘  │
//! │  └─────────────────────────────┘                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use textdrop::http::{router, AppState};
//! use textdrop::storage::{ExpiryConfig, ExpirySweeper, StoreConfig, TextStore};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Open the store
//!     let store = Arc::new(TextStore::connect(StoreConfig::new("texts.db")).await?);
//!
//!     // Start the background expiry sweeper
//!     let sweeper = ExpirySweeper::start(Arc::clone(&store), ExpiryConfig::default());
//!
//!     // Serve the API
//!     let listener = TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, router(AppState::new(store, "static"))).await?;
//!
//!     sweeper.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`storage`]: Code allocation, the SQLite-backed store and the sweeper
//! - [`http`]: Routes, handlers and the JSON wire types
//! - [`config`]: Environment-driven server configuration
//!
//! ## Design Highlights
//!
//! ### Uniqueness Without Locks
//!
//! Allocation picks a random code that no live record holds, but it doesn't
//! reserve it. The insert is a single statement that only succeeds if no live
//! record holds the code; a lost race is retried with a new code.
//!
//! ### Lazy + Active Expiry
//!
//! Texts are expired in two ways:
//! 1. **Lazy**: When a code is read, an expired record is deleted and reported
//!    as not found
//! 2. **Active**: A background task periodically deletes all expired records
//!
//! Only lazy expiry matters for correctness; the sweeper bounds table size.

pub mod config;
pub mod http;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError};
pub use http::{router, AppState};
pub use storage::{Code, ExpiryConfig, ExpirySweeper, StoreConfig, StoreError, TextStore};

/// The default port textdrop listens on
pub const DEFAULT_PORT: u16 = 5000;

/// Version of textdrop
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
