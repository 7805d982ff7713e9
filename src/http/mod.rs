//! HTTP Module
//!
//! This module exposes the text store over HTTP with axum. Every response,
//! errors included, carries headers that forbid caching: a retrieved text
//! must never linger in a browser or proxy cache after it expires.
//!
//! ## Routes
//!
//! ```text
//! GET  /                    landing page (<static_dir>/index.html)
//! GET  /health              {"status":"healthy","database":"connected"}
//! POST /api/create          {"text":"..."}  -> 201 {"code":"042"}
//! GET  /api/retrieve/:code  -> 200 {"text":"..."}
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use textdrop::http::{router, AppState};
//!
//! let state = AppState::new(store, "static");
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router(state)).await?;
//! ```

pub mod handler;
pub mod types;

use axum::http::{header, HeaderValue};
use axum::middleware;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;

// Re-export commonly used types
pub use handler::{ApiError, AppState};
pub use types::{CreateRequest, CreateResponse, ErrorBody, HealthResponse, RetrieveResponse};

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handler::index))
        .route("/health", get(handler::health))
        .route("/api/create", post(handler::create_text))
        .route("/api/retrieve/:code", get(handler::retrieve_text))
        .layer(middleware::map_response(no_cache))
        .with_state(state)
}

async fn no_cache(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}
