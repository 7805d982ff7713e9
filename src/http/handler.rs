//! Request Handlers
//!
//! Each handler validates its request, calls into the [`TextStore`] and turns
//! the outcome into a JSON response. Store errors become [`ApiError`]s whose
//! bodies carry a short, fixed message; error details only go to the log.
//!
//! ## Status Mapping
//!
//! ```text
//! InvalidInput        -> 400 Bad Request
//! NotFound            -> 404 Not Found   (missing and expired look the same)
//! CodeSpaceExhausted  -> 503 Service Unavailable
//! StorageUnavailable  -> 500 Internal Server Error
//! DuplicateCode       -> 500 Internal Server Error
//! ```

use crate::http::types::{
    CreateRequest, CreateResponse, ErrorBody, HealthResponse, RetrieveResponse,
};
use crate::storage::{StoreError, TextStore};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<TextStore>,
    pub static_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: Arc<TextStore>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            static_dir: Arc::new(static_dir.into()),
        }
    }
}

/// Errors returned to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is missing or isn't `{"text": "..."}`
    #[error("no text provided")]
    MissingText,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failure outside the store, e.g. reading the landing page
    #[error("internal error")]
    Internal,
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingText => (StatusCode::BAD_REQUEST, "No text provided"),
            ApiError::Store(StoreError::InvalidInput(message)) => {
                (StatusCode::BAD_REQUEST, *message)
            }
            ApiError::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "Invalid code or text expired")
            }
            ApiError::Store(StoreError::CodeSpaceExhausted { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "No codes available, try again later",
            ),
            ApiError::Store(StoreError::StorageUnavailable(_))
            | ApiError::Store(StoreError::DuplicateCode)
            | ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "Request failed");
        }
        let body = ErrorBody {
            error: message.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// `GET /` serves the landing page.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Ok(Html(page)),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error serving landing page");
            Err(ApiError::Internal)
        }
    }
}

/// `GET /health` probes the database.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::healthy())).into_response(),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse::unhealthy("database unavailable")),
            )
                .into_response()
        }
    }
}

/// `POST /api/create` stores a text and returns its code.
pub async fn create_text(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "Rejected create request body");
        ApiError::MissingText
    })?;

    let code = state.store.create(&request.text).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            code: code.to_string(),
        }),
    ))
}

/// `GET /api/retrieve/:code` returns the text stored under a code.
pub async fn retrieve_text(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RetrieveResponse>, ApiError> {
    let text = state.store.retrieve(&code).await?;
    Ok(Json(RetrieveResponse { text }))
}
