//! JSON bodies exchanged over the HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/create`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    pub text: String,
}

/// Reply to a successful create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateResponse {
    pub code: String,
}

/// Reply to a successful retrieve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrieveResponse {
    pub text: String,
}

/// Body of every error reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

/// Reply to `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            database: Some("connected".to_string()),
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            database: None,
            error: Some(error.into()),
        }
    }
}
