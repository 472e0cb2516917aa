// src/error.rs
//! Error taxonomy for storage access and the search boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;

/// Failures talking to the SQLite file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File missing or could not be opened.
    #[error("quote store unavailable at {}: {reason}", path.display())]
    Unavailable { path: PathBuf, reason: String },
    /// A read against an opened store failed.
    #[error("quote store query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("quote store lock poisoned")]
    Poisoned,
}

/// Errors surfaced by a search request.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl SearchError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Store(StoreError::Unavailable { .. }) => "store_unavailable",
            SearchError::Store(_) => "store_query",
            SearchError::Unexpected(_) => "unexpected",
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        match &self {
            SearchError::Store(StoreError::Unavailable { path, reason }) => {
                tracing::warn!(target: "store", db_path = %path.display(), %reason, "store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "error": "quote store unavailable",
                        "detail": reason,
                        "dbPath": path.display().to_string(),
                    })),
                )
                    .into_response()
            }
            other => {
                tracing::error!(target: "search", error = %other, "search failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "search failed" })),
                )
                    .into_response()
            }
        }
    }
}
