// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod diversify;
pub mod error;
pub mod import;
pub mod metrics;
pub mod model;
pub mod retrieve;
pub mod scoring;
pub mod search;
pub mod store;
pub mod tokenize;
pub mod tone;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::error::{SearchError, StoreError};
pub use crate::model::{Candidate, QuoteRecord, QuoteResult, SearchQuery, Tone};
pub use crate::search::search;

use axum::Router;
use tracing::info;

/// Build the full in-process app from config files and env (no server runtime).
pub fn app() -> anyhow::Result<Router> {
    let state = AppState::from_env()?;
    let _ = state.metrics.spawn_upkeep(crate::metrics::UPKEEP_INTERVAL);
    info!(
        db_path = %state.store.path().display(),
        result_limit = state.search.result_limit,
        "quote service configured"
    );
    Ok(router(state))
}
