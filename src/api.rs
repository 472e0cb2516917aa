// src/api.rs
//! HTTP surface: `/api/search`, `/api/debug-info`, `/health`, `/metrics`.

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::config::{AppConfig, SearchConfig};
use crate::error::SearchError;
use crate::metrics::Metrics;
use crate::model::{QuoteResult, SearchQuery, Tone};
use crate::search::search;
use crate::store::StoreHandle;

#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
    pub search: SearchConfig,
    pub static_dir: Option<PathBuf>,
    pub metrics: Metrics,
}

impl AppState {
    /// State for a loaded config. The store itself opens on the first search.
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            store: StoreHandle::new(cfg.resolve_db_path()),
            search: cfg.search.sanitized(),
            static_dir: cfg.server.static_dir.clone(),
            metrics: Metrics::init(),
        }
    }

    /// Load config from file/env and build state.
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = AppConfig::load()?;
        Ok(Self::new(&cfg))
    }

    pub fn with_store(store: StoreHandle) -> Self {
        Self {
            store,
            search: SearchConfig::default(),
            static_dir: None,
            metrics: Metrics::init(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/search", post(search_quotes))
        .route("/api/debug-info", get(debug_info))
        .merge(state.metrics.router());

    if let Some(dir) = &state.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::very_permissive()).with_state(state)
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<QuoteResult>,
}

/// Read `{query, tone?, publicDomainOnly?}` leniently.
///
/// `None` when the body is not a JSON object or `query` is absent / not a string.
pub fn parse_search_request(body: &[u8]) -> Option<SearchQuery> {
    let v: Value = serde_json::from_slice(body).ok()?;
    let obj = v.as_object()?;
    let text = obj.get("query")?.as_str()?;
    let tone = obj
        .get("tone")
        .and_then(Value::as_str)
        .map(Tone::parse)
        .unwrap_or_default();
    let public_domain_only = obj
        .get("publicDomainOnly")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(
        SearchQuery::new(text)
            .tone(tone)
            .public_domain_only(public_domain_only),
    )
}

async fn search_quotes(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SearchResponse>, SearchError> {
    let Some(query) = parse_search_request(&body) else {
        counter!("search_empty_query_total").increment(1);
        return Ok(Json(SearchResponse {
            results: Vec::new(),
        }));
    };

    let store = state.store.clone();
    let cfg = state.search;
    let outcome = tokio::task::spawn_blocking(move || -> Result<Vec<QuoteResult>, SearchError> {
        let store = store.get()?;
        Ok(search(&*store, &query, cfg)?)
    })
    .await
    .map_err(|e| SearchError::Unexpected(e.to_string()))
    .and_then(|r| r);

    match outcome {
        Ok(results) => Ok(Json(SearchResponse { results })),
        Err(e) => {
            counter!("search_errors_total", "kind" => e.kind()).increment(1);
            Err(e)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DebugInfo {
    cwd: String,
    db_path: String,
    db_exists: bool,
    store_open: bool,
}

async fn debug_info(State(state): State<AppState>) -> Json<DebugInfo> {
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let path = state.store.path();
    Json(DebugInfo {
        cwd,
        db_path: path.display().to_string(),
        db_exists: path.exists(),
        store_open: state.store.is_open(),
    })
}
