// src/metrics.rs
//! Prometheus exposition for the search counters.

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How often buffered histogram samples are folded into their summaries.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct Metrics {
    pub handle: Option<PrometheusHandle>,
}

impl Metrics {
    /// Install the Prometheus recorder once per process and describe our series.
    ///
    /// If another recorder already owns the global slot, `/metrics` renders empty.
    pub fn init() -> Self {
        static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();
        let handle = HANDLE
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(h) => {
                    describe_series();
                    Some(h)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "prometheus recorder not installed");
                    None
                }
            })
            .clone();
        Self { handle }
    }

    /// Periodically drain buffered histogram samples so an unscraped `/metrics` does not
    /// grow without bound. `None` outside a tokio runtime or without a recorder.
    pub fn spawn_upkeep(&self, every: Duration) -> Option<JoinHandle<()>> {
        let handle = self.handle.clone()?;
        let rt = tokio::runtime::Handle::try_current().ok()?;
        Some(rt.spawn(async move {
            let mut tick = tokio::time::interval(every);
            loop {
                tick.tick().await;
                handle.run_upkeep();
            }
        }))
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.map(|h| h.render()).unwrap_or_default() }
            }),
        )
    }
}

fn describe_series() {
    describe_counter!("search_requests_total", "Searches served by the pipeline.");
    describe_counter!(
        "search_tier_total",
        "Searches by the retrieval tier that produced candidates."
    );
    describe_counter!(
        "search_empty_query_total",
        "Requests rejected for a missing or non-string query."
    );
    describe_counter!("search_errors_total", "Failed searches by error kind.");
    describe_histogram!("search_duration_ms", "Pipeline time in milliseconds.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::histogram;

    #[test]
    fn upkeep_keeps_recorded_samples_renderable() {
        let m = Metrics::init();
        let handle = m.handle.clone().expect("recorder installed");

        histogram!("search_duration_ms").record(12.5);
        handle.run_upkeep();

        let out = handle.render();
        assert!(out.contains("search_duration_ms"), "{out}");
    }

    #[test]
    fn upkeep_needs_a_runtime() {
        assert!(Metrics::init().spawn_upkeep(UPKEEP_INTERVAL).is_none());
    }

    #[tokio::test]
    async fn upkeep_task_runs_inside_runtime() {
        let task = Metrics::init()
            .spawn_upkeep(Duration::from_millis(10))
            .expect("spawned");
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!task.is_finished());
        task.abort();
    }
}
