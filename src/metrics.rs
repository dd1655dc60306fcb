// src/metrics.rs
use std::sync::OnceLock;

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide Prometheus recorder (once) and return a handle to it.
    pub fn init() -> Self {
        let handle = HANDLE
            .get_or_init(|| {
                let handle = match PrometheusBuilder::new().install_recorder() {
                    Ok(h) => h,
                    // Another recorder is already global. This handle belongs to a
                    // detached recorder, so `/metrics` renders an empty page.
                    Err(e) => {
                        tracing::warn!(error = %e, "prometheus recorder not installed; /metrics will be empty");
                        PrometheusBuilder::new().build_recorder().handle()
                    }
                };
                describe_counter!(
                    "recommend_requests_total",
                    "Recommendation requests by outcome"
                );
                describe_counter!(
                    "recommend_scoring_failures_total",
                    "Scorer calls that fell back to recency order, by reason"
                );
                describe_histogram!(
                    "recommend_scoring_duration_ms",
                    "Latency of the external scoring call"
                );
                handle
            })
            .clone();
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S: Clone + Send + Sync + 'static>(&self) -> Router<S> {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
