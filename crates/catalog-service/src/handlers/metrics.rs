//! Prometheus scrape endpoint.
//!
//! Unauthenticated so Prometheus can scrape it. Metric labels carry no
//! usernames or tokens.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
#[tracing::instrument(skip_all, name = "catalog.handlers.metrics")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
