//! Metrics definitions for the catalog service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `catalog_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `status`: 2 values (success, error)
//! - `error_type`: bounded by `TokenError::reason()` / `GateRejection::reason()`
//! - `outcome`: 4 gate outcomes
//! - `method`: 7 values max
//! - `endpoint`: known paths, everything else collapsed to `/other`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder.
///
/// Must be called once per process, before any metric is recorded.
///
/// # Errors
///
/// Returns an error string if bucket configuration or recorder installation
/// fails (e.g. a recorder is already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // HTTP request buckets aligned with a 200ms p95 target
        .set_buckets_for_metric(
            Matcher::Prefix("catalog_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance outcome
///
/// Metric: `catalog_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str) {
    counter!("catalog_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record token validation result
///
/// Metric: `catalog_token_validations_total`
/// Labels: `status`, `error_type`
pub fn record_token_validation(status: &str, error_type: Option<&str>) {
    let error_type = error_type.unwrap_or("none");
    counter!("catalog_token_validations_total",
        "status" => status.to_string(),
        "error_type" => error_type.to_string()
    )
    .increment(1);
}

// ============================================================================
// Authentication Gate Metrics
// ============================================================================

/// Record the outcome of the per-request authentication gate
///
/// Metric: `catalog_authentication_total`
/// Labels: `outcome` (authenticated, no_credentials, already_authenticated, rejected)
pub fn record_authentication(outcome: &str) {
    counter!("catalog_authentication_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record why the gate left a request unauthenticated
///
/// Metric: `catalog_authentication_rejections_total`
/// Labels: `reason`
pub fn record_authentication_rejection(reason: &str) {
    counter!("catalog_authentication_rejections_total", "reason" => reason.to_string())
        .increment(1);
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `catalog_http_requests_total`, `catalog_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("catalog_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("catalog_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Collapse unknown paths to `/other` to bound label cardinality
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/api/me" => "/api/me",
        "/api/auth/login" => "/api/auth/login",
        _ => "/other",
    }
}
