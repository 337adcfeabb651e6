//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the vidfetch server:
//! - HTTP request metrics (latency, counts, in-flight)
//! - Orchestrator status (collected dynamically)
//! - Core task lifecycle metrics, registered from `vidfetch_core::metrics`

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidfetch_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 600.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// Total HTTP requests.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidfetch_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently being processed.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "vidfetch_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Tasks between processing and a terminal state.
pub static TASKS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "vidfetch_tasks_in_flight",
        "Number of download tasks currently being processed",
    )
    .unwrap()
});

/// Whether the task store is attached (1) or the service is degraded (0).
pub static STORE_CONNECTED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "vidfetch_store_connected",
        "Whether the task store is connected (1) or not (0)",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    // HTTP metrics
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Orchestrator metrics
    registry.register(Box::new(TASKS_IN_FLIGHT.clone())).unwrap();
    registry.register(Box::new(STORE_CONNECTED.clone())).unwrap();

    // Core metrics (task lifecycle, store writes, retrieval)
    for metric in vidfetch_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the orchestrator right now.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.orchestrator_status();
    TASKS_IN_FLIGHT.set(status.in_flight as i64);
    STORE_CONNECTED.set(if status.store_connected { 1 } else { 0 });
}

/// Normalize a path for metric labels.
///
/// Only known routes keep their path; anything else is folded into
/// `{other}` so that probing random URLs cannot blow up label cardinality.
pub fn normalize_path(path: &str) -> String {
    match path {
        "/" | "/health" | "/download" | "/metrics" | "/config" | "/status" => path.to_string(),
        _ => "{other}".to_string(),
    }
}
