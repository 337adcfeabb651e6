//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Task lifecycle (started, completed, failed, rejected)
//! - Store writes per transition
//! - Retrieval duration

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Task lifecycle
// =============================================================================

/// Tasks that entered processing.
pub static TASKS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("vidfetch_tasks_started_total", "Total tasks started").unwrap()
});

/// Tasks that reached completed.
pub static TASKS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vidfetch_tasks_completed_total",
        "Total tasks completed successfully",
    )
    .unwrap()
});

/// Tasks that reached failed.
pub static TASKS_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("vidfetch_tasks_failed_total", "Total tasks that failed").unwrap()
});

/// Requests refused because the task_id was already in flight.
pub static TASKS_REJECTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vidfetch_tasks_rejected_total",
        "Requests rejected because the task was already in flight",
    )
    .unwrap()
});

// =============================================================================
// Store
// =============================================================================

/// Store writes by transition and result.
pub static STORE_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidfetch_store_writes_total", "Task store writes"),
        &["status", "result"], // result: "ok", "error", "skipped"
    )
    .unwrap()
});

// =============================================================================
// Retrieval
// =============================================================================

/// Retrieval duration in seconds.
pub static RETRIEVAL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidfetch_retrieval_duration_seconds",
            "Duration of retrievals",
        )
        .buckets(vec![
            1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0,
        ]),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TASKS_STARTED.clone()),
        Box::new(TASKS_COMPLETED.clone()),
        Box::new(TASKS_FAILED.clone()),
        Box::new(TASKS_REJECTED.clone()),
        Box::new(STORE_WRITES.clone()),
        Box::new(RETRIEVAL_DURATION.clone()),
    ]
}
