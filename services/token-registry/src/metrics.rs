//! Prometheus metrics for the token registry.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

/// Calls served, by method and status.
pub static REGISTRY_CALLS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "token_registry_calls_total",
        "Total number of registry calls",
        &["method", "status"]
    )
    .expect("Failed to register registry_calls metric")
});

/// Call latency histogram.
pub static CALL_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "token_registry_call_latency_seconds",
        "Registry call latency in seconds",
        &["method"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("Failed to register call_latency metric")
});

/// Token operations, by operation and outcome.
pub static NFT_OPERATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "token_registry_nft_operations_total",
        "Total number of token operations",
        &["operation", "status"]
    )
    .expect("Failed to register nft_operations metric")
});

/// Calls refused by a guard.
pub static REJECTIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "token_registry_rejections_total",
        "Total number of rejected calls",
        &["method"]
    )
    .expect("Failed to register rejections metric")
});

/// Snapshot loads and saves.
pub static SNAPSHOT_OPERATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "token_registry_snapshot_operations_total",
        "Total number of snapshot operations",
        &["operation", "status"]
    )
    .expect("Failed to register snapshot_operations metric")
});

/// Record a served call and its latency.
pub fn record_call(method: &str, status: &str, duration_secs: f64) {
    REGISTRY_CALLS.with_label_values(&[method, status]).inc();
    CALL_LATENCY
        .with_label_values(&[method])
        .observe(duration_secs);
}

/// Record a token operation.
pub fn record_nft_operation(operation: &str, status: &str) {
    NFT_OPERATIONS
        .with_label_values(&[operation, status])
        .inc();
}

/// Record a rejected call.
pub fn record_rejection(method: &str) {
    REJECTIONS.with_label_values(&[method]).inc();
}

/// Record a snapshot load or save.
pub fn record_snapshot_operation(operation: &str, status: &str) {
    SNAPSHOT_OPERATIONS
        .with_label_values(&[operation, status])
        .inc();
}
