//! Discovery Metrics
//!
//! Prometheus metrics for trending aggregation passes

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};
use std::time::Duration;

static AGGREGATION_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "discovery_aggregation_runs_total",
        "Total trending aggregation passes (loaded/empty/failed)",
        &["status"]
    )
    .expect("Failed to register discovery aggregation runs metric")
});

static AGGREGATION_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "discovery_aggregation_duration_seconds",
        "Duration of a trending aggregation pass",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register discovery aggregation duration metric")
});

static COUNTER_FALLBACKS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "discovery_counter_fallbacks_total",
        "Passes that fell back to zero play counts"
    )
    .expect("Failed to register discovery counter fallback metric")
});

static STALE_RESULTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "discovery_stale_results_total",
        "Aggregation results discarded because a newer refresh started"
    )
    .expect("Failed to register discovery stale results metric")
});

static RANKED_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "discovery_ranked_items",
        "Number of items in the current trending list"
    )
    .expect("Failed to register discovery ranked items metric")
});

pub fn record_aggregation_run(status: &str) {
    AGGREGATION_RUNS_TOTAL.with_label_values(&[status]).inc();
}

pub fn record_aggregation_duration(duration: Duration) {
    AGGREGATION_DURATION_SECONDS.observe(duration.as_secs_f64());
}

pub fn record_counter_fallback() {
    COUNTER_FALLBACKS_TOTAL.inc();
}

pub fn record_stale_result() {
    STALE_RESULTS_TOTAL.inc();
}

pub fn set_ranked_items(count: usize) {
    RANKED_ITEMS.set(count as i64);
}

/// Render the default registry in Prometheus text format
pub fn render() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
