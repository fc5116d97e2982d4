//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the conversion gateway:
//! - HTTP request metrics (latency, counts, in flight)
//! - Upload sizes accepted by the transport
//! - Core conversion metrics, registered alongside

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use tracing::warn;

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
            "transmute_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("transmute_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "transmute_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Upload Metrics
// =============================================================================

/// Size of stored uploads in bytes.
pub static UPLOAD_SIZE_BYTES: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("transmute_upload_size_bytes", "Size of received uploads")
            .buckets(prometheus::exponential_buckets(1024.0, 4.0, 12).unwrap()),
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Uploads
    registry
        .register(Box::new(UPLOAD_SIZE_BYTES.clone()))
        .unwrap();

    // Core metrics (conversions, upload cleanup)
    for metric in transmute_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics in the Prometheus text exposition format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Routes served by the router. Anything else is reported as `unmatched`.
const KNOWN_PATHS: &[&str] = &["/convert", "/formats", "/health", "/metrics"];

/// Map a request path to a bounded label value.
pub fn normalize_path(path: &str) -> String {
    let trimmed = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    if KNOWN_PATHS.contains(&trimmed) {
        trimmed.to_string()
    } else {
        "unmatched".to_string()
    }
}
