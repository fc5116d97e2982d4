//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Conversions (outcome by family, duration)
//! - Upload cleanup

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Conversions by source family and result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("transmute_conversions_total", "Total conversion requests"),
        &["family", "result"], // result: "success" or an error kind
    )
    .unwrap()
});

/// Conversion duration in seconds, classification through cleanup.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "transmute_conversion_duration_seconds",
            "Duration of a conversion request",
        )
        .buckets(vec![
            0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0,
        ]),
        &["family"],
    )
    .unwrap()
});

// =============================================================================
// Upload Metrics
// =============================================================================

/// Uploads whose temporary file could not be removed.
pub static UPLOAD_CLEANUP_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "transmute_upload_cleanup_failures_total",
        "Uploaded temporary files that could not be deleted",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(UPLOAD_CLEANUP_FAILURES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        CONVERSIONS_TOTAL
            .with_label_values(&["image", "success"])
            .inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"transmute_conversions_total".to_string()));
    }
}
