// Prometheus metrics registry and collectors

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // TRANSLATION METRICS
    // ============================================================================

    /// Completed form submissions by engine and outcome
    pub static ref TRANSLATIONS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("translations_total", "Total translation requests"),
        &["engine", "outcome"], // outcome: success, error
        REGISTRY
    ).unwrap();

    /// End-to-end vendor translation time
    pub static ref TRANSLATION_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("translation_duration_seconds", "Document translation duration")
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["engine"],
        REGISTRY
    ).unwrap();

    /// Accepted upload volume
    pub static ref UPLOAD_BYTES: IntCounter = {
        let counter = IntCounter::new("upload_bytes_total", "Total bytes of accepted uploads").unwrap();
        REGISTRY.register(Box::new(counter.clone())).unwrap();
        counter
    };

    // ============================================================================
    // VENDOR METRICS
    // ============================================================================

    /// Individual HTTP calls made to vendors
    pub static ref VENDOR_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("vendor_calls_total", "Total vendor API calls"),
        &["engine", "status_code"],
        REGISTRY
    ).unwrap();

    /// Google access token refreshes
    pub static ref GOOGLE_TOKEN_REFRESHES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("google_token_refreshes_total", "Total Google access token refreshes"),
        &["status"], // status: success, failure
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        TRANSLATIONS_TOTAL.with_label_values(&["deepl", "success"]).inc();
        VENDOR_CALLS.with_label_values(&["deepl", "200"]).inc();
        UPLOAD_BYTES.inc_by(10);

        let metrics = gather_metrics();
        assert!(metrics.contains("translations_total"));
        assert!(metrics.contains("vendor_calls_total"));
        assert!(metrics.contains("upload_bytes_total"));
    }
}
