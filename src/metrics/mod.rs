// Metrics module for Prometheus observability

mod registry;

pub use registry::{
    gather_metrics, GOOGLE_TOKEN_REFRESHES, TRANSLATIONS_TOTAL, TRANSLATION_DURATION,
    UPLOAD_BYTES, VENDOR_CALLS,
};

use crate::models::EngineKind;

/// Helper to record the outcome of one form submission's translation
pub fn record_translation(engine: EngineKind, success: bool, duration_secs: f64) {
    let outcome = if success { "success" } else { "error" };
    TRANSLATIONS_TOTAL
        .with_label_values(&[engine.as_str(), outcome])
        .inc();

    TRANSLATION_DURATION
        .with_label_values(&[engine.as_str()])
        .observe(duration_secs);
}

/// Helper to record a single vendor HTTP call (status 0 = transport error)
pub fn record_vendor_call(engine: EngineKind, status_code: u16) {
    VENDOR_CALLS
        .with_label_values(&[engine.as_str(), &status_code.to_string()])
        .inc();
}

pub fn record_upload(bytes: usize) {
    UPLOAD_BYTES.inc_by(bytes as u64);
}

pub fn record_google_token_refresh(success: bool) {
    let status = if success { "success" } else { "failure" };
    GOOGLE_TOKEN_REFRESHES.with_label_values(&[status]).inc();
}
