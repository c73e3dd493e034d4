//! Utility functions and helpers for docrelay.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and credential redaction.
//! - `retry`: Retry with backoff that respects upstream wait hints.

pub mod logging;
pub mod retry;
