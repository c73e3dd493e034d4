//! Structured logging and secret redaction.
//!
//! This module configures the `tracing` ecosystem for the application and
//! provides [`sanitize`], which masks vendor credentials that may echo back in
//! error bodies before those bodies reach logs or the browser.

use crate::config::LoggingConfig;
use crate::error::Result;
use regex::Regex;
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

struct Pattern {
    regex: Regex,
    replacement: &'static str,
}

fn patterns() -> &'static [Pattern] {
    static PATTERNS: OnceLock<Vec<Pattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let table: [(&str, &str); 5] = [
            // Google OAuth2 access tokens
            (r"ya29\.[A-Za-z0-9_\-\.]+", "[REDACTED_ACCESS_TOKEN]"),
            // Google refresh tokens
            (r"1//0[A-Za-z0-9_\-]+", "[REDACTED_REFRESH_TOKEN]"),
            // DeepL authentication keys (UUID, optional `:fx` suffix)
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}(:fx)?",
                "[REDACTED_API_KEY]",
            ),
            // DeepL document keys
            (r#"("?document_key"?\s*[:=]\s*"?)[0-9A-F]{64}"#, "${1}[REDACTED_DOCUMENT_KEY]"),
            // Authorization-style headers echoed back in bodies
            (
                r"(?i)((?:apy-token|api-key|deepl-auth-key|bearer)[\s:=]+)[A-Za-z0-9_\-\.]{8,}",
                "${1}[REDACTED]",
            ),
        ];
        table
            .iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(pattern).ok().map(|regex| Pattern {
                    regex,
                    replacement,
                })
            })
            .collect()
    })
}

/// Sanitizes sensitive information from log messages.
///
/// Every occurrence of a known credential shape is replaced with a
/// `[REDACTED_*]` placeholder.
pub fn sanitize(input: &str) -> String {
    patterns().iter().fold(input.to_string(), |acc, pattern| {
        pattern
            .regex
            .replace_all(&acc, pattern.replacement)
            .into_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_access_token() {
        let input = "Authorization: Bearer ya29.a0AfH6SMC...";
        let output = sanitize(input);
        assert!(output.contains("[REDACTED"));
        assert!(!output.contains("ya29.a0AfH6SMC"));
    }

    #[test]
    fn test_sanitize_refresh_token() {
        let input = "refresh_token: 1//01S6LICZta2ee...";
        let output = sanitize(input);
        assert!(output.contains("[REDACTED_REFRESH_TOKEN]"));
        assert!(!output.contains("1//01S6LICZta2ee"));
    }

    #[test]
    fn test_sanitize_deepl_key() {
        let input = "invalid key 9b5c3f1e-1234-4cde-9abc-0123456789ab:fx for account";
        let output = sanitize(input);
        assert_eq!(output, "invalid key [REDACTED_API_KEY] for account");
    }

    #[test]
    fn test_sanitize_document_key() {
        let key = "A".repeat(64);
        let input = format!(r#"{{"document_id":"04DE5AD9","document_key":"{}"}}"#, key);
        let output = sanitize(&input);
        assert!(!output.contains(&key));
        assert!(output.contains("04DE5AD9"));
    }

    #[test]
    fn test_sanitize_apy_token() {
        let output = sanitize("apy-token: APY0123456789abcdef rejected");
        assert_eq!(output, "apy-token: [REDACTED] rejected");
    }

    #[test]
    fn test_sanitize_leaves_plain_text() {
        assert_eq!(sanitize("quota exceeded"), "quota exceeded");
    }
}
