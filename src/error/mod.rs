// Error types for docrelay
// PDF document translation relay

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file part")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("File is too large (limit {0} MB)")]
    UploadTooLarge(usize),

    #[error("Only PDF files are supported")]
    NotAPdf(String),

    #[error("Please select a language")]
    MissingLanguage,

    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),

    #[error("Please select a translation engine.")]
    MissingEngine,

    #[error("Invalid translation engine selected.")]
    InvalidEngine(String),

    #[error("{engine} is not configured. Please set {hint} in your environment or .env file.")]
    EngineNotConfigured { engine: &'static str, hint: &'static str },

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("{engine} API error: {message}")]
    Vendor { engine: &'static str, message: String },

    #[error("Rate limited by upstream: {0}")]
    TooManyRequests(String),

    #[error("Upstream unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Google authentication failed: {0}")]
    GoogleAuth(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors caused by the submitted form rather than by the translation itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::NoFilePart
                | AppError::NoSelectedFile
                | AppError::InvalidUpload(_)
                | AppError::UploadTooLarge(_)
                | AppError::NotAPdf(_)
                | AppError::MissingLanguage
                | AppError::UnsupportedLanguage(_)
                | AppError::MissingEngine
                | AppError::InvalidEngine(_)
        )
    }

    /// Text shown to the user after the redirect back to the form.
    pub fn flash_message(&self) -> String {
        if self.is_validation() {
            self.to_string()
        } else {
            format!("An error occurred during translation: {}", self)
        }
    }
}

// Convert AppError to HTTP responses for Axum
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AppError::UploadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "request_too_large"),
            e if e.is_validation() => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found_error"),
            AppError::EngineNotConfigured { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "engine_not_configured")
            }
            AppError::NotImplemented(_) => (StatusCode::NOT_IMPLEMENTED, "not_implemented"),
            AppError::Vendor { .. } | AppError::Http(_) => (StatusCode::BAD_GATEWAY, "api_error"),
            AppError::GoogleAuth(_) | AppError::InvalidCredentials(_) => {
                (StatusCode::BAD_GATEWAY, "authentication_error")
            }
            AppError::TooManyRequests(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limit_error"),
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "overloaded_error")
            }
            AppError::Config(_) | AppError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
