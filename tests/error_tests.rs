// Error handling tests

use axum::http::StatusCode;
use axum::response::IntoResponse;
use docrelay::error::AppError;

#[test]
fn test_validation_messages_are_flashed_verbatim() {
    let cases = [
        (AppError::NoFilePart, "No file part"),
        (AppError::NoSelectedFile, "No selected file"),
        (AppError::NotAPdf("a.docx".to_string()), "Only PDF files are supported"),
        (AppError::MissingLanguage, "Please select a language"),
        (AppError::MissingEngine, "Please select a translation engine."),
        (AppError::InvalidEngine("libre".to_string()), "Invalid translation engine selected."),
        (AppError::UploadTooLarge(50), "File is too large (limit 50 MB)"),
    ];

    for (error, expected) in cases {
        assert!(error.is_validation());
        assert_eq!(error.flash_message(), expected);
    }
}

#[test]
fn test_translation_failures_are_prefixed() {
    let error = AppError::Vendor {
        engine: "DeepL",
        message: "HTTP 403: Forbidden".to_string(),
    };
    assert!(!error.is_validation());
    assert_eq!(
        error.flash_message(),
        "An error occurred during translation: DeepL API error: HTTP 403: Forbidden"
    );
}

#[test]
fn test_not_configured_names_the_variable() {
    let error = AppError::EngineNotConfigured {
        engine: "ApyHub",
        hint: "APYHUB_API_KEY",
    };
    let message = error.flash_message();
    assert!(message.starts_with("An error occurred during translation: ApyHub is not configured"));
    assert!(message.contains("APYHUB_API_KEY"));
}

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::NoFilePart, StatusCode::BAD_REQUEST),
        (AppError::UploadTooLarge(50), StatusCode::PAYLOAD_TOO_LARGE),
        (AppError::NotFound("x.pdf".to_string()), StatusCode::NOT_FOUND),
        (AppError::NotImplemented("documents".to_string()), StatusCode::NOT_IMPLEMENTED),
        (
            AppError::EngineNotConfigured { engine: "DeepL", hint: "DEEPL_API_KEY" },
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (
            AppError::Vendor { engine: "DeepL", message: "boom".to_string() },
            StatusCode::BAD_GATEWAY,
        ),
        (AppError::TooManyRequests("DeepL".to_string()), StatusCode::TOO_MANY_REQUESTS),
        (AppError::GoogleAuth("invalid_grant".to_string()), StatusCode::BAD_GATEWAY),
        (AppError::Internal("oops".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, status) in cases {
        assert_eq!(error.into_response().status(), status);
    }
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let error: AppError = io.into();
    assert!(error.to_string().contains("read-only"));
}
