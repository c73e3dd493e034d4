// HTTP request handlers

use super::flash;
use super::routes::AppState;
use crate::engines::TranslationJob;
use crate::error::{AppError, Result};
use crate::models::{EngineKind, Language};
use crate::storage::{self, FileStore};
use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

/// Raw form submission, before validation.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// `None` when the request had no `file` part at all.
    pub file: Option<UploadedFile>,
    pub language: Option<String>,
    pub engine: Option<String>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: bytes::Bytes,
}

/// A submission that passed validation.
#[derive(Debug)]
pub struct ValidatedUpload {
    pub filename: String,
    pub bytes: bytes::Bytes,
    pub language: Language,
    pub engine: EngineKind,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart, max_upload_mb: usize) -> Result<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_upload_mb))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error(e, max_upload_mb))?;
                    form.file = Some(UploadedFile { filename, bytes });
                }
                "language" => {
                    form.language = Some(
                        field
                            .text()
                            .await
                            .map_err(|e| multipart_error(e, max_upload_mb))?,
                    );
                }
                // `service` is accepted as an alias for older forms.
                "engine" | "service" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, max_upload_mb))?;
                    if form.engine.as_deref().map_or(true, |v| v.trim().is_empty()) {
                        form.engine = Some(value);
                    }
                }
                other => debug!("Ignoring unexpected form field '{}'", other),
            }
        }

        Ok(form)
    }

    /// Check the submission in the order the form reports problems.
    pub fn validate(self) -> Result<ValidatedUpload> {
        let file = self.file.ok_or(AppError::NoFilePart)?;
        if file.filename.trim().is_empty() {
            return Err(AppError::NoSelectedFile);
        }
        if !storage::has_pdf_extension(&file.filename) {
            return Err(AppError::NotAPdf(file.filename));
        }

        let language = Language::parse(self.language.as_deref().unwrap_or_default())?;
        let engine = EngineKind::parse(self.engine.as_deref().unwrap_or_default())?;

        if !storage::looks_like_pdf(&file.bytes) {
            return Err(AppError::NotAPdf(file.filename));
        }

        let filename = storage::secure_pdf_filename(&file.filename).ok_or(AppError::NoSelectedFile)?;

        Ok(ValidatedUpload {
            filename,
            bytes: file.bytes,
            language,
            engine,
        })
    }
}

/// Body limit breaches surface here, while the stream is read.
fn multipart_error(error: MultipartError, max_upload_mb: usize) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::UploadTooLarge(max_upload_mb)
    } else {
        AppError::InvalidUpload(error.body_text())
    }
}

/// GET / - render the upload form along with any pending flash message.
pub async fn index_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let flashed = state.flash_key.read(&headers);
    let messages: Vec<String> = flashed.iter().cloned().collect();

    let html = super::templates::render_index(
        &state.templates,
        &state.engines,
        &messages,
        state.config.server.max_upload_mb,
    )?;

    let mut response = Html(html).into_response();
    if flashed.is_some() {
        response.headers_mut().insert(SET_COOKIE, flash::clear_cookie());
    }
    Ok(response)
}

/// POST / - validate, store, translate and redirect to the result.
///
/// Every failure is flashed and redirects back to the form.
pub async fn submit_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    match process_submission(&state, multipart).await {
        Ok(output_name) => {
            let location = format!("/downloads/{}", urlencoding::encode(&output_name));
            Redirect::to(&location).into_response()
        }
        Err(e) => {
            if e.is_validation() {
                warn!("Rejected submission: {}", e);
            } else {
                error!("Translation failed: {}", e);
            }
            flash_redirect(&state, &e.flash_message())
        }
    }
}

async fn process_submission(state: &AppState, multipart: Multipart) -> Result<String> {
    let upload = UploadForm::read(multipart, state.config.server.max_upload_mb).await?.validate()?;
    crate::metrics::record_upload(upload.bytes.len());

    let source = state.store.save_upload(&upload.filename, &upload.bytes).await?;
    let output_name = FileStore::output_name(upload.engine, &upload.filename);

    let job = TranslationJob {
        source,
        output: state.store.output_path(&output_name),
        filename: upload.filename,
        language: upload.language,
    };

    state.engines.translate(upload.engine, &job).await?;
    Ok(output_name)
}

fn flash_redirect(state: &AppState, message: &str) -> Response {
    let mut response = Redirect::to("/").into_response();
    match state.flash_key.cookie(message) {
        Ok(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        Err(e) => error!("Failed to set flash message: {}", e),
    }
    response
}

/// GET /downloads/:filename - serve a translated document as an attachment.
pub async fn download_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let path = state.store.resolve_download(&filename).await?;
    let bytes = tokio::fs::read(&path).await?;
    info!("Serving {} ({} bytes)", filename, bytes.len());

    let content_type = if storage::has_pdf_extension(&filename) {
        "application/pdf"
    } else {
        "application/octet-stream"
    };

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: BTreeMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

impl HealthCheck {
    fn new(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
        }
    }
}

/// GET /health - storage and engine availability.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = BTreeMap::new();
    let mut overall_status = HealthStatus::Healthy;

    let storage_check = match state.store.check_writable().await {
        Ok(()) => HealthCheck::new(
            "ok",
            format!(
                "uploads: {}, downloads: {}",
                state.store.upload_dir().display(),
                state.store.download_dir().display()
            ),
        ),
        Err(e) => {
            overall_status = HealthStatus::Unhealthy;
            HealthCheck::new("error", e.to_string())
        }
    };
    checks.insert("storage".to_string(), storage_check);

    for kind in EngineKind::ALL {
        let check = if state.engines.is_configured(kind) {
            HealthCheck::new("ok", format!("{} configured", kind.label()))
        } else {
            HealthCheck::new("not_configured", format!("{} credentials not set", kind.label()))
        };
        checks.insert(format!("engine_{}", kind.as_str()), check);
    }

    if let Some(google) = state.engines.google() {
        if let Some((expires_in, is_expired)) = google.tokens().token_info().await {
            let check = if is_expired {
                HealthCheck::new("warning", "Access token due for refresh")
            } else {
                HealthCheck::new("ok", format!("Access token expires in {} seconds", expires_in))
            };
            checks.insert("google_token".to_string(), check);
        }
    }

    if overall_status == HealthStatus::Healthy && state.engines.configured().is_empty() {
        overall_status = HealthStatus::Degraded;
    }

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(filename: &str, bytes: &'static [u8], language: &str, engine: &str) -> UploadForm {
        UploadForm {
            file: Some(UploadedFile {
                filename: filename.to_string(),
                bytes: bytes::Bytes::from_static(bytes),
            }),
            language: Some(language.to_string()),
            engine: Some(engine.to_string()),
        }
    }

    #[test]
    fn test_validate_accepts_pdf() {
        let upload = form("My Report.pdf", b"%PDF-1.7", "uk", "deepl").validate().unwrap();
        assert_eq!(upload.filename, "My_Report.pdf");
        assert_eq!(upload.language.code(), "UK");
        assert_eq!(upload.engine, EngineKind::DeepL);
    }

    #[test]
    fn test_validate_order() {
        assert!(matches!(UploadForm::default().validate(), Err(AppError::NoFilePart)));
        assert!(matches!(form("", b"%PDF-", "", "").validate(), Err(AppError::NoSelectedFile)));
        assert!(matches!(form("a.docx", b"%PDF-", "", "").validate(), Err(AppError::NotAPdf(_))));
        assert!(matches!(form("a.pdf", b"%PDF-", "", "").validate(), Err(AppError::MissingLanguage)));
        assert!(matches!(form("a.pdf", b"%PDF-", "RU", "").validate(), Err(AppError::MissingEngine)));
        assert!(matches!(
            form("a.pdf", b"%PDF-", "RU", "libre").validate(),
            Err(AppError::InvalidEngine(_))
        ));
    }

    #[test]
    fn test_validate_rejects_renamed_non_pdf() {
        assert!(matches!(
            form("a.pdf", b"PK\x03\x04", "RU", "deepl").validate(),
            Err(AppError::NotAPdf(_))
        ));
    }
}
