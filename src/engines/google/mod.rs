// Google Cloud Translation v3 document translation

mod auth;
mod credentials;

pub use auth::GoogleTokenProvider;
pub use credentials::GoogleCredentials;

use super::{TranslationJob, VendorHttp};
use crate::config::GoogleConfig;
use crate::error::{AppError, Result};
use crate::models::EngineKind;
use crate::storage::write_atomic;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest document `translateDocument` accepts inline; bigger files need the
/// Cloud Storage batch API.
pub const MAX_INLINE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateDocumentRequest {
    target_language_code: String,
    document_input_config: DocumentInputConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentInputConfig {
    content: String,
    mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateDocumentResponse {
    document_translation: DocumentTranslation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentTranslation {
    #[serde(default)]
    byte_stream_outputs: Vec<String>,
    #[serde(default)]
    detected_language_code: Option<String>,
}

pub struct GoogleTranslator {
    http: VendorHttp,
    tokens: GoogleTokenProvider,
    project_id: String,
    location: String,
    api_base_url: String,
}

impl GoogleTranslator {
    /// `Ok(None)` when no project is configured; an error when a project is
    /// set but its credentials cannot be loaded.
    pub fn from_config(config: &GoogleConfig, http: VendorHttp) -> Result<Option<Self>> {
        let project_id = match config.project_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Ok(None),
        };

        let credentials = GoogleCredentials::load(config)?;
        Ok(Some(Self::new(config, project_id, credentials, http)))
    }

    pub fn new(
        config: &GoogleConfig,
        project_id: String,
        credentials: GoogleCredentials,
        http: VendorHttp,
    ) -> Self {
        Self {
            tokens: GoogleTokenProvider::new(credentials, http.clone(), config.refresh_buffer_seconds),
            http,
            project_id,
            location: config.location.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn tokens(&self) -> &GoogleTokenProvider {
        &self.tokens
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/projects/{}/locations/{}:translateDocument",
            self.api_base_url, self.project_id, self.location
        )
    }

    pub async fn translate(&self, job: &TranslationJob) -> Result<()> {
        let bytes = tokio::fs::read(&job.source).await?;
        if bytes.len() > MAX_INLINE_BYTES {
            return Err(AppError::NotImplemented(format!(
                "Google document translation of files over {} MiB requires Cloud Storage",
                MAX_INLINE_BYTES / (1024 * 1024)
            )));
        }

        let request = TranslateDocumentRequest {
            target_language_code: job.language.lower(),
            document_input_config: DocumentInputConfig {
                content: STANDARD.encode(&bytes),
                mime_type: "application/pdf",
            },
        };

        let access_token = self.tokens.get_token().await?;
        let url = self.endpoint();

        let response = self
            .http
            .send(EngineKind::Google, "translateDocument", || {
                self.http
                    .client()
                    .post(&url)
                    .bearer_auth(&access_token)
                    .header("x-goog-user-project", &self.project_id)
                    .json(&request)
            })
            .await?;

        let body: TranslateDocumentResponse = response.json().await.map_err(|e| AppError::Vendor {
            engine: EngineKind::Google.label(),
            message: format!("invalid translateDocument response: {}", e),
        })?;

        if let Some(detected) = &body.document_translation.detected_language_code {
            debug!("Google detected source language {}", detected);
        }

        let encoded = body
            .document_translation
            .byte_stream_outputs
            .first()
            .ok_or_else(|| AppError::Vendor {
                engine: EngineKind::Google.label(),
                message: "response contained no document".to_string(),
            })?;

        let translated = STANDARD.decode(encoded).map_err(|e| AppError::Vendor {
            engine: EngineKind::Google.label(),
            message: format!("invalid document encoding: {}", e),
        })?;

        write_atomic(&job.output, &translated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_rest_field_names() {
        let request = TranslateDocumentRequest {
            target_language_code: "uk".to_string(),
            document_input_config: DocumentInputConfig {
                content: "JVBERi0=".to_string(),
                mime_type: "application/pdf",
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["targetLanguageCode"], "uk");
        assert_eq!(json["documentInputConfig"]["mimeType"], "application/pdf");
    }

    #[test]
    fn test_no_project_means_unconfigured() {
        let http = VendorHttp::new(&Default::default(), true).unwrap();
        assert!(GoogleTranslator::from_config(&GoogleConfig::default(), http)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_project_with_bad_credentials_is_an_error() {
        let http = VendorHttp::new(&Default::default(), true).unwrap();
        let config = GoogleConfig {
            project_id: Some("demo".to_string()),
            credentials_json: Some("{not json".to_string()),
            ..Default::default()
        };
        assert!(GoogleTranslator::from_config(&config, http).is_err());
    }
}
