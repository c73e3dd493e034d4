// DeepL document translation
// Upload -> poll status -> download result, per the DeepL v2 document API

use super::{TranslationJob, VendorHttp};
use crate::config::DeepLConfig;
use crate::error::{AppError, Result};
use crate::models::EngineKind;
use crate::storage::write_atomic;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;
use zeroize::Zeroizing;

const FREE_API_URL: &str = "https://api-free.deepl.com";
const PRO_API_URL: &str = "https://api.deepl.com";

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Identifies an uploaded document on DeepL's side.
#[derive(Deserialize)]
struct DocumentHandle {
    document_id: String,
    document_key: String,
}

#[derive(Debug, Deserialize)]
struct DocumentStatus {
    status: String,
    #[serde(default)]
    seconds_remaining: Option<u64>,
    #[serde(default)]
    error_message: Option<String>,
}

pub struct DeepLTranslator {
    http: VendorHttp,
    auth_header: Zeroizing<String>,
    base_url: String,
    max_wait: Duration,
}

impl DeepLTranslator {
    /// `None` when no API key is configured.
    pub fn from_config(config: &DeepLConfig, http: VendorHttp) -> Option<Self> {
        let api_key = config.api_key.as_deref()?.trim();
        if api_key.is_empty() {
            return None;
        }

        let base_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| Self::default_base_url(api_key).to_string());

        Some(Self {
            http,
            auth_header: Zeroizing::new(format!("DeepL-Auth-Key {}", api_key)),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_wait: Duration::from_secs(config.max_wait_seconds),
        })
    }

    /// Free-plan keys carry a `:fx` suffix and live on a separate host.
    pub fn default_base_url(api_key: &str) -> &'static str {
        if api_key.ends_with(":fx") {
            FREE_API_URL
        } else {
            PRO_API_URL
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn translate(&self, job: &TranslationJob) -> Result<()> {
        let bytes = bytes::Bytes::from(tokio::fs::read(&job.source).await?);

        let handle = self.upload(job, bytes).await?;
        debug!("DeepL accepted document {}", handle.document_id);

        // Once uploaded, failures name the document so it can be looked up later.
        let translated = self
            .wait_and_download(&handle)
            .await
            .map_err(|e| match e {
                AppError::Vendor { engine, message } => AppError::Vendor {
                    engine,
                    message: format!("document {}: {}", handle.document_id, message),
                },
                other => other,
            })?;

        write_atomic(&job.output, &translated).await
    }

    async fn upload(&self, job: &TranslationJob, bytes: bytes::Bytes) -> Result<DocumentHandle> {
        let url = format!("{}/v2/document", self.base_url);

        let response = self
            .http
            .send(EngineKind::DeepL, "document upload", || {
                let file = Part::stream(bytes.clone())
                    .file_name(job.filename.clone())
                    .mime_str("application/pdf")
                    .unwrap_or_else(|_| Part::stream(bytes.clone()).file_name(job.filename.clone()));
                let form = Form::new()
                    .text("target_lang", job.language.code())
                    .part("file", file);

                self.http
                    .client()
                    .post(&url)
                    .header("Authorization", self.auth_header.as_str())
                    .multipart(form)
            })
            .await?;

        response.json::<DocumentHandle>().await.map_err(|e| AppError::Vendor {
            engine: EngineKind::DeepL.label(),
            message: format!("invalid upload response: {}", e),
        })
    }

    async fn wait_and_download(&self, handle: &DocumentHandle) -> Result<bytes::Bytes> {
        let started = Instant::now();

        loop {
            let status = self.status(handle).await?;
            debug!("DeepL document {} status: {}", handle.document_id, status.status);

            match status.status.as_str() {
                "done" => break,
                "error" => {
                    return Err(AppError::Vendor {
                        engine: EngineKind::DeepL.label(),
                        message: status
                            .error_message
                            .unwrap_or_else(|| "translation failed".to_string()),
                    });
                }
                _ => {
                    let wait = poll_interval(status.seconds_remaining);
                    if started.elapsed() + wait > self.max_wait {
                        return Err(AppError::Vendor {
                            engine: EngineKind::DeepL.label(),
                            message: format!(
                                "still {} after {}s",
                                status.status,
                                started.elapsed().as_secs()
                            ),
                        });
                    }
                    tokio::time::sleep(wait).await;
                }
            }
        }

        let url = format!("{}/v2/document/{}/result", self.base_url, handle.document_id);
        let response = self
            .http
            .send(EngineKind::DeepL, "document download", || self.keyed_request(&url, handle))
            .await?;

        Ok(response.bytes().await?)
    }

    async fn status(&self, handle: &DocumentHandle) -> Result<DocumentStatus> {
        let url = format!("{}/v2/document/{}", self.base_url, handle.document_id);
        let response = self
            .http
            .send(EngineKind::DeepL, "document status", || self.keyed_request(&url, handle))
            .await?;

        response.json::<DocumentStatus>().await.map_err(|e| AppError::Vendor {
            engine: EngineKind::DeepL.label(),
            message: format!("invalid status response: {}", e),
        })
    }

    fn keyed_request(&self, url: &str, handle: &DocumentHandle) -> reqwest::RequestBuilder {
        self.http
            .client()
            .post(url)
            .header("Authorization", self.auth_header.as_str())
            .form(&[("document_key", handle.document_key.as_str())])
    }
}

/// Sleep suggested by DeepL's estimate, kept within sane bounds.
fn poll_interval(seconds_remaining: Option<u64>) -> Duration {
    seconds_remaining
        .map(Duration::from_secs)
        .unwrap_or(MIN_POLL_INTERVAL)
        .clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url_by_key_type() {
        assert_eq!(DeepLTranslator::default_base_url("abc:fx"), FREE_API_URL);
        assert_eq!(DeepLTranslator::default_base_url("abc"), PRO_API_URL);
    }

    #[test]
    fn test_poll_interval_bounds() {
        assert_eq!(poll_interval(None), Duration::from_secs(1));
        assert_eq!(poll_interval(Some(0)), Duration::from_secs(1));
        assert_eq!(poll_interval(Some(4)), Duration::from_secs(4));
        assert_eq!(poll_interval(Some(600)), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_key_means_unconfigured() {
        let http = VendorHttp::new(&Default::default(), true).unwrap();
        assert!(DeepLTranslator::from_config(&DeepLConfig::default(), http.clone()).is_none());

        let blank = DeepLConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(DeepLTranslator::from_config(&blank, http).is_none());
    }

    #[test]
    fn test_base_url_override() {
        let http = VendorHttp::new(&Default::default(), true).unwrap();
        let config = DeepLConfig {
            api_key: Some("key:fx".to_string()),
            api_base_url: Some("http://127.0.0.1:9999/".to_string()),
            ..Default::default()
        };
        let client = DeepLTranslator::from_config(&config, http).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9999");
    }
}
