// ApyHub document translation

use super::{TranslationJob, VendorHttp};
use crate::config::ApyHubConfig;
use crate::error::{AppError, Result};
use crate::models::EngineKind;
use crate::storage::write_atomic;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

/// JSON reply of the `/url` variant: the translated file is hosted elsewhere.
#[derive(Debug, Deserialize)]
struct UrlResponse {
    data: String,
}

pub struct ApyHubTranslator {
    http: VendorHttp,
    api_key: Zeroizing<String>,
    api_url: String,
}

impl ApyHubTranslator {
    /// `None` when no API key is configured.
    pub fn from_config(config: &ApyHubConfig, http: VendorHttp) -> Option<Self> {
        let api_key = config.api_key.as_deref()?.trim();
        if api_key.is_empty() {
            return None;
        }

        Some(Self {
            http,
            api_key: Zeroizing::new(api_key.to_string()),
            api_url: config.api_url.clone(),
        })
    }

    pub async fn translate(&self, job: &TranslationJob) -> Result<()> {
        let bytes = bytes::Bytes::from(tokio::fs::read(&job.source).await?);
        let language = job.language.lower();

        let response = self
            .http
            .send(EngineKind::ApyHub, "document translate", || {
                let form = Form::new()
                    .part(
                        "file",
                        Part::stream(bytes.clone()).file_name(job.filename.clone()),
                    )
                    .text("output", "pdf")
                    .text("language", language.clone());

                self.http
                    .client()
                    .post(&self.api_url)
                    .header("apy-token", self.api_key.as_str())
                    .multipart(form)
            })
            .await?;

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        let translated = if is_json {
            let body: UrlResponse = response.json().await.map_err(|e| AppError::Vendor {
                engine: EngineKind::ApyHub.label(),
                message: format!("invalid response: {}", e),
            })?;
            debug!("ApyHub returned a download URL");
            self.http
                .send(EngineKind::ApyHub, "result download", || {
                    self.http.client().get(&body.data)
                })
                .await?
                .bytes()
                .await?
        } else {
            response.bytes().await?
        };

        if translated.is_empty() {
            return Err(AppError::Vendor {
                engine: EngineKind::ApyHub.label(),
                message: "empty document returned".to_string(),
            });
        }

        write_atomic(&job.output, &translated).await
    }
}
