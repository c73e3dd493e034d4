//! Document translation engines.
//!
//! One adapter per vendor, each owning the request shape its vendor's API
//! dictates. [`Engines`] holds the adapters whose credentials are present and
//! dispatches a [`TranslationJob`] to the one selected on the form.
//!
//! # Components
//!
//! - `deepl`: DeepL document API (upload, poll, download).
//! - `google`: Cloud Translation v3 `translateDocument` with OAuth2 tokens.
//! - `apyhub`: ApyHub multipart document translation.
//! - `yandex`: Yandex Cloud Translate (text-only, documents unsupported).

mod apyhub;
mod deepl;
mod google;
mod yandex;

pub use apyhub::ApyHubTranslator;
pub use deepl::DeepLTranslator;
pub use google::{GoogleCredentials, GoogleTokenProvider, GoogleTranslator};
pub use yandex::YandexTranslator;

use crate::config::{AppConfig, HttpConfig};
use crate::error::{AppError, Result};
use crate::models::{EngineKind, Language};
use crate::utils::logging::sanitize;
use crate::utils::retry::{with_retry, Failure};
use reqwest::{Client, RequestBuilder, Response};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// One document to translate.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    /// Stored upload.
    pub source: PathBuf,
    /// Where the translated document must appear on success.
    pub output: PathBuf,
    /// Secured client filename, sent to vendors that want one.
    pub filename: String,
    pub language: Language,
}

/// HTTP plumbing shared by all vendor adapters.
#[derive(Clone)]
pub struct VendorHttp {
    client: Client,
    max_retries: u32,
    sanitize_logs: bool,
}

impl VendorHttp {
    pub fn new(config: &HttpConfig, sanitize_logs: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .use_rustls_tls()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            sanitize_logs,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn loggable(&self, body: &str) -> String {
        let body: String = body.chars().take(1000).collect();
        if self.sanitize_logs {
            sanitize(&body)
        } else {
            body
        }
    }

    /// Send the request produced by `build`, retrying transient failures.
    ///
    /// `build` is called once per attempt since multipart bodies cannot be
    /// replayed. Non-success responses become an [`AppError`] for `engine`.
    pub async fn send<F>(&self, engine: EngineKind, operation: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        debug!("{}: {}", engine.label(), operation);

        let result = with_retry(operation, self.max_retries, || {
            let request = build();
            async move {
                let response = request.send().await.map_err(|e| {
                    crate::metrics::record_vendor_call(engine, 0);
                    Failure::transport(&e)
                })?;

                let status = response.status();
                crate::metrics::record_vendor_call(engine, status.as_u16());
                if status.is_success() {
                    Ok(response)
                } else {
                    Err(Failure::from_response(response).await)
                }
            }
        })
        .await;

        result.map_err(|failure| {
            error!(
                "{} {} failed: HTTP {} - {}",
                engine.label(),
                operation,
                failure.status,
                self.loggable(&failure.body)
            );
            vendor_error(engine, failure)
        })
    }
}

/// Pull a human-readable message out of a vendor error body.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let candidates = [
        value.pointer("/error/message"),
        value.pointer("/message"),
        value.pointer("/error/status"),
        value.pointer("/error"),
        value.pointer("/detail"),
    ];

    let found = candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().map(str::to_string));
    found
}

/// Convert a final failed attempt into the error shown to the user.
pub(crate) fn vendor_error(engine: EngineKind, failure: Failure) -> AppError {
    let message = extract_error_message(&failure.body).unwrap_or_else(|| {
        let trimmed = failure.body.trim();
        if trimmed.is_empty() {
            "empty response".to_string()
        } else {
            trimmed.chars().take(300).collect()
        }
    });
    let message = sanitize(&message);

    match failure.status {
        0 => AppError::Vendor {
            engine: engine.label(),
            message: format!("network error: {}", message),
        },
        429 => AppError::TooManyRequests(format!("{}: {}", engine.label(), message)),
        503 | 504 | 529 => AppError::ServiceUnavailable(format!("{}: {}", engine.label(), message)),
        456 if engine == EngineKind::DeepL => AppError::Vendor {
            engine: engine.label(),
            message: format!("quota exceeded: {}", message),
        },
        status => AppError::Vendor {
            engine: engine.label(),
            message: format!("HTTP {}: {}", status, message),
        },
    }
}

/// The configured vendor adapters.
pub struct Engines {
    deepl: Option<DeepLTranslator>,
    google: Option<GoogleTranslator>,
    apyhub: Option<ApyHubTranslator>,
    yandex: Option<YandexTranslator>,
}

impl Engines {
    /// Build an adapter for every vendor whose credentials are present.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = VendorHttp::new(&config.http, config.logging.sanitize_tokens)?;

        let deepl = DeepLTranslator::from_config(&config.deepl, http.clone());
        match &deepl {
            Some(client) => info!("DeepL client initialized ({})", client.base_url()),
            None => info!("DEEPL_API_KEY not set. DeepL translation will not be available."),
        }

        let google = match GoogleTranslator::from_config(&config.google, http.clone()) {
            Ok(Some(client)) => {
                info!("Google Translate client initialized for project {}", client.project_id());
                Some(client)
            }
            Ok(None) => {
                info!("GOOGLE_CLOUD_PROJECT_ID not set. Google Translate will not be available.");
                None
            }
            Err(e) => {
                warn!("{}. Google Translate will not be available.", e);
                None
            }
        };

        let apyhub = ApyHubTranslator::from_config(&config.apyhub, http.clone());
        if apyhub.is_none() {
            info!("APYHUB_API_KEY not set. ApyHub translation will not be available.");
        }

        let yandex = YandexTranslator::from_config(&config.yandex);
        if yandex.is_none() {
            info!("YANDEX_API_KEY or YANDEX_FOLDER_ID not set. Yandex Translate will not be available.");
        }

        Ok(Self {
            deepl,
            google,
            apyhub,
            yandex,
        })
    }

    pub fn is_configured(&self, kind: EngineKind) -> bool {
        match kind {
            EngineKind::DeepL => self.deepl.is_some(),
            EngineKind::Google => self.google.is_some(),
            EngineKind::ApyHub => self.apyhub.is_some(),
            EngineKind::Yandex => self.yandex.is_some(),
        }
    }

    pub fn configured(&self) -> Vec<EngineKind> {
        EngineKind::ALL
            .into_iter()
            .filter(|kind| self.is_configured(*kind))
            .collect()
    }

    pub fn google(&self) -> Option<&GoogleTranslator> {
        self.google.as_ref()
    }

    /// Translate `job` with the selected vendor.
    ///
    /// A vendor whose credentials are missing is never contacted.
    pub async fn translate(&self, kind: EngineKind, job: &TranslationJob) -> Result<()> {
        info!(
            "Using {} for translation to {} ({})",
            kind.label(),
            job.language.code(),
            job.filename
        );
        let started = Instant::now();

        let result = match kind {
            EngineKind::DeepL => match &self.deepl {
                Some(client) => client.translate(job).await,
                None => Err(not_configured(kind)),
            },
            EngineKind::Google => match &self.google {
                Some(client) => client.translate(job).await,
                None => Err(not_configured(kind)),
            },
            EngineKind::ApyHub => match &self.apyhub {
                Some(client) => client.translate(job).await,
                None => Err(not_configured(kind)),
            },
            EngineKind::Yandex => match &self.yandex {
                Some(client) => client.translate(job).await,
                None => Err(not_configured(kind)),
            },
        };

        crate::metrics::record_translation(kind, result.is_ok(), started.elapsed().as_secs_f64());

        if result.is_ok() {
            info!(
                "{} translation completed in {:.1}s. Saved file: {}",
                kind.label(),
                started.elapsed().as_secs_f64(),
                job.output.display()
            );
        }
        result
    }
}

fn not_configured(kind: EngineKind) -> AppError {
    let hint = match kind {
        EngineKind::DeepL => "DEEPL_API_KEY",
        EngineKind::Google => "GOOGLE_CLOUD_PROJECT_ID and GOOGLE_APPLICATION_CREDENTIALS_JSON",
        EngineKind::ApyHub => "APYHUB_API_KEY",
        EngineKind::Yandex => "YANDEX_API_KEY and YANDEX_FOLDER_ID",
    };
    AppError::EngineNotConfigured {
        engine: kind.label(),
        hint,
    }
}
