//! Configuration data structures for docrelay.
//!
//! This module defines the schema for the application settings: the HTTP
//! server, on-disk storage for uploads and results, the outbound HTTP client
//! shared by all vendors, one section per translation vendor, and logging.

use serde::{Deserialize, Serialize};

/// Placeholder written over secrets when the configuration is printed.
pub const REDACTED: &str = "[REDACTED]";

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, upload limit).
    #[serde(default)]
    pub server: ServerConfig,

    /// Where uploads and translated documents are written.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound HTTP client settings shared by every vendor.
    #[serde(default)]
    pub http: HttpConfig,

    /// DeepL document translation.
    #[serde(default)]
    pub deepl: DeepLConfig,

    /// Google Cloud Translation (v3 `translateDocument`).
    #[serde(default)]
    pub google: GoogleConfig,

    /// ApyHub document translation.
    #[serde(default)]
    pub apyhub: ApyHubConfig,

    /// Yandex Cloud Translate.
    #[serde(default)]
    pub yandex: YandexConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `5000`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body, in MiB.
    /// Default: `50`
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

/// Temporary storage for uploaded and translated files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Default: `/tmp/uploads`
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Default: `/tmp/downloads`
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
}

/// Settings for the outbound vendor HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds.
    /// Default: `300` (5 minutes)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// TCP connect timeout in seconds.
    /// Default: `10`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Maximum attempts for a retryable vendor call (429 and 5xx).
    /// Default: `5`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepLConfig {
    /// `DEEPL_API_KEY`. DeepL is unavailable without it.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Overrides the endpoint otherwise derived from the key
    /// (`:fx` keys use the free API host).
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Upper bound on waiting for a document to finish translating.
    /// Default: `600`
    #[serde(default = "default_deepl_max_wait")]
    pub max_wait_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// `GOOGLE_CLOUD_PROJECT_ID`. Google is unavailable without it.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Default: `global`
    #[serde(default = "default_google_location")]
    pub location: String,

    /// `GOOGLE_APPLICATION_CREDENTIALS_JSON`: inline service account key.
    #[serde(default)]
    pub credentials_json: Option<String>,

    /// `GOOGLE_APPLICATION_CREDENTIALS`: path to a credentials file.
    /// When neither this nor `credentials_json` is set the gcloud
    /// application-default file is used.
    #[serde(default)]
    pub credentials_path: Option<String>,

    /// Default: `https://translation.googleapis.com/v3`
    #[serde(default = "default_google_api_base_url")]
    pub api_base_url: String,

    /// Number of seconds before expiry at which the access token is renewed.
    /// Default: `300`
    #[serde(default = "default_refresh_buffer")]
    pub refresh_buffer_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApyHubConfig {
    /// `APYHUB_API_KEY`. ApyHub is unavailable without it.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_apyhub_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct YandexConfig {
    /// `YANDEX_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// `YANDEX_FOLDER_ID`
    #[serde(default)]
    pub folder_id: Option<String>,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to mask API keys and tokens in logged vendor responses.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub sanitize_tokens: bool,
}

impl AppConfig {
    /// Copy of the configuration with every credential replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        fn mask(value: &Option<String>) -> Option<String> {
            value.as_ref().map(|_| REDACTED.to_string())
        }

        let mut config = self.clone();
        config.deepl.api_key = mask(&self.deepl.api_key);
        config.google.credentials_json = mask(&self.google.credentials_json);
        config.apyhub.api_key = mask(&self.apyhub.api_key);
        config.yandex.api_key = mask(&self.yandex.api_key);
        config
    }
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            download_dir: default_download_dir(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for DeepLConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: None,
            max_wait_seconds: default_deepl_max_wait(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: default_google_location(),
            credentials_json: None,
            credentials_path: None,
            api_base_url: default_google_api_base_url(),
            refresh_buffer_seconds: default_refresh_buffer(),
        }
    }
}

impl Default for ApyHubConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_apyhub_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            sanitize_tokens: true,
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_mb() -> usize {
    50
}

fn default_upload_dir() -> String {
    "/tmp/uploads".to_string()
}

fn default_download_dir() -> String {
    "/tmp/downloads".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_deepl_max_wait() -> u64 {
    600
}

fn default_google_location() -> String {
    "global".to_string()
}

fn default_google_api_base_url() -> String {
    "https://translation.googleapis.com/v3".to_string()
}

fn default_refresh_buffer() -> i64 {
    300 // 5 minutes
}

fn default_apyhub_url() -> String {
    "https://api.apyhub.com/api/v1/convert/document/translate/url".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
