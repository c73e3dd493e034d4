//! Google credential loading and service-account assertions.
//!
//! Two credential shapes are accepted, matching what gcloud and the Cloud
//! console produce:
//!
//! - `service_account`: a private key used to sign an RS256 JWT that is
//!   exchanged for an access token (the JWT bearer grant).
//! - `authorized_user`: the refresh token written by
//!   `gcloud auth application-default login`.

use crate::config::GoogleConfig;
use crate::error::{AppError, Result};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Lifetime requested for signed assertions.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    TOKEN_URI.to_string()
}

#[derive(Clone, Deserialize, Zeroize)]
#[zeroize(drop)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Clone, Deserialize, Zeroize)]
#[zeroize(drop)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoogleCredentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

// Custom Debug impls that never log secrets
impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl std::fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoogleCredentials::ServiceAccount(key) => key.fmt(f),
            GoogleCredentials::AuthorizedUser(user) => user.fmt(f),
        }
    }
}

impl GoogleCredentials {
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| {
            AppError::InvalidCredentials(format!("Invalid Google credentials JSON: {}", e))
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::InvalidCredentials(format!(
                "Failed to read Google credentials {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }

    /// Resolve credentials in order: inline JSON, explicit file, gcloud ADC file.
    pub fn load(config: &GoogleConfig) -> Result<Self> {
        if let Some(json) = config.credentials_json.as_deref().filter(|s| !s.trim().is_empty()) {
            return Self::from_json(json);
        }

        if let Some(path) = config.credentials_path.as_deref().filter(|s| !s.trim().is_empty()) {
            return Self::from_file(Path::new(path));
        }

        match well_known_file() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Err(AppError::InvalidCredentials(
                "No Google credentials found (set GOOGLE_APPLICATION_CREDENTIALS_JSON or \
                 GOOGLE_APPLICATION_CREDENTIALS, or run `gcloud auth application-default login`)"
                    .to_string(),
            )),
        }
    }

    pub fn token_uri(&self) -> &str {
        match self {
            GoogleCredentials::ServiceAccount(key) => &key.token_uri,
            GoogleCredentials::AuthorizedUser(user) => &user.token_uri,
        }
    }
}

/// The file gcloud writes for application default credentials.
fn well_known_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join("gcloud")
            .join("application_default_credentials.json")
    })
}

impl ServiceAccountKey {
    /// Build a signed JWT asserting this account for the cloud-platform scope.
    pub fn signed_assertion(&self, issued_at: i64) -> Result<String> {
        let header = json!({
            "alg": "RS256",
            "typ": "JWT",
            "kid": self.private_key_id,
        });
        let claims = json!({
            "iss": self.client_email,
            "scope": CLOUD_PLATFORM_SCOPE,
            "aud": self.token_uri,
            "iat": issued_at,
            "exp": issued_at + ASSERTION_LIFETIME_SECS,
        });

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );

        let key_pair = self.key_pair()?;
        let mut signature = vec![0u8; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &RSA_PKCS1_SHA256,
                &SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| AppError::GoogleAuth("Failed to sign JWT assertion".to_string()))?;

        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
    }

    fn key_pair(&self) -> Result<RsaKeyPair> {
        let der = pem_to_der(&self.private_key)?;
        RsaKeyPair::from_pkcs8(&der)
            .map_err(|e| AppError::InvalidCredentials(format!("Invalid service account private key: {}", e)))
    }
}

/// Decode the body of a PEM block.
fn pem_to_der(pem: &str) -> Result<Vec<u8>> {
    let body: String = pem
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect();

    STANDARD
        .decode(body)
        .map_err(|e| AppError::InvalidCredentials(format!("Invalid PEM private key: {}", e)))
}
