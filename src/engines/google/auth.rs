//! Google OAuth2 access token management.
//!
//! `GoogleTokenProvider` exchanges the loaded credentials for short-lived
//! access tokens and caches them. Concurrent requests that find the token
//! expired serialize on a refresh mutex and re-check before calling Google,
//! so one expiry triggers one refresh.

use super::credentials::GoogleCredentials;
use crate::engines::VendorHttp;
use crate::error::{AppError, Result};
use crate::models::EngineKind;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

struct AccessToken {
    value: Zeroizing<String>,
    /// Unix time in milliseconds.
    expiry_date: i64,
}

impl AccessToken {
    /// Check if token is expired or will expire within buffer seconds
    fn is_expired(&self, buffer_seconds: i64) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        self.expiry_date - now < buffer_seconds * 1000
    }

    fn expires_in_seconds(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        (self.expiry_date - now) / 1000
    }
}

#[derive(Clone)]
pub struct GoogleTokenProvider {
    credentials: Arc<GoogleCredentials>,
    token: Arc<RwLock<Option<AccessToken>>>,
    refresh_lock: Arc<Mutex<()>>,
    http: VendorHttp,
    refresh_buffer_seconds: i64,
}

impl GoogleTokenProvider {
    pub fn new(credentials: GoogleCredentials, http: VendorHttp, refresh_buffer_seconds: i64) -> Self {
        Self {
            credentials: Arc::new(credentials),
            token: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
            http,
            refresh_buffer_seconds,
        }
    }

    /// Return a valid access token, fetching a new one when needed.
    pub async fn get_token(&self) -> Result<String> {
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited.
        if let Some(token) = self.cached().await {
            debug!("Google token already refreshed by a concurrent request");
            return Ok(token);
        }

        match self.fetch_token().await {
            Ok(fresh) => {
                let value = fresh.value.to_string();
                *self.token.write().await = Some(fresh);
                crate::metrics::record_google_token_refresh(true);
                Ok(value)
            }
            Err(e) => {
                crate::metrics::record_google_token_refresh(false);
                warn!("Google token refresh failed: {}", e);
                Err(e)
            }
        }
    }

    async fn cached(&self) -> Option<String> {
        let token = self.token.read().await;
        token
            .as_ref()
            .filter(|t| !t.is_expired(self.refresh_buffer_seconds))
            .map(|t| t.value.to_string())
    }

    async fn fetch_token(&self) -> Result<AccessToken> {
        let token_uri = self.credentials.token_uri().to_string();

        let params: Vec<(&str, Zeroizing<String>)> = match self.credentials.as_ref() {
            GoogleCredentials::ServiceAccount(key) => {
                let assertion = key.signed_assertion(chrono::Utc::now().timestamp())?;
                vec![
                    ("grant_type", Zeroizing::new(JWT_BEARER_GRANT.to_string())),
                    ("assertion", Zeroizing::new(assertion)),
                ]
            }
            GoogleCredentials::AuthorizedUser(user) => vec![
                ("grant_type", Zeroizing::new("refresh_token".to_string())),
                ("client_id", Zeroizing::new(user.client_id.clone())),
                ("client_secret", Zeroizing::new(user.client_secret.clone())),
                ("refresh_token", Zeroizing::new(user.refresh_token.clone())),
            ],
        };
        let form: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let response = self
            .http
            .send(EngineKind::Google, "token exchange", || {
                self.http.client().post(&token_uri).form(&form)
            })
            .await
            .map_err(|e| AppError::GoogleAuth(e.to_string()))?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::GoogleAuth(format!("Malformed token response: {}", e)))?;

        info!("Obtained Google access token (expires in {}s)", body.expires_in);

        Ok(AccessToken {
            value: Zeroizing::new(body.access_token),
            expiry_date: chrono::Utc::now().timestamp_millis() + body.expires_in * 1000,
        })
    }

    /// Seconds until the cached token expires and whether it is due for
    /// refresh; `None` before the first exchange.
    pub async fn token_info(&self) -> Option<(i64, bool)> {
        let token = self.token.read().await;
        token.as_ref().map(|t| {
            (
                t.expires_in_seconds(),
                t.is_expired(self.refresh_buffer_seconds),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_detection() {
        let token = AccessToken {
            value: Zeroizing::new("ya29.test".to_string()),
            expiry_date: chrono::Utc::now().timestamp_millis() + 3_600_000,
        };

        assert!(!token.is_expired(0));
        assert!(token.is_expired(3700));
        assert!(token.expires_in_seconds() > 3500);
    }
}
