//! One-shot messages carried across a redirect.
//!
//! The message travels in a short-lived cookie as `<hex tag>.<urlencoded
//! message>`, where the tag is an HMAC-SHA256 under a key generated at
//! startup. Cookies with a bad tag, or from a previous process, are ignored.

use crate::error::{AppError, Result};
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use ring::hmac;
use ring::rand::SystemRandom;
use std::sync::Arc;

pub const COOKIE_NAME: &str = "docrelay_flash";

/// Seconds a flash cookie stays valid if it is never displayed.
const MAX_AGE_SECS: u32 = 300;

#[derive(Clone)]
pub struct FlashKey(Arc<hmac::Key>);

impl FlashKey {
    /// Fresh random key for this process.
    pub fn generate() -> Result<Self> {
        let key = hmac::Key::generate(hmac::HMAC_SHA256, &SystemRandom::new())
            .map_err(|_| AppError::Internal("Failed to generate flash signing key".to_string()))?;
        Ok(Self(Arc::new(key)))
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        Self(Arc::new(hmac::Key::new(hmac::HMAC_SHA256, secret)))
    }

    /// `Set-Cookie` value carrying `message`.
    pub fn cookie(&self, message: &str) -> Result<HeaderValue> {
        let encoded = urlencoding::encode(message);
        let tag = hmac::sign(&self.0, encoded.as_bytes());
        let value = format!(
            "{}={}.{}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            COOKIE_NAME,
            hex::encode(tag.as_ref()),
            encoded,
            MAX_AGE_SECS
        );
        HeaderValue::from_str(&value).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Verified message from the request cookies, if any.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        let raw = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE_NAME)
            .map(|(_, value)| value)?;

        let (tag, encoded) = raw.split_once('.')?;
        let tag = hex::decode(tag).ok()?;
        hmac::verify(&self.0, encoded.as_bytes(), &tag).ok()?;

        urlencoding::decode(encoded).ok().map(|m| m.into_owned())
    }
}

/// `Set-Cookie` value that removes the flash cookie.
pub fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("docrelay_flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
