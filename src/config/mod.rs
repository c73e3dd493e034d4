// Configuration module
// PDF document translation relay

mod models;

pub use models::*;

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

/// Vendor environment variables and the configuration keys they populate.
pub const VENDOR_ENV: &[(&str, &str)] = &[
    ("DEEPL_API_KEY", "deepl.api_key"),
    ("GOOGLE_CLOUD_PROJECT_ID", "google.project_id"),
    ("GOOGLE_APPLICATION_CREDENTIALS_JSON", "google.credentials_json"),
    ("GOOGLE_APPLICATION_CREDENTIALS", "google.credentials_path"),
    ("APYHUB_API_KEY", "apyhub.api_key"),
    ("YANDEX_API_KEY", "yandex.api_key"),
    ("YANDEX_FOLDER_ID", "yandex.folder_id"),
];

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Vendor environment variables (highest, e.g. `DEEPL_API_KEY`)
    /// 2. `DOCRELAY__SECTION__KEY` environment variables
    /// 3. Config file
    /// 4. Defaults (lowest)
    ///
    /// CLI flags are applied on top by the caller.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::load`] with the vendor variables read through `lookup`.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Self::default_config_path().as_path()).required(false),
        };

        let mut builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            // Override with environment variables (prefix: DOCRELAY__)
            .add_source(
                Environment::with_prefix("DOCRELAY")
                    .prefix_separator("__")
                    .separator("__"),
            );

        for (key, value) in vendor_overrides(lookup) {
            builder = builder.set_override(key, value)?;
        }

        builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".docrelay")
            .join("config.toml")
    }
}

/// Resolve the vendor variables that are set and non-empty.
pub fn vendor_overrides<F>(lookup: F) -> Vec<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    VENDOR_ENV
        .iter()
        .filter_map(|(var, key)| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(|value| (*key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_vendor_overrides_skip_blank_values() {
        let overrides = vendor_overrides(env(&[
            ("DEEPL_API_KEY", "abc:fx"),
            ("APYHUB_API_KEY", "   "),
        ]));
        assert_eq!(overrides, vec![("deepl.api_key", "abc:fx".to_string())]);
    }

    #[test]
    fn test_load_applies_vendor_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9100\n").unwrap();

        let config = AppConfig::load_with_env(
            Some(&path),
            env(&[
                ("GOOGLE_CLOUD_PROJECT_ID", "my-project"),
                ("YANDEX_FOLDER_ID", "b1g"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.google.project_id.as_deref(), Some("my-project"));
        assert_eq!(config.google.location, "global");
        assert_eq!(config.yandex.folder_id.as_deref(), Some("b1g"));
        assert!(config.deepl.api_key.is_none());
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let result = AppConfig::load_with_env(Some(Path::new("/nonexistent/docrelay.toml")), env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_redacted_masks_secrets_only() {
        let mut config = AppConfig::default();
        config.deepl.api_key = Some("secret:fx".to_string());
        config.google.project_id = Some("visible".to_string());

        let redacted = config.redacted();
        assert_eq!(redacted.deepl.api_key.as_deref(), Some(REDACTED));
        assert_eq!(redacted.google.project_id.as_deref(), Some("visible"));
        assert!(redacted.apyhub.api_key.is_none());
    }
}
