// Yandex Cloud Translate
// The public API translates text only; documents are reported as unsupported.

use super::TranslationJob;
use crate::config::YandexConfig;
use crate::error::{AppError, Result};
use tracing::warn;

pub struct YandexTranslator {
    folder_id: String,
}

impl YandexTranslator {
    /// `None` unless both the API key and the folder id are configured.
    pub fn from_config(config: &YandexConfig) -> Option<Self> {
        let has_key = config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        let folder_id = config.folder_id.as_deref()?.trim();

        if !has_key || folder_id.is_empty() {
            return None;
        }

        Some(Self {
            folder_id: folder_id.to_string(),
        })
    }

    pub async fn translate(&self, job: &TranslationJob) -> Result<()> {
        warn!(
            "Yandex document translation requested for {} (folder {})",
            job.filename, self.folder_id
        );
        Err(AppError::NotImplemented(
            "Yandex Translate does not offer document translation".to_string(),
        ))
    }
}
