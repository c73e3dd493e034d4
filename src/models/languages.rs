// Target language table
// Codes as submitted by the form, mapped to the casing each vendor expects

use crate::error::{AppError, Result};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A validated target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    code: &'static str,
    name: &'static str,
}

static LANGUAGES: OnceLock<BTreeMap<&'static str, &'static str>> = OnceLock::new();

fn language_map() -> &'static BTreeMap<&'static str, &'static str> {
    LANGUAGES.get_or_init(|| {
        let mut m = BTreeMap::new();
        m.insert("RU", "Russian");
        m.insert("UK", "Ukrainian");
        m
    })
}

impl Language {
    /// Look up a form value (`ru`, `RU`, ` uk `) in the supported table.
    pub fn parse(code: &str) -> Result<Self> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(AppError::MissingLanguage);
        }

        let normalized = trimmed.to_ascii_uppercase();
        language_map()
            .get_key_value(normalized.as_str())
            .map(|(code, name)| Language { code: *code, name: *name })
            .ok_or_else(|| AppError::UnsupportedLanguage(trimmed.to_string()))
    }

    /// Upper-case code, as shown in the form and sent to DeepL.
    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Lower-case code for ApyHub, Google and Yandex.
    pub fn lower(&self) -> String {
        self.code.to_ascii_lowercase()
    }
}

/// All supported languages, ordered by code.
pub fn supported() -> Vec<Language> {
    language_map()
        .iter()
        .map(|(code, name)| Language { code: *code, name: *name })
        .collect()
}
