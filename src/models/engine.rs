// Translation engine selector
// The `engine` form field names one of the supported vendors

use crate::error::{AppError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    DeepL,
    Google,
    ApyHub,
    Yandex,
}

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::DeepL,
        EngineKind::Google,
        EngineKind::ApyHub,
        EngineKind::Yandex,
    ];

    /// Identifier used in form values and output filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::DeepL => "deepl",
            EngineKind::Google => "google",
            EngineKind::ApyHub => "apyhub",
            EngineKind::Yandex => "yandex",
        }
    }

    /// Human-readable vendor name.
    pub fn label(&self) -> &'static str {
        match self {
            EngineKind::DeepL => "DeepL",
            EngineKind::Google => "Google Translate",
            EngineKind::ApyHub => "ApyHub",
            EngineKind::Yandex => "Yandex Translate",
        }
    }

    /// Parse a form value. Blank means no selection was made.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::MissingEngine);
        }
        value.parse()
    }
}

impl FromStr for EngineKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        EngineKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| AppError::InvalidEngine(s.to_string()))
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_engines() {
        assert_eq!(EngineKind::parse("deepl").unwrap(), EngineKind::DeepL);
        assert_eq!(EngineKind::parse("Google").unwrap(), EngineKind::Google);
        assert_eq!(EngineKind::parse(" APYHUB ").unwrap(), EngineKind::ApyHub);
        assert_eq!(EngineKind::parse("yandex").unwrap(), EngineKind::Yandex);
    }

    #[test]
    fn test_blank_engine_is_missing() {
        assert!(matches!(EngineKind::parse(""), Err(AppError::MissingEngine)));
    }

    #[test]
    fn test_unknown_engine_is_invalid() {
        assert!(matches!(
            EngineKind::parse("libretranslate"),
            Err(AppError::InvalidEngine(_))
        ));
    }

    #[test]
    fn test_identifiers_round_trip_through_display() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.to_string().parse::<EngineKind>().unwrap(), kind);
        }
    }
}
