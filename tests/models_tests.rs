// Language and engine selection tests

use docrelay::error::AppError;
use docrelay::models::{languages, EngineKind, Language};

#[test]
fn test_supported_languages() {
    let codes: Vec<&str> = languages::supported().iter().map(|l| l.code()).collect();
    assert_eq!(codes, ["RU", "UK"]);
}

#[test]
fn test_language_codes_are_case_insensitive() {
    let ukrainian = Language::parse(" uk ").unwrap();
    assert_eq!(ukrainian.code(), "UK");
    assert_eq!(ukrainian.name(), "Ukrainian");
    assert_eq!(ukrainian.lower(), "uk");
}

#[test]
fn test_language_errors() {
    assert!(matches!(Language::parse(""), Err(AppError::MissingLanguage)));
    assert!(matches!(Language::parse("DE"), Err(AppError::UnsupportedLanguage(_))));
}

#[test]
fn test_engine_ids() {
    for kind in EngineKind::ALL {
        assert_eq!(EngineKind::parse(kind.as_str()).unwrap(), kind);
        assert_eq!(kind.to_string(), kind.as_str());
    }
    assert_eq!(EngineKind::parse("DeepL").unwrap(), EngineKind::DeepL);
    assert_eq!(EngineKind::Google.label(), "Google Translate");
}

#[test]
fn test_engine_errors() {
    assert!(matches!(EngineKind::parse("  "), Err(AppError::MissingEngine)));
    assert!(matches!(EngineKind::parse("bing"), Err(AppError::InvalidEngine(_))));
}
