// HTML rendering for the upload form

use crate::engines::Engines;
use crate::error::Result;
use crate::models::{languages, EngineKind};
use serde::Serialize;
use tera::{Context, Tera};

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

#[derive(Serialize)]
struct LanguageOption {
    code: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
struct EngineOption {
    id: &'static str,
    label: &'static str,
    configured: bool,
}

pub fn load() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template("index.html", INDEX_TEMPLATE)?;
    Ok(tera)
}

pub fn render_index(
    tera: &Tera,
    engines: &Engines,
    messages: &[String],
    max_upload_mb: usize,
) -> Result<String> {
    let language_options: Vec<LanguageOption> = languages::supported()
        .into_iter()
        .map(|l| LanguageOption {
            code: l.code(),
            name: l.name(),
        })
        .collect();

    let engine_options: Vec<EngineOption> = EngineKind::ALL
        .into_iter()
        .map(|kind| EngineOption {
            id: kind.as_str(),
            label: kind.label(),
            configured: engines.is_configured(kind),
        })
        .collect();

    let mut context = Context::new();
    context.insert("languages", &language_options);
    context.insert("engines", &engine_options);
    context.insert("messages", messages);
    context.insert("max_upload_mb", &max_upload_mb);

    Ok(tera.render("index.html", &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_render_lists_languages_and_engines() {
        let tera = load().unwrap();
        let engines = Engines::from_config(&AppConfig::default()).unwrap();
        let html = render_index(&tera, &engines, &["No file part".to_string()], 50).unwrap();

        assert!(html.contains(r#"<option value="RU">Russian</option>"#));
        assert!(html.contains(r#"<option value="UK">Ukrainian</option>"#));
        assert!(html.contains(r#"value="deepl" disabled"#));
        assert!(html.contains("No file part"));
    }

    #[test]
    fn test_messages_are_escaped() {
        let tera = load().unwrap();
        let engines = Engines::from_config(&AppConfig::default()).unwrap();
        let html = render_index(&tera, &engines, &["<script>".to_string()], 50).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
