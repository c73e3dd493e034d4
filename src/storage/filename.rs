// Client filename sanitisation

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

const WINDOWS_DEVICE_FILES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

fn strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.\-]").expect("static regex"))
}

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// The result never contains a path separator, never starts with `.` or `_`
/// and may be empty when nothing usable remains.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let flattened = ascii.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = strip_re().replace_all(&joined, "");
    let trimmed = stripped.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if !trimmed.is_empty() && WINDOWS_DEVICE_FILES.contains(&stem.to_ascii_uppercase().as_str()) {
        return format!("_{}", trimmed);
    }

    trimmed.to_string()
}

/// Whether the client filename claims to be a PDF.
pub fn has_pdf_extension(name: &str) -> bool {
    name.len() > 4
        && name
            .get(name.len() - 4..)
            .map(|ext| ext.eq_ignore_ascii_case(".pdf"))
            .unwrap_or(false)
}

/// Secure a PDF filename, keeping a `.pdf` extension on the result.
///
/// Returns `None` when nothing but the extension survives sanitisation.
pub fn secure_pdf_filename(name: &str) -> Option<String> {
    let secured = secure_filename(name);
    if has_pdf_extension(&secured) {
        return Some(secured);
    }
    if secured.is_empty() || secured.eq_ignore_ascii_case("pdf") {
        return None;
    }
    Some(format!("{}.pdf", secured))
}
