// Filename sanitising and storage layout tests

use docrelay::config::StorageConfig;
use docrelay::models::EngineKind;
use docrelay::storage::{secure_filename, secure_pdf_filename, FileStore};
use proptest::prelude::*;
use tempfile::TempDir;

proptest! {
    #[test]
    fn secure_filename_never_escapes(name in "\\PC{0,64}") {
        let secured = secure_filename(&name);
        prop_assert!(!secured.contains('/'));
        prop_assert!(!secured.contains('\\'));
        prop_assert!(!secured.starts_with('.'));
    }

    #[test]
    fn secure_filename_is_idempotent(name in "\\PC{0,64}") {
        let once = secure_filename(&name);
        prop_assert_eq!(secure_filename(&once), once.clone());
    }

    #[test]
    fn secure_pdf_filename_keeps_extension(stem in "[A-Za-z0-9 _-]{1,20}") {
        if let Some(name) = secure_pdf_filename(&format!("{}.PDF", stem)) {
            prop_assert!(name.to_lowercase().ends_with(".pdf"));
            prop_assert_eq!(secure_filename(&name), name.clone());
        }
    }
}

#[test]
fn test_traversal_is_flattened() {
    assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
    assert_eq!(secure_pdf_filename("../../secret.pdf").as_deref(), Some("secret.pdf"));
}

#[tokio::test]
async fn test_upload_and_download_layout() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(&StorageConfig {
        upload_dir: dir.path().join("in").to_string_lossy().to_string(),
        download_dir: dir.path().join("out").to_string_lossy().to_string(),
    });
    store.ensure_dirs().await.unwrap();

    let saved = store.save_upload("report.pdf", b"%PDF-1.7").await.unwrap();
    assert_eq!(saved, dir.path().join("in").join("report.pdf"));

    let name = FileStore::output_name(EngineKind::Google, "report.pdf");
    assert_eq!(name, "translated_google_report.pdf");
    assert!(store.resolve_download(&name).await.is_err());

    tokio::fs::write(store.output_path(&name), b"%PDF-1.7").await.unwrap();
    assert_eq!(store.resolve_download(&name).await.unwrap(), store.output_path(&name));
    assert!(store.check_writable().await.is_ok());
}
