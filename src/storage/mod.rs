//! Temporary on-disk storage for uploads and translated documents.
//!
//! Uploads land in `upload_dir` under their secured client filename and
//! results in `download_dir` as `translated_<engine>_<filename>`. Files are
//! never deleted by the service; the host recycles the temporary directory.

mod filename;

pub use filename::{has_pdf_extension, secure_filename, secure_pdf_filename};

use crate::config::StorageConfig;
use crate::error::{AppError, Result};
use crate::models::EngineKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Every PDF starts with this header.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone)]
pub struct FileStore {
    upload_dir: PathBuf,
    download_dir: PathBuf,
}

impl FileStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            download_dir: PathBuf::from(&config.download_dir),
        }
    }

    /// Create both directories if they do not exist yet.
    pub async fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.upload_dir).await?;
        fs::create_dir_all(&self.download_dir).await?;
        Ok(())
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Persist an uploaded document under its already secured name.
    pub async fn save_upload(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.upload_dir.join(filename);
        fs::write(&path, bytes).await?;
        debug!("Saved upload ({} bytes) to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Name of the translated file for `filename` produced by `engine`.
    pub fn output_name(engine: EngineKind, filename: &str) -> String {
        format!("translated_{}_{}", engine.as_str(), filename)
    }

    pub fn output_path(&self, output_name: &str) -> PathBuf {
        self.download_dir.join(output_name)
    }

    /// Map a requested download name to an existing file inside `download_dir`.
    ///
    /// Only names that are already in secured form are served, so no request
    /// can address a path outside the directory or a partial `.part` file.
    pub async fn resolve_download(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || secure_filename(name) != name {
            return Err(AppError::NotFound(name.to_string()));
        }

        let path = self.download_dir.join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(AppError::NotFound(name.to_string())),
        }
    }

    /// Check that both directories exist and accept writes.
    pub async fn check_writable(&self) -> Result<()> {
        for dir in [&self.upload_dir, &self.download_dir] {
            let probe = dir.join(".docrelay-probe");
            fs::write(&probe, b"").await?;
            fs::remove_file(&probe).await?;
        }
        Ok(())
    }
}

/// Whether `bytes` begin with the PDF header.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Write `bytes` to `path` so that `path` only ever holds a complete file.
///
/// Data goes to a hidden sibling first and is renamed into place.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Internal(format!("Invalid output path: {}", path.display())))?;
    let partial = path.with_file_name(format!(".{}.part", file_name));

    if let Err(e) = fs::write(&partial, bytes).await {
        let _ = fs::remove_file(&partial).await;
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&partial, path).await {
        let _ = fs::remove_file(&partial).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> FileStore {
        FileStore::new(&StorageConfig {
            upload_dir: dir.join("uploads").to_string_lossy().to_string(),
            download_dir: dir.join("downloads").to_string_lossy().to_string(),
        })
    }

    #[test]
    fn test_output_name() {
        assert_eq!(
            FileStore::output_name(EngineKind::DeepL, "report.pdf"),
            "translated_deepl_report.pdf"
        );
    }

    #[test]
    fn test_pdf_magic() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(!looks_like_pdf(b"PK\x03\x04"));
        assert!(!looks_like_pdf(b""));
    }

    #[tokio::test]
    async fn test_save_and_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.ensure_dirs().await.unwrap();

        let saved = store.save_upload("a.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-1.4");

        let output = store.output_path("translated_deepl_a.pdf");
        write_atomic(&output, b"%PDF-translated").await.unwrap();

        let resolved = store.resolve_download("translated_deepl_a.pdf").await.unwrap();
        assert_eq!(resolved, output);
        assert!(!store.download_dir().join(".translated_deepl_a.pdf.part").exists());
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.ensure_dirs().await.unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"x").unwrap();

        for name in ["../secret.txt", "..", "", "missing.pdf", ".hidden.part"] {
            assert!(matches!(
                store.resolve_download(name).await,
                Err(AppError::NotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_failed_rename_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the output path makes the rename fail.
        let output = dir.path().join("translated_deepl_a.pdf");
        std::fs::create_dir(&output).unwrap();
        std::fs::write(output.join("occupied"), b"x").unwrap();

        assert!(write_atomic(&output, b"%PDF-translated").await.is_err());
        assert!(!dir.path().join(".translated_deepl_a.pdf.part").exists());
    }

    #[tokio::test]
    async fn test_check_writable() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert!(store.check_writable().await.is_err());
        store.ensure_dirs().await.unwrap();
        store.check_writable().await.unwrap();
    }
}
