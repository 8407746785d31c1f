//! Local file storage for uploaded resumes and identity documents.
//!
//! Files land under `{upload_folder}/resumes` or `{upload_folder}/documents`
//! as `{uuid}_{sanitized_name}` so uploads never collide or escape the root.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

pub const RESUME_EXTENSIONS: &[&str] = &["pdf", "docx"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    InvalidFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a saved upload ended up.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Sanitized original name.
    pub filename: String,
    /// On-disk location, `{folder}/{uuid}_{filename}`.
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn save_resume(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        if !allowed_file(original_name, RESUME_EXTENSIONS) {
            return Err(StorageError::InvalidFile(
                "Invalid file type. Only PDF and DOCX files are allowed.".to_string(),
            ));
        }
        self.save("resumes", original_name, bytes).await
    }

    pub async fn save_document(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        if !allowed_file(original_name, DOCUMENT_EXTENSIONS) {
            return Err(StorageError::InvalidFile(
                "Invalid file type. Only PDF and image files are allowed.".to_string(),
            ));
        }
        self.save("documents", original_name, bytes).await
    }

    /// Removes a stored file. Returns whether anything was deleted.
    pub async fn delete_file(&self, path: &Path) -> bool {
        match tokio::fs::remove_file(path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Error deleting file {}: {e}", path.display());
                false
            }
        }
    }

    async fn save(&self, folder: &str, original_name: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        let filename = secure_filename(original_name);
        if filename.is_empty() {
            return Err(StorageError::InvalidFile("No file selected".to_string()));
        }
        let unique_filename = format!("{}_{}", Uuid::new_v4(), filename);

        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(&unique_filename);
        tokio::fs::write(&path, bytes).await?;
        info!("Stored upload at {}", path.display());

        Ok(StoredFile {
            filename,
            path,
            size: bytes.len() as u64,
        })
    }
}

/// Lowercased extension without the dot.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn allowed_file(filename: &str, allowed: &[&str]) -> bool {
    file_extension(filename).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Reduces a client-supplied name to a safe single path component: directory
/// parts are dropped, whitespace becomes `_`, anything outside ASCII
/// alphanumerics and `._-` is removed, and leading dots are stripped.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My Resume (final).pdf"), "My_Resume_final.pdf");
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\jo\\cv.docx"), "cv.docx");
        assert_eq!(secure_filename(".hidden.pdf"), "hidden.pdf");
        assert_eq!(secure_filename("???"), "");
    }

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("cv.PDF", RESUME_EXTENSIONS));
        assert!(allowed_file("cv.docx", RESUME_EXTENSIONS));
        assert!(!allowed_file("cv.doc", RESUME_EXTENSIONS));
        assert!(!allowed_file("pdf", RESUME_EXTENSIONS));
        assert!(allowed_file("pan.jpeg", DOCUMENT_EXTENSIONS));
        assert!(!allowed_file("pan.gif", DOCUMENT_EXTENSIONS));
    }

    #[tokio::test]
    async fn test_save_resume_writes_unique_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        let stored = storage.save_resume("John Doe.pdf", b"%PDF-1.4").await.unwrap();

        assert_eq!(stored.filename, "John_Doe.pdf");
        let on_disk = stored.path.file_name().unwrap().to_str().unwrap();
        assert!(on_disk.ends_with("_John_Doe.pdf"));
        assert!(stored.path.starts_with(dir.path().join("resumes")));
        assert_eq!(stored.size, 8);
        assert_eq!(file_extension(on_disk).as_deref(), Some("pdf"));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_save_resume_rejects_other_types() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        let err = storage.save_resume("notes.txt", b"hi").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidFile(_)));
        assert!(!dir.path().join("resumes").exists());
    }

    #[tokio::test]
    async fn test_save_document_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        let stored = storage.save_document("pan.png", b"\x89PNG").await.unwrap();
        assert!(stored.path.starts_with(dir.path().join("documents")));

        assert!(storage.delete_file(&stored.path).await);
        assert!(!storage.delete_file(&stored.path).await);
    }
}
