//! Object storage for generated quote documents and uploaded attachments.
//!
//! The trait keeps handlers independent of where bytes land; production uses
//! the local files directory, tests swap in an in-memory implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Byte-level storage keyed by filename.
#[async_trait]
pub trait ObjectStorage {
    async fn upload_file(&self, filename: &str, file_data: &[u8]) -> Result<(), String>;
    async fn download_file(&self, filename: &str) -> Result<Vec<u8>, String>;
    async fn delete_file(&self, filename: &str) -> Result<(), String>;
}

/// Local-disk storage rooted at `FILES_DIR` (default `./files`).
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn from_env() -> Self {
        let root = std::env::var("FILES_DIR").unwrap_or_else(|_| "./files".to_string());
        Self::new(PathBuf::from(root))
    }

    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path_for(&self, filename: &str) -> Result<PathBuf, String> {
        // Filenames are generated or sanitized upstream; reject anything that
        // would escape the root regardless.
        let name = Path::new(filename);
        if name.components().count() != 1 || filename.contains("..") {
            return Err(format!("invalid storage filename: {filename}"));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload_file(&self, filename: &str, file_data: &[u8]) -> Result<(), String> {
        let path = self.path_for(filename)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| format!("failed to create files directory: {e}"))?;
        tokio::fs::write(&path, file_data)
            .await
            .map_err(|e| format!("failed to write {filename}: {e}"))
    }

    async fn download_file(&self, filename: &str) -> Result<Vec<u8>, String> {
        let path = self.path_for(filename)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| format!("failed to read {filename}: {e}"))
    }

    async fn delete_file(&self, filename: &str) -> Result<(), String> {
        let path = self.path_for(filename)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| format!("failed to delete {filename}: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_path_buf());
        storage.upload_file("quote.txt", b"hello").await.unwrap();
        assert_eq!(storage.download_file("quote.txt").await.unwrap(), b"hello");
        storage.delete_file("quote.txt").await.unwrap();
        assert!(storage.download_file("quote.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_path_buf());
        assert!(storage.upload_file("../escape.txt", b"x").await.is_err());
        assert!(storage.download_file("a/b.txt").await.is_err());
    }
}
