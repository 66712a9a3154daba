// ABOUTME: Thin wrapper over the external file/object storage service
// ABOUTME: Document bytes live behind this trait, metadata stays in SQLite

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum FileStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored file {0} not found")]
    NotFound(String),
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl From<FileStoreError> for StorageError {
    fn from(err: FileStoreError) -> Self {
        match err {
            FileStoreError::Io(e) => StorageError::Io(e),
            FileStoreError::NotFound(key) => StorageError::NotFound(format!("File {}", key)),
            FileStoreError::InvalidKey(key) => {
                StorageError::InvalidInput(format!("Invalid storage key: {}", key))
            }
        }
    }
}

/// Blob storage reached through a thin wrapper
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), FileStoreError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, FileStoreError>;
    async fn delete(&self, key: &str) -> Result<(), FileStoreError>;
}

/// Local-disk implementation storing blobs under a root directory
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // Keys are generated internally, but reject separators anyway so a
    // corrupted key can never escape the root.
    fn path_for(&self, key: &str) -> Result<PathBuf, FileStoreError> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(FileStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), FileStoreError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, FileStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FileStoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(FileStoreError::Io(e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), FileStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FileStoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(FileStoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_delete_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(dir.path());

        store.put("doc-abc", b"hello").await.unwrap();
        assert_eq!(store.get("doc-abc").await.unwrap(), b"hello");

        store.delete("doc-abc").await.unwrap();
        assert!(matches!(
            store.get("doc-abc").await,
            Err(FileStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(dir.path());

        assert!(matches!(
            store.get("../etc/passwd").await,
            Err(FileStoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.put("a/b", b"x").await,
            Err(FileStoreError::InvalidKey(_))
        ));
    }
}
