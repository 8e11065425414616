//! Local file storage for uploaded imports and generated exports.
//!
//! Files are addressed by a relative reference such as `imports/<uuid>.csv`,
//! which is what the job records store in `file_ref`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file reference: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a reference below the root; absolute paths and `..` are rejected.
    pub fn path(&self, file_ref: &str) -> Result<PathBuf, FileStoreError> {
        let relative = Path::new(file_ref);
        let clean = !file_ref.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(FileStoreError::InvalidPath(file_ref.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Stores `bytes` under `<folder>/<uuid>.<extension>` and returns the reference.
    pub async fn save(
        &self,
        folder: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, FileStoreError> {
        let file_ref = format!("{}/{}.{}", folder, Uuid::new_v4(), extension);
        let path = self.path(&file_ref)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(file_ref = %file_ref, size = bytes.len(), "Stored file");
        Ok(file_ref)
    }

    pub async fn read(&self, file_ref: &str) -> Result<Vec<u8>, FileStoreError> {
        let path = self.path(file_ref)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => FileStoreError::NotFound(file_ref.to_string()),
            _ => FileStoreError::Io(e),
        })
    }

    pub async fn open(&self, file_ref: &str) -> Result<tokio::fs::File, FileStoreError> {
        let path = self.path(file_ref)?;
        tokio::fs::File::open(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => FileStoreError::NotFound(file_ref.to_string()),
            _ => FileStoreError::Io(e),
        })
    }

    /// Removes a file. A missing file is not an error.
    pub async fn delete(&self, file_ref: &str) -> Result<(), FileStoreError> {
        let path = self.path(file_ref)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
