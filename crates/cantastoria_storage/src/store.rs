//! Artifact persistence.

use async_trait::async_trait;
use cantastoria_error::{CantastoriaResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Directory-addressable byte sink for generated artifacts.
///
/// Names are flat, no separators; the store decides where bytes
/// actually land. Pipelines depend on this trait so tests can swap in
/// a temporary directory or an in-memory map.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `bytes` under `name`, replacing any previous artifact.
    /// Returns the location written.
    async fn write(&self, name: &str, bytes: &[u8]) -> CantastoriaResult<PathBuf>;

    /// Load the artifact stored under `name`.
    async fn read(&self, name: &str) -> CantastoriaResult<Vec<u8>>;

    /// Remove the artifact stored under `name`.
    async fn delete(&self, name: &str) -> CantastoriaResult<()>;

    /// Whether an artifact exists under `name`.
    async fn exists(&self, name: &str) -> CantastoriaResult<bool>;
}

/// Artifact store over one filesystem directory.
///
/// Writes go to a temporary sibling first and are renamed into place,
/// so a crash mid-write never leaves a truncated artifact under its
/// final name.
#[derive(Debug, Clone)]
pub struct FileArtifacts {
    root: PathBuf,
}

impl FileArtifacts {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> CantastoriaResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation {
                path: root.display().to_string(),
                message: e.to_string(),
            })
        })?;
        Ok(Self { root })
    }

    /// Directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> CantastoriaResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(name.to_string())).into());
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ArtifactStore for FileArtifacts {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn write(&self, name: &str, bytes: &[u8]) -> CantastoriaResult<PathBuf> {
        let path = self.resolve(name)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite {
                name: name.to_string(),
                message: e.to_string(),
            })
        })?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite {
                name: name.to_string(),
                message: e.to_string(),
            })
        })?;
        debug!(path = %path.display(), "artifact written");
        Ok(path)
    }

    #[instrument(skip(self))]
    async fn read(&self, name: &str) -> CantastoriaResult<Vec<u8>> {
        let path = self.resolve(name)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(name.to_string())).into()
            } else {
                StorageError::new(StorageErrorKind::FileRead {
                    name: name.to_string(),
                    message: e.to_string(),
                })
                .into()
            }
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str) -> CantastoriaResult<()> {
        let path = self.resolve(name)?;
        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(name.to_string())).into()
            } else {
                StorageError::new(StorageErrorKind::FileDelete {
                    name: name.to_string(),
                    message: e.to_string(),
                })
                .into()
            }
        })
    }

    async fn exists(&self, name: &str) -> CantastoriaResult<bool> {
        let path = self.resolve(name)?;
        Ok(path.exists())
    }
}
