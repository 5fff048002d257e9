//! Directory operations

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::ServerError;
use crate::filesys::file::File;

/// A directory wrapper with path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    path: PathBuf,
}

impl Dir {
    /// Create a new directory reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the directory exists
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Create the directory (and parents)
    pub async fn create(&self) -> Result<(), ServerError> {
        fs::create_dir_all(&self.path).await?;
        Ok(())
    }

    /// Check whether the directory has no entries
    pub async fn is_empty(&self) -> Result<bool, ServerError> {
        let mut entries = fs::read_dir(&self.path).await?;
        Ok(entries.next_entry().await?.is_none())
    }

    /// Remove the directory if it exists and holds no entries.
    ///
    /// Returns whether the directory was removed.
    pub async fn remove_if_empty(&self) -> Result<bool, ServerError> {
        if !self.exists().await || !self.is_empty().await? {
            return Ok(false);
        }
        match fs::remove_dir(&self.path).await {
            Ok(()) => Ok(true),
            // Another deployment wrote into it or removed it in the meantime
            Err(e) if matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::DirectoryNotEmpty
            ) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Blocking variant of [`Dir::remove_if_empty`], for use in `Drop`.
    pub fn remove_if_empty_blocking(&self) -> std::io::Result<()> {
        let empty = match std::fs::read_dir(&self.path) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => return Ok(()),
        };
        if empty {
            match std::fs::remove_dir(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
                _ => {}
            }
        }
        Ok(())
    }

    /// Get a file within this directory
    pub fn file(&self, name: &str) -> File {
        File::new(self.path.join(name))
    }

    /// Get a subdirectory
    pub fn subdir(&self, name: &str) -> Dir {
        Dir::new(self.path.join(name))
    }
}
