//! Scratch file management for encoder runs.
//!
//! A [`ScratchDir`] hands out [`ScratchFile`] guards with collision-free
//! names (`<epoch-millis>_<random>.<ext>`). Callers release a guard with
//! [`ScratchFile::cleanup`], which deletes through `tokio::fs`. A guard that
//! is dropped without it (early return, cancelled future) falls back to a
//! blocking delete in `Drop`. Deletion is best-effort: failures are logged,
//! never raised.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory scratch files are created in.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Reserve a unique path with the given extension.
    ///
    /// Creates the scratch directory (recursively) if it does not exist yet.
    /// Nothing is written to the returned path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub async fn reserve(&self, extension: &str) -> stickerforge_core::Result<ScratchFile> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(unique_name(extension));
        tracing::trace!("Reserved scratch path {}", path.display());
        Ok(ScratchFile {
            path,
            removed: false,
        })
    }
}

/// `<epoch-millis>_<random>.<ext>`
fn unique_name(extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let nonce: u32 = rand::random();
    let ext = extension.trim_start_matches('.');
    if ext.is_empty() {
        format!("{millis}_{nonce}")
    } else {
        format!("{millis}_{nonce}.{ext}")
    }
}

/// A reserved scratch path, removed from disk when dropped.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    removed: bool,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `data` to the scratch path, replacing any previous content.
    pub async fn write(&self, data: &[u8]) -> stickerforge_core::Result<()> {
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }

    /// Read the whole file. A file the encoder never created reads as an error.
    pub async fn read(&self) -> stickerforge_core::Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    /// Delete the file without blocking the executor.
    pub async fn cleanup(mut self) {
        let result = tokio::fs::remove_file(&self.path).await;
        log_removal(&self.path, result);
        self.removed = true;
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.removed {
            log_removal(&self.path, std::fs::remove_file(&self.path));
        }
    }
}

fn log_removal(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::trace!("Removed scratch file {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove scratch file {}: {e}", path.display()),
    }
}
