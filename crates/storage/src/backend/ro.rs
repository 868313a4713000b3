//! Read-only storage backend.
//!
//! Wraps another implementation and prevents write operations from executing,
//! while still reporting success. Drives `--dry-run`: the whole rename
//! transaction runs, every side effect is logged instead of performed.

use crate::StorageBackend;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Read-only storage backend.
///
/// Reads go to the wrapped backend; writes are dropped and logged as an
/// [`info event`](tracing::Event).
#[derive(Clone, Debug)]
pub struct ReadOnlyBackend<B> {
    inner: B,
}
impl<B: StorageBackend> ReadOnlyBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

impl<B: StorageBackend> StorageBackend for ReadOnlyBackend<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list(&self, root: &Path) -> Result<Vec<PathBuf>> {
        self.inner.list(root)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        tracing::info!(from = %from.display(), to = %to.display(), "Skipping copy during read-only mode");
        Ok(0)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        tracing::info!(from = %from.display(), to = %to.display(), "Skipping rename/move during read-only mode");
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping delete during read-only mode");
        Ok(())
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping directory creation during read-only mode");
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping directory removal during read-only mode");
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        true
    }
}
