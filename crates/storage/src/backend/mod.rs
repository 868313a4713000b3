//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, the small set of filesystem
//! operations that discovering and committing a scan batch needs. Everything
//! that touches the disk goes through it, which is what lets the rename engine
//! be exercised against injected failures and lets `--dry-run` swap in a
//! backend that never writes.

#[cfg(feature = "mock")]
mod faulty;
mod local;
mod ro;

#[cfg(feature = "mock")]
pub use self::faulty::{FaultyBackend, Operation};
pub use self::local::LocalBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Unified interface for storage backends.
///
/// All operations are synchronous and take absolute (or caller-relative)
/// paths; backends do not impose a root of their own. Unlike [`std::fs`],
/// errors carry the offending path in their [`ErrorKind`](crate::error::ErrorKind).
///
/// # Examples
///
/// ```
/// use debrother_storage::backend::StorageBackend;
/// use debrother_storage::error::Result;
/// use std::path::Path;
///
/// fn backup(backend: &dyn StorageBackend, file: &Path) -> Result<u64> {
///     let backup = file.with_extension("bak");
///     if backend.exists(&backup)? {
///         return Ok(0);
///     }
///     backend.copy(file, &backup)
/// }
/// ```
pub trait StorageBackend {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// Recursively list every regular file below `root`.
    ///
    /// Order is whatever the directory walk produced; callers that need
    /// determinism must sort. Symlinks are never followed; they and anything
    /// else that is neither a file nor a directory are skipped.
    ///
    /// # Errors
    /// [`NotFound`](crate::error::ErrorKind::NotFound) if `root` does not
    /// exist and [`InvalidPath`](crate::error::ErrorKind::InvalidPath) if it is
    /// not a directory. Unlike object stores, a missing directory is never
    /// silently treated as empty.
    fn list(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Check whether anything exists at `path`.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Copy the contents of `from` into `to`, returning the number of bytes
    /// copied. `to` is created or truncated.
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Move a file. The parent directory of `to` must already exist.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete a file.
    fn delete(&self, path: &Path) -> Result<()>;

    /// Create a single directory; its parent must already exist.
    fn create_dir(&self, path: &Path) -> Result<()>;

    /// Remove a single, empty directory.
    fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Whether writes are dropped instead of performed. Callers that touch
    /// the disk outside of the backend (scratch directories) must not do so
    /// when this is `true`.
    fn is_read_only(&self) -> bool {
        false
    }
}
