//! Failure-injecting storage backend for testing.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use std::cell::Cell;
use std::path::{Path, PathBuf};

/// Operations of [`StorageBackend`] that [`FaultyBackend`] can sabotage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Copy,
    Rename,
    Delete,
}

/// Decorates another backend and fails the n-th call (1-based) of a chosen
/// [`Operation`], passing every other call through untouched.
///
/// Counters live in [`Cell`]s: the rename engine is single-threaded and the
/// trait takes `&self`.
///
/// # Example
///
/// ```
/// use debrother_storage::backend::{FaultyBackend, LocalBackend, Operation, StorageBackend};
/// use std::path::Path;
///
/// let backend = FaultyBackend::new(LocalBackend::default()).fail_on(Operation::Rename, 2);
/// // First rename goes to the real filesystem (and fails there: no such file).
/// let first = backend.rename(Path::new("/nonexistent/a"), Path::new("/nonexistent/b"));
/// // Second one is the injected failure.
/// let second = backend.rename(Path::new("/nonexistent/a"), Path::new("/nonexistent/b"));
/// assert!(first.is_err() && second.is_err());
/// assert_eq!(backend.calls(Operation::Rename), 2);
/// ```
pub struct FaultyBackend<B> {
    inner: B,
    faults: Vec<(Operation, usize)>,
    copies: Cell<usize>,
    renames: Cell<usize>,
    deletes: Cell<usize>,
}

impl<B: StorageBackend> FaultyBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            faults: Vec::new(),
            copies: Cell::new(0),
            renames: Cell::new(0),
            deletes: Cell::new(0),
        }
    }

    /// Make the `nth` (1-based) call of `operation` fail.
    pub fn fail_on(mut self, operation: Operation, nth: usize) -> Self {
        self.faults.push((operation, nth));
        self
    }

    /// How many times `operation` has been called so far, failed calls included.
    pub fn calls(&self, operation: Operation) -> usize {
        self.counter(operation).get()
    }

    fn counter(&self, operation: Operation) -> &Cell<usize> {
        match operation {
            Operation::Copy => &self.copies,
            Operation::Rename => &self.renames,
            Operation::Delete => &self.deletes,
        }
    }

    /// Bumps the counter and bails if this call was chosen to fail.
    fn tick(&self, operation: Operation, path: &Path) -> Result<()> {
        let counter = self.counter(operation);
        let nth = counter.get() + 1;
        counter.set(nth);
        if self.faults.contains(&(operation, nth)) {
            tracing::debug!(?operation, nth, path = %path.display(), "Injecting storage failure");
            exn::bail!(ErrorKind::BackendError(format!("injected {operation:?} failure #{nth}")));
        }
        Ok(())
    }
}

impl<B: StorageBackend> StorageBackend for FaultyBackend<B> {
    fn name(&self) -> &str {
        "faulty"
    }

    fn list(&self, root: &Path) -> Result<Vec<PathBuf>> {
        self.inner.list(root)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        self.tick(Operation::Copy, from)?;
        self.inner.copy(from, to)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.tick(Operation::Rename, to)?;
        self.inner.rename(from, to)
    }

    fn delete(&self, path: &Path) -> Result<()> {
        self.tick(Operation::Delete, path)?;
        self.inner.delete(path)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        self.inner.create_dir(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.inner.remove_dir(path)
    }

    fn is_read_only(&self) -> bool {
        self.inner.is_read_only()
    }
}
