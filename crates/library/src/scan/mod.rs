//! Scan batch discovery.
//!
//! Walks an input directory through a [`StorageBackend`] and keeps every file
//! whose name follows the scanner's [`NamingConvention`]. Discovery never
//! writes anything.

mod convention;

pub use self::convention::{NamingConvention, SCANNER_PATTERN, ScanName};
use crate::error::{ErrorKind, Result};
use crate::models::ScanFile;
use debrother_storage::StorageBackend;
use exn::ResultExt;
use std::path::Path;
use tracing::instrument;

/// Finds scan batch files below a root directory.
pub struct Scanner<'a> {
    backend: &'a dyn StorageBackend,
    convention: NamingConvention,
}
impl<'a> Scanner<'a> {
    pub fn new(backend: &'a dyn StorageBackend, convention: NamingConvention) -> Self {
        Self { backend, convention }
    }

    /// Every matching file below `root`, in lexicographic path order.
    ///
    /// Only the file name is matched, so a batch may be spread across
    /// sub-directories. A missing or unreadable `root` is an error, never an
    /// empty batch.
    #[instrument(skip_all, fields(root = %root.display(), backend = self.backend.name()))]
    pub fn discover(&self, root: &Path) -> Result<Vec<ScanFile>> {
        let listing = self.backend.list(root).or_raise(|| ErrorKind::Discovery(root.to_path_buf()))?;
        let total = listing.len();
        let mut files: Vec<ScanFile> = listing
            .into_iter()
            .filter(|path| path.file_name().and_then(|name| name.to_str()).is_some_and(|name| self.convention.matches(name)))
            .map(ScanFile::new)
            .collect();
        files.sort_by(|a, b| a.path().as_os_str().as_encoded_bytes().cmp(b.path().as_os_str().as_encoded_bytes()));
        tracing::debug!(total, matched = files.len(), "Discovered scan batch");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debrother_storage::backend::LocalBackend;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn batch() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        for name in ["Scan_20190527_2.jpg", "Scan_20190527.jpg", "notes.txt", "Scan_2019.jpg", "nested/Scan_20190528 (2).png"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        dir
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = batch();
        let backend = LocalBackend::default();
        let scanner = Scanner::new(&backend, NamingConvention::new());
        let files = scanner.discover(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.path().strip_prefix(dir.path()).unwrap().to_path_buf()).collect();
        assert_eq!(names, vec![
            Path::new("Scan_20190527.jpg").to_path_buf(),
            Path::new("Scan_20190527_2.jpg").to_path_buf(),
            Path::new("nested/Scan_20190528 (2).png").to_path_buf(),
        ]);
    }

    #[test]
    fn test_discover_is_idempotent() {
        let dir = batch();
        let backend = LocalBackend::default();
        let scanner = Scanner::new(&backend, NamingConvention::new());
        let first: HashSet<_> = scanner.discover(dir.path()).unwrap().into_iter().collect();
        let second: HashSet<_> = scanner.discover(dir.path()).unwrap().into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::default();
        let files = Scanner::new(&backend, NamingConvention::new()).discover(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("missing");
        let backend = LocalBackend::default();
        let err = Scanner::new(&backend, NamingConvention::new()).discover(&root).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Discovery(path) if *path == root));
    }

    #[test]
    fn test_discover_root_is_a_file() {
        let dir = batch();
        let root = dir.path().join("notes.txt");
        let backend = LocalBackend::default();
        let err = Scanner::new(&backend, NamingConvention::new()).discover(&root).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Discovery(_)));
    }
}
