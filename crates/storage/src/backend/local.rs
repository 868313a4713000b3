//! Local filesystem storage backend.
//!
//! Thin wrapper over [`std::fs`] that maps I/O failures onto path-carrying
//! [`ErrorKind`]s.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

enum WalkEntry {
    File(PathBuf),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use debrother_storage::backend::{LocalBackend, StorageBackend};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::default();
/// let files = backend.list(Path::new("/home/me/scans")).map_err(|e| format!("{e:?}"))?;
/// println!("{} files", files.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
}
impl LocalBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn process_entry(entry: DirEntry) -> Result<WalkEntry> {
        let path = entry.path();
        // Does not follow symlinks: a link is neither a file nor a directory.
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(WalkEntry::Skip),
            Err(e) => exn::bail!(ErrorKind::from_io(e, &path)),
        };
        if metadata.is_symlink() {
            tracing::debug!(path = %path.display(), "Skipping symlink");
            return Ok(WalkEntry::Skip);
        }
        if metadata.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if metadata.is_file() {
            return Ok(WalkEntry::File(path));
        }
        Ok(WalkEntry::Skip)
    }
}
impl Default for LocalBackend {
    fn default() -> Self {
        Self::new("local")
    }
}

impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let metadata = fs::metadata(root).map_err(|e| ErrorKind::from_io(e, root))?;
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root.to_path_buf()));
        }
        let mut files = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(current) = stack.pop() {
            let entries = fs::read_dir(&current).map_err(|e| ErrorKind::from_io(e, &current))?;
            for entry in entries {
                let entry = entry.map_err(|e| ErrorKind::from_io(e, &current))?;
                match Self::process_entry(entry)? {
                    WalkEntry::File(f) => files.push(f),
                    WalkEntry::Descend(d) => stack.push(d),
                    WalkEntry::Skip => {},
                }
            }
        }
        tracing::trace!(backend = self.name(), root = %root.display(), files = files.len(), "Listed directory tree");
        Ok(files)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::exists(path).map_err(|e| ErrorKind::from_io(e, path))?)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        // Attribute a failure to whichever side is actually at fault; fs::copy
        // reports both through the same error.
        if !fs::exists(from).map_err(|e| ErrorKind::from_io(e, from))? {
            exn::bail!(ErrorKind::NotFound(from.to_path_buf()));
        }
        Ok(fs::copy(from, to).map_err(|e| ErrorKind::from_io(e, to))?)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        Ok(fs::rename(from, to).map_err(|e| ErrorKind::from_io(e, to))?)
    }

    fn delete(&self, path: &Path) -> Result<()> {
        Ok(fs::remove_file(path).map_err(|e| ErrorKind::from_io(e, path))?)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir(path).map_err(|e| ErrorKind::from_io(e, path))?)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        Ok(fs::remove_dir(path).map_err(|e| ErrorKind::from_io(e, path))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_list_recurses() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(&temp_dir.path().join("a.jpg"));
        touch(&temp_dir.path().join("sub/b.jpg"));
        touch(&temp_dir.path().join("sub/deeper/c.jpg"));
        let files: BTreeSet<_> = LocalBackend::default().list(temp_dir.path()).unwrap().into_iter().collect();
        let expected: BTreeSet<_> =
            ["a.jpg", "sub/b.jpg", "sub/deeper/c.jpg"].iter().map(|p| temp_dir.path().join(p)).collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_list_empty_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::default().list(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_list_missing_root_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope");
        let err = LocalBackend::default().list(&missing).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(p) if *p == missing));
    }

    #[test]
    fn test_list_file_root_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("a.jpg");
        touch(&file);
        let err = LocalBackend::default().list(&file).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_list_skips_linked_directories() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let page = temp_dir.path().join("batch/S_20190527.jpg");
        touch(&page);
        symlink(temp_dir.path().join("batch"), temp_dir.path().join("alias")).unwrap();
        symlink(&page, temp_dir.path().join("batch/linked.jpg")).unwrap();
        assert_eq!(LocalBackend::default().list(temp_dir.path()).unwrap(), vec![page]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_survives_link_loop() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let page = temp_dir.path().join("S_20190527.jpg");
        touch(&page);
        symlink(temp_dir.path(), temp_dir.path().join("loop")).unwrap();
        symlink(temp_dir.path().join("gone"), temp_dir.path().join("dangling")).unwrap();
        assert_eq!(LocalBackend::default().list(temp_dir.path()).unwrap(), vec![page]);
    }

    #[test]
    fn test_copy() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("from.jpg");
        let to = temp_dir.path().join("to.jpg");
        touch(&from);
        let backend = LocalBackend::default();
        assert_eq!(backend.copy(&from, &to).unwrap(), 4);
        assert_eq!(fs::read(&to).unwrap(), b"data");
        assert!(backend.exists(&from).unwrap());
    }

    #[test]
    fn test_copy_missing_source_blames_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("from.jpg");
        let err = LocalBackend::default().copy(&from, &temp_dir.path().join("to.jpg")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(p) if *p == from));
    }

    #[test]
    fn test_rename_requires_parent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("from.jpg");
        touch(&from);
        let backend = LocalBackend::default();
        let nested = temp_dir.path().join("missing/to.jpg");
        assert!(backend.rename(&from, &nested).is_err());
        backend.create_dir(&temp_dir.path().join("missing")).unwrap();
        backend.rename(&from, &nested).unwrap();
        assert!(!backend.exists(&from).unwrap());
        assert!(backend.exists(&nested).unwrap());
    }

    #[test]
    fn test_delete_and_remove_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("dir");
        let file = dir.join("a.jpg");
        touch(&file);
        let backend = LocalBackend::default();
        // Not empty yet.
        assert!(backend.remove_dir(&dir).is_err());
        backend.delete(&file).unwrap();
        backend.remove_dir(&dir).unwrap();
        assert!(!backend.exists(&dir).unwrap());
        let err = backend.delete(&file).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_create_dir_existing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = LocalBackend::default().create_dir(temp_dir.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
    }
}
