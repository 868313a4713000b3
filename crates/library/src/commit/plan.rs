use crate::error::{ErrorKind, Result};
use crate::models::ScanFile;
use debrother_storage::StorageBackend;
use exn::ResultExt;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Sources paired one to one with their destinations, in page order.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    sources: Vec<ScanFile>,
    destinations: Vec<PathBuf>,
}
impl Plan {
    pub fn new(sources: Vec<ScanFile>, destinations: Vec<PathBuf>) -> Result<Self> {
        if sources.len() != destinations.len() {
            exn::bail!(ErrorKind::Mismatch { sources: sources.len(), destinations: destinations.len() });
        }
        Ok(Self { sources, destinations })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn sources(&self) -> &[ScanFile] {
        &self.sources
    }

    pub fn destinations(&self) -> &[PathBuf] {
        &self.destinations
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&ScanFile, &Path)> {
        self.sources.iter().zip(self.destinations.iter().map(PathBuf::as_path))
    }

    /// Destinations claimed by more than one source, in plan order.
    pub fn duplicates(&self) -> Vec<&Path> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        self.destinations
            .iter()
            .filter(|destination| !seen.insert(destination.as_path()) && reported.insert(destination.as_path()))
            .map(PathBuf::as_path)
            .collect()
    }

    /// Fail closed on the first destination that is claimed twice or that
    /// already exists.
    ///
    /// A destination equal to its own source counts as existing: renaming in
    /// place is never needed, and overwriting is never allowed.
    pub fn check(&self, backend: &dyn StorageBackend) -> Result<()> {
        if let Some(duplicate) = self.duplicates().first() {
            exn::bail!(ErrorKind::Collision(duplicate.to_path_buf()));
        }
        for destination in &self.destinations {
            if backend.exists(destination).or_raise(|| ErrorKind::WriteFailure(destination.clone()))? {
                exn::bail!(ErrorKind::Collision(destination.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debrother_storage::backend::LocalBackend;
    use std::fs;
    use tempfile::TempDir;

    fn sources(n: usize) -> Vec<ScanFile> {
        (1..=n).map(|i| ScanFile::new(format!("in/Scan_20190527_{i}.jpg"))).collect()
    }

    #[test]
    fn test_mismatch() {
        let err = Plan::new(sources(3), vec![PathBuf::from("a"), PathBuf::from("b")]).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Mismatch { sources: 3, destinations: 2 }));
    }

    #[test]
    fn test_duplicate_destination() {
        let dir = TempDir::new().unwrap();
        let destinations = ["001.jpg", "002.jpg", "001.jpg", "002.jpg"].map(|name| dir.path().join(name)).to_vec();
        let plan = Plan::new(sources(4), destinations).unwrap();
        let (first, second) = (dir.path().join("001.jpg"), dir.path().join("002.jpg"));
        assert_eq!(plan.duplicates(), vec![first.as_path(), second.as_path()]);
        let err = plan.check(&LocalBackend::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Collision(path) if *path == first));
    }

    #[test]
    fn test_existing_destination() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("002.jpg"), b"taken").unwrap();
        let destinations = vec![dir.path().join("001.jpg"), dir.path().join("002.jpg")];
        let plan = Plan::new(sources(2), destinations).unwrap();
        let err = plan.check(&LocalBackend::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Collision(path) if *path == dir.path().join("002.jpg")));
    }

    #[test]
    fn test_clean_plan() {
        let dir = TempDir::new().unwrap();
        let destinations = vec![dir.path().join("001.jpg"), dir.path().join("sub/002.jpg")];
        let plan = Plan::new(sources(2), destinations).unwrap();
        assert!(plan.duplicates().is_empty());
        plan.check(&LocalBackend::default()).unwrap();
        assert_eq!(plan.pairs().count(), 2);
    }
}
