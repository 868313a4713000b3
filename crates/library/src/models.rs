//! Scan batch models.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single scanned page on disk.
///
/// Identity is the path. Every other attribute is derived from it on demand,
/// nothing is cached, and the value never changes once discovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanFile {
    path: PathBuf,
}
impl ScanFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// File name including extension (`Scan_20190527_2.jpg`).
    pub fn filename(&self) -> Cow<'_, str> {
        self.path.file_name().map(|s| s.to_string_lossy()).unwrap_or_default()
    }

    /// File name without its extension (`Scan_20190527_2`).
    pub fn basename(&self) -> Cow<'_, str> {
        self.path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default()
    }

    /// Extension without the leading dot (`jpg`), empty when there is none.
    pub fn extension(&self) -> Cow<'_, str> {
        self.path.extension().map(|s| s.to_string_lossy()).unwrap_or_default()
    }

    /// Directory holding the file; empty for a bare file name.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}
impl AsRef<Path> for ScanFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
impl From<PathBuf> for ScanFile {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}
impl From<&str> for ScanFile {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
impl fmt::Display for ScanFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("scans/Scan_20190527_2.jpg", "Scan_20190527_2.jpg", "Scan_20190527_2", "jpg", "scans")]
    #[case("scans/Scan_20190527 (2).jpeg", "Scan_20190527 (2).jpeg", "Scan_20190527 (2)", "jpeg", "scans")]
    #[case("archive.tar.gz", "archive.tar.gz", "archive.tar", "gz", "")]
    #[case("/abs/no_extension", "no_extension", "no_extension", "", "/abs")]
    #[case("dir/.hidden", ".hidden", ".hidden", "", "dir")]
    fn test_derived_fields(
        #[case] path: &str,
        #[case] filename: &str,
        #[case] basename: &str,
        #[case] extension: &str,
        #[case] directory: &str,
    ) {
        let file = ScanFile::from(path);
        assert_eq!(file.filename(), filename);
        assert_eq!(file.basename(), basename);
        assert_eq!(file.extension(), extension);
        assert_eq!(file.directory(), Path::new(directory));
    }
}
