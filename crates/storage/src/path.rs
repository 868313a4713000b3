//! Path validation and helpers.
//!
//! Names produced from user templates are joined onto a destination
//! directory. [`validate`] makes sure such a name can never point outside of
//! that directory, and [`common_ancestor`] finds the directory that holds
//! an entire batch of destinations.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a path that is meant to be relative to some root.
///
/// - `.` components, empty components and any leading root are dropped, so
///   `/scans/001.jpg` becomes `scans/001.jpg`.
/// - `..` is resolved against the components seen so far and must never climb
///   above the root.
/// - Null bytes and platform prefixes (`C:`) are rejected.
/// - A path that normalizes to nothing is rejected.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use debrother_storage::validate_path;
///
/// assert_eq!(validate_path("2024/001.jpg").unwrap(), Path::new("2024/001.jpg"));
/// assert_eq!(validate_path("/home/me/scan.jpg").unwrap(), Path::new("home/me/scan.jpg"));
/// assert_eq!(validate_path("a/../b.jpg").unwrap(), Path::new("b.jpg"));
/// assert!(validate_path("../b.jpg").is_err());
/// assert!(validate_path("").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(s) => {
                // Survives Path::components() on Unix, truncates in syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(invalid());
                }
                components.push(s);
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(invalid());
    }
    Ok(components.into_iter().collect())
}

/// Longest leading run of components shared by every path.
///
/// Returns `None` for an empty input, or when the paths share nothing at all
/// (two relative paths starting with different names).
///
/// ```
/// use std::path::Path;
/// use debrother_storage::common_ancestor;
///
/// let paths = [Path::new("/out/2024/001.jpg"), Path::new("/out/002.jpg")];
/// assert_eq!(common_ancestor(paths).unwrap(), Path::new("/out"));
/// ```
pub fn common_ancestor<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
    let mut paths = paths.into_iter();
    let mut shared: Vec<Component<'a>> = paths.next()?.components().collect();
    for path in paths {
        let matching = shared.iter().zip(path.components()).take_while(|(a, b)| **a == *b).count();
        shared.truncate(matching);
    }
    match shared.is_empty() {
        true => None,
        false => Some(shared.into_iter().collect()),
    }
}
