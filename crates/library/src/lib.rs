//! Re-ordering and renaming of scanner output.
//!
//! A batch goes through four steps, each usable on its own:
//!
//! 1. [`discover`] the files that follow the scanner's naming convention,
//! 2. [`reorder`] them into physical page order,
//! 3. [`resolve_paths`] from a naming template,
//! 4. [`commit`] the renames as a single all-or-nothing transaction.
//!
//! The free functions work on the local filesystem. The types behind them
//! ([`Scanner`](scan::Scanner), [`Sorter`], [`PathGenerator`],
//! [`Plan`](commit::Plan), [`Transaction`](commit::Transaction) and [`Job`])
//! take a [`StorageBackend`](debrother_storage::StorageBackend) instead.

pub mod commit;
pub mod error;
mod job;
pub mod models;
pub mod scan;
pub mod sort;
pub mod template;

use crate::commit::{Outcome, Plan, Transaction};
use crate::error::{ErrorKind, Result};
use crate::models::ScanFile;
use crate::scan::{NamingConvention, Scanner};
use debrother_storage::backend::LocalBackend;
use std::path::{Path, PathBuf};

pub use crate::job::Job;
pub use crate::sort::{SortPolicy, Sorter};
pub use crate::template::{PathGenerator, today};

/// Naming template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "{page:03d}.{ext}";

/// Every scan batch file below `root`, in lexicographic order.
pub fn discover(root: impl AsRef<Path>) -> Result<Vec<ScanFile>> {
    Scanner::new(&LocalBackend::default(), NamingConvention::new()).discover(root.as_ref())
}

/// Put `files` into physical page order according to `policy`.
pub fn reorder(files: Vec<ScanFile>, policy: SortPolicy) -> Vec<ScanFile> {
    Sorter::new(policy).sort(files)
}

/// One destination per file, in order, below `destination`.
///
/// The template is compiled and validated before anything is resolved; dates
/// are today's.
pub fn resolve_paths(files: &[ScanFile], destination: impl AsRef<Path>, template: &str) -> Result<Vec<PathBuf>> {
    let generator: PathGenerator = template.parse().map_err(ErrorKind::template)?;
    generator.resolve(files, destination.as_ref(), today()).map_err(ErrorKind::template)
}

/// Rename `sources` to `destinations` (paired by position) as one transaction.
pub fn commit(sources: Vec<ScanFile>, destinations: Vec<PathBuf>, delete_originals: bool) -> Result<Outcome> {
    let plan = Plan::new(sources, destinations)?;
    Transaction::new(&LocalBackend::default()).delete_originals(delete_originals).commit(&plan)
}
