//! Page order reconstruction.
//!
//! A duplex document scanned on a simplex feeder comes out as two batches:
//! every recto, then every verso (often in reverse). The [`Sorter`] turns the
//! lexicographic file order back into physical page order by applying up to
//! three independent transforms, always in the same sequence:
//!
//! 1. lexicographic baseline (always)
//! 2. numbering: stable sort on the `_<N>` page suffix
//! 3. flip: swap every recto/verso pair
//! 4. backward verso: reverse the verso pages among themselves
//!
//! Every step is a permutation of its input, and total for any length.

use crate::models::ScanFile;
use crate::scan::NamingConvention;

/// Which reordering transforms to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortPolicy {
    /// Re-sort by the scanner's page suffix, so that `_10` comes after `_2`.
    pub numbering: bool,
    /// Swap each pair of adjacent pages.
    pub flip: bool,
    /// The verso batch was scanned back to front.
    pub backward_verso: bool,
}

/// Applies a [`SortPolicy`] to a batch.
#[derive(Debug, Clone)]
pub struct Sorter {
    policy: SortPolicy,
    convention: NamingConvention,
}
impl Sorter {
    pub fn new(policy: SortPolicy) -> Self {
        Self { policy, convention: NamingConvention::new() }
    }

    /// Put `files` into physical page order.
    pub fn sort(&self, mut files: Vec<ScanFile>) -> Vec<ScanFile> {
        files.sort_by(|a, b| a.path().as_os_str().as_encoded_bytes().cmp(b.path().as_os_str().as_encoded_bytes()));
        if self.policy.numbering {
            files.sort_by_cached_key(|file| self.page_number(&file.filename()));
        }
        if self.policy.flip {
            flip(&mut files);
        }
        if self.policy.backward_verso {
            backward_verso(&mut files);
        }
        tracing::debug!(policy = ?self.policy, files = files.len(), "Sorted scan batch");
        files
    }

    /// Page number the scanner appended after the date stamp, 1 when there
    /// is none (the first page of a day carries no suffix).
    pub fn page_number(&self, filename: &str) -> u64 {
        self.convention.parse(filename).and_then(|name| name.page).unwrap_or(1)
    }
}

/// Swap elements `2k` and `2k + 1`; an unpaired last element stays put.
pub fn flip<T>(items: &mut [T]) {
    for pair in items.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

/// Keep even indices in place and reverse the elements at odd indices among
/// themselves.
pub fn backward_verso<T>(items: &mut [T]) {
    let odd = items.len() / 2;
    for i in 0..odd / 2 {
        items.swap(2 * i + 1, 2 * (odd - 1 - i) + 1);
    }
}
