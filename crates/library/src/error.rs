//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. The kinds form a closed set: callers
//! match on them to decide what to tell the user, and the storage error that
//! caused them (if any) is kept as a child frame.

use crate::template::error::{Error as TemplateError, ErrorKind as TemplateErrorKind};
use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every way the discover → reorder → resolve → commit pipeline can fail.
///
/// ### Before any file is touched
/// - [`ErrorKind::Discovery`]
/// - [`ErrorKind::Template`]
/// - [`ErrorKind::Collision`]
/// - [`ErrorKind::Mismatch`]
///
/// ### During the rename transaction
/// - [`ErrorKind::ReadFailure`]: nothing was written to the destination tree.
/// - [`ErrorKind::WriteFailure`]: everything written so far was rolled back.
#[derive(Debug, Clone, Display, Error)]
pub enum ErrorKind {
    /// The input directory is missing, not a directory, or unreadable.
    #[display("cannot discover scans in {}", _0.display())]
    Discovery(#[error(not(source))] PathBuf),
    /// The naming template is malformed or names an unknown placeholder.
    #[display("invalid naming template: {_0}")]
    Template(TemplateErrorKind),
    /// A source file could not be staged.
    #[display("cannot read {}", _0.display())]
    ReadFailure(#[error(not(source))] PathBuf),
    /// A staged file could not be moved to its destination.
    #[display("cannot write {}", _0.display())]
    WriteFailure(#[error(not(source))] PathBuf),
    /// A destination is claimed by two files, or is already taken on disk.
    #[display("destination collision: {}", _0.display())]
    Collision(#[error(not(source))] PathBuf),
    /// Sources and destinations were not paired one to one.
    #[display("{sources} source files but {destinations} destinations")]
    Mismatch { sources: usize, destinations: usize },
}

impl ErrorKind {
    /// Convert a template error into a library error, keeping the template
    /// kind (which names the offending placeholder) inspectable on the outer
    /// error and the original frame as a child.
    #[track_caller]
    pub fn template(err: TemplateError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Template(inner))
    }

    /// Returns `true` if retrying might succeed (after fixing whatever made
    /// the file unreadable or unwritable).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ReadFailure(_) | Self::WriteFailure(_))
    }
}
