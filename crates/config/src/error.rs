//! Config Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A settings error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for settings operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Display, Error)]
pub enum ErrorKind {
    /// No home directory, so no platform configuration directory either.
    #[display("cannot determine the configuration directory")]
    ConfigDir,
    /// The settings file or environment holds values of the wrong shape.
    #[display("cannot load settings from {}", _0.display())]
    Load(#[error(not(source))] PathBuf),
    #[display("cannot save settings to {}", _0.display())]
    Save(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Save(_))
    }
}
