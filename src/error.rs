//! Command line error types.

use debrother_config::error::{Error as SettingsError, ErrorKind as SettingsErrorKind};
use debrother_library::error::{Error as LibraryError, ErrorKind as LibraryErrorKind};
use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("{_0}")]
    Settings(SettingsErrorKind),
    #[display("{_0}")]
    Library(LibraryErrorKind),
    /// Standard output went away (closed pipe, full disk).
    #[display("cannot write output")]
    Output,
}

impl ErrorKind {
    #[track_caller]
    pub fn settings(err: SettingsError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Settings(inner))
    }

    #[track_caller]
    pub fn library(err: LibraryError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Library(inner))
    }

    /// Whether running the same command again could succeed once the
    /// filesystem problem is fixed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Settings(kind) => kind.is_retryable(),
            Self::Library(kind) => kind.is_retryable(),
            Self::Output => false,
        }
    }
}
