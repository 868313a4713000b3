//! Template Error Types
//!
//! Every variant is detected while compiling a template, before any file is
//! read or written. Kinds are `Clone` so that the library error can carry the
//! kind while keeping the original frame as a child.

use derive_more::{Display, Error};

/// A template error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for template compilation and rendering.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The field names something that is not a known placeholder.
    #[display("unknown placeholder `{{{_0}}}`")]
    UnknownPlaceholder(#[error(not(source))] String),
    /// The format spec is malformed or its type does not suit the placeholder.
    #[display("format spec `{spec}` is not valid for placeholder `{placeholder}`")]
    UnsupportedFormat {
        placeholder: &'static str,
        spec: String,
    },
    /// Brace structure or field syntax is wrong.
    #[display("{reason} at position {position}")]
    Syntax { position: usize, reason: &'static str },
    /// The rendered path is empty or escapes the destination directory.
    #[display("template renders an invalid path: {_0}")]
    InvalidPath(#[error(not(source))] String),
}

impl ErrorKind {
    pub(crate) fn syntax(position: usize, reason: &'static str) -> Self {
        Self::Syntax { position, reason }
    }
}
