//! Output path templating.
//!
//! Turns a position in the final page order into a destination path, using a
//! naming template such as `{yyyy}-{mm}-{dd}/{page:03d}.{ext}`. Templates use
//! the brace syntax of Python's `str.format` (the scanner workflow this tool
//! replaces was configured that way), restricted to named fields.
//!
//! # Placeholders
//!
//! | Placeholder | Type    | Description                                |
//! |-------------|---------|--------------------------------------------|
//! | `index`     | integer | position in the final order, starting at 0 |
//! | `page`      | integer | position in the final order, starting at 1 |
//! | `yyyy`      | integer | current year                               |
//! | `mm`        | integer | current month                              |
//! | `dd`        | integer | current day of the month                   |
//! | `original`  | text    | full path of the scanned file              |
//! | `filename`  | text    | file name with extension                   |
//! | `basename`  | text    | file name without extension                |
//! | `ext`       | text    | extension without the leading dot          |
//!
//! Format specs follow `[[fill]align][0][width][type]`: `{page:03d}` renders
//! page 7 as `007`, `{ext:>5}` right-aligns the extension.
//!
//! # Example
//!
//! ```
//! use debrother_library::PathGenerator;
//! use debrother_library::models::ScanFile;
//! use std::path::Path;
//! use time::macros::date;
//!
//! let generator: PathGenerator = "{yyyy}/{page:03d}.{ext}".parse().unwrap();
//! let file = ScanFile::from("in/Scan_20190527_2.jpg");
//! let path = generator.generate(&file, 6, date!(2024 - 01 - 31)).unwrap();
//! assert_eq!(path, Path::new("2024/007.jpg"));
//! ```

pub mod error;
mod parser;
mod placeholder;

pub use self::placeholder::Placeholder;
use self::error::{Error, ErrorKind, Result};
use self::parser::Segment;
use crate::models::ScanFile;
use debrother_storage::validate_path;
use exn::ResultExt;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use time::{Date, OffsetDateTime};
use tracing::instrument;

/// File the template is rendered against while compiling, so that a template
/// that can only ever produce an invalid path is rejected up front.
pub const SAMPLE_FILE: &str = "sample/sample.png";

/// Generates destination paths from a compiled naming template.
///
/// Constructed via [`FromStr`], which parses the template eagerly and
/// dry-runs it so that every template error surfaces before any file is
/// touched. The compiled template is reusable across many
/// [`generate`](Self::generate) calls.
#[derive(Debug, Clone)]
pub struct PathGenerator {
    source: String,
    segments: Vec<Segment>,
}
impl FromStr for PathGenerator {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let generator = Self { source: s.to_string(), segments: parser::parse(s)? };
        // Fail fast: a template that renders nothing, or only `..`, is never useful.
        generator.generate(&ScanFile::from(SAMPLE_FILE), 0, today())?;
        Ok(generator)
    }
}
impl fmt::Display for PathGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
impl PathGenerator {
    /// Substitutes every placeholder, without any path normalization.
    pub fn render(&self, file: &ScanFile, position: usize, date: Date) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { placeholder, spec } => {
                    spec.render(&placeholder.resolve(file, position, date), &mut out);
                },
            }
        }
        out
    }

    /// Renders the template for the file at `position` (0-based) and
    /// normalizes the result into a path relative to the destination
    /// directory.
    ///
    /// Leading separators are dropped (an absolute `{original}` is re-rooted)
    /// and `..` may never climb out of the destination.
    pub fn generate(&self, file: &ScanFile, position: usize, date: Date) -> Result<PathBuf> {
        let rendered = self.render(file, position, date);
        validate_path(&rendered).or_raise(|| ErrorKind::InvalidPath(rendered.clone()))
    }

    /// Destination path for every file, in order, under `destination`.
    #[instrument(skip_all, fields(template = %self.source, destination = %destination.display(), files = files.len()))]
    pub fn resolve(&self, files: &[ScanFile], destination: &Path, date: Date) -> Result<Vec<PathBuf>> {
        files
            .iter()
            .enumerate()
            .map(|(position, file)| self.generate(file, position, date).map(|path| destination.join(path)))
            .collect()
    }
}

/// Today's date in the local timezone, or UTC when the local offset cannot be
/// determined (which `time` refuses to do in multi-threaded processes on some
/// platforms).
pub fn today() -> Date {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()).date()
}
