use regex::Regex;

/// Scanner output naming: `<prefix>_<yyyymmdd>[_<page>][ (<batch>)].<ext>`.
///
/// The page suffix is appended by the scanner software when several pages are
/// scanned on the same day; the parenthesised batch suffix is appended by the
/// operating system when a second pass (typically the verso sides) produces
/// names that already exist.
pub const SCANNER_PATTERN: &str =
    r"^(?P<base>.+_(?P<date>[0-9]{8}))(?:_(?P<page>[0-9]+))?(?:\s\((?P<batch>[0-9]+)\))?\.(?P<ext>\w+)$";

/// The fields of a filename that follows the scanner naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanName<'a> {
    /// Everything up to and including the date stamp (`Scan_20190527`).
    pub base: &'a str,
    /// The eight digit date stamp (`20190527`).
    pub date: &'a str,
    /// Page-within-date suffix, when present.
    pub page: Option<u64>,
    /// Duplicate-batch suffix, when present.
    pub batch: Option<u64>,
    pub extension: &'a str,
}

/// Recognizes scan batch files from their filename alone.
///
/// Owns its compiled pattern; build one per scanner rather than sharing a
/// global.
#[derive(Debug, Clone)]
pub struct NamingConvention {
    pattern: Regex,
}
impl NamingConvention {
    pub fn new() -> Self {
        // Constant pattern, covered by tests.
        Self { pattern: Regex::new(SCANNER_PATTERN).unwrap() }
    }

    /// Whether `filename` (not a full path) belongs to a scan batch.
    pub fn matches(&self, filename: &str) -> bool {
        self.pattern.is_match(filename)
    }

    /// Split a matching `filename` into its fields.
    pub fn parse<'a>(&self, filename: &'a str) -> Option<ScanName<'a>> {
        let captures = self.pattern.captures(filename)?;
        Some(ScanName {
            base: captures.name("base")?.as_str(),
            date: captures.name("date")?.as_str(),
            page: captures.name("page").and_then(|m| m.as_str().parse().ok()),
            batch: captures.name("batch").and_then(|m| m.as_str().parse().ok()),
            extension: captures.name("ext")?.as_str(),
        })
    }
}
impl Default for NamingConvention {
    fn default() -> Self {
        Self::new()
    }
}
