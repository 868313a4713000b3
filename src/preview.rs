//! Tabular preview of a rename plan.

use clap::ValueEnum;
use debrother_library::commit::Plan;
use debrother_storage::StorageBackend;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    Index,
    Page,
    Original,
    Renamed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Recto,
    Verso,
}
impl Side {
    fn as_str(self) -> &'static str {
        match self {
            Self::Recto => "recto",
            Self::Verso => "verso",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub index: usize,
    pub page: usize,
    pub sheet: usize,
    pub side: Side,
    pub original: PathBuf,
    pub renamed: PathBuf,
    pub collision: bool,
}

/// One row per planned rename, in page order. Paths are shown relative to the
/// input and output directories when they are inside them.
pub fn rows(plan: &Plan, input: &Path, output: &Path, collisions: &HashSet<&Path>) -> Vec<Row> {
    plan.pairs()
        .enumerate()
        .map(|(index, (source, destination))| Row {
            index,
            page: index + 1,
            sheet: index / 2 + 1,
            side: if index % 2 == 0 { Side::Recto } else { Side::Verso },
            original: relative(source.path(), input),
            renamed: relative(destination, output),
            collision: collisions.contains(destination),
        })
        .collect()
}

fn relative(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

/// Every destination that cannot be written: claimed twice, or already taken.
pub fn collisions<'a>(plan: &'a Plan, backend: &dyn StorageBackend) -> HashSet<&'a Path> {
    let mut found: HashSet<&Path> = plan.duplicates().into_iter().collect();
    for destination in plan.destinations() {
        match backend.exists(destination) {
            Ok(true) => {
                found.insert(destination);
            },
            Ok(false) => {},
            Err(err) => tracing::warn!(destination = %destination.display(), error = ?err, "Cannot check destination"),
        }
    }
    found
}

pub fn sort(rows: &mut [Row], by: SortBy) {
    match by {
        SortBy::Index | SortBy::Page => rows.sort_by_key(|row| row.index),
        SortBy::Original => rows.sort_by(|a, b| a.original.cmp(&b.original)),
        SortBy::Renamed => rows.sort_by(|a, b| a.renamed.cmp(&b.renamed)),
    }
}

pub fn render(rows: &[Row], out: &mut impl Write) -> io::Result<()> {
    let header = ["#", "page", "sheet", "side", "original", "renamed"];
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|row| {
            let mut renamed = row.renamed.display().to_string();
            if row.collision {
                renamed.push_str("  (collision)");
            }
            [
                row.index.to_string(),
                format!("{:04}", row.page),
                row.sheet.to_string(),
                row.side.as_str().to_string(),
                row.original.display().to_string(),
                renamed,
            ]
        })
        .collect();
    let mut widths = header.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }
    write_line(out, &header, &widths)?;
    let rule = widths.map(|width| "-".repeat(width));
    write_line(out, &rule, &widths)?;
    for line in &cells {
        write_line(out, line, &widths)?;
    }
    Ok(())
}

fn write_line(out: &mut impl Write, cells: &[impl AsRef<str>], widths: &[usize]) -> io::Result<()> {
    let mut line = String::new();
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        // Numbers right, text left.
        if i < 3 {
            line.push_str(&format!("{:>width$}", cell.as_ref()));
        } else {
            line.push_str(&format!("{:<width$}", cell.as_ref()));
        }
    }
    writeln!(out, "{}", line.trim_end())
}
