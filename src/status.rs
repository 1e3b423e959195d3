// Stored data status: one line per table under the data directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::warn;

use crate::papers::{loader, store};

/// Summary of one stored `<conference>_<year>.json` table.
#[derive(Debug, Clone)]
pub struct TableStatus {
    pub path: PathBuf,
    pub rows: usize,
    /// Distinct conference values, sorted
    pub conferences: Vec<String>,
    /// Distinct years, sorted
    pub years: Vec<u16>,
    /// Rows marked as rejected
    pub rejected: usize,
    pub modified: Option<DateTime<Local>>,
    pub size_bytes: u64,
}

/// Scan `data_dir` for stored tables. A missing directory yields an empty
/// list; an unreadable table is logged and skipped.
pub fn scan(data_dir: &Path) -> Result<Vec<TableStatus>> {
    let mut tables = Vec::new();
    for path in loader::matching_tables(data_dir, None)? {
        match table_status(&path) {
            Ok(status) => tables.push(status),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable table"),
        }
    }
    Ok(tables)
}

fn table_status(path: &Path) -> Result<TableStatus> {
    let records = store::read_table(path)?;
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?;

    let mut conferences: Vec<String> = records.iter().map(|r| r.conference.clone()).collect();
    conferences.sort();
    conferences.dedup();
    let mut years: Vec<u16> = records.iter().map(|r| r.year).collect();
    years.sort_unstable();
    years.dedup();

    Ok(TableStatus {
        path: path.to_path_buf(),
        rows: records.len(),
        conferences,
        years,
        rejected: records.iter().filter(|r| r.is_rejected()).count(),
        modified: metadata.modified().ok().map(DateTime::<Local>::from),
        size_bytes: metadata.len(),
    })
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
