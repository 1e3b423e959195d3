// RecordStore: one columnar JSON table per (conference, year).
//
// Layout of `<dir>/<conference>_<year>.json`:
//
//   {"year": [..], "title": [..], "abstract": [..], "conference": [..],
//    "decision": [..]}
//
// The decision column is written only when some record carries a decision,
// so CVPR tables have four columns and ICLR tables five.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::models::PaperRecord;
use crate::error::PapersError;

/// Extension of stored tables.
pub const TABLE_EXTENSION: &str = "json";

/// Outcome of a save: where the table went and how many rows survived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub path: PathBuf,
    pub kept: usize,
    pub dropped: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PaperTable {
    year: Vec<u16>,
    title: Vec<String>,
    #[serde(rename = "abstract")]
    abstract_text: Vec<String>,
    conference: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    decision: Option<Vec<Option<String>>>,
}

impl PaperTable {
    fn from_records(records: &[PaperRecord]) -> Self {
        let has_decision = records.iter().any(|r| r.decision.is_some());
        Self {
            year: records.iter().map(|r| r.year).collect(),
            title: records.iter().map(|r| r.title.clone()).collect(),
            abstract_text: records.iter().map(|r| r.abstract_text.clone()).collect(),
            conference: records.iter().map(|r| r.conference.clone()).collect(),
            decision: has_decision.then(|| records.iter().map(|r| r.decision.clone()).collect()),
        }
    }

    fn into_records(self, path: &Path) -> Result<Vec<PaperRecord>> {
        let rows = self.year.len();
        let mut lengths = vec![
            ("title", self.title.len()),
            ("abstract", self.abstract_text.len()),
            ("conference", self.conference.len()),
        ];
        if let Some(decision) = &self.decision {
            lengths.push(("decision", decision.len()));
        }
        if let Some((column, len)) = lengths.into_iter().find(|(_, len)| *len != rows) {
            return Err(PapersError::CorruptTable {
                path: path.to_path_buf(),
                reason: format!("column '{column}' has {len} rows, 'year' has {rows}"),
            }
            .into());
        }

        let decisions = self.decision.unwrap_or_else(|| vec![None; rows]);

        Ok(self
            .year
            .into_iter()
            .zip(self.title)
            .zip(self.abstract_text)
            .zip(self.conference)
            .zip(decisions)
            .map(|((((year, title), abstract_text), conference), decision)| PaperRecord {
                year,
                title,
                abstract_text,
                conference,
                decision,
            })
            .collect())
    }
}

/// Path of the table for one (conference, year).
pub fn table_path(dir: &Path, conference: &str, year: u16) -> PathBuf {
    dir.join(format!("{conference}_{year}.{TABLE_EXTENSION}"))
}

/// Filter `records` by abstract length and write them to
/// `<output_dir>/<conference>_<year>.json`.
///
/// Fails with `EmptyCollection` (writing nothing) when `records` is empty.
pub fn save(
    records: &[PaperRecord],
    conference: &str,
    year: u16,
    output_dir: &Path,
    min_abstract_len: usize,
) -> Result<SaveReport> {
    if records.is_empty() {
        return Err(PapersError::EmptyCollection {
            conference: conference.to_string(),
            year,
        }
        .into());
    }

    let kept: Vec<PaperRecord> = records
        .iter()
        .filter(|r| r.abstract_len() >= min_abstract_len)
        .cloned()
        .collect();
    let dropped = records.len() - kept.len();

    info!(
        dropped,
        min_abstract_len,
        "Removing submissions with short abstracts"
    );

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create data directory {}", output_dir.display()))?;

    let path = table_path(output_dir, conference, year);
    let json = serde_json::to_string(&PaperTable::from_records(&kept))
        .context("Failed to serialize paper table")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), kept = kept.len(), "Paper table saved");

    Ok(SaveReport {
        path,
        kept: kept.len(),
        dropped,
    })
}

/// Read one stored table back into records, in stored row order.
pub fn read_table(path: &Path) -> Result<Vec<PaperRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read paper table {}", path.display()))?;
    let table: PaperTable = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse paper table {}", path.display()))?;
    table.into_records(path)
}
