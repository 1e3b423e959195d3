// CorpusLoader: gather stored tables into one filtered Corpus.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::models::{Corpus, PaperRecord};
use super::store::{self, TABLE_EXTENSION};
use crate::error::PapersError;

/// Which rows to load. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusQuery {
    pub conference: Option<String>,
    pub year: Option<u16>,
}

impl CorpusQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn conference(mut self, conference: impl Into<String>) -> Self {
        let conference = conference.into();
        self.conference = (!conference.eq_ignore_ascii_case("all")).then_some(conference);
        self
    }

    pub fn year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }
}

/// Stored table files under `data_dir` matching `<conference>_*.json`
/// (or every `*.json` table when no conference is given), sorted by name.
pub fn matching_tables(data_dir: &Path, conference: Option<&str>) -> Result<Vec<PathBuf>> {
    if !data_dir.is_dir() {
        return Ok(Vec::new());
    }

    let prefix = conference.map(|c| format!("{}_", c.to_ascii_lowercase()));

    let mut files = Vec::new();
    for entry in fs::read_dir(data_dir)
        .with_context(|| format!("Failed to list {}", data_dir.display()))?
    {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(TABLE_EXTENSION) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if prefix.as_deref().is_none_or(|p| name.starts_with(p)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every matching table, drop rejected papers, then apply the year filter.
///
/// Fails with `NoDataFound` when no table matches.
pub fn load(data_dir: &Path, query: &CorpusQuery) -> Result<Corpus> {
    let files = matching_tables(data_dir, query.conference.as_deref())?;
    if files.is_empty() {
        return Err(PapersError::NoDataFound {
            path: data_dir.to_path_buf(),
        }
        .into());
    }

    let mut papers: Vec<PaperRecord> = Vec::new();
    for file in &files {
        let rows = store::read_table(file)?;
        debug!(file = %file.display(), rows = rows.len(), "Loaded paper table");
        papers.extend(rows);
    }

    let total = papers.len();
    papers.retain(|p| !p.is_rejected());
    let rejected = total - papers.len();

    if let Some(year) = query.year {
        papers.retain(|p| p.year == year);
    }

    info!(
        files = files.len(),
        papers = papers.len(),
        rejected,
        "Corpus loaded"
    );

    Ok(Corpus::new(papers))
}
