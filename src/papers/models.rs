// Data models: the records that flow from collectors to the visualizer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PapersError;

/// One accepted paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub year: u16,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Conference tag, e.g. "cvpr"
    pub conference: String,
    /// Acceptance status text. Only ICLR records carry one.
    pub decision: Option<String>,
}

impl PaperRecord {
    /// Abstract length in characters (not bytes).
    pub fn abstract_len(&self) -> usize {
        self.abstract_text.chars().count()
    }

    pub fn is_rejected(&self) -> bool {
        self.decision.as_deref() == Some("Reject")
    }
}

/// Conference families with a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conference {
    Cvpr,
    Iclr,
}

impl Conference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conference::Cvpr => "cvpr",
            Conference::Iclr => "iclr",
        }
    }
}

impl fmt::Display for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Conference {
    type Err = PapersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cvpr" => Ok(Conference::Cvpr),
            "iclr" => Ok(Conference::Iclr),
            other => Err(PapersError::unsupported(format!(
                "unknown conference '{other}' (expected cvpr or iclr)"
            ))),
        }
    }
}

/// In-memory table of papers, in file-discovery then append order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    papers: Vec<PaperRecord>,
}

impl Corpus {
    pub fn new(papers: Vec<PaperRecord>) -> Self {
        Self { papers }
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn papers(&self) -> &[PaperRecord] {
        &self.papers
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.papers.iter().map(|p| p.title.as_str())
    }

    /// `"{title} {abstract}"` per row, the text the embedder vectorizes.
    pub fn title_and_abstracts(&self) -> Vec<String> {
        self.papers
            .iter()
            .map(|p| format!("{} {}", p.title, p.abstract_text))
            .collect()
    }

    pub fn into_papers(self) -> Vec<PaperRecord> {
        self.papers
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a PaperRecord;
    type IntoIter = std::slice::Iter<'a, PaperRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.papers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conference_parses_case_insensitively() {
        assert_eq!("CVPR".parse::<Conference>().unwrap(), Conference::Cvpr);
        assert_eq!(" iclr ".parse::<Conference>().unwrap(), Conference::Iclr);
    }

    #[test]
    fn unknown_conference_is_unsupported() {
        let err = "neurips".parse::<Conference>().unwrap_err();
        assert!(matches!(err, PapersError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn abstract_len_counts_chars() {
        let paper = PaperRecord {
            year: 2023,
            title: "t".to_string(),
            abstract_text: "é".repeat(10),
            conference: "cvpr".to_string(),
            decision: None,
        };
        assert_eq!(paper.abstract_len(), 10);
    }
}
