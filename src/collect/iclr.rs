// ICLR collector: pages through the OpenReview API (v1).
//
// Submissions are listed under the year's Blind_Submission invitation in
// batches of 1000. Each submission's forum thread is then looked up to find
// its decision note, and only accepted papers are kept. The decision text
// ("Accept (Poster)", "Accept (Oral)", ...) is stored with the record.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::fetcher::PageFetcher;
use super::progress_bar;
use super::traits::{CollectionReport, Collector};
use crate::error::PapersError;
use crate::papers::models::{Conference, PaperRecord};

/// Submissions requested per API call.
pub const BATCH_SIZE: usize = 1000;

/// Upper bound on submission batches, in case the API never returns an
/// empty page.
pub const MAX_BATCHES: usize = 100;

/// Years served by the v1 Blind_Submission invitation.
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<u16> = 2018..=2023;

/// Response from `GET /notes`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotesResponse {
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// A single OpenReview note: a submission, review, comment or decision.
#[derive(Debug, Clone, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub forum: String,
    #[serde(default)]
    pub content: serde_json::Map<String, Value>,
}

impl Note {
    /// A content field as text. Accepts both the plain-string form and the
    /// `{"value": "..."}` wrapper newer notes use.
    pub fn content_str(&self, key: &str) -> Option<&str> {
        match self.content.get(key)? {
            Value::String(s) => Some(s.as_str()),
            Value::Object(wrapped) => wrapped.get("value").and_then(Value::as_str),
            _ => None,
        }
    }

    /// The forum (discussion thread) this note belongs to. Submissions are
    /// their own forum, so fall back to the note id.
    pub fn forum_id(&self) -> Option<&str> {
        [self.forum.as_str(), self.id.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
    }
}

/// The decision text of a forum thread: the last note carrying a
/// `decision` field.
pub fn latest_decision(thread: &[Note]) -> Option<String> {
    thread
        .iter()
        .filter_map(|note| note.content_str("decision"))
        .last()
        .map(str::to_string)
}

pub fn is_accepted(decision: &str) -> bool {
    decision.contains("Accept")
}

/// Collects accepted ICLR papers for one year.
pub struct IclrCollector<F: PageFetcher> {
    fetcher: F,
    api_url: Url,
    year: u16,
    papers: Vec<PaperRecord>,
}

impl<F: PageFetcher> IclrCollector<F> {
    /// Fails with `UnsupportedConfiguration` outside the supported years.
    /// No request is made here.
    pub fn new(fetcher: F, api_url: Url, year: u16) -> Result<Self> {
        if !SUPPORTED_YEARS.contains(&year) {
            return Err(PapersError::unsupported(format!(
                "ICLR {year} is not supported (supported years: {}–{})",
                SUPPORTED_YEARS.start(),
                SUPPORTED_YEARS.end()
            ))
            .into());
        }

        Ok(Self {
            fetcher,
            api_url,
            year,
            papers: Vec::new(),
        })
    }

    /// URL of the submission batch starting at `offset`.
    pub fn submissions_url(&self, offset: usize) -> Result<Url> {
        let mut url = self.api_url.join("notes").context("Failed to build notes URL")?;
        url.query_pairs_mut()
            .append_pair(
                "invitation",
                &format!("ICLR.cc/{}/Conference/-/Blind_Submission", self.year),
            )
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &BATCH_SIZE.to_string());
        Ok(url)
    }

    /// URL of every note in the forum thread `forum_id`.
    pub fn forum_url(&self, forum_id: &str) -> Result<Url> {
        let mut url = self.api_url.join("notes").context("Failed to build notes URL")?;
        url.query_pairs_mut().append_pair("forum", forum_id);
        Ok(url)
    }

    /// Page through submissions until an empty batch or the batch cap.
    /// Any failure here is fatal for the run.
    async fn enumerate_submissions(&self) -> Result<Vec<Note>> {
        let mut submissions = Vec::new();

        for batch in 0..MAX_BATCHES {
            let offset = batch * BATCH_SIZE;
            let url = self.submissions_url(offset)?;
            let body = self
                .fetcher
                .fetch_text(&url)
                .await
                .with_context(|| format!("Failed to fetch ICLR {} submissions at offset {offset}", self.year))?;
            let page: NotesResponse = serde_json::from_str(&body)
                .with_context(|| format!("Failed to parse ICLR submissions at offset {offset}"))?;

            debug!(offset, count = page.notes.len(), "Submission batch fetched");

            if page.notes.is_empty() {
                break;
            }
            submissions.extend(page.notes);

            if batch + 1 == MAX_BATCHES {
                warn!(batches = MAX_BATCHES, "Submission batch cap reached, stopping pagination");
            }
        }

        Ok(submissions)
    }

    /// Look up a submission's decision. `Ok(None)` for papers that were not
    /// accepted.
    async fn accepted_record(&self, submission: &Note) -> Result<Option<PaperRecord>, PapersError> {
        let forum_id = submission.forum_id().ok_or_else(|| PapersError::ItemFetch {
            url: self.api_url.to_string(),
            reason: "submission has no forum id".to_string(),
        })?;
        let url = self.forum_url(forum_id).map_err(|e| PapersError::ItemFetch {
            url: self.api_url.to_string(),
            reason: format!("{e:#}"),
        })?;
        let item_error = |reason: String| PapersError::ItemFetch {
            url: url.to_string(),
            reason,
        };

        let body = self
            .fetcher
            .fetch_text(&url)
            .await
            .map_err(|e| item_error(format!("{e:#}")))?;
        let thread: NotesResponse =
            serde_json::from_str(&body).map_err(|e| item_error(format!("invalid forum JSON: {e}")))?;

        let decision = latest_decision(&thread.notes)
            .ok_or_else(|| item_error("no decision in forum".to_string()))?;
        if !is_accepted(&decision) {
            debug!(forum = forum_id, decision = %decision, "Not accepted");
            return Ok(None);
        }

        let title = submission
            .content_str("title")
            .ok_or_else(|| item_error("submission has no title".to_string()))?;
        let abstract_text = submission
            .content_str("abstract")
            .ok_or_else(|| item_error("submission has no abstract".to_string()))?;

        Ok(Some(PaperRecord {
            year: self.year,
            title: title.trim().to_string(),
            abstract_text: abstract_text.trim().to_string(),
            conference: Conference::Iclr.as_str().to_string(),
            decision: Some(decision),
        }))
    }
}

#[async_trait]
impl<F: PageFetcher> Collector for IclrCollector<F> {
    fn conference(&self) -> Conference {
        Conference::Iclr
    }

    fn year(&self) -> u16 {
        self.year
    }

    async fn collect(&mut self) -> Result<CollectionReport> {
        let submissions = self.enumerate_submissions().await?;
        info!(year = self.year, count = submissions.len(), "ICLR submissions found");

        let mut report = CollectionReport {
            found: submissions.len(),
            ..Default::default()
        };

        let pb = progress_bar(submissions.len(), "ICLR");
        for submission in &submissions {
            match self.accepted_record(submission).await {
                Ok(Some(record)) => {
                    self.papers.push(record);
                    report.collected += 1;
                }
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    warn!(error = %e, "Skipping submission");
                    report.skipped += 1;
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            year = self.year,
            collected = report.collected,
            skipped = report.skipped,
            "ICLR collection complete"
        );
        Ok(report)
    }

    fn records(&self) -> &[PaperRecord] {
        &self.papers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(json: &str) -> Note {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn content_str_accepts_both_shapes() {
        let plain = note(r#"{"id": "a", "forum": "a", "content": {"title": "Plain"}}"#);
        assert_eq!(plain.content_str("title"), Some("Plain"));

        let wrapped = note(r#"{"id": "b", "content": {"title": {"value": "Wrapped"}}}"#);
        assert_eq!(wrapped.content_str("title"), Some("Wrapped"));
        assert_eq!(wrapped.content_str("abstract"), None);
    }

    #[test]
    fn forum_id_falls_back_to_note_id() {
        assert_eq!(note(r#"{"id": "x1", "forum": "f1"}"#).forum_id(), Some("f1"));
        assert_eq!(note(r#"{"id": "x1"}"#).forum_id(), Some("x1"));
        assert_eq!(note(r#"{}"#).forum_id(), None);
    }

    #[test]
    fn latest_decision_takes_last_decision_note() {
        let thread: NotesResponse = serde_json::from_str(
            r#"{"notes": [
                {"id": "r1", "content": {"review": "fine"}},
                {"id": "d1", "content": {"decision": "Reject"}},
                {"id": "c1", "content": {"comment": "appeal"}},
                {"id": "d2", "content": {"decision": "Accept (Poster)"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(latest_decision(&thread.notes).as_deref(), Some("Accept (Poster)"));
        assert!(latest_decision(&[]).is_none());
    }

    #[test]
    fn acceptance_is_substring_match() {
        assert!(is_accepted("Accept (Oral)"));
        assert!(is_accepted("Accept: notable-top-5%"));
        assert!(!is_accepted("Reject"));
        assert!(!is_accepted("Invite to Workshop Track"));
    }
}
