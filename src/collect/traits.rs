// Collector trait: one implementation per conference family.
//
// A collector gathers papers for a single (conference, year) into its own
// record list, then hands that list to the RecordStore. The CVPR and ICLR
// collectors share nothing but this interface.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::papers::models::{Conference, PaperRecord};
use crate::papers::store::{self, SaveReport};

/// Counts from one `collect()` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Candidate papers enumerated from the listing or API
    pub found: usize,
    /// Papers kept as records
    pub collected: usize,
    /// Candidates skipped: missing pages, failed lookups, malformed
    /// entries, or (ICLR) non-accepted decisions
    pub skipped: usize,
}

#[async_trait]
pub trait Collector: Send {
    fn conference(&self) -> Conference;

    fn year(&self) -> u16;

    /// Enumerate the year's papers and accumulate records.
    ///
    /// Per-paper failures are logged and skipped; a failure enumerating
    /// the listing itself is returned as an error.
    async fn collect(&mut self) -> Result<CollectionReport>;

    /// Records accumulated so far.
    fn records(&self) -> &[PaperRecord];

    /// Write the accumulated records to `<output_dir>/<conference>_<year>.json`,
    /// dropping abstracts shorter than `min_abstract_len` characters.
    fn save_records(&self, output_dir: &Path, min_abstract_len: usize) -> Result<SaveReport> {
        store::save(
            self.records(),
            self.conference().as_str(),
            self.year(),
            output_dir,
            min_abstract_len,
        )
    }
}
