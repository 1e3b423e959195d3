// Typed failure kinds.
//
// Most functions return anyhow::Result with context attached, but the
// failures a caller may want to tell apart are raised as PapersError so they
// can be recovered with `err.downcast_ref::<PapersError>()`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PapersError {
    /// Unknown conference, unsupported year, or an unrecognized embedding
    /// option. Raised before any network call or computation.
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// `save_records` was called with nothing collected.
    #[error("No papers collected for {conference} {year}; run collect() before saving")]
    EmptyCollection { conference: String, year: u16 },

    /// The loader matched zero stored tables.
    #[error("No paper data found in {}", path.display())]
    NoDataFound { path: PathBuf },

    /// A single paper page or lookup could not be fetched or parsed.
    /// Collectors log and skip these; they never abort a run.
    #[error("Failed to fetch {url}: {reason}")]
    ItemFetch { url: String, reason: String },

    /// A stored table whose columns disagree in length.
    #[error("Corrupt paper table {}: {reason}", path.display())]
    CorruptTable { path: PathBuf, reason: String },
}

impl PapersError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        PapersError::UnsupportedConfiguration(message.into())
    }
}

/// True when `err` (or anything in its context chain) is an
/// `UnsupportedConfiguration` error.
pub fn is_unsupported(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<PapersError>(),
        Some(PapersError::UnsupportedConfiguration(_))
    )
}
