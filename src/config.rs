use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default CVF open-access site (CVPR listings and paper pages).
pub const DEFAULT_CVPR_BASE_URL: &str = "https://openaccess.thecvf.com";

/// Default OpenReview API v1 endpoint (ICLR submissions and decisions).
pub const DEFAULT_OPENREVIEW_API_URL: &str = "https://api.openreview.net";

/// Abstracts shorter than this many characters are dropped before saving.
pub const DEFAULT_MIN_ABSTRACT_LEN: usize = 200;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. Every value has a
/// default, and CLI flags override whatever is loaded here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the stored `<conference>_<year>.json` tables
    pub data_path: PathBuf,
    /// Directory the rendered maps are written to
    pub results_path: PathBuf,
    pub min_abstract_len: usize,
    pub cvpr_base_url: String,
    pub openreview_api_url: String,
    /// Per-request timeout for the HTTP fetcher
    pub request_timeout: Duration,
    /// TrueType font used for map labels. When unset, common system
    /// locations are searched.
    pub font_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./papers_info"),
            results_path: PathBuf::from("./results"),
            min_abstract_len: DEFAULT_MIN_ABSTRACT_LEN,
            cvpr_base_url: DEFAULT_CVPR_BASE_URL.to_string(),
            openreview_api_url: DEFAULT_OPENREVIEW_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            font_path: None,
        }
    }
}

impl Config {
    /// Load only the path settings (data, results, font). Never fails;
    /// the collection settings keep their defaults.
    pub fn load_paths() -> Self {
        let defaults = Self::default();
        Self {
            data_path: env::var("PAPERS_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            results_path: env::var("PAPERS_RESULTS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.results_path),
            font_path: env::var("PAPERS_FONT_PATH").ok().map(PathBuf::from),
            ..defaults
        }
    }

    /// Load the full configuration from environment variables, falling
    /// back to the defaults for anything unset.
    pub fn load() -> Result<Self> {
        let paths = Self::load_paths();

        let min_abstract_len = match env::var("PAPERS_MIN_ABSTRACT_LEN") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PAPERS_MIN_ABSTRACT_LEN is not a number: {raw}"))?,
            Err(_) => paths.min_abstract_len,
        };

        let request_timeout = match env::var("PAPERS_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("PAPERS_REQUEST_TIMEOUT_SECS is not a number: {raw}"))?,
            ),
            Err(_) => paths.request_timeout,
        };

        Ok(Self {
            min_abstract_len,
            cvpr_base_url: env::var("CVPR_BASE_URL").unwrap_or(paths.cvpr_base_url.clone()),
            openreview_api_url: env::var("OPENREVIEW_API_URL")
                .unwrap_or(paths.openreview_api_url.clone()),
            request_timeout,
            ..paths
        })
    }
}
