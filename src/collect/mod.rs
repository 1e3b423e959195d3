// Paper collection: one collector per conference family.
//
// Both collectors fetch sequentially through a PageFetcher and keep their
// records in instance state until `save_records` writes them out.

pub mod cvpr;
pub mod fetcher;
pub mod iclr;
pub mod traits;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::papers::models::Conference;
use cvpr::CvprCollector;
use fetcher::{parse_base_url, HttpFetcher};
use iclr::IclrCollector;
use traits::Collector;

/// Build the collector for `conference`/`year` over a fresh HTTP fetcher.
///
/// Unsupported years fail here with `UnsupportedConfiguration`, before any
/// request is sent.
pub fn make_collector(
    conference: Conference,
    year: u16,
    config: &Config,
) -> Result<Box<dyn Collector>> {
    let fetcher = HttpFetcher::new(config.request_timeout)?;
    let collector: Box<dyn Collector> = match conference {
        Conference::Cvpr => Box::new(CvprCollector::new(
            fetcher,
            parse_base_url(&config.cvpr_base_url)?,
            year,
        )?),
        Conference::Iclr => Box::new(IclrCollector::new(
            fetcher,
            parse_base_url(&config.openreview_api_url)?,
            year,
        )?),
    };
    Ok(collector)
}

/// Progress bar for per-paper fetching.
pub(crate) fn progress_bar(len: usize, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template(&format!("  {label} [{{bar:30}}] {{pos}}/{{len}} ({{eta}})"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
