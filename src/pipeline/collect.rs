// Collection pipeline: enumerate one conference year, then persist it.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::collect::make_collector;
use crate::collect::traits::{CollectionReport, Collector};
use crate::config::Config;
use crate::papers::models::Conference;
use crate::papers::store::SaveReport;

/// What one collection run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOutcome {
    pub collection: CollectionReport,
    pub saved: SaveReport,
}

/// Collect `conference`/`year` over HTTP and save it under `data_path`.
pub async fn run(
    conference: Conference,
    year: u16,
    config: &Config,
    data_path: &Path,
    min_abstract_len: usize,
) -> Result<CollectOutcome> {
    let mut collector = make_collector(conference, year, config)?;
    run_with(collector.as_mut(), data_path, min_abstract_len).await
}

/// Drive an already-built collector through collect and save.
pub async fn run_with(
    collector: &mut dyn Collector,
    data_path: &Path,
    min_abstract_len: usize,
) -> Result<CollectOutcome> {
    info!(
        conference = %collector.conference(),
        year = collector.year(),
        "Collecting papers"
    );
    let collection = collector.collect().await?;
    let saved = collector.save_records(data_path, min_abstract_len)?;
    Ok(CollectOutcome { collection, saved })
}
