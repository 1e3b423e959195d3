// Visualization pipeline: load → keywords → embed → plan → render.
//
// The embedding options are validated before the corpus is read, so an
// unknown mode or mapping fails without touching the data directory and
// without writing an image.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::embedding::{EmbedParams, Embedder};
use crate::papers::loader::{self, CorpusQuery};
use crate::papers::models::Corpus;
use crate::topics::keywords::KeywordExtractor;
use crate::visualize::{self, MapLayout};

/// Everything one `visualize` run needs.
#[derive(Debug, Clone)]
pub struct VisualizeRequest {
    pub data_path: PathBuf,
    pub query: CorpusQuery,
    pub mode: String,
    pub mapping: String,
    pub params: EmbedParams,
    /// `None` shows the map instead of saving it
    pub output_dir: Option<PathBuf>,
    pub title: String,
    pub font_path: Option<PathBuf>,
}

/// A planned map, ready to render.
#[derive(Debug, Clone)]
pub struct PreparedMap {
    pub corpus: Corpus,
    pub keywords: Vec<String>,
    pub layout: MapLayout,
}

/// Load, extract keywords, embed and plan, without drawing.
pub fn prepare(request: &VisualizeRequest) -> Result<PreparedMap> {
    let embedder = Embedder::new(&request.mode, &request.mapping, request.params.clone())?;

    let corpus = loader::load(&request.data_path, &request.query)?;
    let keywords = KeywordExtractor::default().extract(&corpus);
    let embedding = embedder.embed(&corpus.title_and_abstracts())?;
    let layout = visualize::plan(&corpus, &embedding, &keywords)?;

    Ok(PreparedMap {
        corpus,
        keywords,
        layout,
    })
}

/// Prepare and render. Returns the map alongside the written image.
pub fn run(request: &VisualizeRequest) -> Result<(PreparedMap, PathBuf)> {
    let prepared = prepare(request)?;
    let path = visualize::render(
        &prepared.layout,
        request.output_dir.as_deref(),
        &request.title,
        request.font_path.as_deref(),
    )?;
    info!(
        papers = prepared.corpus.len(),
        keywords = prepared.keywords.len(),
        path = %path.display(),
        "Visualization complete"
    );
    Ok((prepared, path))
}

/// Keywords for the stored corpus matching `query`.
pub fn keywords(data_path: &Path, query: &CorpusQuery) -> Result<(Corpus, Vec<String>)> {
    let corpus = loader::load(data_path, query)?;
    let keywords = KeywordExtractor::default().extract(&corpus);
    Ok((corpus, keywords))
}
