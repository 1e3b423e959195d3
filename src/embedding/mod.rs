// Document embedding: TF-IDF vectors projected to two dimensions.
//
// The projection is either UMAP (neighbourhood graph layout) or t-SNE
// (stochastic neighbour embedding). Every option is validated up front, so
// a bad mode, mapping or parameter fails before any work is done.

pub mod neighbors;
pub mod tsne;
pub mod umap;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use tracing::info;

use crate::error::PapersError;
use crate::topics::tfidf::TfidfVectorizer;
pub use neighbors::Metric;

/// 2-D coordinates, one per input text, in input order.
pub type Embedding = Vec<[f64; 2]>;

/// How texts are turned into vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    Tfidf,
}

impl FromStr for EmbeddingMode {
    type Err = PapersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfidf" => Ok(EmbeddingMode::Tfidf),
            other => Err(PapersError::unsupported(format!(
                "unknown embedding mode '{other}' (expected tfidf)"
            ))),
        }
    }
}

/// How vectors are projected to 2-D.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    Umap,
    Tsne,
}

impl FromStr for Mapping {
    type Err = PapersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "umap" => Ok(Mapping::Umap),
            "tsne" => Ok(Mapping::Tsne),
            other => Err(PapersError::unsupported(format!(
                "unknown mapping '{other}' (expected umap or tsne)"
            ))),
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapping::Umap => write!(f, "umap"),
            Mapping::Tsne => write!(f, "tsne"),
        }
    }
}

/// t-SNE step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LearningRate {
    /// `max(n / early_exaggeration / 4, 50)`
    Auto,
    Fixed(f64),
}

impl FromStr for LearningRate {
    type Err = PapersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(LearningRate::Auto);
        }
        match s.parse::<f64>() {
            Ok(rate) if rate.is_finite() && rate > 0.0 => Ok(LearningRate::Fixed(rate)),
            _ => Err(PapersError::unsupported(format!(
                "invalid learning rate '{s}' (expected auto or a positive number)"
            ))),
        }
    }
}

/// t-SNE initialization. Only random initialization is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Init {
    Random,
}

impl FromStr for Init {
    type Err = PapersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Init::Random),
            other => Err(PapersError::unsupported(format!(
                "unknown init '{other}' (expected random)"
            ))),
        }
    }
}

/// Projection options. UMAP reads the neighbourhood fields, t-SNE the rest.
#[derive(Debug, Clone)]
pub struct EmbedParams {
    pub n_neighbors: usize,
    pub min_dist: f64,
    pub metric: Metric,
    pub learning_rate: LearningRate,
    pub init: Init,
    pub perplexity: f64,
    /// Seed for the random initialization and negative sampling
    pub seed: u64,
    /// UMAP epochs; `None` picks by corpus size
    pub n_epochs: Option<usize>,
    /// t-SNE iterations
    pub max_iter: usize,
}

impl Default for EmbedParams {
    fn default() -> Self {
        Self {
            n_neighbors: 20,
            min_dist: 0.1,
            metric: Metric::Cosine,
            learning_rate: LearningRate::Auto,
            init: Init::Random,
            perplexity: 10.0,
            seed: 42,
            n_epochs: None,
            max_iter: 1000,
        }
    }
}

impl EmbedParams {
    fn validate(&self) -> Result<(), PapersError> {
        if self.n_neighbors < 2 {
            return Err(PapersError::unsupported("n_neighbors must be at least 2"));
        }
        if !(self.min_dist.is_finite() && self.min_dist >= 0.0) {
            return Err(PapersError::unsupported("min_dist must be a non-negative number"));
        }
        if !(self.perplexity.is_finite() && self.perplexity > 0.0) {
            return Err(PapersError::unsupported("perplexity must be positive"));
        }
        Ok(())
    }
}

/// A validated embedding configuration.
#[derive(Debug, Clone)]
pub struct Embedder {
    mode: EmbeddingMode,
    mapping: Mapping,
    params: EmbedParams,
}

impl Embedder {
    /// Parse `mode` and `mapping`; unrecognized values fail with
    /// `UnsupportedConfiguration`.
    pub fn new(mode: &str, mapping: &str, params: EmbedParams) -> Result<Self> {
        let mode: EmbeddingMode = mode.parse()?;
        let mapping: Mapping = mapping.parse()?;
        Self::from_parts(mode, mapping, params)
    }

    pub fn from_parts(mode: EmbeddingMode, mapping: Mapping, params: EmbedParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            mode,
            mapping,
            params,
        })
    }

    /// Vectorize `texts` and project them. Output length and order equal
    /// the input.
    pub fn embed(&self, texts: &[String]) -> Result<Embedding> {
        let vectors = match self.mode {
            EmbeddingMode::Tfidf => TfidfVectorizer::fit_transform(texts).1,
        };

        info!(
            rows = texts.len(),
            mapping = %self.mapping,
            "Projecting documents to 2-D"
        );

        let embedding = match self.mapping {
            Mapping::Umap => umap::fit_transform(
                &vectors,
                &umap::UmapParams {
                    n_neighbors: self.params.n_neighbors,
                    min_dist: self.params.min_dist,
                    metric: self.params.metric,
                    n_epochs: self.params.n_epochs,
                    seed: self.params.seed,
                    ..Default::default()
                },
            ),
            Mapping::Tsne => tsne::fit_transform(
                &vectors,
                &tsne::TsneParams {
                    perplexity: self.params.perplexity,
                    learning_rate: self.params.learning_rate,
                    max_iter: self.params.max_iter,
                    seed: self.params.seed,
                    ..Default::default()
                },
            ),
        };

        Ok(embedding)
    }
}

/// One-shot form of `Embedder::new(..)?.embed(texts)`.
pub fn embed(texts: &[String], mode: &str, mapping: &str, params: EmbedParams) -> Result<Embedding> {
    Embedder::new(mode, mapping, params)?.embed(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_options() {
        assert_eq!("TFIDF".parse::<EmbeddingMode>().unwrap(), EmbeddingMode::Tfidf);
        assert_eq!("umap".parse::<Mapping>().unwrap(), Mapping::Umap);
        assert_eq!("tsne".parse::<Mapping>().unwrap(), Mapping::Tsne);
        assert_eq!("auto".parse::<LearningRate>().unwrap(), LearningRate::Auto);
        assert_eq!("200".parse::<LearningRate>().unwrap(), LearningRate::Fixed(200.0));
        assert_eq!("random".parse::<Init>().unwrap(), Init::Random);
    }

    #[test]
    fn rejects_unknown_options() {
        assert!("bert".parse::<EmbeddingMode>().is_err());
        assert!("pca".parse::<Mapping>().is_err());
        assert!("-3".parse::<LearningRate>().is_err());
        assert!("pca".parse::<Init>().is_err());
    }

    #[test]
    fn invalid_params_are_unsupported() {
        let params = EmbedParams {
            n_neighbors: 1,
            ..Default::default()
        };
        let err = Embedder::new("tfidf", "umap", params).unwrap_err();
        assert!(crate::error::is_unsupported(&err));
    }
}
