// Title keyword extraction.
//
// Counts lowercase whitespace-separated title tokens across the corpus,
// takes the most frequent ones, and drops short tokens plus a stoplist of
// words that appear in nearly every title of the field ("learning",
// "network", ...). The survivors label the map's clusters.

use std::collections::HashMap;

use tracing::info;

use crate::papers::models::Corpus;

/// Words too generic to label a cluster.
pub const STOPLIST: &[&str] = &[
    "learning", "training", "image", "neural", "towards", "models", "model", "network", "networks",
];

/// Frequency-based title keyword extractor.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    /// How many of the most frequent tokens are considered
    pub top_n: usize,
    /// Shorter candidates are discarded
    pub min_len: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            top_n: 30,
            min_len: 5,
        }
    }
}

impl KeywordExtractor {
    /// Keywords in descending frequency order. Equal counts are ordered by
    /// token text.
    pub fn extract(&self, corpus: &Corpus) -> Vec<String> {
        let candidates = top_tokens(corpus.titles(), self.top_n);

        let keywords: Vec<String> = candidates
            .into_iter()
            .map(|(token, _)| token)
            .filter(|token| token.chars().count() >= self.min_len)
            .filter(|token| !STOPLIST.contains(&token.as_str()))
            .collect();

        info!(count = keywords.len(), "Extracted title keywords");
        keywords
    }
}

/// The `n` most frequent lowercase tokens across `titles`, with counts.
pub fn top_tokens<'a>(titles: impl Iterator<Item = &'a str>, n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for title in titles {
        for token in title.to_lowercase().split_whitespace() {
            *counts.entry(token.to_string()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}
