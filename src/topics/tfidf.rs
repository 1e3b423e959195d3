// TF-IDF document vectors.
//
// Each text becomes a sparse row over the corpus vocabulary:
//
//   tf(t, d)  = raw count of t in d
//   idf(t)    = ln((1 + n) / (1 + df(t))) + 1
//   row       = L2-normalized tf * idf
//
// Tokens are lowercase runs of two or more word characters (ASCII word
// characters only).

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern"));

/// Sparse vector with strictly increasing indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

/// Lowercase tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A fitted vocabulary with idf weights.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit on `texts` and return their vectors, in input order.
    pub fn fit_transform(texts: &[String]) -> (Self, Vec<SparseVector>) {
        let tokenized: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();

        // Sorted vocabulary so indices are stable across runs
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let mut unique: Vec<&str> = tokens.iter().map(String::as_str).collect();
            unique.sort_unstable();
            unique.dedup();
            for token in unique {
                *df.entry(token).or_insert(0) += 1;
            }
        }

        let n = texts.len() as f64;
        let mut vocabulary = HashMap::with_capacity(df.len());
        let mut idf = Vec::with_capacity(df.len());
        for (index, (token, count)) in df.iter().enumerate() {
            vocabulary.insert(token.to_string(), index);
            idf.push(((1.0 + n) / (1.0 + *count as f64)).ln() + 1.0);
        }

        let vectorizer = Self { vocabulary, idf };
        let vectors = tokenized
            .iter()
            .map(|tokens| vectorizer.vectorize(tokens))
            .collect();

        debug!(
            documents = texts.len(),
            vocabulary = vectorizer.vocabulary.len(),
            "TF-IDF fitted"
        );

        (vectorizer, vectors)
    }

    fn vectorize(&self, tokens: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector {
            indices: Vec::with_capacity(counts.len()),
            values: Vec::with_capacity(counts.len()),
        };
        for (index, tf) in counts {
            vector.indices.push(index);
            vector.values.push(tf * self.idf[index]);
        }

        let norm = vector.norm();
        if norm > 0.0 {
            for v in &mut vector.values {
                *v /= norm;
            }
        }
        vector
    }
}
