// Exact nearest-neighbour search over sparse TF-IDF rows.
//
// Brute force: every pair is compared once per row. Conference corpora are
// a few thousand papers, which keeps this well within interactive time.

use std::str::FromStr;

use crate::error::PapersError;
use crate::topics::tfidf::SparseVector;

/// Distance between document vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cosine,
    Euclidean,
}

impl FromStr for Metric {
    type Err = PapersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" => Ok(Metric::Euclidean),
            other => Err(PapersError::unsupported(format!(
                "unknown metric '{other}' (expected cosine or euclidean)"
            ))),
        }
    }
}

impl Metric {
    /// Distance given the dot product and the two norms.
    pub fn from_dot(&self, dot: f64, norm_a: f64, norm_b: f64) -> f64 {
        match self {
            Metric::Cosine => {
                if norm_a == 0.0 && norm_b == 0.0 {
                    0.0
                } else if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    (1.0 - dot / (norm_a * norm_b)).max(0.0)
                }
            }
            Metric::Euclidean => (norm_a * norm_a + norm_b * norm_b - 2.0 * dot).max(0.0).sqrt(),
        }
    }

    pub fn distance(&self, a: &SparseVector, b: &SparseVector) -> f64 {
        self.from_dot(a.dot(b), a.norm(), b.norm())
    }
}

/// For each row, its `k` nearest other rows as `(index, distance)`, nearest
/// first. Ties are broken by index. `k` is capped at `n - 1`.
pub fn nearest_neighbors(vectors: &[SparseVector], k: usize, metric: Metric) -> Vec<Vec<(usize, f64)>> {
    let n = vectors.len();
    let k = k.min(n.saturating_sub(1));
    let norms: Vec<f64> = vectors.iter().map(SparseVector::norm).collect();

    let by_distance = |a: &(usize, f64), b: &(usize, f64)| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0));

    (0..n)
        .map(|i| {
            let mut row: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| {
                    let dot = vectors[i].dot(&vectors[j]);
                    (j, metric.from_dot(dot, norms[i], norms[j]))
                })
                .collect();
            if k == 0 {
                return Vec::new();
            }
            if k < row.len() {
                row.select_nth_unstable_by(k - 1, by_distance);
                row.truncate(k);
            }
            row.sort_by(by_distance);
            row
        })
        .collect()
}
