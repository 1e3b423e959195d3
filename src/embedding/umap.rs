// UMAP layout.
//
// 1. exact k-nearest-neighbour graph in the input metric
// 2. per-point fuzzy memberships: exp(-(d - rho_i) / sigma_i), where rho_i
//    is the nearest non-zero distance and sigma_i is chosen so the
//    memberships sum to log2(k + 1), with k excluding the point itself
// 3. fuzzy union of the directed graph: w = a + b - a*b
// 4. stochastic gradient descent in 2-D with the low-dimensional kernel
//    1 / (1 + a * d^(2b)), attraction along graph edges and repulsion from
//    negative samples
//
// Initialization is uniform random in [-10, 10]^2 (no spectral init).

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::neighbors::{nearest_neighbors, Metric};
use crate::topics::tfidf::SparseVector;

const SMOOTH_K_TOLERANCE: f64 = 1e-5;
const MIN_K_DIST_SCALE: f64 = 1e-3;
const GRADIENT_CLIP: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct UmapParams {
    /// Neighbourhood size, counting the point itself
    pub n_neighbors: usize,
    pub min_dist: f64,
    pub spread: f64,
    pub metric: Metric,
    /// Defaults to 500 for up to 10k rows, 200 above
    pub n_epochs: Option<usize>,
    pub negative_sample_rate: usize,
    pub seed: u64,
}

impl Default for UmapParams {
    fn default() -> Self {
        Self {
            n_neighbors: 20,
            min_dist: 0.1,
            spread: 1.0,
            metric: Metric::Cosine,
            n_epochs: None,
            negative_sample_rate: 5,
            seed: 42,
        }
    }
}

/// Project `vectors` to 2-D. Output rows follow input order.
pub fn fit_transform(vectors: &[SparseVector], params: &UmapParams) -> Vec<[f64; 2]> {
    let n = vectors.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![[0.0, 0.0]];
    }

    let k = params.n_neighbors.saturating_sub(1).clamp(1, n - 1);
    let knn = nearest_neighbors(vectors, k, params.metric);
    let edges = fuzzy_graph(&knn, k);
    let (a, b) = find_ab_params(params.spread, params.min_dist);
    let n_epochs = params
        .n_epochs
        .unwrap_or(if n <= 10_000 { 500 } else { 200 });

    debug!(rows = n, neighbors = k, edges = edges.len(), a, b, n_epochs, "UMAP graph built");

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut embedding: Vec<[f64; 2]> = (0..n)
        .map(|_| [rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0)])
        .collect();

    optimize_layout(
        &mut embedding,
        &edges,
        a,
        b,
        n_epochs,
        params.negative_sample_rate,
        &mut rng,
    );
    embedding
}

/// `(sigma, rho)` for one point's ascending neighbour distances, such that
/// `sum(exp(-(d - rho) / sigma)) ≈ log2(k + 1)`.
pub fn smooth_knn_dist(distances: &[f64], k: usize) -> (f64, f64) {
    if distances.is_empty() {
        return (1.0, 0.0);
    }

    let target = ((k + 1) as f64).log2();
    let rho = distances.iter().copied().find(|&d| d > 0.0).unwrap_or(0.0);

    let (mut lo, mut hi, mut mid) = (0.0_f64, f64::INFINITY, 1.0_f64);
    for _ in 0..64 {
        let psum: f64 = distances
            .iter()
            .map(|&d| {
                let excess = d - rho;
                if excess > 0.0 {
                    (-excess / mid).exp()
                } else {
                    1.0
                }
            })
            .sum();

        if (psum - target).abs() < SMOOTH_K_TOLERANCE {
            break;
        }
        if psum > target {
            hi = mid;
            mid = (lo + hi) / 2.0;
        } else {
            lo = mid;
            mid = if hi.is_infinite() { mid * 2.0 } else { (lo + hi) / 2.0 };
        }
    }

    let mean = distances.iter().sum::<f64>() / distances.len() as f64;
    (mid.max(MIN_K_DIST_SCALE * mean), rho)
}

/// Symmetric weighted edge list (both directions present) from the kNN graph.
fn fuzzy_graph(knn: &[Vec<(usize, f64)>], k: usize) -> Vec<(usize, usize, f64)> {
    // (low, high) -> (weight low→high, weight high→low)
    let mut pairs: BTreeMap<(usize, usize), (f64, f64)> = BTreeMap::new();

    for (i, row) in knn.iter().enumerate() {
        let distances: Vec<f64> = row.iter().map(|&(_, d)| d).collect();
        let (sigma, rho) = smooth_knn_dist(&distances, k);
        for &(j, d) in row {
            let w = if d - rho <= 0.0 { 1.0 } else { (-(d - rho) / sigma).exp() };
            let entry = pairs.entry((i.min(j), i.max(j))).or_insert((0.0, 0.0));
            if i < j {
                entry.0 = w;
            } else {
                entry.1 = w;
            }
        }
    }

    let mut edges = Vec::with_capacity(pairs.len() * 2);
    for ((i, j), (forward, backward)) in pairs {
        let w = forward + backward - forward * backward;
        if w > 0.0 {
            edges.push((i, j, w));
            edges.push((j, i, w));
        }
    }
    edges
}

/// Fit `1 / (1 + a * x^(2b))` to the offset exponential defined by
/// `min_dist` and `spread`, by least squares over 300 points on
/// `[0, 3 * spread]`. Coarse grid search refined around the best cell.
pub fn find_ab_params(spread: f64, min_dist: f64) -> (f64, f64) {
    let xs: Vec<f64> = (0..300).map(|i| 3.0 * spread * i as f64 / 299.0).collect();
    let ys: Vec<f64> = xs
        .iter()
        .map(|&x| if x < min_dist { 1.0 } else { (-(x - min_dist) / spread).exp() })
        .collect();
    let loss = |a: f64, b: f64| -> f64 {
        xs.iter()
            .zip(&ys)
            .map(|(&x, &y)| {
                let fitted = 1.0 / (1.0 + a * x.powf(2.0 * b));
                (fitted - y).powi(2)
            })
            .sum()
    };

    const STEPS: usize = 40;
    let (mut a_lo, mut a_hi, mut b_lo, mut b_hi) = (0.01_f64, 10.0_f64, 0.1_f64, 3.0_f64);
    let (mut best_a, mut best_b) = (1.0, 1.0);
    let mut best = loss(best_a, best_b);

    for _ in 0..5 {
        for ia in 0..=STEPS {
            let a = a_lo + (a_hi - a_lo) * ia as f64 / STEPS as f64;
            for ib in 0..=STEPS {
                let b = b_lo + (b_hi - b_lo) * ib as f64 / STEPS as f64;
                let l = loss(a, b);
                if l < best {
                    best = l;
                    best_a = a;
                    best_b = b;
                }
            }
        }
        let da = 2.0 * (a_hi - a_lo) / STEPS as f64;
        let db = 2.0 * (b_hi - b_lo) / STEPS as f64;
        a_lo = (best_a - da).max(1e-4);
        a_hi = best_a + da;
        b_lo = (best_b - db).max(1e-3);
        b_hi = best_b + db;
    }

    (best_a, best_b)
}

fn clip(v: f64) -> f64 {
    v.clamp(-GRADIENT_CLIP, GRADIENT_CLIP)
}

fn squared_distance(p: [f64; 2], q: [f64; 2]) -> f64 {
    (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2)
}

fn optimize_layout(
    embedding: &mut [[f64; 2]],
    edges: &[(usize, usize, f64)],
    a: f64,
    b: f64,
    n_epochs: usize,
    negative_sample_rate: usize,
    rng: &mut StdRng,
) {
    let n = embedding.len();
    let max_weight = edges.iter().map(|e| e.2).fold(0.0, f64::max);
    if max_weight <= 0.0 || n_epochs == 0 {
        return;
    }

    // Edges too weak to be sampled even once are dropped
    let edges: Vec<(usize, usize, f64)> = edges
        .iter()
        .copied()
        .filter(|e| e.2 >= max_weight / n_epochs as f64)
        .collect();

    let epochs_per_sample: Vec<f64> = edges.iter().map(|e| max_weight / e.2).collect();
    let epochs_per_negative: Vec<f64> = epochs_per_sample
        .iter()
        .map(|eps| eps / negative_sample_rate.max(1) as f64)
        .collect();
    let mut next_sample = epochs_per_sample.clone();
    let mut next_negative = epochs_per_negative.clone();

    for epoch in 0..n_epochs {
        let alpha = 1.0 - epoch as f64 / n_epochs as f64;
        let now = epoch as f64;

        for (idx, &(j, k, _)) in edges.iter().enumerate() {
            if next_sample[idx] > now {
                continue;
            }

            let (current, other) = (embedding[j], embedding[k]);
            let d2 = squared_distance(current, other);
            let coef = if d2 > 0.0 {
                -2.0 * a * b * d2.powf(b - 1.0) / (a * d2.powf(b) + 1.0)
            } else {
                0.0
            };
            for d in 0..2 {
                let grad = clip(coef * (current[d] - other[d]));
                embedding[j][d] += grad * alpha;
                embedding[k][d] -= grad * alpha;
            }
            next_sample[idx] += epochs_per_sample[idx];

            let n_negative = ((now - next_negative[idx]) / epochs_per_negative[idx])
                .floor()
                .max(0.0) as usize;
            for _ in 0..n_negative {
                let sample = rng.random_range(0..n);
                if sample == j {
                    continue;
                }
                let (current, other) = (embedding[j], embedding[sample]);
                let d2 = squared_distance(current, other);
                let coef = if d2 > 0.0 {
                    2.0 * b / ((0.001 + d2) * (a * d2.powf(b) + 1.0))
                } else {
                    0.0
                };
                for d in 0..2 {
                    let grad = if coef > 0.0 {
                        clip(coef * (current[d] - other[d]))
                    } else {
                        GRADIENT_CLIP
                    };
                    embedding[j][d] += grad * alpha;
                }
            }
            next_negative[idx] += n_negative as f64 * epochs_per_negative[idx];
        }
    }
}
