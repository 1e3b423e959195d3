// t-SNE layout.
//
// Input affinities are computed over each point's 3·perplexity + 1 nearest
// neighbours (squared Euclidean distances), with a per-point Gaussian
// bandwidth found by binary search so the conditional distribution has the
// requested perplexity. The joint P is the symmetrized, normalized sum.
//
// The 2-D layout uses the Student-t kernel with exact O(n²) repulsion per
// iteration, early exaggeration for the first 250 iterations, momentum
// 0.5 → 0.8 and per-coordinate adaptive gains.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::neighbors::{nearest_neighbors, Metric};
use super::LearningRate;
use crate::topics::tfidf::SparseVector;

const PERPLEXITY_TOLERANCE: f64 = 1e-5;
const MIN_GAIN: f64 = 0.01;
const EXPLORATION_ITERS: usize = 250;
const MACHINE_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone)]
pub struct TsneParams {
    pub perplexity: f64,
    pub learning_rate: LearningRate,
    pub early_exaggeration: f64,
    pub max_iter: usize,
    pub seed: u64,
}

impl Default for TsneParams {
    fn default() -> Self {
        Self {
            perplexity: 10.0,
            learning_rate: LearningRate::Auto,
            early_exaggeration: 12.0,
            max_iter: 1000,
            seed: 42,
        }
    }
}

/// Project `vectors` to 2-D. Output rows follow input order.
pub fn fit_transform(vectors: &[SparseVector], params: &TsneParams) -> Vec<[f64; 2]> {
    let n = vectors.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![[0.0, 0.0]];
    }

    let perplexity = if params.perplexity >= (n - 1) as f64 {
        let clamped = ((n - 1) as f64 * 0.5).max(1.0);
        warn!(
            requested = params.perplexity,
            used = clamped,
            rows = n,
            "Perplexity too large for the corpus, clamping"
        );
        clamped
    } else {
        params.perplexity
    };

    let k = ((3.0 * perplexity).floor() as usize + 1).min(n - 1);
    let knn = nearest_neighbors(vectors, k, Metric::Euclidean);
    let affinities = joint_probabilities(&knn, perplexity);

    let learning_rate = match params.learning_rate {
        LearningRate::Auto => (n as f64 / params.early_exaggeration / 4.0).max(50.0),
        LearningRate::Fixed(rate) => rate,
    };

    debug!(rows = n, neighbors = k, learning_rate, "t-SNE affinities built");

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut embedding: Vec<[f64; 2]> = (0..n)
        .map(|_| [1e-4 * standard_normal(&mut rng), 1e-4 * standard_normal(&mut rng)])
        .collect();

    let mut update = vec![[0.0_f64; 2]; n];
    let mut gains = vec![[1.0_f64; 2]; n];

    for iter in 0..params.max_iter {
        let (exaggeration, momentum) = if iter < EXPLORATION_ITERS {
            (params.early_exaggeration, 0.5)
        } else {
            (1.0, 0.8)
        };

        let grad = gradient(&embedding, &affinities, exaggeration);
        for i in 0..n {
            for d in 0..2 {
                let g = grad[i][d];
                if update[i][d] * g < 0.0 {
                    gains[i][d] += 0.2;
                } else {
                    gains[i][d] *= 0.8;
                }
                gains[i][d] = gains[i][d].max(MIN_GAIN);
                update[i][d] = momentum * update[i][d] - learning_rate * gains[i][d] * g;
                embedding[i][d] += update[i][d];
            }
        }
    }

    embedding
}

/// Conditional probabilities `p_{j|i}` over one point's squared neighbour
/// distances, calibrated so their entropy is `ln(perplexity)`.
pub fn conditional_probabilities(squared_distances: &[f64], perplexity: f64) -> Vec<f64> {
    let target = perplexity.ln();
    let (mut beta, mut beta_min, mut beta_max) = (1.0_f64, f64::NEG_INFINITY, f64::INFINITY);
    let mut p = vec![0.0; squared_distances.len()];

    for _ in 0..100 {
        let mut sum_p = 0.0;
        for (pj, &d) in p.iter_mut().zip(squared_distances) {
            *pj = (-d * beta).exp();
            sum_p += *pj;
        }
        if sum_p == 0.0 {
            sum_p = MACHINE_EPSILON;
        }

        let mut sum_dp = 0.0;
        for (pj, &d) in p.iter_mut().zip(squared_distances) {
            *pj /= sum_p;
            sum_dp += d * *pj;
        }

        let entropy = sum_p.ln() + beta * sum_dp;
        let diff = entropy - target;
        if diff.abs() <= PERPLEXITY_TOLERANCE {
            break;
        }

        if diff > 0.0 {
            beta_min = beta;
            beta = if beta_max.is_infinite() { beta * 2.0 } else { (beta + beta_max) / 2.0 };
        } else {
            beta_max = beta;
            beta = if beta_min.is_infinite() { beta / 2.0 } else { (beta + beta_min) / 2.0 };
        }
    }

    p
}

/// Symmetric joint affinities as a directed edge list (both directions
/// present) summing to 1.
fn joint_probabilities(knn: &[Vec<(usize, f64)>], perplexity: f64) -> Vec<(usize, usize, f64)> {
    let mut pairs: BTreeMap<(usize, usize), f64> = BTreeMap::new();

    for (i, row) in knn.iter().enumerate() {
        let squared: Vec<f64> = row.iter().map(|&(_, d)| d * d).collect();
        let conditional = conditional_probabilities(&squared, perplexity);
        for (&(j, _), p) in row.iter().zip(conditional) {
            *pairs.entry((i.min(j), i.max(j))).or_insert(0.0) += p;
        }
    }

    let total: f64 = 2.0 * pairs.values().sum::<f64>();
    let total = total.max(MACHINE_EPSILON);

    let mut edges = Vec::with_capacity(pairs.len() * 2);
    for ((i, j), p) in pairs {
        let p = p / total;
        edges.push((i, j, p));
        edges.push((j, i, p));
    }
    edges
}

/// KL-divergence gradient with exact repulsion.
fn gradient(embedding: &[[f64; 2]], affinities: &[(usize, usize, f64)], exaggeration: f64) -> Vec<[f64; 2]> {
    let n = embedding.len();
    let mut attraction = vec![[0.0_f64; 2]; n];
    let mut repulsion = vec![[0.0_f64; 2]; n];
    let mut z = 0.0;

    for i in 0..n {
        for j in (i + 1)..n {
            let dx = embedding[i][0] - embedding[j][0];
            let dy = embedding[i][1] - embedding[j][1];
            let q = 1.0 / (1.0 + dx * dx + dy * dy);
            z += 2.0 * q;
            let q2 = q * q;
            repulsion[i][0] += q2 * dx;
            repulsion[i][1] += q2 * dy;
            repulsion[j][0] -= q2 * dx;
            repulsion[j][1] -= q2 * dy;
        }
    }
    let z = z.max(MACHINE_EPSILON);

    for &(i, j, p) in affinities {
        let dx = embedding[i][0] - embedding[j][0];
        let dy = embedding[i][1] - embedding[j][1];
        let q = 1.0 / (1.0 + dx * dx + dy * dy);
        attraction[i][0] += exaggeration * p * q * dx;
        attraction[i][1] += exaggeration * p * q * dy;
    }

    attraction
        .iter()
        .zip(&repulsion)
        .map(|(att, rep)| {
            [
                4.0 * (att[0] - rep[0] / z),
                4.0 * (att[1] - rep[1] / z),
            ]
        })
        .collect()
}

/// Box–Muller standard normal sample.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
