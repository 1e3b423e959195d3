// Gaussian kernel density over 2-D points, used to place keyword labels.
//
// Bandwidth follows Scott's rule without data scaling: h = n^(-1/(d+4)).
// The label goes at the point with the highest estimated density (the
// mode), pushed one unit further from the origin so it sits at the edge of
// its cluster rather than on top of it.

use std::f64::consts::PI;

/// Scott's rule bandwidth for `n` points in `dims` dimensions.
pub fn scott_bandwidth(n: usize, dims: usize) -> f64 {
    (n.max(1) as f64).powf(-1.0 / (dims as f64 + 4.0))
}

/// Log density of the Gaussian KDE fitted on `points`, evaluated at each
/// of `points`.
pub fn log_density(points: &[[f64; 2]], bandwidth: f64) -> Vec<f64> {
    let n = points.len() as f64;
    let h2 = bandwidth * bandwidth;
    let log_norm = -(n.ln() + (2.0 * PI * h2).ln());

    points
        .iter()
        .map(|p| {
            let exponents: Vec<f64> = points
                .iter()
                .map(|q| {
                    let d2 = (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2);
                    -d2 / (2.0 * h2)
                })
                .collect();
            log_sum_exp(&exponents) + log_norm
        })
        .collect()
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// The highest-density point among `points`. First wins on ties.
pub fn density_mode(points: &[[f64; 2]]) -> Option<[f64; 2]> {
    if points.is_empty() {
        return None;
    }
    let densities = log_density(points, scott_bandwidth(points.len(), 2));
    let mut best = 0;
    for (i, &d) in densities.iter().enumerate() {
        if d > densities[best] {
            best = i;
        }
    }
    Some(points[best])
}

/// `mode + mode / |mode|`; the mode itself when it sits at the origin.
pub fn label_anchor(mode: [f64; 2]) -> [f64; 2] {
    let norm = (mode[0] * mode[0] + mode[1] * mode[1]).sqrt();
    if norm == 0.0 {
        return mode;
    }
    [mode[0] + mode[0] / norm, mode[1] + mode[1] / norm]
}
