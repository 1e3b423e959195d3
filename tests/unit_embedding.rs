// Unit tests for document embedding.
//
// Option validation (unknown modes, mappings and metrics fail up front),
// output shape for both projections, seeded determinism, and a coarse
// check that topically similar documents land near each other.

use papermap::embedding::{embed, EmbedParams, Embedder, Metric};
use papermap::error::{is_unsupported, PapersError};
use papermap::topics::tfidf::TfidfVectorizer;

fn texts() -> Vec<String> {
    let stereo = [
        "stereo matching disparity depth cost volume",
        "stereo depth estimation disparity refinement",
        "disparity stereo matching network depth",
        "depth from stereo disparity cost aggregation",
        "stereo disparity volume depth regression",
        "learning stereo matching depth disparity",
    ];
    let language = [
        "language model translation tokens attention",
        "translation language attention decoder tokens",
        "tokens language model pretraining translation",
        "attention language translation encoder tokens",
        "language translation tokens vocabulary attention",
        "multilingual language translation tokens model",
    ];
    stereo.iter().chain(language.iter()).map(|s| s.to_string()).collect()
}

fn fast_params() -> EmbedParams {
    EmbedParams {
        n_neighbors: 5,
        n_epochs: Some(100),
        max_iter: 300,
        perplexity: 3.0,
        ..Default::default()
    }
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

fn mean_distance(points: &[[f64; 2]], pairs: impl Iterator<Item = (usize, usize)>) -> f64 {
    let ds: Vec<f64> = pairs.map(|(i, j)| distance(points[i], points[j])).collect();
    ds.iter().sum::<f64>() / ds.len() as f64
}

// ============================================================
// Option validation
// ============================================================

#[test]
fn unknown_mode_is_unsupported() {
    let err = embed(&texts(), "bert", "umap", EmbedParams::default()).unwrap_err();
    assert!(is_unsupported(&err));
}

#[test]
fn unknown_mapping_is_unsupported() {
    let err = embed(&texts(), "tfidf", "pca", EmbedParams::default()).unwrap_err();
    assert!(is_unsupported(&err));
}

#[test]
fn unknown_metric_is_unsupported() {
    let err = "manhattan".parse::<Metric>().unwrap_err();
    assert!(matches!(err, PapersError::UnsupportedConfiguration(_)));
}

#[test]
fn non_positive_perplexity_is_unsupported() {
    let params = EmbedParams {
        perplexity: 0.0,
        ..Default::default()
    };
    let err = Embedder::new("tfidf", "tsne", params).unwrap_err();
    assert!(is_unsupported(&err));
}

// ============================================================
// Output shape
// ============================================================

#[test]
fn umap_output_matches_input_length() {
    let input = texts();
    let out = embed(&input, "tfidf", "umap", fast_params()).unwrap();
    assert_eq!(out.len(), input.len());
    assert!(out.iter().all(|p| p[0].is_finite() && p[1].is_finite()));
}

#[test]
fn tsne_output_matches_input_length() {
    let input = texts();
    let out = embed(&input, "tfidf", "tsne", fast_params()).unwrap();
    assert_eq!(out.len(), input.len());
    assert!(out.iter().all(|p| p[0].is_finite() && p[1].is_finite()));
}

#[test]
fn tiny_inputs_are_handled() {
    for mapping in ["umap", "tsne"] {
        assert!(embed(&[], "tfidf", mapping, fast_params()).unwrap().is_empty());
        let one = embed(&["only one paper".to_string()], "tfidf", mapping, fast_params()).unwrap();
        assert_eq!(one.len(), 1);
        let two: Vec<String> = vec!["first paper".into(), "second paper".into()];
        assert_eq!(embed(&two, "tfidf", mapping, fast_params()).unwrap().len(), 2);
    }
}

#[test]
fn same_seed_same_layout() {
    let embedder = Embedder::new("tfidf", "umap", fast_params()).unwrap();
    let a = embedder.embed(&texts()).unwrap();
    let b = embedder.embed(&texts()).unwrap();
    assert_eq!(a, b);
}

// ============================================================
// Layout quality
// ============================================================

/// Mean distance within the two topic groups, and across them.
fn topic_spread(out: &[[f64; 2]]) -> (f64, f64) {
    let within = mean_distance(
        out,
        (0..6).flat_map(|i| ((i + 1)..6).map(move |j| (i, j)))
            .chain((6..12).flat_map(|i| ((i + 1)..12).map(move |j| (i, j)))),
    );
    let across = mean_distance(out, (0..6).flat_map(|i| (6..12).map(move |j| (i, j))));
    (within, across)
}

#[test]
fn tsne_keeps_topics_apart() {
    let out = embed(&texts(), "tfidf", "tsne", fast_params()).unwrap();
    let (within, across) = topic_spread(&out);
    assert!(within < across, "within = {within}, across = {across}");
}

#[test]
fn umap_keeps_topics_apart() {
    let out = embed(&texts(), "tfidf", "umap", fast_params()).unwrap();
    assert!(out.iter().all(|p| p[0].is_finite() && p[1].is_finite()));
    let (within, across) = topic_spread(&out);
    assert!(within < across, "within = {within}, across = {across}");
}

#[test]
fn tfidf_rows_are_unit_length() {
    let (_, rows) = TfidfVectorizer::fit_transform(&texts());
    assert_eq!(rows.len(), 12);
    for row in &rows {
        assert!((row.norm() - 1.0).abs() < 1e-9);
    }
}
