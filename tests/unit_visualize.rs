// Unit tests for map planning and rendering.
//
// Planning is pure: keyword highlights, palette assignment and label
// anchors from the kernel density mode. Rendering is checked end to end
// by writing a PNG into a temp directory.

use papermap::embedding::EmbedParams;
use papermap::error::is_unsupported;
use papermap::papers::loader::CorpusQuery;
use papermap::papers::models::{Corpus, PaperRecord};
use papermap::papers::store;
use papermap::pipeline::visualize::{prepare, VisualizeRequest};
use papermap::visualize::kde::{density_mode, label_anchor};
use papermap::visualize::layout::{matching_rows, palette};
use papermap::visualize::{plan, render};

fn corpus(titles: &[&str]) -> Corpus {
    Corpus::new(
        titles
            .iter()
            .map(|t| PaperRecord {
                year: 2021,
                title: t.to_string(),
                abstract_text: String::new(),
                conference: "cvpr".to_string(),
                decision: None,
            })
            .collect(),
    )
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// ============================================================
// Highlights
// ============================================================

#[test]
fn highlights_are_case_insensitive_substrings() {
    let c = corpus(&["Stereo Matching", "MULTI-STEREO depth", "Optical flow"]);
    assert_eq!(matching_rows(&c, "stereo"), vec![0, 1]);
    assert_eq!(matching_rows(&c, "flow"), vec![2]);
    assert!(matching_rows(&c, "segmentation").is_empty());
}

#[test]
fn overlapping_keywords_share_papers() {
    let c = corpus(&["Stereo depth", "Stereo flow", "Depth completion"]);
    let embedding = vec![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
    let layout = plan(&c, &embedding, &keywords(&["stereo", "depth"])).unwrap();

    assert_eq!(layout.highlights[0].members, vec![0, 1]);
    assert_eq!(layout.highlights[1].members, vec![0, 2]);
    assert_ne!(layout.highlights[0].color, layout.highlights[1].color);
    assert_eq!(layout.points, embedding);
}

#[test]
fn keyword_without_matches_gets_no_label() {
    let c = corpus(&["Stereo depth"]);
    let layout = plan(&c, &[[1.0, 0.0]], &keywords(&["stereo", "transformer"])).unwrap();
    assert!(layout.highlights[0].label.is_some());
    assert!(layout.highlights[1].members.is_empty());
    assert!(layout.highlights[1].label.is_none());
}

#[test]
fn length_mismatch_is_an_error() {
    let c = corpus(&["a", "b"]);
    assert!(plan(&c, &[[0.0, 0.0]], &[]).is_err());
}

#[test]
fn palette_is_sized_to_keywords() {
    let c = corpus(&["one two three"]);
    let layout = plan(&c, &[[0.0, 0.0]], &keywords(&["one", "two", "three"])).unwrap();
    let colors: Vec<_> = layout.highlights.iter().map(|h| h.color).collect();
    assert_eq!(colors, palette(3));
}

// ============================================================
// Label anchors
// ============================================================

#[test]
fn label_sits_one_unit_beyond_the_mode() {
    // Dense cluster around (3, 4) plus one outlier
    let points = [[3.0, 4.0], [3.05, 4.0], [3.0, 4.05], [2.95, 3.95], [-6.0, 0.0]];
    let mode = density_mode(&points).unwrap();
    assert!((mode[0] - 3.0).abs() < 0.1 && (mode[1] - 4.0).abs() < 0.1);

    let anchor = label_anchor(mode);
    let norm = (mode[0] * mode[0] + mode[1] * mode[1]).sqrt();
    let offset = ((anchor[0] - mode[0]).powi(2) + (anchor[1] - mode[1]).powi(2)).sqrt();
    assert!((offset - 1.0).abs() < 1e-9);
    // Pushed away from the origin, along the same direction
    assert!((anchor[0] / mode[0] - (norm + 1.0) / norm).abs() < 1e-9);
}

#[test]
fn label_at_origin_stays_put() {
    let c = corpus(&["stereo", "stereo"]);
    let layout = plan(&c, &[[0.0, 0.0], [0.0, 0.0]], &keywords(&["stereo"])).unwrap();
    assert_eq!(layout.highlights[0].label, Some([0.0, 0.0]));
}

// ============================================================
// Rendering
// ============================================================

#[test]
fn render_writes_png_named_after_title() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("results");
    let c = corpus(&["Stereo depth", "Stereo flow", "Optical flow", "Depth maps"]);
    let embedding = vec![[0.0, 1.0], [1.0, 0.5], [-1.0, -1.0], [2.0, -0.5]];
    let layout = plan(&c, &embedding, &keywords(&["stereo", "depth", "flow"])).unwrap();

    let path = render(&layout, Some(&out_dir), "test_map", None).unwrap();
    assert_eq!(path, out_dir.join("test_map.png"));

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

// ============================================================
// Pipeline
// ============================================================

fn stored_corpus(dir: &std::path::Path) {
    let records: Vec<PaperRecord> = [
        "Stereo Matching with Cost Volumes",
        "Stereo Depth Refinement",
        "Optical Flow Estimation",
        "Optical Flow Transformers",
        "Semantic Segmentation Transformers",
        "Panoptic Segmentation Baselines",
    ]
    .iter()
    .map(|t| PaperRecord {
        year: 2022,
        title: t.to_string(),
        abstract_text: format!("{t}. ").repeat(20),
        conference: "cvpr".to_string(),
        decision: None,
    })
    .collect();
    store::save(&records, "cvpr", 2022, dir, 200).unwrap();
}

fn request(dir: &std::path::Path, mapping: &str) -> VisualizeRequest {
    VisualizeRequest {
        data_path: dir.to_path_buf(),
        query: CorpusQuery::all().conference("cvpr").year(2022),
        mode: "tfidf".to_string(),
        mapping: mapping.to_string(),
        params: EmbedParams {
            n_neighbors: 3,
            perplexity: 2.0,
            max_iter: 300,
            n_epochs: Some(50),
            ..Default::default()
        },
        output_dir: Some(dir.join("results")),
        title: "pipeline_map".to_string(),
        font_path: None,
    }
}

#[test]
fn prepare_plans_every_paper() {
    let dir = tempfile::tempdir().unwrap();
    stored_corpus(dir.path());

    for mapping in ["umap", "tsne"] {
        let prepared = prepare(&request(dir.path(), mapping)).unwrap();
        assert_eq!(prepared.corpus.len(), 6);
        assert_eq!(prepared.layout.points.len(), 6);
        assert_eq!(prepared.layout.highlights.len(), prepared.keywords.len());
        assert!(prepared.keywords.iter().any(|k| k == "stereo"));
    }
}

#[test]
fn unknown_mapping_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    stored_corpus(dir.path());

    let err = prepare(&request(dir.path(), "pca")).unwrap_err();
    assert!(is_unsupported(&err));
    assert!(!dir.path().join("results").exists());
}
