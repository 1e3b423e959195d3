// Map layout: everything the renderer needs, computed without drawing.
//
// A keyword highlights every paper whose title contains it
// (case-insensitive substring), so one paper can belong to several
// keywords. Each keyword gets one colour from a rainbow palette sized to
// the keyword count, and a label anchored near its density mode.

use anyhow::Result;
use tracing::{debug, warn};

use super::kde::{density_mode, label_anchor};
use crate::papers::models::Corpus;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordHighlight {
    pub keyword: String,
    pub color: Rgb,
    /// Row indices of the papers whose title contains the keyword
    pub members: Vec<usize>,
    /// Label position; `None` when no title matches
    pub label: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLayout {
    pub points: Vec<[f64; 2]>,
    pub highlights: Vec<KeywordHighlight>,
}

impl MapLayout {
    /// `((x_min, x_max), (y_min, y_max))` covering points and labels,
    /// padded by `margin` of the span on each side.
    pub fn bounds(&self, margin: f64) -> ((f64, f64), (f64, f64)) {
        let coords = self
            .points
            .iter()
            .chain(self.highlights.iter().filter_map(|h| h.label.as_ref()));

        let (mut x0, mut x1, mut y0, mut y1) = (
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        for p in coords {
            x0 = x0.min(p[0]);
            x1 = x1.max(p[0]);
            y0 = y0.min(p[1]);
            y1 = y1.max(p[1]);
        }
        if !x0.is_finite() {
            return ((-1.0, 1.0), (-1.0, 1.0));
        }

        let pad = |lo: f64, hi: f64| {
            let span = (hi - lo).max(1e-6);
            (lo - span * margin, hi + span * margin)
        };
        (pad(x0, x1), pad(y0, y1))
    }
}

/// `n` evenly spaced colours running red → yellow → green → cyan → blue →
/// magenta.
pub fn palette(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            hsv_to_rgb(300.0 * t, 1.0, 1.0)
        })
        .collect()
}

fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb {
    let c = value * saturation;
    let h = (hue % 360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb(to_u8(r), to_u8(g), to_u8(b))
}

/// Row indices whose title contains `keyword`, ignoring case.
pub fn matching_rows(corpus: &Corpus, keyword: &str) -> Vec<usize> {
    let needle = keyword.to_lowercase();
    corpus
        .titles()
        .enumerate()
        .filter(|(_, title)| title.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// Compute highlights and label anchors for `keywords` over `embedding`.
///
/// Fails when the embedding and corpus disagree in length.
pub fn plan(corpus: &Corpus, embedding: &[[f64; 2]], keywords: &[String]) -> Result<MapLayout> {
    if corpus.len() != embedding.len() {
        anyhow::bail!(
            "Embedding has {} rows but the corpus has {} papers",
            embedding.len(),
            corpus.len()
        );
    }

    let colors = palette(keywords.len());
    let highlights = keywords
        .iter()
        .zip(colors)
        .map(|(keyword, color)| {
            let members = matching_rows(corpus, keyword);
            let member_points: Vec<[f64; 2]> = members.iter().map(|&i| embedding[i]).collect();
            let label = density_mode(&member_points).map(label_anchor);
            if label.is_none() {
                warn!(keyword = %keyword, "No titles contain keyword, skipping label");
            } else {
                debug!(keyword = %keyword, papers = members.len(), "Keyword highlighted");
            }
            KeywordHighlight {
                keyword: keyword.clone(),
                color,
                members,
                label,
            }
        })
        .collect();

    Ok(MapLayout {
        points: embedding.to_vec(),
        highlights,
    })
}
