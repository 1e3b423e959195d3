// Draws a planned map to a PNG.
//
// Every paper is a small black dot; papers matching a keyword are redrawn
// in that keyword's colour, later keywords on top. Labels are the keyword
// in a white box outlined in its colour. The plot has no axes or ticks.

use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, TextStyle};
use tracing::info;

use super::fonts::{self, LABEL_FAMILY};
use super::layout::{MapLayout, Rgb};

/// Output is square, in pixels.
pub const CANVAS_SIZE: u32 = 1000;
const POINT_RADIUS: i32 = 1;
const LABEL_FONT_SIZE: f64 = 14.0;
const LABEL_PADDING: i32 = 4;
const BOUNDS_MARGIN: f64 = 0.05;

fn plot_err<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    anyhow::anyhow!("Plotting failed: {e:?}")
}

fn to_color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

/// Render `layout` to `path`. Labels need a font; without one they are
/// skipped.
pub fn render_png(layout: &MapLayout, path: &Path, font: Option<&Path>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let draw_labels = fonts::ensure_registered(font);

    let root = BitMapBackend::new(path, (CANVAS_SIZE, CANVAS_SIZE)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let ((x0, x1), (y0, y1)) = layout.bounds(BOUNDS_MARGIN);
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(plot_err)?;

    chart
        .draw_series(
            layout
                .points
                .iter()
                .map(|&[x, y]| Circle::new((x, y), POINT_RADIUS, BLACK.filled())),
        )
        .map_err(plot_err)?;

    for highlight in &layout.highlights {
        let color = to_color(highlight.color);
        chart
            .draw_series(highlight.members.iter().map(|&i| {
                let [x, y] = layout.points[i];
                Circle::new((x, y), POINT_RADIUS, color.filled())
            }))
            .map_err(plot_err)?;
    }

    if draw_labels {
        let font = FontDesc::new(FontFamily::Name(LABEL_FAMILY), LABEL_FONT_SIZE, FontStyle::Normal);
        let style = TextStyle::from(font)
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));

        for highlight in &layout.highlights {
            let Some(anchor) = highlight.label else {
                continue;
            };
            let (cx, cy) = chart.backend_coord(&(anchor[0], anchor[1]));
            let (w, h) = root
                .estimate_text_size(&highlight.keyword, &style)
                .map_err(plot_err)?;
            let (hw, hh) = (w as i32 / 2 + LABEL_PADDING, h as i32 / 2 + LABEL_PADDING);
            let corners = [(cx - hw, cy - hh), (cx + hw, cy + hh)];

            root.draw(&Rectangle::new(corners, WHITE.filled()))
                .map_err(plot_err)?;
            root.draw(&Rectangle::new(corners, to_color(highlight.color).stroke_width(1)))
                .map_err(plot_err)?;
            root.draw(&Text::new(highlight.keyword.as_str(), (cx, cy), style.clone()))
                .map_err(plot_err)?;
        }
    }

    root.present().map_err(plot_err)?;
    info!(path = %path.display(), points = layout.points.len(), "Map written");
    Ok(())
}
