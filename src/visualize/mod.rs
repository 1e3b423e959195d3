// Keyword maps: plan where everything goes, then draw it.

pub mod fonts;
pub mod kde;
pub mod layout;
pub mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub use layout::{plan, KeywordHighlight, MapLayout, Rgb};

/// Where a rendered map goes.
#[derive(Debug, Clone)]
pub enum MapOutput {
    /// Save `<dir>/<title>.png`
    Save { dir: PathBuf, title: String },
    /// Write to the temp directory and open it in the default viewer
    Show { title: String },
}

impl MapOutput {
    /// `Save` when a directory is given, otherwise `Show`.
    pub fn new(output_dir: Option<&Path>, title: &str) -> Self {
        match output_dir {
            Some(dir) => MapOutput::Save {
                dir: dir.to_path_buf(),
                title: title.to_string(),
            },
            None => MapOutput::Show {
                title: title.to_string(),
            },
        }
    }

    pub fn path(&self) -> PathBuf {
        match self {
            MapOutput::Save { dir, title } => dir.join(format!("{title}.png")),
            MapOutput::Show { title } => std::env::temp_dir().join(format!("{title}.png")),
        }
    }
}

/// Render `layout` as `<output_dir>/<title>.png`, or into the temp
/// directory and open it when `output_dir` is `None`. Returns the written
/// file.
pub fn render(
    layout: &MapLayout,
    output_dir: Option<&Path>,
    title: &str,
    font: Option<&Path>,
) -> Result<PathBuf> {
    let output = MapOutput::new(output_dir, title);
    let path = output.path();
    render::render_png(layout, &path, font)?;

    if let MapOutput::Show { .. } = output {
        info!(path = %path.display(), "Opening map");
        open::that(&path).with_context(|| format!("Failed to open {}", path.display()))?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_selects_save() {
        let out = MapOutput::new(Some(Path::new("results")), "map");
        assert!(matches!(out, MapOutput::Save { .. }));
        assert!(matches!(MapOutput::new(None, "map"), MapOutput::Show { .. }));
    }

    #[test]
    fn save_path_uses_title() {
        let out = MapOutput::Save {
            dir: PathBuf::from("results"),
            title: "cvpr_2019".to_string(),
        };
        assert_eq!(out.path(), PathBuf::from("results/cvpr_2019.png"));
    }

    #[test]
    fn show_path_is_in_temp_dir() {
        let out = MapOutput::Show {
            title: "papers_visualize".to_string(),
        };
        assert!(out.path().starts_with(std::env::temp_dir()));
    }
}
