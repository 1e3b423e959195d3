// Label font discovery.
//
// Plotters' ab_glyph backend draws text only with fonts registered at
// runtime. A font is looked up once per process: PAPERS_FONT_PATH first,
// then a handful of common system locations. Without a font the map is
// still drawn, just without keyword labels.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{register_font, FontStyle};
use tracing::{debug, warn};

/// Family name labels are drawn with.
pub const LABEL_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<bool> = OnceLock::new();

/// First existing font file: `explicit` if given, otherwise a system font.
pub fn find_font(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "Configured font not found, trying system fonts");
    }
    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Register a label font with plotters. Returns whether labels can be
/// drawn. Only the first call does any work.
pub fn ensure_registered(explicit: Option<&Path>) -> bool {
    *REGISTERED.get_or_init(|| {
        let Some(path) = find_font(explicit) else {
            warn!("No usable font found, keyword labels will be omitted (set PAPERS_FONT_PATH)");
            return false;
        };

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read font");
                return false;
            }
        };

        // ab_glyph keeps a 'static reference for the life of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(LABEL_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                debug!(path = %path.display(), "Registered label font");
                true
            }
            Err(_) => {
                warn!(path = %path.display(), "Font file is not a valid TrueType/OpenType font");
                false
            }
        }
    })
}
