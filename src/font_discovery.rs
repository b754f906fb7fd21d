//! Finding a font that can set Japanese and Latin text.
//!
//! Candidates are tried in order: an explicit path (or the `FONT_TTF` environment
//! variable), the Noto fonts bundled under `fonts/`, then whatever CJK or sans-serif
//! font the system has installed.

use crate::{Font, InvoiceError};
use std::path::{Path, PathBuf};

/// Environment variable naming a font file to use
pub const FONT_ENV: &str = "FONT_TTF";

/// Font files looked for under the base directory, in order of preference
pub const BUNDLED_FONTS: [&str; 3] = [
    "fonts/NotoSansJP-Regular.ttf",
    "fonts/NotoSansCJKjp-Regular.otf",
    "fonts/NotoSansCJKjp-Regular.ttf",
];

const SYSTEM_FAMILIES: [&str; 2] = ["Noto Sans CJK JP", "Noto Sans JP"];

/// The font files to try, most preferred first. `explicit` wins over `FONT_TTF`.
pub fn candidate_paths(explicit: Option<&Path>, base: &Path) -> Vec<PathBuf> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(FONT_ENV).filter(|v| !v.is_empty()).map(PathBuf::from));

    explicit
        .into_iter()
        .chain(BUNDLED_FONTS.iter().map(|relative| base.join(relative)))
        .collect()
}

/// Load a candidate font file, or `None` if it is absent or unusable
fn load_candidate(path: &Path) -> Option<Font> {
    if !path.is_file() {
        log::debug!("font candidate {} does not exist", path.display());
        return None;
    }
    let loaded = std::fs::read(path)
        .map_err(InvoiceError::from)
        .and_then(Font::load);
    match loaded {
        Ok(font) => {
            log::info!("using font {} from {}", font.name(), path.display());
            Some(font)
        }
        Err(e) => {
            log::warn!("skipping font {}: {e}", path.display());
            None
        }
    }
}

fn query_regular(db: &fontdb::Database, families: &[fontdb::Family]) -> Option<fontdb::ID> {
    db.query(&fontdb::Query {
        families,
        weight: fontdb::Weight::NORMAL,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    })
}

/// Query installed fonts for a CJK family, then for any sans-serif face
pub fn system_font() -> Option<Font> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let id = SYSTEM_FAMILIES
        .iter()
        .find_map(|family| query_regular(&db, &[fontdb::Family::Name(family)]))
        .or_else(|| {
            log::debug!("no CJK system font, trying any sans-serif");
            query_regular(&db, &[fontdb::Family::SansSerif])
        })?;

    let loaded = db.with_face_data(id, |data, index| Font::load_indexed(data.to_vec(), index))?;
    match loaded {
        Ok(font) => {
            log::info!("using system font {}", font.name());
            Some(font)
        }
        Err(e) => {
            log::warn!("system font could not be parsed: {e}");
            None
        }
    }
}

/// Find the font invoices are set in. Without a usable font nothing can be measured,
/// so this is the one host-level failure that stops every render.
pub fn discover_font(explicit: Option<&Path>, base: &Path) -> Result<Font, InvoiceError> {
    candidate_paths(explicit, base)
        .iter()
        .find_map(|path| load_candidate(path))
        .or_else(system_font)
        .ok_or(InvoiceError::NoFontAvailable)
}
