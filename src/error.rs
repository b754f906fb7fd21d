use crate::measure::FontId;
use thiserror::Error;

/// All errors that rendering an invoice can produce.
///
/// Malformed invoice data is never an error; it is coerced on intake. What remains
/// are failures of the measurement and drawing collaborators, and of the host
/// plumbing around them.
#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [image] failed to parse the image
    Image(#[from] image::ImageError),

    #[error(transparent)]
    /// An invoice record could not be read as JSON
    Json(#[from] serde_json::Error),

    #[error("font '{font}' has no glyph for {ch:?} and no replacement glyph")]
    /// The text cannot be measured or drawn with the selected font
    MissingGlyph { ch: char, font: String },

    #[error("no font is registered under {0:?}")]
    UnknownFont(FontId),

    #[error("no usable font found; set FONT_TTF or place a font in ./fonts")]
    NoFontAvailable,

    #[error("page is missing from the document")]
    PageMissing,
}
