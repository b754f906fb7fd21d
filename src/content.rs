//! Page contents to PDF content stream operators.

use crate::page::{PageContents, SpanLayout};
use crate::{FontBook, InvoiceError};
use std::io::Write;

/// Renders page contents to an (uncompressed) PDF content stream.
///
/// Text is shown glyph by glyph through the Identity-H encoding, so every character
/// is written as its 4-digit hex glyph id. Characters the font lacks are drawn as its
/// replacement glyph.
#[allow(clippy::write_with_newline)]
pub(crate) fn render_contents(
    contents: &[PageContents],
    fonts: &FontBook,
) -> Result<Vec<u8>, InvoiceError> {
    let mut content: Vec<u8> = Vec::default();

    for page_content in contents.iter() {
        match page_content {
            PageContents::Text(span) => render_span(&mut content, span, fonts)?,
            PageContents::Image(image) => {
                write!(&mut content, "q\n")?;
                write!(
                    &mut content,
                    "{} 0 0 {} {} {} cm\n",
                    image.position.width(),
                    image.position.height(),
                    image.position.x1,
                    image.position.y1
                )?;
                write!(&mut content, "/I{} Do\n", image.image.index())?;
                write!(&mut content, "Q\n")?;
            }
            PageContents::Rule(rule) => {
                write!(&mut content, "{} {} m\n", rule.from.0, rule.from.1)?;
                write!(&mut content, "{} {} l\n", rule.to.0, rule.to.1)?;
                write!(&mut content, "S\n")?;
            }
        }
    }

    Ok(content)
}

#[allow(clippy::write_with_newline)]
fn render_span(
    content: &mut Vec<u8>,
    span: &SpanLayout,
    fonts: &FontBook,
) -> Result<(), InvoiceError> {
    if span.text.is_empty() {
        return Ok(());
    }
    let font = fonts.get(span.font)?;

    write!(content, "BT\n")?;
    write!(content, "/F{} {} Tf\n", span.font.0, span.size)?;
    write!(content, "{} {} Td\n", span.coords.0, span.coords.1)?;
    write!(content, "<")?;
    for ch in span.text.chars() {
        write!(content, "{:04x}", font.resolve_glyph(ch)?)?;
    }
    write!(content, "> Tj\n")?;
    write!(content, "ET\n")?;
    Ok(())
}
