use crate::canvas::{paint, Canvas};
use crate::image::Image;
use crate::layout::{Align, LayoutConfig, LayoutEngine, Margins, Rule};
use crate::page::{ImageLayout, Page, SpanLayout};
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::{Document, FontBook, FontId, Info, InvoiceError, InvoiceRecord, Pt, TextMeasurer};
use chrono::{DateTime, Local};
use id_arena::Id;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A [Canvas] that produces a PDF document.
///
/// Every font in the [FontBook] is embedded; text is drawn with the same fonts it was
/// measured with, so right-aligned runs end exactly at their anchor. An image file
/// drawn several times is embedded once.
pub struct PdfCanvas<'f> {
    fonts: &'f FontBook,
    page_size: PageSize,
    margins: Option<Margins>,
    document: Document,
    current: Page,
    images: HashMap<PathBuf, Id<Image>>,
}

impl<'f> PdfCanvas<'f> {
    pub fn new(
        fonts: &'f FontBook,
        page_size: PageSize,
        margins: Option<Margins>,
    ) -> PdfCanvas<'f> {
        PdfCanvas {
            fonts,
            page_size,
            margins,
            document: Document::default(),
            current: Page::new(page_size, margins),
            images: HashMap::new(),
        }
    }

    pub fn with_info(mut self, info: Info) -> Self {
        self.document.set_info(info);
        self
    }

    /// Pages finished so far, including the open one
    pub fn page_count(&self) -> usize {
        self.document.page_count() + 1
    }

    fn image(&mut self, path: &Path) -> Result<Id<Image>, InvoiceError> {
        if let Some(id) = self.images.get(path) {
            return Ok(*id);
        }
        let image = Image::new_from_disk(path)?;
        let id = self.document.add_image(image);
        self.images.insert(path.to_path_buf(), id);
        Ok(id)
    }
}

impl Canvas for PdfCanvas<'_> {
    fn draw_text(
        &mut self,
        text: &str,
        x: Pt,
        y: Pt,
        font: FontId,
        size: Pt,
        align: Align,
    ) -> Result<(), InvoiceError> {
        let x = match align {
            Align::Left => x,
            Align::Right => x - self.fonts.measure(text, font, size)?,
        };
        self.current.add_span(SpanLayout {
            text: text.to_string(),
            font,
            size,
            coords: (x, y),
        });
        Ok(())
    }

    fn draw_line(&mut self, from: (Pt, Pt), to: (Pt, Pt)) -> Result<(), InvoiceError> {
        self.current.add_rule(Rule { from, to });
        Ok(())
    }

    /// The image keeps its aspect ratio, scaled to fit `position` and pinned to its
    /// top-right corner
    fn draw_image(&mut self, path: &Path, position: Rect) -> Result<(), InvoiceError> {
        let image = self.image(path)?;
        let (width, height) = {
            let decoded = &self.document.images[image];
            (decoded.width, decoded.height)
        };
        self.current.add_image(ImageLayout {
            image,
            position: fit_top_right(position, width, height),
        });
        Ok(())
    }

    fn new_page(&mut self) -> Result<(), InvoiceError> {
        let fresh = Page::new(self.page_size, self.margins);
        let finished = std::mem::replace(&mut self.current, fresh);
        self.document.add_page(finished);
        Ok(())
    }

    fn finalize(mut self) -> Result<Vec<u8>, InvoiceError> {
        self.document.add_page(self.current);
        let mut bytes: Vec<u8> = Vec::new();
        self.document.write(self.fonts, &mut bytes)?;
        Ok(bytes)
    }
}

/// The largest rectangle of `width:height` that fits in `bounds`, sharing its
/// top-right corner
fn fit_top_right(bounds: Rect, width: f32, height: f32) -> Rect {
    if width <= 0.0 || height <= 0.0 {
        return bounds;
    }
    let scale = (bounds.width().0 / width).min(bounds.height().0 / height);
    let (width, height) = (Pt(width * scale), Pt(height * scale));
    Rect {
        x1: bounds.x2 - width,
        y1: bounds.y2 - height,
        x2: bounds.x2,
        y2: bounds.y2,
    }
}

/// Lay out one invoice and render it to PDF bytes.
///
/// Space for the logo is only reserved when the file exists; if it exists but cannot
/// be decoded, the space stays empty. `created` becomes the document's creation date.
pub fn render_invoice_pdf(
    record: &InvoiceRecord,
    fonts: &FontBook,
    config: &LayoutConfig,
    logo: Option<&Path>,
    created: DateTime<Local>,
) -> Result<Vec<u8>, InvoiceError> {
    let logo = logo.filter(|path| path.is_file());
    let layout = LayoutEngine::new(fonts, config).with_logo(logo).layout(record)?;

    let info = Info::for_invoice(record, &config.labels.title, created.fixed_offset());
    let mut canvas =
        PdfCanvas::new(fonts, config.page_size, Some(config.margins)).with_info(info);
    paint(&layout, &mut canvas)?;
    log::debug!("painted {} page(s)", canvas.page_count());
    canvas.finalize()
}
