//! The drawing side of rendering: a [Canvas] executes laid-out pages.

use crate::layout::{Align, DrawOp, InvoiceLayout};
use crate::rect::Rect;
use crate::{FontId, InvoiceError, Pt};
use std::path::Path;

/// A drawing surface for laid-out invoices.
///
/// A canvas starts with one open page; [Canvas::new_page] closes it and opens the
/// next. Coordinates are PDF user space: points, origin at the bottom-left.
pub trait Canvas {
    /// Draw one line of text with its baseline at `y`. With [Align::Right] the text
    /// ends at `x` instead of starting there.
    fn draw_text(&mut self, text: &str, x: Pt, y: Pt, font: FontId, size: Pt, align: Align)
        -> Result<(), InvoiceError>;

    fn draw_line(&mut self, from: (Pt, Pt), to: (Pt, Pt)) -> Result<(), InvoiceError>;

    /// Place an image file stretched into `position`
    fn draw_image(&mut self, path: &Path, position: Rect) -> Result<(), InvoiceError>;

    fn new_page(&mut self) -> Result<(), InvoiceError>;

    /// Close the last page and produce the finished document
    fn finalize(self) -> Result<Vec<u8>, InvoiceError>
    where
        Self: Sized;
}

/// Execute every page of `layout` on `canvas`, in order.
///
/// Text and line failures abort painting. Images are decoration: one that cannot be
/// drawn is logged and left out.
pub fn paint<C: Canvas + ?Sized>(
    layout: &InvoiceLayout,
    canvas: &mut C,
) -> Result<(), InvoiceError> {
    for (index, page) in layout.pages.iter().enumerate() {
        if index > 0 {
            canvas.new_page()?;
        }
        for op in &page.ops {
            match op {
                DrawOp::Text(run) => {
                    canvas.draw_text(&run.text, run.x, run.y, run.font, run.size, run.align)?
                }
                DrawOp::Line(rule) => canvas.draw_line(rule.from, rule.to)?,
                DrawOp::Image(image) => {
                    if let Err(e) = canvas.draw_image(&image.path, image.position) {
                        log::warn!("skipping image {}: {e}", image.path.display());
                    }
                }
            }
        }
    }
    Ok(())
}
