//! Paginated invoice layout with a PDF backend.
//!
//! An [InvoiceRecord] is laid out by a [layout::LayoutEngine] into pages of draw
//! instructions, which are then painted onto a [Canvas]. [PdfCanvas] is the canvas
//! that writes PDF; [render_invoice_pdf] does both steps at once.

mod batch;
pub use batch::*;

mod canvas;
pub use canvas::*;

mod content;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod font_discovery;
pub use font_discovery::*;

mod image;
pub use self::image::*;

mod info;
pub use info::*;

mod invoice;
pub use invoice::*;

/// Invoice layout: wrapping, geometry and the pagination engine
pub mod layout;

mod measure;
pub use measure::*;

mod money;
pub use money::*;

mod page;
pub use page::*;

pub mod pagesize;

mod pdf;
pub use pdf::*;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod tax;
pub use tax::*;

mod units;
pub use units::*;

#[cfg(test)]
mod test_utils;

/// Re-export PDF-writer functionality
pub use pdf_writer;
