//! Invoice layout: turning an [InvoiceRecord](crate::InvoiceRecord) into positioned
//! draw instructions.
//!
//! Layout never touches a PDF. The [LayoutEngine] only needs a
//! [TextMeasurer](crate::TextMeasurer) to decide where lines break and when a page is
//! full; the resulting [InvoiceLayout] is then painted onto any
//! [Canvas](crate::Canvas).
//!
//! # Example
//!
//! ```no_run
//! use invoice_pdf::layout::{LayoutConfig, LayoutEngine};
//! use invoice_pdf::{Font, FontBook, InvoiceRecord};
//!
//! let font = Font::load(std::fs::read("fonts/NotoSansJP-Regular.ttf").unwrap()).unwrap();
//! let mut fonts = FontBook::new();
//! fonts.add(font);
//!
//! let json = r#"{"invoice_no": "INV-1", "items": "Design|1|5000"}"#;
//! let record = InvoiceRecord::from_json(json).unwrap();
//! let config = LayoutConfig::default();
//! let layout = LayoutEngine::new(&fonts, &config).layout(&record).unwrap();
//! assert_eq!(layout.pages.len(), 1);
//! ```

mod config;
mod engine;
mod margins;
mod ops;
mod wrap;

pub use config::*;
pub use engine::*;
pub use margins::*;
pub use ops::*;
pub use wrap::*;
