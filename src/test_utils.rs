//! Deterministic measurers so layout can be tested without font files.

use crate::{FontId, InvoiceError, Pt, TextMeasurer};

/// ASCII characters advance half an em, everything else a full em.
pub(crate) struct FixedAdvance;

impl TextMeasurer for FixedAdvance {
    fn measure(&self, text: &str, _font: FontId, size: Pt) -> Result<Pt, InvoiceError> {
        let ems: f32 = text
            .chars()
            .map(|ch| if ch.is_ascii() { 0.5 } else { 1.0 })
            .sum();
        Ok(size * ems)
    }
}

/// Like [FixedAdvance], but fails on one character.
pub(crate) struct RejectChar(pub char);

impl TextMeasurer for RejectChar {
    fn measure(&self, text: &str, font: FontId, size: Pt) -> Result<Pt, InvoiceError> {
        if text.contains(self.0) {
            return Err(InvoiceError::MissingGlyph {
                ch: self.0,
                font: "test".to_string(),
            });
        }
        FixedAdvance.measure(text, font, size)
    }
}
