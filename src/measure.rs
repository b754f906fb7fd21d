//! Text measurement, the one capability the layout engine needs from fonts.

use crate::{Font, InvoiceError, Pt};

/// Identifies a font registered in a [FontBook]. Ids are handed out in registration
/// order and stay valid for the lifetime of the book.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub usize);

/// Measures the rendered width of a run of text.
///
/// Implementations must be pure: the same text, font and size always produce the
/// same width. The engine only ever calls this through a shared reference, so an
/// implementation that is `Sync` can back any number of concurrent renders.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: FontId, size: Pt) -> Result<Pt, InvoiceError>;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str, font: FontId, size: Pt) -> Result<Pt, InvoiceError> {
        (**self).measure(text, font, size)
    }
}

/// The fonts available to a render. Registration happens up front; afterwards the
/// book is read-only and can be shared between threads.
#[derive(Debug, Default)]
pub struct FontBook {
    fonts: Vec<Font>,
}

impl FontBook {
    pub fn new() -> FontBook {
        FontBook::default()
    }

    /// Register a font, returning the id to refer to it by
    pub fn add(&mut self, font: Font) -> FontId {
        self.fonts.push(font);
        FontId(self.fonts.len() - 1)
    }

    pub fn get(&self, id: FontId) -> Result<&Font, InvoiceError> {
        self.fonts.get(id.0).ok_or(InvoiceError::UnknownFont(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (FontId, &Font)> {
        self.fonts.iter().enumerate().map(|(i, font)| (FontId(i), font))
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl TextMeasurer for FontBook {
    fn measure(&self, text: &str, font: FontId, size: Pt) -> Result<Pt, InvoiceError> {
        self.get(font)?.width_of_text(text, size)
    }
}
