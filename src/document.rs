use crate::{
    image::Image,
    info::Info,
    page::Page,
    refs::{ObjectReferences, RefType},
    FontBook, InvoiceError,
};
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Pdf, Ref};
use std::io::Write;

/// The pages and images of one PDF, rendered out with a call to [Document::write].
/// Fonts are not owned here: they live in a [FontBook] shared by every document.
#[derive(Default, Debug)]
pub struct Document {
    pub info: Option<Info>,
    /// Pages in reading order
    pub pages: Vec<Page>,
    pub images: Arena<Image>,
}

impl Document {
    /// Without info, no information dictionary is written
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Images are document-wide: any page may refer to one by its id
    pub fn add_image(&mut self, image: Image) -> Id<Image> {
        self.images.alloc(image)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialise the document. Everything is rendered in memory before `w` sees a
    /// byte, so a failure never leaves a truncated file behind. Every font in `fonts`
    /// is embedded, used or not.
    pub fn write<W: Write>(self, fonts: &FontBook, mut w: W) -> Result<(), InvoiceError> {
        if self.pages.is_empty() {
            return Err(InvoiceError::PageMissing);
        }

        let mut refs = ObjectReferences::new();
        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = &self.info {
            info.write(&mut refs, &mut writer);
        }

        let page_refs: Vec<Ref> = (0..self.pages.len())
            .map(|i| refs.gen(RefType::Page(i)))
            .collect();
        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (id, font) in fonts.iter() {
            font.write(&mut refs, id, &mut writer);
        }
        for (id, image) in self.images.iter() {
            image.write(&mut refs, id.index(), &mut writer);
        }
        for (index, page) in self.pages.iter().enumerate() {
            page.write(&mut refs, index, fonts, &self.images, &mut writer)?;
        }

        let mut catalog = writer.catalog(catalog_id);
        catalog.pages(page_tree_id);
        catalog.finish();

        w.write_all(writer.finish().as_slice())?;
        Ok(())
    }
}
