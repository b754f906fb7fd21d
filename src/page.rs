use crate::content::render_contents;
use crate::image::Image;
use crate::layout::{Margins, Rule};
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::{FontBook, FontId, InvoiceError, Pt};
use id_arena::{Arena, Id};
use pdf_writer::{Filter, Finish, Name, Pdf};

/// A run of text in one font, positioned by its left baseline point
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: FontId,
    pub size: Pt,
    pub coords: (Pt, Pt),
}

#[derive(Clone, PartialEq, Debug)]
pub struct ImageLayout {
    pub image: Id<Image>,
    pub position: Rect,
}

#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(SpanLayout),
    Image(ImageLayout),
    Rule(Rule),
}

/// One PDF page
#[derive(Debug)]
pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    /// Everything drawn on the page, in painting order
    pub contents: Vec<PageContents>,
}

impl Page {
    pub fn new(size: PageSize, margins: Option<Margins>) -> Page {
        let media_box = Rect::from_origin_size(Pt(0.0), Pt(0.0), size.0, size.1);
        Page {
            media_box,
            content_box: margins.map_or(media_box, |m| m.content_box(size)),
            contents: Vec::default(),
        }
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        self.contents.push(PageContents::Text(span));
    }

    pub fn add_image(&mut self, image: ImageLayout) {
        self.contents.push(PageContents::Image(image));
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.contents.push(PageContents::Rule(rule));
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &FontBook,
        images: &Arena<Image>,
        writer: &mut Pdf,
    ) -> Result<(), InvoiceError> {
        let id = refs
            .get(RefType::Page(page_index))
            .ok_or(InvoiceError::PageMissing)?;
        let page_tree = refs.get(RefType::PageTree).ok_or(InvoiceError::PageMissing)?;
        let content_id = refs.gen(RefType::ContentForPage(page_index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(page_tree);

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (font_id, _) in fonts.iter() {
            if let Some(font_ref) = refs.get(RefType::Font(font_id.0)) {
                resource_fonts.pair(Name(format!("F{}", font_id.0).as_bytes()), font_ref);
            }
        }
        resource_fonts.finish();

        let mut resource_xobjects = resources.x_objects();
        for (image_id, _) in images.iter() {
            if let Some(image_ref) = refs.get(RefType::Image(image_id.index())) {
                let name = format!("I{}", image_id.index());
                resource_xobjects.pair(Name(name.as_bytes()), image_ref);
            }
        }
        resource_xobjects.finish();
        resources.finish();

        page.contents(content_id);
        page.finish();

        let rendered = render_contents(&self.contents, fonts)?;
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            rendered.as_slice(),
            miniz_oxide::deflate::CompressionLevel::DefaultLevel as u8,
        );
        writer
            .stream(content_id, compressed.as_slice())
            .filter(Filter::FlateDecode);

        Ok(())
    }
}
