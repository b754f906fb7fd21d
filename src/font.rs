use crate::{
    measure::FontId,
    refs::{ObjectReferences, RefType},
    InvoiceError, Pt,
};
use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace};
use pdf_writer::{
    types::{CidFontType, FontFlags, SystemInfo},
    Filter, Finish, Name, Pdf, Ref, Str,
};
use std::collections::{BTreeMap, HashMap};

/// A parsed TTF / OTF font. The whole font file is embedded in the generated PDF,
/// so large CJK fonts will dominate the output size.
///
/// Fonts are registered in a [FontBook](crate::FontBook) and referred to by
/// [FontId] everywhere else.
pub struct Font {
    pub face: OwnedFace,
}

impl Font {
    /// Load a font from raw bytes, returning an error if the font could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, InvoiceError> {
        Self::load_indexed(bytes, 0)
    }

    /// Load one face out of a font collection (`.ttc` / `.otc`)
    pub fn load_indexed(bytes: Vec<u8>, index: u32) -> Result<Font, InvoiceError> {
        let face = OwnedFace::from_vec(bytes, index)?;
        Ok(Font { face })
    }

    fn name_entry(&self, name_id: u16) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == name_id && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// Full name of the font, e.g. "Noto Sans JP Regular"
    pub fn name(&self) -> String {
        self.name_entry(owned_ttf_parser::name_id::FULL_NAME)
            .unwrap_or_else(|| "Unnamed".to_string())
    }

    /// Family name of the font, e.g. "Noto Sans JP"
    pub fn family(&self) -> String {
        self.name_entry(owned_ttf_parser::name_id::FAMILY)
            .unwrap_or_else(|| self.name())
    }

    fn scaling(&self, size: Pt) -> Pt {
        size / self.face.as_face_ref().units_per_em() as f32
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face.as_face_ref().glyph_index(ch).map(|i| i.0)
    }

    /// The glyph drawn for `ch`: its own glyph, else U+FFFD, else `?`.
    pub fn resolve_glyph(&self, ch: char) -> Result<u16, InvoiceError> {
        self.glyph_id(ch)
            .or_else(|| self.glyph_id('\u{FFFD}'))
            .or_else(|| self.glyph_id('?'))
            .ok_or_else(|| InvoiceError::MissingGlyph {
                ch,
                font: self.name(),
            })
    }

    /// Horizontal advance of the text at the given size. Characters without a glyph
    /// are measured as the glyph that will stand in for them when drawn.
    pub fn width_of_text(&self, text: &str, size: Pt) -> Result<Pt, InvoiceError> {
        let scaling = self.scaling(size);
        let face = self.face.as_face_ref();
        let mut width = Pt(0.0);
        for ch in text.chars() {
            let gid = self.resolve_glyph(ch)?;
            width += scaling * face.glyph_hor_advance(GlyphId(gid)).unwrap_or_default() as f32;
        }
        Ok(width)
    }

    /// glyph id -> first unicode character mapped onto it
    fn glyph_chars(&self) -> BTreeMap<u16, char> {
        let mut map: BTreeMap<u16, char> = BTreeMap::new();
        let Some(cmap) = self.face.as_face_ref().tables().cmap else {
            return map;
        };

        for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    let index = subtable.glyph_index(codepoint).filter(|index| index.0 > 0);
                    if let Some(index) = index {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }

        map
    }

    /// glyph id -> (advance, height), in font units
    fn glyph_metrics(&self, glyphs: &BTreeMap<u16, char>) -> BTreeMap<u16, (u16, i16)> {
        let face = self.face.as_face_ref();
        glyphs
            .keys()
            .filter_map(|&gid| {
                let advance = face.glyph_hor_advance(GlyphId(gid))?;
                let height = face
                    .glyph_bounding_box(GlyphId(gid))
                    .map(|bbox| bbox.y_max - bbox.y_min - face.descender())
                    .unwrap_or(1000);
                Some((gid, (advance, height)))
            })
            .collect()
    }

    fn write_font_data(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::FontData(font_index));
        writer
            .stream(id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);
        id
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        metrics: &BTreeMap<u16, (u16, i16)>,
        writer: &mut Pdf,
    ) -> Ref {
        let font_data_id = self.write_font_data(refs, font_index, writer);
        let face = self.face.as_face_ref();
        let scaling = 1000.0 / face.units_per_em() as f32;

        let max_width = metrics.values().map(|&(w, _)| w).max().unwrap_or_default();
        let max_height = metrics.values().map(|&(_, h)| h).max().unwrap_or_default();
        let sum_width: usize = metrics.values().map(|&(w, _)| w as usize).sum();
        let avg_width = sum_width as f32 / metrics.len().max(1) as f32;

        let id = refs.gen(RefType::FontDescriptor(font_index));
        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(self.name().as_bytes()));
        descriptor.family(Str(self.family().as_bytes()));
        descriptor.weight(face.weight().to_number());

        let mut flags = FontFlags::NON_SYMBOLIC;
        if face.is_monospaced() {
            flags.set(FontFlags::FIXED_PITCH, true);
        }
        if face.is_italic() {
            flags.set(FontFlags::ITALIC, true);
        }
        descriptor.flags(flags);

        descriptor.bbox(pdf_writer::Rect {
            x1: 0.0,
            y1: face.descender() as f32 * scaling,
            x2: max_width as f32 * scaling,
            y2: max_height as f32 * scaling,
        });
        descriptor.italic_angle(face.italic_angle());
        descriptor.ascent(face.ascender() as f32 * scaling);
        descriptor.descent(face.descender() as f32 * scaling);
        descriptor.leading(face.line_gap() as f32 * scaling);
        let cap_height = face.capital_height().map(|h| h as f32 * scaling).unwrap_or(1000.0);
        descriptor.cap_height(cap_height);
        descriptor.x_height(face.x_height().map(|h| h as f32 * scaling).unwrap_or(cap_height));
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width * scaling);
        descriptor.max_width(max_width as f32 * scaling);
        descriptor.missing_width(max_width as f32 * scaling);
        descriptor.font_file2(font_data_id);

        id
    }

    fn write_cid(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        glyphs: &BTreeMap<u16, char>,
        writer: &mut Pdf,
    ) -> Ref {
        let metrics = self.glyph_metrics(glyphs);
        let descriptor_id = self.write_descriptor(refs, font_index, &metrics, writer);
        let scaling = 1000.0 / self.face.as_face_ref().units_per_em() as f32;

        let id = refs.gen(RefType::CidFont(font_index));
        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(CidFontType::Type2);
        cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(descriptor_id);

        let mut width_counts: HashMap<u16, usize> = HashMap::new();
        for &(advance, _) in metrics.values() {
            *width_counts.entry(advance).or_insert(0) += 1;
        }
        let default_width = width_counts
            .iter()
            .max_by_key(|&(&advance, &count)| (count, advance))
            .map(|(&advance, _)| advance as f32 * scaling)
            .unwrap_or(1000.0);

        // runs of consecutive glyph ids share one widths entry
        let mut widths = cid_font.widths();
        let mut run_start: Option<u16> = None;
        let mut run: Vec<f32> = Vec::new();
        for (&gid, &(advance, _)) in metrics.iter() {
            match run_start {
                Some(start) if start as usize + run.len() == gid as usize => {}
                Some(start) => {
                    widths.consecutive(start, run.drain(..));
                    run_start = Some(gid);
                }
                None => run_start = Some(gid),
            }
            run.push(advance as f32 * scaling);
        }
        if let Some(start) = run_start {
            widths.consecutive(start, run.drain(..));
        }
        widths.finish();

        cid_font.default_width(default_width);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        id
    }

    fn write_to_unicode(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        glyphs: &BTreeMap<u16, char>,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::ToUnicode(font_index));

        let mut map = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo\n\
             << /Registry (Adobe)\n\
             /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        // bfchar blocks hold at most 100 entries sharing one high byte
        let mut blocks: Vec<Vec<(u16, char)>> = Vec::new();
        for (&gid, &ch) in glyphs.iter() {
            let starts_block = match blocks.last().and_then(|block| block.first()) {
                Some(&(first, _)) => {
                    first >> 8 != gid >> 8 || blocks.last().map_or(0, Vec::len) >= 100
                }
                None => true,
            };
            if starts_block {
                blocks.push(Vec::new());
            }
            if let Some(block) = blocks.last_mut() {
                block.push((gid, ch));
            }
        }

        for block in blocks {
            map.push_str(&format!("{} beginbfchar\n", block.len()));
            for (gid, ch) in block {
                let mut utf16 = [0u16; 2];
                let units: String = ch
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04x}"))
                    .collect();
                map.push_str(&format!("<{gid:04x}> <{units}>\n"));
            }
            map.push_str("endbfchar\n");
        }
        map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            map.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultLevel as u8,
        );
        let mut stream = writer.stream(id, compressed.as_slice());
        stream.filter(Filter::FlateDecode);

        id
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, id: FontId, writer: &mut Pdf) {
        let font_index = id.0;
        let glyphs = self.glyph_chars();
        let font_ref = refs.gen(RefType::Font(font_index));
        let cid_font_ref = self.write_cid(refs, font_index, &glyphs, writer);
        let to_unicode_ref = self.write_to_unicode(refs, font_index, &glyphs, writer);

        let mut font = writer.type0_font(font_ref);
        font.base_font(Name(format!("F{font_index}").as_bytes()));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_font_ref);
        font.to_unicode(to_unicode_ref);
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font").field("name", &self.name()).finish()
    }
}
