//! Fonts for the PDF renderer.
//!
//! An embedded TrueType font is written as a CID-keyed Type0 font with
//! Identity-H encoding, so any glyph in the font program can be used, and a
//! ToUnicode CMap so the text stays searchable. Standard Helvetica exists
//! only for layout tests; it is never picked by [`FontFace::resolve`].

use crate::error::{DispatchError, Result};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;
use ttf_parser::{Face, GlyphId};

/// Font file picked up from the working directory when none is given.
pub const DEFAULT_FONT_FILE: &str = "Amiri-Bold.ttf";

// bfchar entries per block; PDF readers cap a block at 100.
const BFCHAR_BLOCK: usize = 100;

// Helvetica advance widths for ASCII 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722,
    722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722,
    667, 944, 667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556,
    556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500,
    500, 334, 260, 334, 584,
];
const HELVETICA_DEFAULT_WIDTH: u16 = 556;

/// A TrueType font program plus the metrics the layout needs.
#[derive(Debug, Clone)]
pub struct EmbeddedFont {
    name: String,
    data: Vec<u8>,
    units_per_em: f32,
    ascent: i16,
    descent: i16,
    cap_height: i16,
    bbox: [i16; 4],
    glyphs: HashMap<char, u16>,
    advances: Vec<u16>,
}

impl EmbeddedFont {
    pub fn from_bytes(name: &str, data: Vec<u8>) -> Result<Self> {
        let face =
            Face::parse(&data, 0).map_err(|e| DispatchError::Font(format!("{name}: {e}")))?;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|cp| {
                    let Some(ch) = char::from_u32(cp) else {
                        return;
                    };
                    if let Some(gid) = subtable.glyph_index(cp) {
                        glyphs.entry(ch).or_insert(gid.0);
                    }
                });
            }
        }
        if glyphs.is_empty() {
            return Err(DispatchError::Font(format!("{name}: no unicode cmap")));
        }

        let advances = (0..face.number_of_glyphs())
            .map(|gid| face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0))
            .collect();
        let bbox = face.global_bounding_box();
        let font = EmbeddedFont {
            name: pdf_name(name),
            units_per_em: f32::from(face.units_per_em()),
            ascent: face.ascender(),
            descent: face.descender(),
            cap_height: face.capital_height().unwrap_or_else(|| face.ascender()),
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            glyphs,
            advances,
            data,
        };
        Ok(font)
    }

    fn glyph(&self, c: char) -> u16 {
        self.glyphs.get(&c).copied().unwrap_or(0)
    }

    fn advance(&self, gid: u16) -> u16 {
        self.advances.get(usize::from(gid)).copied().unwrap_or(0)
    }

    /// Scale font units to the 1/1000 em PDF glyph space.
    fn to_glyph_space(&self, units: i32) -> i64 {
        (units as f32 * 1000.0 / self.units_per_em).round() as i64
    }
}

#[derive(Debug, Clone)]
pub enum FontFace {
    /// Standard Helvetica; characters outside Latin-1 print as `?`. Used by
    /// layout tests, which need no font file.
    Builtin,
    Embedded(EmbeddedFont),
}

impl FontFace {
    /// Load a TrueType/OpenType font file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| DispatchError::Font(format!("{}: {e}", path.display())))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Embedded".to_string());
        let font = EmbeddedFont::from_bytes(&name, data)?;
        info!(font = %path.display(), glyphs = font.glyphs.len(), "font loaded");
        Ok(FontFace::Embedded(font))
    }

    /// Use `explicit` if given, otherwise [`DEFAULT_FONT_FILE`] from the
    /// working directory. A missing font is an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_in(explicit, Path::new("."))
    }

    /// Like [`FontFace::resolve`], looking for the default font in `dir`.
    pub fn resolve_in(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default = dir.join(DEFAULT_FONT_FILE);
        if default.is_file() {
            return Self::load(&default);
        }
        Err(DispatchError::Font(format!(
            "no font given and {} not found; pass --font <file.ttf>",
            default.display()
        )))
    }

    /// Width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: f32 = match self {
            FontFace::Builtin => {
                text.chars()
                    .map(|c| f32::from(helvetica_width(c)))
                    .sum::<f32>()
                    / 1000.0
            }
            FontFace::Embedded(font) => {
                text.chars()
                    .map(|c| f32::from(font.advance(font.glyph(c))))
                    .sum::<f32>()
                    / font.units_per_em
            }
        };
        units * size
    }

    /// Encode `text` as a PDF string operand, recording each glyph used and
    /// the character it was drawn for.
    pub fn encode(&self, text: &str, used: &mut BTreeMap<u16, char>) -> Object {
        match self {
            FontFace::Builtin => {
                let bytes = text
                    .chars()
                    .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                    .collect();
                Object::String(bytes, StringFormat::Literal)
            }
            FontFace::Embedded(font) => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for c in text.chars() {
                    let gid = font.glyph(c);
                    used.entry(gid).or_insert(c);
                    bytes.extend_from_slice(&gid.to_be_bytes());
                }
                Object::String(bytes, StringFormat::Hexadecimal)
            }
        }
    }

    /// Add the font objects to `doc` and return the font dictionary id.
    pub fn write_to(&self, doc: &mut Document, used: &BTreeMap<u16, char>) -> ObjectId {
        match self {
            FontFace::Builtin => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            }),
            FontFace::Embedded(font) => write_embedded(doc, font, used),
        }
    }
}

fn write_embedded(
    doc: &mut Document,
    font: &EmbeddedFont,
    used: &BTreeMap<u16, char>,
) -> ObjectId {
    let base_font = Object::Name(font.name.as_bytes().to_vec());
    let file_id = doc.add_object(Stream::new(
        dictionary! { "Length1" => Object::Integer(font.data.len() as i64) },
        font.data.clone(),
    ));
    let bbox: Vec<Object> = font
        .bbox
        .iter()
        .map(|v| Object::Integer(font.to_glyph_space(i32::from(*v))))
        .collect();
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.clone(),
        "Flags" => Object::Integer(4),
        "FontBBox" => bbox,
        "ItalicAngle" => Object::Integer(0),
        "Ascent" => Object::Integer(font.to_glyph_space(i32::from(font.ascent))),
        "Descent" => Object::Integer(font.to_glyph_space(i32::from(font.descent))),
        "CapHeight" => Object::Integer(font.to_glyph_space(i32::from(font.cap_height))),
        "StemV" => Object::Integer(80),
        "FontFile2" => file_id,
    });

    let mut widths: Vec<Object> = Vec::with_capacity(used.len() * 2);
    for gid in used.keys() {
        let advance = font.to_glyph_space(i32::from(font.advance(*gid)));
        widths.push(Object::Integer(i64::from(*gid)));
        widths.push(Object::Array(vec![Object::Integer(advance)]));
    }
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => base_font.clone(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => Object::Integer(0),
        },
        "FontDescriptor" => descriptor_id,
        "DW" => Object::Integer(1000),
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });
    let cmap = to_unicode_cmap(used);
    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, cmap.into_bytes()));
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => to_unicode_id,
    })
}

/// ToUnicode CMap mapping each used glyph id back to its character.
/// Glyph 0 (`.notdef`) is left unmapped.
fn to_unicode_cmap(used: &BTreeMap<u16, char>) -> String {
    let entries: Vec<(u16, char)> = used
        .iter()
        .filter(|(gid, _)| **gid != 0)
        .map(|(gid, c)| (*gid, *c))
        .collect();

    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    for block in entries.chunks(BFCHAR_BLOCK) {
        cmap.push_str(&format!("{} beginbfchar\n", block.len()));
        for (gid, c) in block {
            let mut units = [0u16; 2];
            let utf16: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{u:04X}"))
                .collect();
            cmap.push_str(&format!("<{gid:04X}> <{utf16}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}

fn helvetica_width(c: char) -> u16 {
    match u32::from(c) {
        code @ 0x20..=0x7E => HELVETICA_WIDTHS[(code - 0x20) as usize],
        _ => HELVETICA_DEFAULT_WIDTH,
    }
}

/// PDF font names may not contain whitespace or delimiters.
fn pdf_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "Embedded".to_string()
    } else {
        cleaned
    }
}
