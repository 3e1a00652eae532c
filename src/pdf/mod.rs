//! # PDF Surface
//!
//! A [`Surface`] that builds a PDF 1.7 document in memory and writes it on
//! [`Surface::save`]. Drawing calls append operators to the current page's
//! content stream; objects are only laid out when the document is
//! serialized.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, pages, content streams
//! ...
//! xref                <- byte offset of each object
//! trailer             <- points to the catalog
//! %%EOF
//! ```
//!
//! Standard fonts are plain Type1 references with WinAnsiEncoding. TrueType
//! fonts are embedded whole as CIDFontType2 with Identity-H encoding, five
//! objects per font: FontFile2, FontDescriptor, CIDFont, ToUnicode CMap and
//! the Type0 root.
//!
//! Barcode images arrive as SVG and are replayed as vector paths, so they
//! stay sharp at any print resolution.

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::{Result, SheetError};
use crate::font::{FontData, FontRegistry, TrueTypeFont};
use crate::style::Color;
use crate::surface::Surface;
use crate::svg::{parse_svg_bytes, SvgCommand};

/// Bézier control-point factor for quarter circles.
const KAPPA: f64 = 0.5522847498;

const COMPRESSION_LEVEL: u8 = 6;

/// A font that has been used on some page, in order of first use.
/// Its index is the `/F{n}` resource name.
#[derive(Debug)]
struct UsedFont {
    name: String,
    data: FontData,
    /// Glyph ids drawn with a TrueType font, for widths and ToUnicode.
    glyphs: BTreeMap<u16, char>,
}

struct PdfObject {
    data: Vec<u8>,
}

/// In-memory PDF document with a fixed page size.
pub struct PdfSurface {
    width: f64,
    height: f64,
    fonts: FontRegistry,
    used_fonts: Vec<UsedFont>,
    /// One uncompressed content stream per page.
    pages: Vec<String>,
    /// `(font index, size)` set on the current page.
    current_font: Option<(usize, f64)>,
    title: Option<String>,
}

impl PdfSurface {
    /// Start a one-page document. Sizes are in points.
    pub fn new(width: f64, height: f64, fonts: FontRegistry) -> Self {
        Self {
            width,
            height,
            fonts,
            used_fonts: Vec::new(),
            pages: vec![String::new()],
            current_font: None,
            title: None,
        }
    }

    /// Set the document title written to the Info dictionary.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn stream(&mut self) -> &mut String {
        if self.pages.is_empty() {
            self.pages.push(String::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn font_index(&mut self, name: &str) -> Result<usize> {
        if let Some(idx) = self.used_fonts.iter().position(|f| f.name == name) {
            return Ok(idx);
        }
        let data = self.fonts.resolve(name).ok_or_else(|| {
            SheetError::Font(format!("'{}' has not been loaded", name))
        })?;
        self.used_fonts.push(UsedFont {
            name: name.to_string(),
            data,
            glyphs: BTreeMap::new(),
        });
        Ok(self.used_fonts.len() - 1)
    }

    /// Serialize the whole document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        // 0 is the free-list head, 1 the catalog, 2 the page tree
        let mut objects: Vec<PdfObject> = (0..3).map(|_| PdfObject { data: Vec::new() }).collect();

        let mut font_refs: Vec<usize> = Vec::with_capacity(self.used_fonts.len());
        for (idx, used) in self.used_fonts.iter().enumerate() {
            let id = match &used.data {
                FontData::Standard(std_font) => {
                    let id = objects.len();
                    objects.push(PdfObject {
                        data: format!(
                            "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                             /Encoding /WinAnsiEncoding >>",
                            std_font.pdf_name()
                        )
                        .into_bytes(),
                    });
                    id
                }
                FontData::TrueType(font) => {
                    write_truetype_objects(&mut objects, idx, &used.name, font, &used.glyphs)?
                }
            };
            font_refs.push(id);
        }

        let font_resources: String = font_refs
            .iter()
            .enumerate()
            .map(|(i, id)| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_ids = Vec::with_capacity(self.pages.len());
        for content in &self.pages {
            let content_id = objects.len();
            objects.push(PdfObject {
                data: flate_stream("", content.as_bytes()),
            });

            let page_id = objects.len();
            objects.push(PdfObject {
                data: format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                    self.width, self.height, content_id, font_resources
                )
                .into_bytes(),
            });
            page_ids.push(page_id);
        }

        objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids: String = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        objects[2].data = format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len())
            .into_bytes();

        let info_id = objects.len();
        let mut info = String::from("<< ");
        if let Some(ref title) = self.title {
            let _ = write!(info, "/Title ({}) ", escape_pdf_string(title));
        }
        let _ = write!(
            info,
            "/Producer (Barcodiche {}) /Creator (Barcodiche) >>",
            env!("CARGO_PKG_VERSION")
        );
        objects.push(PdfObject {
            data: info.into_bytes(),
        });

        Ok(serialize(&objects, info_id))
    }
}

impl Surface for PdfSurface {
    fn set_font(&mut self, name: &str, size: f64) -> Result<()> {
        let idx = self.font_index(name)?;
        self.current_font = Some((idx, size));
        Ok(())
    }

    fn set_fill_color(&mut self, color: Color) {
        let op = color.fill_operator();
        let _ = writeln!(self.stream(), "{}", op);
    }

    fn set_stroke_color(&mut self, color: Color) {
        let op = color.stroke_operator();
        let _ = writeln!(self.stream(), "{}", op);
    }

    fn set_line_width(&mut self, width: f64) {
        let _ = writeln!(self.stream(), "{:.2} w", width);
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str) -> Result<()> {
        let (idx, size) = self.current_font.ok_or_else(|| {
            SheetError::Font("text drawn before a font was set on this page".to_string())
        })?;

        let glyphs = match &self.used_fonts[idx].data {
            FontData::Standard(_) => None,
            FontData::TrueType(font) => Some(font.glyph_ids(text)),
        };
        let shown = match glyphs {
            None => format!("({})", encode_winansi(text)),
            Some(glyphs) => {
                let used = &mut self.used_fonts[idx].glyphs;
                let mut hex = String::with_capacity(glyphs.len() * 4);
                for (ch, gid) in glyphs {
                    let _ = write!(hex, "{:04X}", gid);
                    used.entry(gid).or_insert(ch);
                }
                format!("<{}>", hex)
            }
        };

        let _ = write!(
            self.stream(),
            "BT\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n{} Tj\nET\n",
            idx, size, x, y, shown
        );
        Ok(())
    }

    fn draw_image(&mut self, svg: &[u8], x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        let drawing = parse_svg_bytes(svg)
            .map_err(|e| SheetError::Surface(format!("Cannot place image: {}", e)))?;
        let vb = drawing.view_box;
        if vb.width <= 0.0 || vb.height <= 0.0 {
            return Err(SheetError::Surface("Cannot place image: empty view box".to_string()));
        }

        // SVG y runs down; flip so the view box top lands on y + height.
        let sx = width / vb.width;
        let sy = height / vb.height;
        let stream = self.stream();
        let _ = write!(
            stream,
            "q\n{:.4} 0 0 {:.4} {:.4} {:.4} cm\n",
            sx,
            -sy,
            x - vb.min_x * sx,
            y + height + vb.min_y * sy
        );
        for cmd in &drawing.commands {
            write_svg_command(stream, cmd);
        }
        stream.push_str("Q\n");
        Ok(())
    }

    fn draw_rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        stroke: bool,
        fill: bool,
    ) {
        let stream = self.stream();
        write_rounded_rect(stream, x, y, width, height, radius);
        let paint = match (stroke, fill) {
            (true, true) => "B",
            (true, false) => "S",
            (false, true) => "f",
            (false, false) => "n",
        };
        let _ = writeln!(stream, "{}", paint);
    }

    fn new_page(&mut self) {
        self.pages.push(String::new());
        self.current_font = None;
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SheetError::io(parent, e))?;
        }
        fs::write(path, &bytes).map_err(|e| SheetError::io(path, e))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), pages = self.pages.len(), "wrote PDF");
        Ok(())
    }
}

fn write_svg_command(stream: &mut String, cmd: &SvgCommand) {
    let _ = match *cmd {
        SvgCommand::MoveTo(x, y) => writeln!(stream, "{:.3} {:.3} m", x, y),
        SvgCommand::LineTo(x, y) => writeln!(stream, "{:.3} {:.3} l", x, y),
        SvgCommand::CurveTo(x1, y1, x2, y2, x, y) => writeln!(
            stream,
            "{:.3} {:.3} {:.3} {:.3} {:.3} {:.3} c",
            x1, y1, x2, y2, x, y
        ),
        SvgCommand::ClosePath => writeln!(stream, "h"),
        SvgCommand::SetFill(r, g, b) => writeln!(stream, "{:.3} {:.3} {:.3} rg", r, g, b),
        SvgCommand::SetStroke(r, g, b) => writeln!(stream, "{:.3} {:.3} {:.3} RG", r, g, b),
        SvgCommand::SetStrokeWidth(w) => writeln!(stream, "{:.3} w", w),
        SvgCommand::Fill => writeln!(stream, "f"),
        SvgCommand::Stroke => writeln!(stream, "S"),
        SvgCommand::FillAndStroke => writeln!(stream, "B"),
        SvgCommand::SaveState => writeln!(stream, "q"),
        SvgCommand::RestoreState => writeln!(stream, "Q"),
    };
}

/// Append a closed rounded-rectangle path. The radius is clamped to half
/// the shorter side.
fn write_rounded_rect(stream: &mut String, x: f64, y: f64, w: f64, h: f64, radius: f64) {
    let r = radius.max(0.0).min(w / 2.0).min(h / 2.0);
    let k = KAPPA;

    let _ = writeln!(stream, "{:.2} {:.2} m", x + r, y);

    let _ = writeln!(stream, "{:.2} {:.2} l", x + w - r, y);
    if r > 0.0 {
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + w - r + r * k, y,
            x + w, y + r - r * k,
            x + w, y + r
        );
    }

    let _ = writeln!(stream, "{:.2} {:.2} l", x + w, y + h - r);
    if r > 0.0 {
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + w, y + h - r + r * k,
            x + w - r + r * k, y + h,
            x + w - r, y + h
        );
    }

    let _ = writeln!(stream, "{:.2} {:.2} l", x + r, y + h);
    if r > 0.0 {
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + r - r * k, y + h,
            x, y + h - r + r * k,
            x, y + h - r
        );
    }

    let _ = writeln!(stream, "{:.2} {:.2} l", x, y + r);
    if r > 0.0 {
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x, y + r - r * k,
            x + r - r * k, y,
            x + r, y
        );
    }

    stream.push_str("h\n");
}

/// A FlateDecode stream object; `extra` goes into the dictionary.
fn flate_stream(extra: &str, raw: &[u8]) -> Vec<u8> {
    let compressed = compress_to_vec_zlib(raw, COMPRESSION_LEVEL);
    let mut data: Vec<u8> = Vec::with_capacity(compressed.len() + 64);
    let _ = write!(
        data,
        "<< /Length {}{} /Filter /FlateDecode >>\nstream\n",
        compressed.len(),
        extra
    );
    data.extend_from_slice(&compressed);
    data.extend_from_slice(b"\nendstream");
    data
}

/// Write the five objects of an embedded TrueType font and return the id
/// of the Type0 root.
fn write_truetype_objects(
    objects: &mut Vec<PdfObject>,
    index: usize,
    name: &str,
    font: &TrueTypeFont,
    glyphs: &BTreeMap<u16, char>,
) -> Result<usize> {
    let face = ttf_parser::Face::parse(&font.data, 0).map_err(|e| {
        SheetError::Font(format!("Failed to parse TTF data for font '{}': {}", name, e))
    })?;
    let base_font = pdf_font_name(name, index);
    let scale = 1000.0 / f64::from(font.units_per_em);

    let fontfile2_id = objects.len();
    objects.push(PdfObject {
        data: flate_stream(&format!(" /Length1 {}", font.data.len()), &font.data),
    });

    let descriptor_id = objects.len();
    let bbox = face.global_bounding_box();
    let cap_height = f64::from(face.capital_height().unwrap_or(font.ascender)) * scale;
    objects.push(PdfObject {
        data: format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox [{} {} {} {}] /ItalicAngle {} \
             /Ascent {} /Descent {} /CapHeight {} /StemV 80 \
             /FontFile2 {} 0 R >>",
            base_font,
            (f64::from(bbox.x_min) * scale) as i32,
            (f64::from(bbox.y_min) * scale) as i32,
            (f64::from(bbox.x_max) * scale) as i32,
            (f64::from(bbox.y_max) * scale) as i32,
            face.italic_angle() as i32,
            (f64::from(font.ascender) * scale) as i32,
            (f64::from(font.descender) * scale) as i32,
            cap_height as i32,
            fontfile2_id,
        )
        .into_bytes(),
    });

    let cidfont_id = objects.len();
    let default_width = face
        .glyph_hor_advance(ttf_parser::GlyphId(0))
        .map(|adv| (f64::from(adv) * scale) as u32)
        .unwrap_or(1000);
    objects.push(PdfObject {
        data: format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} /CIDToGIDMap /Identity >>",
            base_font,
            descriptor_id,
            default_width,
            build_w_array(glyphs, &face, scale),
        )
        .into_bytes(),
    });

    let tounicode_id = objects.len();
    objects.push(PdfObject {
        data: flate_stream("", build_tounicode_cmap(glyphs, &base_font).as_bytes()),
    });

    let type0_id = objects.len();
    objects.push(PdfObject {
        data: format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] /ToUnicode {} 0 R >>",
            base_font, cidfont_id, tounicode_id,
        )
        .into_bytes(),
    });

    Ok(type0_id)
}

/// `[gid [width] gid [width] ...]` for every glyph drawn.
fn build_w_array(glyphs: &BTreeMap<u16, char>, face: &ttf_parser::Face, scale: f64) -> String {
    let mut result = String::from("[");
    for &gid in glyphs.keys() {
        let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
        let _ = write!(result, " {} [{}]", gid, (f64::from(advance) * scale) as u32);
    }
    result.push_str(" ]");
    result
}

fn build_tounicode_cmap(glyphs: &BTreeMap<u16, char>, font_name: &str) -> String {
    let entries: Vec<(u16, char)> = glyphs.iter().map(|(&gid, &ch)| (gid, ch)).collect();

    let mut cmap = String::new();
    cmap.push_str("/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n");
    cmap.push_str("/CIDSystemInfo\n<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", font_name);
    cmap.push_str("/CMapType 2 def\n1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    // At most 100 entries per bfchar block
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for &(gid, ch) in chunk {
            let mut utf16 = [0u16; 2];
            let units: String = ch
                .encode_utf16(&mut utf16)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            let _ = writeln!(cmap, "<{:04X}> <{}>", gid, units);
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

/// PDF name object for an embedded font: the file stem stripped to safe
/// characters, with a subset-style tag so two files never collide.
fn pdf_font_name(file_name: &str, index: usize) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let mut name: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if name.is_empty() {
        name = "CustomFont".to_string();
    }
    let tag: String = (0..6)
        .map(|i| (b'A' + ((index / 26usize.pow(i)) % 26) as u8) as char)
        .collect();
    format!("{}+{}", tag, name)
}

fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}

/// Encode text for a WinAnsi string literal. Unmappable characters become
/// `?`; bytes outside printable ASCII use octal escapes.
fn encode_winansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match unicode_to_winansi(ch).unwrap_or(b'?') {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b @ 0x20..=0x7E => out.push(b as char),
            b => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a Unicode codepoint to its WinAnsiEncoding (Windows-1252) byte.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // Ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98),
        0x2122 => Some(0x99), // Trade mark
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

/// Lay the objects out and append the xref table and trailer.
fn serialize(objects: &[PdfObject], info_id: usize) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, obj) in objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let _ = write!(output, "{} 0 obj\n", i);
        output.extend_from_slice(&obj.data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len(),
        info_id,
        xref_offset
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> PdfSurface {
        PdfSurface::new(595.28, 841.89, FontRegistry::new())
    }

    fn text_of(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn empty_document_is_valid_pdf() {
        let bytes = surface().to_bytes().unwrap();
        let pdf = text_of(&bytes);
        assert!(pdf.starts_with("%PDF-1.7"));
        assert!(pdf.contains("/Type /Catalog"));
        assert!(pdf.contains("/Count 1"));
        assert!(pdf.contains("xref"));
        assert!(pdf.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn new_page_adds_pages() {
        let mut s = surface();
        s.new_page();
        s.new_page();
        assert_eq!(s.page_count(), 3);
        let pdf = text_of(&s.to_bytes().unwrap());
        assert!(pdf.contains("/Count 3"));
        assert_eq!(pdf.matches("/Type /Page ").count(), 3);
    }

    #[test]
    fn colors_use_cmyk_operators() {
        let mut s = surface();
        s.set_fill_color(Color::cmyk(0.0, 0.0, 0.0, 1.0));
        s.set_stroke_color(Color::cmyk(0.5, 0.0, 0.0, 0.0));
        assert!(s.pages[0].contains("0.000 0.000 0.000 1.000 k"));
        assert!(s.pages[0].contains("0.500 0.000 0.000 0.000 K"));
    }

    #[test]
    fn text_needs_a_font() {
        let mut s = surface();
        assert!(s.draw_text(10.0, 10.0, "100").is_err());
        s.set_font("Helvetica", 8.0).unwrap();
        s.draw_text(10.0, 10.0, "ID (100)").unwrap();
        assert!(s.pages[0].contains("/F0 8.0 Tf"));
        assert!(s.pages[0].contains("(ID \\(100\\)) Tj"));
        s.new_page();
        assert!(s.draw_text(10.0, 10.0, "101").is_err());
    }

    #[test]
    fn unknown_font_is_rejected() {
        let mut s = surface();
        let err = s.set_font("NoSuchFont.ttf", 8.0).unwrap_err();
        assert!(matches!(err, SheetError::Font(_)));
    }

    #[test]
    fn standard_font_is_type1() {
        let mut s = surface();
        s.set_font("Courier", 6.0).unwrap();
        s.draw_text(0.0, 0.0, "x").unwrap();
        let pdf = text_of(&s.to_bytes().unwrap());
        assert!(pdf.contains("/BaseFont /Courier /Encoding /WinAnsiEncoding"));
    }

    #[test]
    fn rounded_rect_paint_operator() {
        let mut s = surface();
        s.draw_rounded_rect(0.0, 0.0, 100.0, 50.0, 5.0, true, false);
        s.draw_rounded_rect(0.0, 0.0, 100.0, 50.0, 0.0, true, true);
        let page = &s.pages[0];
        assert!(page.contains(" c\n"));
        assert!(page.contains("h\nS\n"));
        assert!(page.contains("h\nB\n"));
    }

    #[test]
    fn rounded_rect_radius_is_clamped() {
        let mut stream = String::new();
        write_rounded_rect(&mut stream, 0.0, 0.0, 10.0, 4.0, 50.0);
        assert!(stream.starts_with("2.00 0.00 m"));
    }

    #[test]
    fn image_is_flipped_into_box() {
        let mut s = surface();
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 20"><rect x="0" y="0" width="2" height="20" fill="black"/></svg>"#;
        s.draw_image(svg, 100.0, 200.0, 50.0, 40.0).unwrap();
        let page = &s.pages[0];
        assert!(page.starts_with("q\n5.0000 0 0 -2.0000 100.0000 240.0000 cm\n"));
        assert!(page.ends_with("Q\n"));
    }

    #[test]
    fn invalid_image_is_a_surface_error() {
        let mut s = surface();
        let err = s.draw_image(b"not svg", 0.0, 0.0, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, SheetError::Surface(_)));
    }

    #[test]
    fn winansi_escapes() {
        assert_eq!(encode_winansi("a(b)\\"), "a\\(b\\)\\\\");
        assert_eq!(encode_winansi("€"), "\\200");
        assert_eq!(encode_winansi("あ"), "?");
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("sheet.pdf");
        let mut s = surface().with_title("sheet");
        s.save(&path).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(text_of(&bytes).contains("/Title (sheet)"));
    }

    const MONO_TTF: &[u8] = include_bytes!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/DejaVuSansMono.ttf"
    ));

    fn surface_with_mono() -> (PdfSurface, TrueTypeFont) {
        let font = TrueTypeFont::from_bytes("DejaVuSansMono.ttf", MONO_TTF.to_vec()).unwrap();
        let mut fonts = FontRegistry::new();
        fonts.register("DejaVuSansMono.ttf", font.clone());
        (PdfSurface::new(595.28, 841.89, fonts), font)
    }

    #[test]
    fn truetype_text_is_hex_glyph_ids() {
        let (mut s, font) = surface_with_mono();
        s.set_font("DejaVuSansMono.ttf", 8.0).unwrap();
        s.draw_text(10.0, 20.0, "N7").unwrap();

        let gids = font.glyph_ids("N7");
        assert!(gids.iter().all(|&(_, gid)| gid != 0));
        let expected = format!("<{:04X}{:04X}> Tj", gids[0].1, gids[1].1);
        assert!(s.pages[0].contains(&expected), "{}", s.pages[0]);

        let used = &s.used_fonts[0].glyphs;
        assert_eq!(used.get(&gids[0].1), Some(&'N'));
        assert_eq!(used.get(&gids[1].1), Some(&'7'));
    }

    #[test]
    fn truetype_font_is_embedded_as_type0() {
        let (mut s, font) = surface_with_mono();
        s.set_font("DejaVuSansMono.ttf", 8.0).unwrap();
        s.draw_text(0.0, 0.0, "N").unwrap();
        let pdf = text_of(&s.to_bytes().unwrap());
        assert!(pdf.contains("/Subtype /Type0"));
        assert!(pdf.contains("/Encoding /Identity-H"));
        assert!(pdf.contains("/Subtype /CIDFontType2"));
        assert!(pdf.contains("/FontFile2 "));
        let gid = font.glyph_ids("N")[0].1;
        assert!(pdf.contains(&format!("/W [ {} [", gid)));
    }

    #[test]
    fn tounicode_maps_glyphs_back_to_chars() {
        let glyphs: BTreeMap<u16, char> = [(49, 'N'), (26, '7')].into_iter().collect();
        let cmap = build_tounicode_cmap(&glyphs, "AAAAAA+Mono");
        assert!(cmap.contains("/CMapName /AAAAAA+Mono-UTF16 def"));
        assert!(cmap.contains("2 beginbfchar\n<001A> <0037>\n<0031> <004E>\nendbfchar"));
    }

    #[test]
    fn font_name_tags_are_distinct() {
        assert_eq!(pdf_font_name("DejaVu Sans.ttf", 0), "AAAAAA+DejaVuSans");
        assert_ne!(pdf_font_name("a.ttf", 1), pdf_font_name("a.ttf", 2));
    }
}
