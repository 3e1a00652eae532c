//! # Font Management
//!
//! Labels use either one of the standard PDF fonts (Helvetica, Times,
//! Courier), which need no embedding, or a TrueType file from the fonts
//! directory, which the PDF surface embeds whole.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, SheetError};

/// The standard PDF fonts that can be used without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    const ALL: [StandardFont; 12] = [
        Self::Helvetica,
        Self::HelveticaBold,
        Self::HelveticaOblique,
        Self::HelveticaBoldOblique,
        Self::TimesRoman,
        Self::TimesBold,
        Self::TimesItalic,
        Self::TimesBoldItalic,
        Self::Courier,
        Self::CourierBold,
        Self::CourierOblique,
        Self::CourierBoldOblique,
    ];

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Look up a standard font by its PDF name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.pdf_name().eq_ignore_ascii_case(name.trim()))
    }
}

/// A TrueType font read from disk.
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    pub data: Vec<u8>,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
}

impl TrueTypeFont {
    /// Validate and keep the raw font bytes.
    pub fn from_bytes(name: &str, data: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| SheetError::Font(format!("Failed to parse TTF data for font '{}': {}", name, e)))?;
        let (units_per_em, ascender, descender) =
            (face.units_per_em(), face.ascender(), face.descender());
        Ok(Self {
            data,
            units_per_em,
            ascender,
            descender,
        })
    }

    /// Glyph id for every character of `text`; unmapped characters use
    /// glyph 0 (.notdef).
    pub fn glyph_ids(&self, text: &str) -> Vec<(char, u16)> {
        match ttf_parser::Face::parse(&self.data, 0) {
            Ok(face) => text
                .chars()
                .map(|ch| (ch, face.glyph_index(ch).map(|g| g.0).unwrap_or(0)))
                .collect(),
            Err(_) => text.chars().map(|ch| (ch, 0)).collect(),
        }
    }
}

/// What a font name resolved to.
#[derive(Debug, Clone)]
pub enum FontData {
    Standard(StandardFont),
    TrueType(TrueTypeFont),
}

/// Fonts known to a surface, by the name text is set with.
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    fonts: HashMap<String, FontData>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name`: a standard font is always available, anything else
    /// has to have been registered.
    pub fn resolve(&self, name: &str) -> Option<FontData> {
        if let Some(font) = self.fonts.get(name) {
            return Some(font.clone());
        }
        StandardFont::from_name(name).map(FontData::Standard)
    }

    /// Register a TrueType font under `name`.
    pub fn register(&mut self, name: &str, font: TrueTypeFont) {
        self.fonts.insert(name.to_string(), FontData::TrueType(font));
    }

    /// Make `name` usable: standard fonts need nothing, other names are
    /// loaded from `fonts_dir/name`.
    pub fn load(&mut self, name: &str, fonts_dir: &Path) -> Result<()> {
        if self.resolve(name).is_some() {
            return Ok(());
        }
        let path = fonts_dir.join(name);
        if !path.is_file() {
            return Err(SheetError::Font(format!(
                "'{}' is neither a standard PDF font nor a file in {}",
                name,
                fonts_dir.display()
            )));
        }
        let data = fs::read(&path).map_err(|e| SheetError::io(&path, e))?;
        let font = TrueTypeFont::from_bytes(name, data)?;
        tracing::debug!(font = name, bytes = font.data.len(), "registered TrueType font");
        self.register(name, font);
        Ok(())
    }
}
