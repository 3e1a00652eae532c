//! # Barcode Encoding
//!
//! Turns a payload string into an SVG drawing of the symbol. The SVG has no
//! human-readable text in it; labels are drawn separately by the content
//! pass so they can use the sheet's font.
//!
//! Encoding sits behind [`BarcodeEncoder`] so the render passes never care
//! which library produced the image. [`SymbolEncoder`] is the stock
//! implementation: `barcoders` for the linear symbologies, `qrcode` for QR.

use std::fmt;
use std::str::FromStr;

use barcoders::generators::svg::SVG;
use barcoders::sym::code11::Code11;
use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::code93::Code93;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::tf::TF;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bar height, in SVG user units, of linear symbols. Only the aspect ratio
/// of the bounds matters since images are stretched into the cell.
const LINEAR_HEIGHT: u32 = 80;

/// Code128 character-set selector for set B (printable ASCII).
const CODE128_SET_B: char = 'Ɓ';

/// Supported symbologies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    #[default]
    Code39,
    Code93,
    Code128,
    Code11,
    Ean8,
    Ean13,
    /// Interleaved 2 of 5.
    Itf,
    Qr,
}

impl Symbology {
    pub const ALL: [Symbology; 8] = [
        Symbology::Code39,
        Symbology::Code93,
        Symbology::Code128,
        Symbology::Code11,
        Symbology::Ean8,
        Symbology::Ean13,
        Symbology::Itf,
        Symbology::Qr,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Symbology::Code39 => "code39",
            Symbology::Code93 => "code93",
            Symbology::Code128 => "code128",
            Symbology::Code11 => "code11",
            Symbology::Ean8 => "ean8",
            Symbology::Ean13 => "ean13",
            Symbology::Itf => "itf",
            Symbology::Qr => "qr",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Symbology {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Symbology::ALL
            .into_iter()
            .find(|sym| sym.name() == wanted)
            .ok_or_else(|| EncodeError::new(format!("unknown symbology '{}'", s)))
    }
}

/// The encoder refused a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EncodeError {
    message: String,
}

impl EncodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces a scalable image of a barcode.
pub trait BarcodeEncoder {
    /// Encode `payload` as `symbology`, returning SVG document bytes.
    fn encode(&self, symbology: Symbology, payload: &str) -> Result<Vec<u8>, EncodeError>;
}

/// Encoder backed by `barcoders` (linear codes) and `qrcode` (QR).
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolEncoder;

impl SymbolEncoder {
    pub fn new() -> Self {
        Self
    }

    fn linear_modules(symbology: Symbology, payload: &str) -> Result<Vec<u8>, EncodeError> {
        let encoded = match symbology {
            Symbology::Code39 => Code39::new(payload).map(|c| c.encode()),
            Symbology::Code93 => Code93::new(payload).map(|c| c.encode()),
            Symbology::Code128 => {
                Code128::new(format!("{}{}", CODE128_SET_B, payload)).map(|c| c.encode())
            }
            Symbology::Code11 => Code11::new(payload).map(|c| c.encode()),
            Symbology::Ean8 => EAN8::new(payload).map(|c| c.encode()),
            Symbology::Ean13 => EAN13::new(payload).map(|c| c.encode()),
            Symbology::Itf => TF::interleaved(payload).map(|c| c.encode()),
            Symbology::Qr => return Err(EncodeError::new("QR is not a linear symbology")),
        };
        encoded.map_err(|e| EncodeError::new(e.to_string()))
    }

    fn qr(payload: &str) -> Result<Vec<u8>, EncodeError> {
        let code = qrcode::QrCode::new(payload.as_bytes())
            .map_err(|e| EncodeError::new(e.to_string()))?;
        let svg = code
            .render::<qrcode::render::svg::Color>()
            .quiet_zone(false)
            .build();
        Ok(svg.into_bytes())
    }
}

impl BarcodeEncoder for SymbolEncoder {
    fn encode(&self, symbology: Symbology, payload: &str) -> Result<Vec<u8>, EncodeError> {
        if symbology == Symbology::Qr {
            return Self::qr(payload);
        }
        let modules = Self::linear_modules(symbology, payload)?;
        let svg = SVG::new(LINEAR_HEIGHT)
            .generate(&modules)
            .map_err(|e| EncodeError::new(e.to_string()))?;
        Ok(svg.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbology_names_round_trip() {
        for sym in Symbology::ALL {
            assert_eq!(sym.name().parse::<Symbology>().unwrap(), sym);
        }
        assert_eq!("CODE128".parse::<Symbology>().unwrap(), Symbology::Code128);
        assert!("morse".parse::<Symbology>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let sym: Symbology = serde_json::from_str("\"ean13\"").unwrap();
        assert_eq!(sym, Symbology::Ean13);
        assert_eq!(serde_json::to_string(&Symbology::Itf).unwrap(), "\"itf\"");
    }

    #[test]
    fn code39_numeric_payload_is_svg() {
        let bytes = SymbolEncoder::new().encode(Symbology::Code39, "100").unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn code128_accepts_plain_ids() {
        assert!(SymbolEncoder::new().encode(Symbology::Code128, "4711").is_ok());
    }

    #[test]
    fn qr_payload_is_svg() {
        let bytes = SymbolEncoder::new().encode(Symbology::Qr, "12345").unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn ean13_rejects_short_payload() {
        let err = SymbolEncoder::new().encode(Symbology::Ean13, "42").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn encode_error_displays_its_message() {
        let err = EncodeError::new("wrong length");
        assert_eq!(err.to_string(), "wrong length");
        let source: &dyn std::error::Error = &err;
        assert!(source.source().is_none());
    }

    #[test]
    fn code39_rejects_lowercase() {
        assert!(SymbolEncoder::new().encode(Symbology::Code39, "abc").is_err());
    }
}
