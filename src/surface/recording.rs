//! In-memory surface that records every call.

use std::path::{Path, PathBuf};

use super::Surface;
use crate::error::{Result, SheetError};
use crate::style::Color;

/// One recorded surface call. Coordinates are kept exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    SetFont { name: String, size: f64 },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(f64),
    Text { x: f64, y: f64, text: String },
    Image { x: f64, y: f64, width: f64, height: f64, bytes: usize },
    RoundedRect { x: f64, y: f64, width: f64, height: f64, radius: f64, stroke: bool, fill: bool },
    NewPage,
    Save(PathBuf),
}

/// A [`Surface`] that draws nothing and remembers everything.
///
/// Text before any `set_font` on the current page is rejected, the same as
/// the PDF surface, so tests catch passes that forget to restyle after a
/// page break.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    ops: Vec<Op>,
    pages: usize,
    font_set: bool,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            pages: 1,
            font_set: false,
        }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Recorded ops split at every `NewPage`; one entry per page.
    pub fn pages(&self) -> Vec<&[Op]> {
        self.ops.split(|op| *op == Op::NewPage).collect()
    }

    /// `(x, y, text)` of every text draw, in order.
    pub fn texts(&self) -> Vec<(f64, f64, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { x, y, text } => Some((*x, *y, text.as_str())),
                _ => None,
            })
            .collect()
    }

    /// `(x, y)` of every image placement, in order.
    pub fn images(&self) -> Vec<(f64, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Image { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    /// `(x, y)` of every rounded rectangle, in order.
    pub fn rects(&self) -> Vec<(f64, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::RoundedRect { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    pub fn saved_to(&self) -> Option<&Path> {
        self.ops.iter().rev().find_map(|op| match op {
            Op::Save(path) => Some(path.as_path()),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn set_font(&mut self, name: &str, size: f64) -> Result<()> {
        self.font_set = true;
        self.ops.push(Op::SetFont {
            name: name.to_string(),
            size,
        });
        Ok(())
    }

    fn set_fill_color(&mut self, color: Color) {
        self.ops.push(Op::SetFillColor(color));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.ops.push(Op::SetStrokeColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(Op::SetLineWidth(width));
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str) -> Result<()> {
        if !self.font_set {
            return Err(SheetError::Font("text drawn before a font was set on this page".to_string()));
        }
        self.ops.push(Op::Text {
            x,
            y,
            text: text.to_string(),
        });
        Ok(())
    }

    fn draw_image(&mut self, svg: &[u8], x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.ops.push(Op::Image {
            x,
            y,
            width,
            height,
            bytes: svg.len(),
        });
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
        self.ops.push(Op::RoundedRect {
            x,
            y,
            width,
            height,
            radius,
            stroke,
            fill,
        });
    }

    fn new_page(&mut self) {
        self.pages += 1;
        self.font_set = false;
        self.ops.push(Op::NewPage);
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.ops.push(Op::Save(path.to_path_buf()));
        Ok(())
    }
}
