//! # Drawing Surface
//!
//! The page canvas the render passes draw on. A surface always has a current
//! page; [`Surface::new_page`] closes it and opens the next one with fresh
//! graphics state, so font and colors have to be set again after a break.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner of
//! the page.
//!
//! Two implementations ship with the crate: [`PdfSurface`](crate::pdf::PdfSurface)
//! writes the real document, [`RecordingSurface`] keeps every call for tests
//! and dry runs.

mod recording;

pub use recording::{Op, RecordingSurface};

use std::path::Path;

use crate::error::Result;
use crate::style::Color;

/// An abstract paginated canvas.
pub trait Surface {
    /// Select the font for subsequent [`draw_text`](Surface::draw_text) calls.
    fn set_font(&mut self, name: &str, size: f64) -> Result<()>;

    fn set_fill_color(&mut self, color: Color);

    fn set_stroke_color(&mut self, color: Color);

    fn set_line_width(&mut self, width: f64);

    /// Draw `text` with its baseline starting at `(x, y)`, in the current
    /// font and fill color.
    fn draw_text(&mut self, x: f64, y: f64, text: &str) -> Result<()>;

    /// Place an SVG image so its bounds exactly cover the `width × height`
    /// box whose bottom-left corner is `(x, y)`. Aspect ratio is not kept.
    fn draw_image(&mut self, svg: &[u8], x: f64, y: f64, width: f64, height: f64) -> Result<()>;

    /// Rounded rectangle with its bottom-left corner at `(x, y)`, using the
    /// current stroke color, fill color and line width.
    #[allow(clippy::too_many_arguments)]
    fn draw_rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        stroke: bool,
        fill: bool,
    );

    /// Finish the current page and start an empty one.
    fn new_page(&mut self);

    /// Number of pages, the current one included.
    fn page_count(&self) -> usize;

    /// Write the document to `path`.
    fn save(&mut self, path: &Path) -> Result<()>;
}
