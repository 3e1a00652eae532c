//! # Barcodiche
//!
//! Barcode label sheets as PDF.
//!
//! A sheet is a grid of equally sized cells tiled over as many pages as an
//! ID range needs. Each cell holds one barcode and a short label under it.
//! An optional leading mask page carries the cut outline of every cell, so
//! the same file can drive both the printer and the cutter.
//!
//! ## Architecture
//!
//! ```text
//! configs/<name>.json
//!       ↓
//!   [config]   — serde sections, file lookup
//!       ↓
//!   [layout]   — derived anchors, grid, cursor
//!       ↓
//!   [render]   — mask pass, content pass
//!       ↓           ↘ [barcode]  — ID → SVG symbol
//!   [surface]  — drawing boundary
//!       ↓
//!   [pdf]      — PDF 1.7 writer (fonts, SVG replay)
//! ```

pub mod barcode;
pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod pdf;
pub mod render;
pub mod style;
pub mod surface;
pub mod svg;

use std::path::{Path, PathBuf};

use barcode::SymbolEncoder;
use config::Config;
use error::Result;
use font::FontRegistry;
use layout::LayoutSettings;
use pdf::PdfSurface;
use render::{render_sheet, SheetSummary};
use style::mm;
use surface::RecordingSurface;

pub use error::SheetError;

/// Where configurations, fonts and generated sheets live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    pub configs: PathBuf,
    pub fonts: PathBuf,
    pub output: PathBuf,
}

impl Default for Directories {
    fn default() -> Self {
        Self {
            configs: PathBuf::from("configs"),
            fonts: PathBuf::from("fonts"),
            output: PathBuf::from("output"),
        }
    }
}

impl Directories {
    /// `<output>/<pdf_name>.pdf`
    pub fn output_path(&self, settings: &LayoutSettings) -> PathBuf {
        self.output.join(format!("{}.pdf", settings.pdf_name))
    }
}

/// Load a named configuration and make its label font available.
fn prepare(name: &str, dirs: &Directories) -> Result<(LayoutSettings, FontRegistry)> {
    let config = Config::load(&dirs.configs, name)?;
    let settings = LayoutSettings::from_config(&config)?;
    let mut fonts = FontRegistry::new();
    fonts.load(&settings.label.font, &dirs.fonts)?;
    Ok((settings, fonts))
}

/// Generate the sheet for configuration `name` and write it as PDF.
pub fn generate(name: &str, dirs: &Directories) -> Result<SheetSummary> {
    let (settings, fonts) = prepare(name, dirs)?;
    let mut surface = PdfSurface::new(mm(settings.page.width), mm(settings.page.height), fonts)
        .with_title(settings.pdf_name.clone());
    render_sheet(
        &settings,
        &SymbolEncoder::new(),
        &mut surface,
        &dirs.output_path(&settings),
    )
}

/// Run everything [`generate`] does, recording the drawing instead of
/// writing a file.
pub fn dry_run(name: &str, dirs: &Directories) -> Result<(SheetSummary, RecordingSurface)> {
    let (settings, _fonts) = prepare(name, dirs)?;
    let mut surface = RecordingSurface::new();
    let summary = render_sheet(
        &settings,
        &SymbolEncoder::new(),
        &mut surface,
        &dirs.output_path(&settings),
    )?;
    Ok((summary, surface))
}

/// Names of the configurations in `dir`, sorted.
pub fn list(dir: &Path) -> Result<Vec<String>> {
    config::list_configs(dir)
}
