//! # Sheet Rendering
//!
//! A sheet is drawn in two passes over the same grid: the optional mask page
//! with one outline per cell, then the content pages with one barcode and
//! label per ID. Both passes step through [`Cursor`](crate::layout::Cursor),
//! so outlines and labels line up.

mod content;
mod mask;

pub use content::{render_content, ContentStats};
pub use mask::render_mask;

use std::path::{Path, PathBuf};

use crate::barcode::BarcodeEncoder;
use crate::error::Result;
use crate::layout::LayoutSettings;
use crate::surface::Surface;

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub placed: u64,
    /// Pages in the document, mask page included.
    pub pages: usize,
    pub mask_page: bool,
    pub output: PathBuf,
}

/// Draw the mask (when enabled) and the content, then save to `output`.
///
/// Nothing is saved if any step fails.
pub fn render_sheet(
    settings: &LayoutSettings,
    encoder: &dyn BarcodeEncoder,
    surface: &mut dyn Surface,
    output: &Path,
) -> Result<SheetSummary> {
    tracing::info!(
        ids = settings.ids.len(),
        columns = settings.grid.columns(),
        rows = settings.grid.rows(),
        symbology = %settings.symbology,
        "rendering sheet"
    );
    if settings.ids.is_empty() {
        tracing::warn!(
            start = settings.ids.start,
            "ID range is empty; the sheet will have one blank content page"
        );
    }

    if settings.mask.enabled {
        render_mask(settings, surface);
    }
    let stats = render_content(settings, encoder, surface)?;
    surface.save(output)?;

    let summary = SheetSummary {
        placed: stats.placed,
        pages: surface.page_count(),
        mask_page: settings.mask.enabled,
        output: output.to_path_buf(),
    };
    tracing::info!(
        placed = summary.placed,
        pages = summary.pages,
        output = %output.display(),
        "sheet saved"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::SymbolEncoder;
    use crate::layout::tests::sample_config;
    use crate::surface::RecordingSurface;

    #[test]
    fn mask_page_leads_the_document() {
        let settings = LayoutSettings::from_config(&sample_config()).unwrap();
        let mut surface = RecordingSurface::new();
        let summary =
            render_sheet(&settings, &SymbolEncoder::new(), &mut surface, Path::new("out.pdf")).unwrap();

        // 100 IDs on a 16-slot grid: 7 content pages plus the mask.
        assert_eq!(summary.placed, 100);
        assert_eq!(summary.pages, 8);
        assert!(summary.mask_page);
        let pages = surface.pages();
        assert!(pages[0].iter().all(|op| !matches!(op, crate::surface::Op::Text { .. })));
        assert_eq!(surface.saved_to(), Some(Path::new("out.pdf")));
    }

    #[test]
    fn without_mask_content_starts_on_page_one() {
        let mut config = sample_config();
        config.mask.add = false;
        let settings = LayoutSettings::from_config(&config).unwrap();
        let mut surface = RecordingSurface::new();
        let summary =
            render_sheet(&settings, &SymbolEncoder::new(), &mut surface, Path::new("out.pdf")).unwrap();
        assert_eq!(summary.pages, 7);
        assert!(surface.rects().is_empty());
    }

    #[test]
    fn failed_encode_saves_nothing() {
        let mut config = sample_config();
        config.code.symbology = crate::barcode::Symbology::Ean13;
        let settings = LayoutSettings::from_config(&config).unwrap();
        let mut surface = RecordingSurface::new();
        let result = render_sheet(&settings, &SymbolEncoder::new(), &mut surface, Path::new("out.pdf"));
        assert!(result.is_err());
        assert_eq!(surface.saved_to(), None);
    }
}
