//! Barcodes and their labels, one ID per cell slot.

use crate::barcode::BarcodeEncoder;
use crate::error::{Result, SheetError};
use crate::layout::{Advance, Cursor, LayoutSettings};
use crate::style::mm;
use crate::surface::Surface;

/// Counts from a finished content pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentStats {
    /// IDs placed on the sheet.
    pub placed: u64,
    /// Content pages used, including the page the pass started on.
    pub pages: u64,
}

/// Place every ID of the range on the surface.
///
/// A page break reported by the cursor is only carried out once another ID
/// is waiting, so a range that fills its last page exactly leaves no blank
/// page behind. Font and fill color are set before the first ID and again
/// on every new page.
pub fn render_content(
    settings: &LayoutSettings,
    encoder: &dyn BarcodeEncoder,
    surface: &mut dyn Surface,
) -> Result<ContentStats> {
    let mut cursor = Cursor::new(settings.grid);
    let mut stats = ContentStats { placed: 0, pages: 1 };
    let mut break_pending = false;

    apply_text_style(settings, surface)?;

    for id in settings.ids.iter() {
        if break_pending {
            tracing::info!(page = stats.pages, "content page full");
            surface.new_page();
            apply_text_style(settings, surface)?;
            stats.pages += 1;
        }

        let svg = encoder
            .encode(settings.symbology, &id.to_string())
            .map_err(|source| SheetError::Encode {
                id,
                symbology: settings.symbology,
                source,
            })?;

        let offset = cursor.offset();
        surface.draw_image(
            &svg,
            mm(settings.code_origin.x + offset.x),
            mm(settings.code_origin.y + offset.y),
            mm(settings.code.width),
            mm(settings.code.height),
        )?;
        surface.draw_text(
            mm(settings.text_origin.x + offset.x),
            mm(settings.text_origin.y + offset.y),
            &settings.label.text_for(id),
        )?;

        let slot = cursor.slot();
        tracing::debug!(id, page = stats.pages, row = slot.row, column = slot.column, "placed");
        stats.placed += 1;

        break_pending = cursor.advance() == Advance::Page;
    }

    Ok(stats)
}

fn apply_text_style(settings: &LayoutSettings, surface: &mut dyn Surface) -> Result<()> {
    surface.set_font(&settings.label.font, settings.label.size)?;
    surface.set_fill_color(settings.fill_color);
    Ok(())
}
