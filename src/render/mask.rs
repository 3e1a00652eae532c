//! Cut-line overlay: one rounded outline per cell slot of a full page.

use crate::layout::{Advance, Cursor, LayoutSettings};
use crate::style::mm;
use crate::surface::Surface;

/// Draw the outline of every slot on one page, then start a new page.
///
/// The walk ends on the cursor's own page break, so the number of outlines
/// is always the grid capacity and the surface is left on a fresh page for
/// the content pass. Returns the number of outlines drawn.
pub fn render_mask(settings: &LayoutSettings, surface: &mut dyn Surface) -> u64 {
    let mask = &settings.mask;
    let mut cursor = Cursor::new(settings.grid);
    let mut drawn = 0;

    loop {
        let offset = cursor.offset();
        surface.set_line_width(mask.thickness);
        surface.set_stroke_color(mask.color);
        surface.set_fill_color(mask.color);
        surface.draw_rounded_rect(
            mm(settings.cell_origin.x + offset.x),
            mm(settings.cell_origin.y + offset.y),
            mm(settings.cell.width),
            mm(settings.cell.height),
            mm(mask.border_radius),
            true,
            mask.fill,
        );
        drawn += 1;

        if cursor.advance() == Advance::Page {
            surface.new_page();
            break;
        }
    }

    tracing::info!(outlines = drawn, "mask page done");
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::sample_config;
    use crate::surface::{Op, RecordingSurface};

    #[test]
    fn outlines_every_slot_and_breaks_once() {
        let settings = LayoutSettings::from_config(&sample_config()).unwrap();
        let mut surface = RecordingSurface::new();

        let drawn = render_mask(&settings, &mut surface);

        assert_eq!(drawn, settings.grid.capacity());
        assert_eq!(surface.rects().len() as u64, settings.grid.capacity());
        assert_eq!(surface.ops().iter().filter(|op| **op == Op::NewPage).count(), 1);
        assert_eq!(surface.ops().last(), Some(&Op::NewPage));
        assert_eq!(surface.page_count(), 2);
    }

    #[test]
    fn first_and_last_outline_positions() {
        let settings = LayoutSettings::from_config(&sample_config()).unwrap();
        let mut surface = RecordingSurface::new();
        render_mask(&settings, &mut surface);

        let rects = surface.rects();
        assert_eq!(rects[0], (mm(10.0), mm(257.0)));
        // 2 columns x 8 rows: last slot is column 1, row 7.
        let last = rects[rects.len() - 1];
        assert!((last.0 - mm(10.0 + 62.0)).abs() < 1e-9);
        assert!((last.1 - mm(257.0 - 7.0 * 32.0)).abs() < 1e-9);
    }

    #[test]
    fn style_is_set_before_each_outline() {
        let mut config = sample_config();
        config.mask.fill = true;
        let settings = LayoutSettings::from_config(&config).unwrap();
        let mut surface = RecordingSurface::new();
        render_mask(&settings, &mut surface);

        let ops = surface.ops();
        assert_eq!(ops[0], Op::SetLineWidth(0.5));
        assert_eq!(ops[1], Op::SetStrokeColor(settings.mask.color));
        assert_eq!(ops[2], Op::SetFillColor(settings.mask.color));
        assert!(matches!(
            ops[3],
            Op::RoundedRect { stroke: true, fill: true, .. }
        ));
    }
}
