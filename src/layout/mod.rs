//! # Sheet Layout
//!
//! Turns a raw [`Config`] into [`LayoutSettings`]: the anchors of the first
//! cell, barcode and label on a page, the step between cells, and how many
//! cells fit. Everything is computed once, up front, and never mutated; both
//! render passes borrow the same value.
//!
//! Coordinates are millimetres in PDF orientation: origin at the bottom-left
//! corner of the page, y growing upward. The first cell sits at the top-left
//! of the printable area, so walking the grid moves x right and y down.
//!
//! ```text
//!  ┌──────────────── page ────────────────┐
//!  │ margin.top                           │
//!  │   ┌── cell ──┐ cell_margin.x ┌──...  │
//!  │   │ ▌▌▌▌▌▌▌▌ │ ← code        │        │
//!  │   │ ID-100   │ ← text        │        │
//!  │   └──────────┘               └──...  │
//!  │   cell_margin.y                      │
//!  │   ┌──...                             │
//! ```

pub mod cursor;

pub use cursor::{Advance, Cursor, Grid, Slot};

use crate::barcode::Symbology;
use crate::config::{Config, IdRange};
use crate::error::{Result, SheetError};
use crate::style::{Color, Edges, Offset, Size};

/// Resolved geometry and styling for one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    pub page: Size,
    pub margin: Edges,
    pub cell: Size,
    /// Spacing between neighbouring cells.
    pub cell_margin: Offset,
    pub inner_margin: Edges,
    /// Bottom-left corner of the first cell.
    pub cell_origin: Offset,
    /// Bottom-left corner of the first barcode image.
    pub code_origin: Offset,
    /// Size the barcode image is stretched to.
    pub code: Size,
    /// Baseline start of the first label, adjustment included.
    pub text_origin: Offset,
    pub grid: Grid,
    pub mask: MaskStyle,
    pub label: LabelStyle,
    pub symbology: Symbology,
    pub ids: IdRange,
    /// Fill color for the label text. Bars keep the encoder's own colors.
    pub fill_color: Color,
    pub pdf_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaskStyle {
    pub enabled: bool,
    pub color: Color,
    pub border_radius: f64,
    /// Outline stroke width, in points.
    pub thickness: f64,
    pub fill: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub prefix: String,
    pub font: String,
    /// Font size, in points.
    pub size: f64,
}

impl LabelStyle {
    /// The label printed under the barcode for `id`.
    pub fn text_for(&self, id: u64) -> String {
        format!("{}{}", self.prefix, id)
    }
}

impl LayoutSettings {
    /// Derive the sheet layout from a configuration.
    ///
    /// Fails when the configuration cannot produce at least one cell per page,
    /// or describes negative space anywhere.
    pub fn from_config(config: &Config) -> Result<Self> {
        let doc = &config.document;
        let cell = &config.cell;
        let code = &config.code;
        let text = &config.text;

        require_positive("document.width", doc.width)?;
        require_positive("document.height", doc.height)?;
        require_positive("cell.width", cell.width)?;
        require_positive("cell.height", cell.height)?;
        require_positive("code.height", code.height)?;
        require_positive("text.size", text.size)?;
        if doc.margin.any_negative() {
            return Err(config_error("document.margin must not be negative"));
        }
        if doc.cell_margin.x < 0.0 || doc.cell_margin.y < 0.0 {
            return Err(config_error("document.cell_margin must not be negative"));
        }
        if cell.inner_margin.any_negative() {
            return Err(config_error("cell.inner_margin must not be negative"));
        }
        if config.mask.border_radius < 0.0 || config.mask.thickness < 0.0 {
            return Err(config_error("mask.border_radius and mask.thickness must not be negative"));
        }
        for (name, color) in [
            ("global.fill_color", &config.global.fill_color),
            ("mask.color", &config.mask.color),
        ] {
            if !color.is_valid() {
                return Err(config_error(&format!("{} channels must be within 0..1", name)));
            }
        }
        if code.values.end < code.values.start {
            return Err(config_error(&format!(
                "code.values.end ({}) is before code.values.start ({})",
                code.values.end, code.values.start
            )));
        }
        if config.global.pdf_name.trim().is_empty() {
            return Err(config_error("global.pdf_name must not be empty"));
        }

        let printable = Size::new(
            doc.width - doc.margin.horizontal(),
            doc.height - doc.margin.vertical(),
        );
        if printable.width < 0.0 || printable.height < 0.0 {
            return Err(config_error(&format!(
                "margins leave no printable area ({:.2} x {:.2} mm)",
                printable.width, printable.height
            )));
        }

        let columns = (printable.width / (2.0 * doc.cell_margin.x + cell.width)).floor();
        let rows = (printable.height / (2.0 * doc.cell_margin.y + cell.height)).floor();
        if columns < 1.0 || rows < 1.0 {
            return Err(config_error(&format!(
                "a {} x {} mm cell does not fit on the page ({} columns, {} rows)",
                cell.width, cell.height, columns, rows
            )));
        }

        let code_size = Size::new(cell.width - cell.inner_margin.horizontal(), code.height);
        if code_size.width <= 0.0 {
            return Err(config_error("cell.inner_margin leaves no room for the barcode"));
        }
        if code.height + cell.inner_margin.vertical() > cell.height {
            return Err(config_error("code.height plus inner margins exceeds cell.height"));
        }

        let cell_origin = Offset::new(doc.margin.left, doc.height - doc.margin.top - cell.height);
        // The barcode is inset by the cell margin as well as the inner margin.
        let code_origin = Offset::new(
            cell_origin.x + doc.cell_margin.x + cell.inner_margin.left,
            cell_origin.y + cell.height - doc.cell_margin.y - cell.inner_margin.top - code.height,
        );
        let text_origin = Offset::new(
            code_origin.x + text.adjust_position.x,
            cell_origin.y + cell.inner_margin.bottom + text.adjust_position.y,
        );

        let grid = Grid::new(
            columns as u32,
            rows as u32,
            Offset::new(
                cell.width + doc.cell_margin.x,
                -(cell.height + doc.cell_margin.y),
            ),
        )?;

        Ok(Self {
            page: Size::new(doc.width, doc.height),
            margin: doc.margin,
            cell: Size::new(cell.width, cell.height),
            cell_margin: doc.cell_margin,
            inner_margin: cell.inner_margin,
            cell_origin,
            code_origin,
            code: code_size,
            text_origin,
            grid,
            mask: MaskStyle {
                enabled: config.mask.add,
                color: config.mask.color,
                border_radius: config.mask.border_radius,
                thickness: config.mask.thickness,
                fill: config.mask.fill,
            },
            label: LabelStyle {
                prefix: text.prefix.clone(),
                font: text.font.clone(),
                size: text.size,
            },
            symbology: code.symbology,
            ids: code.values,
            fill_color: config.global.fill_color,
            pdf_name: config.global.pdf_name.clone(),
        })
    }

    /// Content pages the ID range needs (mask page not included).
    pub fn content_pages(&self) -> u64 {
        self.grid.pages_for(self.ids.len())
    }
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(config_error(&format!("{} must be positive, got {}", field, value)))
    }
}

fn config_error(msg: &str) -> SheetError {
    SheetError::Config(msg.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::*;
    use pretty_assertions::assert_eq;

    /// A4 sheet with 60 x 30 mm cells: 2 columns, 8 rows.
    pub(crate) fn sample_config() -> Config {
        Config {
            global: GlobalSection {
                fill_color: Color::BLACK,
                pdf_name: "labels".to_string(),
            },
            document: DocumentSection {
                width: 210.0,
                height: 297.0,
                margin: Edges::uniform(10.0),
                cell_margin: Offset::new(2.0, 2.0),
            },
            mask: MaskSection {
                add: true,
                color: Color::cmyk(0.0, 1.0, 0.0, 0.0),
                border_radius: 2.0,
                thickness: 0.5,
                fill: false,
            },
            cell: CellSection {
                width: 60.0,
                height: 30.0,
                inner_margin: Edges::uniform(3.0),
            },
            code: CodeSection {
                symbology: Symbology::Code39,
                height: 15.0,
                values: IdRange { start: 100, end: 200 },
            },
            text: TextSection {
                prefix: "ID-".to_string(),
                font: "Helvetica".to_string(),
                size: 7.0,
                adjust_position: Offset::new(1.0, 0.5),
            },
        }
    }

    #[test]
    fn derives_capacity_and_steps() {
        let s = LayoutSettings::from_config(&sample_config()).unwrap();
        // (210 - 20) / (4 + 60) = 2.97 → 2; (297 - 20) / (4 + 30) = 8.14 → 8
        assert_eq!(s.grid.columns(), 2);
        assert_eq!(s.grid.rows(), 8);
        assert_eq!(s.grid.step(), Offset::new(62.0, -32.0));
    }

    #[test]
    fn derives_anchors() {
        let s = LayoutSettings::from_config(&sample_config()).unwrap();
        assert_eq!(s.cell_origin, Offset::new(10.0, 257.0));
        assert_eq!(s.code_origin, Offset::new(15.0, 267.0));
        assert_eq!(s.code, Size::new(54.0, 15.0));
        // Adjustment applied exactly once; the label y ignores the cell margin.
        assert_eq!(s.text_origin, Offset::new(16.0, 260.5));
    }

    #[test]
    fn derivation_is_deterministic() {
        let config = sample_config();
        let a = LayoutSettings::from_config(&config).unwrap();
        let b = LayoutSettings::from_config(&config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.code_origin.x.to_bits(), b.code_origin.x.to_bits());
        assert_eq!(a.text_origin.y.to_bits(), b.text_origin.y.to_bits());
    }

    #[test]
    fn cell_wider_than_page_is_rejected() {
        let mut config = sample_config();
        config.cell.width = 250.0;
        let err = LayoutSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, SheetError::Config(ref m) if m.contains("does not fit")));
    }

    #[test]
    fn cell_margin_can_push_capacity_to_zero() {
        let mut config = sample_config();
        config.document.cell_margin.y = 200.0;
        assert!(LayoutSettings::from_config(&config).is_err());
    }

    #[test]
    fn margins_larger_than_page_are_rejected() {
        let mut config = sample_config();
        config.document.margin.left = 150.0;
        config.document.margin.right = 150.0;
        let err = LayoutSettings::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("no printable area"));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let mut config = sample_config();
        config.code.values = IdRange { start: 10, end: 5 };
        assert!(LayoutSettings::from_config(&config).is_err());
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let mut config = sample_config();
        config.cell.height = 0.0;
        assert!(LayoutSettings::from_config(&config).is_err());

        let mut config = sample_config();
        config.text.size = -1.0;
        assert!(LayoutSettings::from_config(&config).is_err());
    }

    #[test]
    fn barcode_taller_than_cell_is_rejected() {
        let mut config = sample_config();
        config.code.height = 28.0;
        assert!(LayoutSettings::from_config(&config).is_err());
    }

    #[test]
    fn label_text() {
        let s = LayoutSettings::from_config(&sample_config()).unwrap();
        assert_eq!(s.label.text_for(100), "ID-100");
    }

    #[test]
    fn content_pages_for_range() {
        let mut config = sample_config();
        config.code.values = IdRange { start: 0, end: 33 };
        let s = LayoutSettings::from_config(&config).unwrap();
        assert_eq!(s.grid.capacity(), 16);
        assert_eq!(s.content_pages(), 3);
    }
}
