//! # Grid Cursor
//!
//! The stepping logic shared by the mask and content passes. Both walk the
//! same grid in the same order, so both go through this one type; the two
//! layers cannot drift apart.
//!
//! A cursor starts at the top-left slot of a page. After something has been
//! drawn into the current slot, [`Cursor::advance`] moves it on:
//!
//! ```text
//! remaining_columns > 1   → next column      (x += x_step)
//! remaining_columns == 1  → next row         (x = 0, y += y_step)
//! remaining_rows == 0     → next page        (x = y = 0, counters reset)
//! ```
//!
//! The row and page checks are sequential, not exclusive: the last slot of a
//! page wraps the row and then immediately overflows the page.
//!
//! [`Grid::slot`] and [`Grid::offset`] compute the same positions without any
//! state, which is what the tests compare the cursor against.

use crate::error::{Result, SheetError};
use crate::style::Offset;

/// Shape of the cell grid on one page, plus the displacement between cells.
///
/// Only built through [`Grid::new`], which rejects an empty axis; the slot
/// arithmetic divides by the column count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    step: Offset,
}

/// Identity of a cell position, independent of what is drawn in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub page: u32,
    pub row: u32,
    pub column: u32,
}

impl Grid {
    /// `step.x` is the column step (positive), `step.y` the row step
    /// (negative: PDF y grows upward while rows go down the page).
    pub fn new(columns: u32, rows: u32, step: Offset) -> Result<Self> {
        if columns == 0 || rows == 0 {
            return Err(SheetError::Config(format!(
                "grid needs at least one column and one row, got {}x{}",
                columns, rows
            )));
        }
        Ok(Self { columns, rows, step })
    }

    /// Cells per row.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Rows per page.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn step(&self) -> Offset {
        self.step
    }

    /// Cells on one full page.
    pub fn capacity(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }

    /// The slot the `n`th item (0-indexed) lands in.
    pub fn slot(&self, n: u64) -> Slot {
        let capacity = self.capacity();
        let on_page = n % capacity;
        Slot {
            page: (n / capacity) as u32,
            row: (on_page / u64::from(self.columns)) as u32,
            column: (on_page % u64::from(self.columns)) as u32,
        }
    }

    /// Displacement of `slot` from the page-start anchors.
    pub fn offset(&self, slot: Slot) -> Offset {
        Offset {
            x: f64::from(slot.column) * self.step.x,
            y: f64::from(slot.row) * self.step.y,
        }
    }

    /// Pages needed to hold `count` items. Zero items still occupy one page.
    pub fn pages_for(&self, count: u64) -> u64 {
        count.div_ceil(self.capacity()).max(1)
    }
}

/// What [`Cursor::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved one column to the right on the same row.
    Column,
    /// Finished a row and moved to the start of the next one.
    Row,
    /// Finished the last row; the caller has to start a new page.
    Page,
}

/// Running position and remaining capacity for one pass over the grid.
#[derive(Debug, Clone)]
pub struct Cursor {
    grid: Grid,
    offset: Offset,
    remaining_columns: u32,
    remaining_rows: u32,
    slot: Slot,
}

impl Cursor {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            offset: Offset::ZERO,
            remaining_columns: grid.columns,
            remaining_rows: grid.rows,
            slot: Slot {
                page: 0,
                row: 0,
                column: 0,
            },
        }
    }

    /// Displacement of the current slot from the page-start anchors.
    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn remaining_columns(&self) -> u32 {
        self.remaining_columns
    }

    pub fn remaining_rows(&self) -> u32 {
        self.remaining_rows
    }

    /// Step past the slot that was just filled.
    pub fn advance(&mut self) -> Advance {
        let mut advance = if self.remaining_columns > 1 {
            self.advance_column();
            Advance::Column
        } else {
            self.advance_row();
            Advance::Row
        };

        if self.remaining_rows == 0 {
            self.advance_page();
            advance = Advance::Page;
        }

        advance
    }

    fn advance_column(&mut self) {
        self.remaining_columns -= 1;
        self.offset.x += self.grid.step.x;
        self.slot.column += 1;
    }

    fn advance_row(&mut self) {
        self.remaining_columns = self.grid.columns;
        self.remaining_rows -= 1;
        self.offset.x = 0.0;
        self.offset.y += self.grid.step.y;
        self.slot.column = 0;
        self.slot.row += 1;
    }

    fn advance_page(&mut self) {
        self.offset = Offset::ZERO;
        self.remaining_columns = self.grid.columns;
        self.remaining_rows = self.grid.rows;
        self.slot = Slot {
            page: self.slot.page + 1,
            row: 0,
            column: 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(columns: u32, rows: u32) -> Grid {
        Grid::new(columns, rows, Offset::new(62.0, -32.0)).unwrap()
    }

    fn slot(page: u32, row: u32, column: u32) -> Slot {
        Slot { page, row, column }
    }

    #[test]
    fn walks_row_major_and_wraps() {
        let mut cursor = Cursor::new(grid(3, 2));
        let mut seen = vec![cursor.slot()];
        let mut steps = Vec::new();
        for _ in 0..6 {
            steps.push(cursor.advance());
            seen.push(cursor.slot());
        }
        assert_eq!(
            seen,
            vec![
                slot(0, 0, 0),
                slot(0, 0, 1),
                slot(0, 0, 2),
                slot(0, 1, 0),
                slot(0, 1, 1),
                slot(0, 1, 2),
                slot(1, 0, 0),
            ]
        );
        assert_eq!(
            steps,
            vec![
                Advance::Column,
                Advance::Column,
                Advance::Row,
                Advance::Column,
                Advance::Column,
                Advance::Page,
            ]
        );
    }

    #[test]
    fn single_column_always_wraps_rows() {
        let mut cursor = Cursor::new(grid(1, 4));
        let steps: Vec<Advance> = (0..8).map(|_| cursor.advance()).collect();
        assert!(steps.iter().all(|s| *s != Advance::Column));
        assert_eq!(steps.iter().filter(|s| **s == Advance::Page).count(), 2);
        assert_eq!(cursor.slot(), slot(2, 0, 0));
    }

    #[test]
    fn single_cell_grid_pages_every_step() {
        let mut cursor = Cursor::new(grid(1, 1));
        assert_eq!(cursor.advance(), Advance::Page);
        assert_eq!(cursor.advance(), Advance::Page);
        assert_eq!(cursor.offset(), Offset::ZERO);
    }

    #[test]
    fn page_break_resets_counters_and_offset() {
        let g = grid(2, 2);
        let mut cursor = Cursor::new(g);
        for _ in 0..4 {
            cursor.advance();
        }
        assert_eq!(cursor.offset(), Offset::ZERO);
        assert_eq!(cursor.remaining_columns(), 2);
        assert_eq!(cursor.remaining_rows(), 2);
    }

    #[test]
    fn cursor_matches_declarative_slots() {
        let g = grid(3, 2);
        let mut cursor = Cursor::new(g);
        for n in 0..13 {
            assert_eq!(cursor.slot(), g.slot(n), "slot of item {}", n);
            assert_eq!(cursor.offset(), g.offset(g.slot(n)), "offset of item {}", n);
            cursor.advance();
        }
    }

    #[test]
    fn declarative_offsets_follow_step_vector() {
        let g = grid(3, 2);
        // 13 items: two full pages, then one cell on page 2.
        assert_eq!(g.slot(5), slot(0, 1, 2));
        assert_eq!(g.slot(6), slot(1, 0, 0));
        assert_eq!(g.slot(12), slot(2, 0, 0));
        assert_eq!(g.offset(g.slot(4)), Offset::new(62.0, -32.0));
        assert_eq!(g.offset(g.slot(11)), Offset::new(124.0, -32.0));
    }

    #[test]
    fn pages_for_counts() {
        let g = grid(3, 2);
        assert_eq!(g.capacity(), 6);
        assert_eq!(g.pages_for(0), 1);
        assert_eq!(g.pages_for(6), 1);
        assert_eq!(g.pages_for(7), 2);
        assert_eq!(g.pages_for(13), 3);
    }

    #[test]
    fn empty_axis_is_rejected() {
        let step = Offset::new(62.0, -32.0);
        assert!(matches!(Grid::new(0, 2, step), Err(SheetError::Config(_))));
        assert!(matches!(Grid::new(2, 0, step), Err(SheetError::Config(_))));
        let g = Grid::new(1, 1, step).unwrap();
        assert_eq!((g.columns(), g.rows(), g.step()), (1, 1, step));
    }
}
