//! Retained slot pool for one table section.
//!
//! Slots are keyed by pool position, never by data index: as the viewport
//! moves, the render pipeline rebinds data into existing nodes instead of
//! recreating them. The pool only grows; shrinking hides surplus slots.

use crate::error::Result;

/// Row-level binding data, reassigned wholesale on every update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBinding<'a> {
    /// Inline style from the provider.
    pub style: &'a str,
    /// Fixed pixel height in virtual mode; `None` means natural layout.
    pub height: Option<f32>,
}

/// Cell-level binding data, reassigned wholesale on every update.
///
/// `row`/`column` are *data* indices; DOM backends expose them as
/// `data-row`/`data-col` attributes so a single delegated click listener
/// can map a node back to `handle_click_cell(row, column)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBinding<'a> {
    pub class: &'a str,
    pub style: &'a str,
    /// Fixed pixel width in virtual mode.
    pub width: Option<f32>,
    pub row: usize,
    pub column: usize,
}

/// Backend that owns the native nodes of one table section.
///
/// The pool drives it position-blind: create appends to the section (or
/// row), hide/unhide toggles retained nodes, and the bind calls push model
/// state into a node. Implemented over `web-sys` on wasm and by a recording
/// mock in native tests.
pub trait SlotDom {
    type Row: Clone;
    type Cell: Clone;

    /// Create a row node and append it to the section container.
    fn create_row(&mut self) -> Result<Self::Row>;

    /// Create a cell node and append it to the given row.
    fn create_cell(&mut self, row: &Self::Row) -> Result<Self::Cell>;

    fn set_row_hidden(&mut self, row: &Self::Row, hidden: bool);

    fn set_cell_hidden(&mut self, cell: &Self::Cell, hidden: bool);

    fn bind_row(&mut self, row: &Self::Row, binding: &RowBinding<'_>);

    fn bind_cell(&mut self, cell: &Self::Cell, binding: &CellBinding<'_>);

    /// Assign a sanitized HTML payload. Never called when the payload is
    /// absent, so width-only updates keep the previous contents.
    fn set_cell_html(&mut self, cell: &Self::Cell, html: &str);
}

/// One pooled row and its pooled cells.
pub struct RowSlot<D: SlotDom> {
    pub row: D::Row,
    pub cells: Vec<D::Cell>,
}

/// Logical bounds of the currently visible slots.
///
/// Everything below the bounds is visible; everything between the bounds
/// and the pool size is hidden but retained for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveArea {
    pub rows: usize,
    pub columns: usize,
}

/// Grow-only pool of row/cell slots bound to a single section container.
pub struct TableCache<D: SlotDom> {
    dom: D,
    rows: Vec<RowSlot<D>>,
    active: ActiveArea,
}

impl<D: SlotDom> TableCache<D> {
    pub fn new(dom: D) -> Self {
        TableCache {
            dom,
            rows: Vec::new(),
            active: ActiveArea::default(),
        }
    }

    /// Make the active area exactly `rows × columns`.
    ///
    /// Missing slots are allocated and appended; surplus slots are hidden,
    /// never detached. Returns true when *both* counts changed — callers
    /// treat this as a structural-change hint only. Resizing to the current
    /// shape touches nothing.
    pub fn resize(&mut self, rows: usize, columns: usize) -> Result<bool> {
        let previous = self.active;
        if previous.rows == rows && previous.columns == columns {
            return Ok(false);
        }

        // Grow the pool; new rows carry the new column count from birth.
        while self.rows.len() < rows {
            let row = self.dom.create_row()?;
            let mut cells = Vec::with_capacity(columns);
            for _ in 0..columns {
                cells.push(self.dom.create_cell(&row)?);
            }
            self.rows.push(RowSlot { row, cells });
        }

        for (index, slot) in self.rows.iter_mut().enumerate() {
            if index < rows {
                if index >= previous.rows {
                    self.dom.set_row_hidden(&slot.row, false);
                }
                // Reused rows may carry a stale column shape.
                while slot.cells.len() < columns {
                    slot.cells.push(self.dom.create_cell(&slot.row)?);
                }
                for (column, cell) in slot.cells.iter().enumerate() {
                    if column < columns {
                        if column >= previous.columns || index >= previous.rows {
                            self.dom.set_cell_hidden(cell, false);
                        }
                    } else if column < previous.columns || index >= previous.rows {
                        self.dom.set_cell_hidden(cell, true);
                    }
                }
            } else if index < previous.rows {
                self.dom.set_row_hidden(&slot.row, true);
            }
        }

        self.active = ActiveArea { rows, columns };
        Ok(previous.rows != rows && previous.columns != columns)
    }

    /// Row node at pool position `index`, if inside the active area.
    pub fn get_row(&self, index: usize) -> Option<&D::Row> {
        if index >= self.active.rows {
            return None;
        }
        self.rows.get(index).map(|slot| &slot.row)
    }

    /// Cell node at pool position `(row, column)`, if inside the active area.
    pub fn get_cell(&self, row: usize, column: usize) -> Option<&D::Cell> {
        if row >= self.active.rows || column >= self.active.columns {
            return None;
        }
        self.rows.get(row).and_then(|slot| slot.cells.get(column))
    }

    /// Current active area.
    pub fn active_area(&self) -> ActiveArea {
        self.active
    }

    /// Total pooled rows, including hidden ones.
    pub fn pool_rows(&self) -> usize {
        self.rows.len()
    }

    /// Backend access for bind calls during rendering.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Backend access for inspection.
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Bind a row slot and return whether the slot exists.
    pub fn bind_row(&mut self, index: usize, binding: &RowBinding<'_>) -> bool {
        if index >= self.active.rows {
            return false;
        }
        let Some(slot) = self.rows.get(index) else {
            return false;
        };
        self.dom.bind_row(&slot.row, binding);
        true
    }

    /// Bind a cell slot, optionally assigning an HTML payload.
    pub fn bind_cell(
        &mut self,
        row: usize,
        column: usize,
        binding: &CellBinding<'_>,
        html: Option<&str>,
    ) -> bool {
        if row >= self.active.rows || column >= self.active.columns {
            return false;
        }
        let Some(cell) = self.rows.get(row).and_then(|slot| slot.cells.get(column)) else {
            return false;
        };
        self.dom.bind_cell(cell, binding);
        if let Some(html) = html {
            self.dom.set_cell_html(cell, html);
        }
        true
    }
}
