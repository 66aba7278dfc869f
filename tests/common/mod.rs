//! Shared test doubles: a recording slot backend and a vec-backed provider.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::RefCell;

use domgrid::{CellBinding, Dimension, ModelProvider, Result, RowBinding, SlotDom, ViewportMetrics};

/// Recorded state of one pooled row node.
#[derive(Debug, Default, Clone)]
pub struct MockRow {
    pub hidden: bool,
    pub style: String,
    pub height: Option<f32>,
    pub cells: Vec<usize>,
}

/// Recorded state of one pooled cell node.
#[derive(Debug, Default, Clone)]
pub struct MockCell {
    pub hidden: bool,
    pub class: String,
    pub style: String,
    pub width: Option<f32>,
    pub data_row: usize,
    pub data_column: usize,
    pub html: Option<String>,
    pub bind_count: usize,
    pub html_writes: usize,
}

/// In-memory [`SlotDom`]: nodes are indices into the recording vectors, so
/// tests can assert exactly what the pool created, hid, and bound.
#[derive(Debug, Default)]
pub struct MockDom {
    pub rows: Vec<MockRow>,
    pub cells: Vec<MockCell>,
}

impl MockDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn created_cells(&self) -> usize {
        self.cells.len()
    }
}

impl SlotDom for MockDom {
    type Row = usize;
    type Cell = usize;

    fn create_row(&mut self) -> Result<usize> {
        self.rows.push(MockRow::default());
        Ok(self.rows.len() - 1)
    }

    fn create_cell(&mut self, row: &usize) -> Result<usize> {
        let id = self.cells.len();
        self.cells.push(MockCell::default());
        self.rows[*row].cells.push(id);
        Ok(id)
    }

    fn set_row_hidden(&mut self, row: &usize, hidden: bool) {
        self.rows[*row].hidden = hidden;
    }

    fn set_cell_hidden(&mut self, cell: &usize, hidden: bool) {
        self.cells[*cell].hidden = hidden;
    }

    fn bind_row(&mut self, row: &usize, binding: &RowBinding<'_>) {
        let slot = &mut self.rows[*row];
        slot.style = binding.style.to_string();
        slot.height = binding.height;
    }

    fn bind_cell(&mut self, cell: &usize, binding: &CellBinding<'_>) {
        let slot = &mut self.cells[*cell];
        slot.class = binding.class.to_string();
        slot.style = binding.style.to_string();
        slot.width = binding.width;
        slot.data_row = binding.row;
        slot.data_column = binding.column;
        slot.bind_count += 1;
    }

    fn set_cell_html(&mut self, cell: &usize, html: &str) {
        let slot = &mut self.cells[*cell];
        slot.html = Some(html.to_string());
        slot.html_writes += 1;
    }
}

/// Provider over literal cell contents with uniform geometry.
pub struct TestProvider {
    pub cells: Vec<Vec<String>>,
    pub columns: usize,
    pub row_height: Option<f32>,
    pub column_width: Option<f32>,
    pub clicks: RefCell<Vec<(usize, usize)>>,
}

impl TestProvider {
    /// Literal grid; dimensions come from the vec shape.
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        let columns = rows.first().map_or(0, |row| row.len());
        TestProvider {
            cells: rows
                .iter()
                .map(|row| row.iter().map(|c| (*c).to_string()).collect())
                .collect(),
            columns,
            row_height: None,
            column_width: None,
            clicks: RefCell::new(Vec::new()),
        }
    }

    /// Generated grid (`r{row}c{col}` contents) with fixed item sizes, the
    /// shape virtual scrolling tests use.
    pub fn generated(rows: usize, columns: usize, row_height: f32, column_width: f32) -> Self {
        TestProvider {
            cells: (0..rows)
                .map(|r| (0..columns).map(|c| format!("r{r}c{c}")).collect())
                .collect(),
            columns,
            row_height: Some(row_height),
            column_width: Some(column_width),
            clicks: RefCell::new(Vec::new()),
        }
    }
}

impl ModelProvider for TestProvider {
    fn dimension(&self) -> Dimension {
        Dimension {
            rows: self.cells.len(),
            columns: self.columns,
        }
    }

    fn row_height(&self, _row: usize) -> Option<f32> {
        self.row_height
    }

    fn column_width(&self, _column: usize) -> Option<f32> {
        self.column_width
    }

    fn styling_for_row(&self, row: usize) -> String {
        format!("--row: {row}")
    }

    fn styling_for_cell(&self, row: usize, column: usize) -> String {
        format!("--cell: {row}-{column}")
    }

    fn class_for_cell(&self, row: usize, column: usize) -> String {
        format!("cell-{row}-{column}")
    }

    fn cell_contents(&self, row: usize, column: usize) -> String {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
            .unwrap_or_default()
    }

    fn handle_click_cell(&self, row: usize, column: usize) {
        self.clicks.borrow_mut().push((row, column));
    }
}

/// Metrics for a 500×200 data surface at the given scroll offsets.
pub fn metrics(scroll_left: f32, scroll_top: f32) -> ViewportMetrics {
    ViewportMetrics {
        client_width: 500.0,
        client_height: 200.0,
        scroll_left,
        scroll_top,
    }
}
