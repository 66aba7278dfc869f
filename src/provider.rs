//! The model provider contract.
//!
//! The grid never owns data; it asks an opaque provider for dimensions,
//! geometry, styling, and cell markup. All operations are pure except
//! `handle_click_cell`.

/// Fixed dimensions of the underlying model.
///
/// A provider whose dimension changes after the grid is built is undefined
/// behavior; an upstream layer must remount the grid instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimension {
    pub rows: usize,
    pub columns: usize,
}

/// Capability record consumed by the grid engine.
///
/// Styling hooks return CSS fragments (`style` attribute text) or class
/// strings; `cell_contents` returns raw HTML that the engine sanitizes
/// before it reaches a slot.
pub trait ModelProvider {
    /// Row and column counts; fixed for the lifetime of the grid.
    fn dimension(&self) -> Dimension;

    /// Height of a data row in pixels. Required when virtual scrolling is
    /// enabled; `None` otherwise means natural layout.
    fn row_height(&self, row: usize) -> Option<f32>;

    /// Width of a data column in pixels. Same contract as [`Self::row_height`].
    fn column_width(&self, column: usize) -> Option<f32>;

    /// Inline style for a row element.
    fn styling_for_row(&self, row: usize) -> String;

    /// Inline style for a cell element.
    fn styling_for_cell(&self, row: usize, column: usize) -> String;

    /// Class string for a cell element.
    fn class_for_cell(&self, row: usize, column: usize) -> String;

    /// Raw (unsanitized) HTML for a single cell.
    fn cell_contents(&self, row: usize, column: usize) -> String;

    /// Raw HTML for a whole row, column-ordered. The default builds the row
    /// from `cell_contents`; providers with row-major storage override it.
    fn row_contents(&self, row: usize) -> Vec<String> {
        let columns = self.dimension().columns;
        (0..columns).map(|c| self.cell_contents(row, c)).collect()
    }

    /// Click sink; the only side-effectful operation on the provider.
    fn handle_click_cell(&self, row: usize, column: usize);
}

/// Pad a provider row to the model's column count.
///
/// Returns true when padding happened, so callers can warn once about the
/// stale row length. Out-of-range cells become empty strings.
pub(crate) fn pad_row_contents(values: &mut Vec<String>, columns: usize) -> bool {
    if values.len() >= columns {
        values.truncate(columns);
        return false;
    }
    values.resize(columns, String::new());
    true
}

/// One-shot diagnostics channel: browser console on wasm, stderr natively.
pub(crate) fn console_warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("domgrid: {message}");
}
