//! `web-sys` slot backend: one instance per table section (`tbody`).

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::cache::{CellBinding, RowBinding, SlotDom};
use crate::error::{GridError, Result};

/// Slot node factory and binder over a fixed section container.
pub struct DomSection {
    document: Document,
    container: Element,
}

impl DomSection {
    pub fn new(document: Document, container: Element) -> Self {
        DomSection {
            document,
            container,
        }
    }

    /// The section container (`tbody`) this backend appends into.
    pub fn container(&self) -> &Element {
        &self.container
    }

    fn create(&self, tag: &str) -> Result<HtmlElement> {
        self.document
            .create_element(tag)
            .map_err(|_| GridError::Dom(format!("failed to create <{tag}>")))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| GridError::Dom(format!("<{tag}> is not an HTMLElement")))
    }
}

impl SlotDom for DomSection {
    type Row = HtmlElement;
    type Cell = HtmlElement;

    fn create_row(&mut self) -> Result<Self::Row> {
        let row = self.create("tr")?;
        self.container
            .append_child(&row)
            .map_err(|_| GridError::Dom("failed to append row".into()))?;
        Ok(row)
    }

    fn create_cell(&mut self, row: &Self::Row) -> Result<Self::Cell> {
        let cell = self.create("td")?;
        row.append_child(&cell)
            .map_err(|_| GridError::Dom("failed to append cell".into()))?;
        Ok(cell)
    }

    fn set_row_hidden(&mut self, row: &Self::Row, hidden: bool) {
        row.set_hidden(hidden);
    }

    fn set_cell_hidden(&mut self, cell: &Self::Cell, hidden: bool) {
        cell.set_hidden(hidden);
    }

    fn bind_row(&mut self, row: &Self::Row, binding: &RowBinding<'_>) {
        let _ = row.set_attribute("style", binding.style);
        if let Some(height) = binding.height {
            let style = row.style();
            let _ = style.set_property("height", &format!("{height}px"));
            let _ = style.set_property("overflow", "hidden");
        }
    }

    fn bind_cell(&mut self, cell: &Self::Cell, binding: &CellBinding<'_>) {
        cell.set_class_name(binding.class);
        let _ = cell.set_attribute("style", binding.style);
        if let Some(width) = binding.width {
            let style = cell.style();
            let _ = style.set_property("width", &format!("{width}px"));
            let _ = style.set_property("overflow", "hidden");
        }
        let _ = cell.set_attribute("data-row", &binding.row.to_string());
        let _ = cell.set_attribute("data-col", &binding.column.to_string());
    }

    fn set_cell_html(&mut self, cell: &Self::Cell, html: &str) {
        cell.set_inner_html(html);
    }
}
