//! Adapters over host JavaScript objects.
//!
//! The host hands the grid two plain objects: a model provider and a
//! sanitizer. Their methods are resolved once at construction with
//! `Reflect::get`; missing optional methods degrade to the documented
//! fallbacks rather than throwing mid-render.

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use crate::error::{GridError, Result};
use crate::provider::{console_warn, Dimension, ModelProvider};
use crate::values::Sanitizer;

fn method(target: &Object, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn required_method(target: &Object, name: &str) -> Result<Function> {
    method(target, name).ok_or_else(|| GridError::Dom(format!("provider method {name} missing")))
}

/// [`ModelProvider`] backed by a host JavaScript object.
///
/// `getDimension`, `stylingForRow`, `stylingForCell`, `classForCell`, and
/// `getRowContents` are required. `getRowHeight` and `getCellWidth` are
/// optional and gate virtual scrolling; `handleClickCell` is optional.
#[derive(Clone)]
pub struct JsModelProvider {
    target: Object,
    dimension: Dimension,
    row_height: Option<Function>,
    cell_width: Option<Function>,
    styling_for_row: Function,
    styling_for_cell: Function,
    class_for_cell: Function,
    row_contents: Function,
    handle_click_cell: Option<Function>,
}

impl JsModelProvider {
    pub fn new(target: Object) -> Result<Self> {
        let get_dimension = required_method(&target, "getDimension")?;
        let dimension = read_dimension(&get_dimension.call0(&target))?;
        Ok(JsModelProvider {
            row_height: method(&target, "getRowHeight"),
            cell_width: method(&target, "getCellWidth"),
            styling_for_row: required_method(&target, "stylingForRow")?,
            styling_for_cell: required_method(&target, "stylingForCell")?,
            class_for_cell: required_method(&target, "classForCell")?,
            row_contents: required_method(&target, "getRowContents")?,
            handle_click_cell: method(&target, "handleClickCell"),
            target,
            dimension,
        })
    }

    fn call_string1(&self, f: &Function, a: usize) -> String {
        f.call1(&self.target, &JsValue::from_f64(a as f64))
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }

    fn call_string2(&self, f: &Function, a: usize, b: usize) -> String {
        f.call2(
            &self.target,
            &JsValue::from_f64(a as f64),
            &JsValue::from_f64(b as f64),
        )
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn call_length(f: Option<&Function>, target: &Object, index: usize) -> Option<f32> {
    let value = f?.call1(target, &JsValue::from_f64(index as f64)).ok()?;
    value.as_f64().map(|v| v as f32)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn read_dimension(value: &std::result::Result<JsValue, JsValue>) -> Result<Dimension> {
    let value = value
        .as_ref()
        .map_err(|_| GridError::Dom("getDimension threw".into()))?;
    let field = |name: &str| -> Result<usize> {
        Reflect::get(value, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_f64())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as usize)
            .ok_or_else(|| GridError::Dom(format!("dimension field {name} invalid")))
    };
    Ok(Dimension {
        rows: field("rows")?,
        columns: field("columns")?,
    })
}

impl ModelProvider for JsModelProvider {
    fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn row_height(&self, row: usize) -> Option<f32> {
        call_length(self.row_height.as_ref(), &self.target, row)
    }

    fn column_width(&self, column: usize) -> Option<f32> {
        call_length(self.cell_width.as_ref(), &self.target, column)
    }

    fn styling_for_row(&self, row: usize) -> String {
        self.call_string1(&self.styling_for_row, row)
    }

    fn styling_for_cell(&self, row: usize, column: usize) -> String {
        self.call_string2(&self.styling_for_cell, row, column)
    }

    fn class_for_cell(&self, row: usize, column: usize) -> String {
        self.call_string2(&self.class_for_cell, row, column)
    }

    fn cell_contents(&self, row: usize, column: usize) -> String {
        self.row_contents(row)
            .into_iter()
            .nth(column)
            .unwrap_or_default()
    }

    fn row_contents(&self, row: usize) -> Vec<String> {
        let Ok(value) = self
            .row_contents
            .call1(&self.target, &JsValue::from_f64(row as f64))
        else {
            console_warn(&format!("getRowContents threw for row {row}"));
            return Vec::new();
        };
        let Ok(array) = value.dyn_into::<Array>() else {
            console_warn(&format!("getRowContents returned a non-array for row {row}"));
            return Vec::new();
        };
        array
            .iter()
            .map(|v| v.as_string().unwrap_or_default())
            .collect()
    }

    fn handle_click_cell(&self, row: usize, column: usize) {
        if let Some(f) = &self.handle_click_cell {
            let _ = f.call2(
                &self.target,
                &JsValue::from_f64(row as f64),
                &JsValue::from_f64(column as f64),
            );
        }
    }
}

/// [`Sanitizer`] backed by a host JavaScript object with a `sanitize(html)`
/// method and an optional `sanitizeInPlace(node)` for whole-body passes.
#[derive(Clone)]
pub struct JsSanitizer {
    target: Object,
    sanitize: Function,
    sanitize_in_place: Option<Function>,
}

impl JsSanitizer {
    pub fn new(target: Object) -> Result<Self> {
        Ok(JsSanitizer {
            sanitize: required_method(&target, "sanitize")?,
            sanitize_in_place: method(&target, "sanitizeInPlace"),
            target,
        })
    }

    /// Sanitize a rendered subtree in place when the host supports it.
    /// Used on the non-virtual path where cells are written unsanitized
    /// and cleaned in one pass.
    pub fn sanitize_in_place(&self, node: &web_sys::Node) -> bool {
        match &self.sanitize_in_place {
            Some(f) => f.call1(&self.target, node).is_ok(),
            None => false,
        }
    }
}

impl Sanitizer for JsSanitizer {
    fn sanitize(&self, html: &str) -> Result<String> {
        let value = self
            .sanitize
            .call1(&self.target, &JsValue::from_str(html))
            .map_err(|_| GridError::Sanitizer("sanitize threw".into()))?;
        value
            .as_string()
            .ok_or_else(|| GridError::Sanitizer("sanitize returned a non-string".into()))
    }
}
