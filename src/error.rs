//! Structured error types for domgrid.
//!
//! Geometry and query failures are fatal at the call site; everything
//! recoverable (short provider rows, sanitizer failures) is handled inline
//! with a one-shot warning instead of an error.

/// All errors that can occur while building or updating a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Virtual scrolling requires a size for every item on both axes.
    #[error("missing {axis} size for item {index} (required when virtual scrolling is enabled)")]
    MissingGeometry {
        /// Axis name, `"row"` or `"column"`.
        axis: &'static str,
        /// Data index of the item lacking a size.
        index: usize,
    },

    /// Negative band or view size passed to an axis query.
    #[error("invalid axis query: {0}")]
    InvalidAxisQuery(String),

    /// HTML sanitization failure.
    #[error("sanitizer: {0}")]
    Sanitizer(String),

    /// DOM node creation or attachment failure.
    #[error("DOM: {0}")]
    Dom(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
