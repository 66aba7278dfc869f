//! domgrid - virtualized DOM data grid for the web
//!
//! Renders arbitrarily large tables (thousands of rows × dozens of columns)
//! inside a bounded scrollable viewport via WebAssembly:
//! - Retained slot pool — DOM size proportional to the visible area
//! - O(log n) per-axis geometry with variable sizes, hiding, and reordering
//! - Cooperative multi-frame updates, one chunk per animation frame
//! - Header and id surfaces scroll-slaved to the data body
//! - Per-cell HTML sanitization with an optional worker pipeline
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'domgrid';
//! await init();
//! const grid = new GridView(root, provider, { sanitize: DOMPurify.sanitize },
//!                           { enabled: true, viewOverflow: { vertical: 1 } });
//! grid.mount();
//! ```

// Pure core (builds and tests natively)
pub mod axis;
pub mod cache;
pub mod engine;
pub mod error;
pub mod options;
pub mod provider;
pub mod values;
pub mod viewport;

// DOM-facing surface (wasm32 only)
#[cfg(target_arch = "wasm32")]
pub mod viewer;

pub use axis::{GridAxis, VisibleItems};
pub use cache::{ActiveArea, CellBinding, RowBinding, SlotDom, TableCache};
pub use engine::{GridEngine, Placement, RenderState, Tick};
pub use error::{GridError, Result};
pub use options::{ViewOverflow, VirtualScrollingOptions};
pub use provider::{Dimension, ModelProvider};
pub use values::{CellValueCache, NoopSanitizer, Sanitizer};
pub use viewport::{is_outside_safe_view_zone, Viewport, ViewportMetrics};

#[cfg(target_arch = "wasm32")]
pub use viewer::GridView;

use wasm_bindgen::prelude::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
