//! Virtual scrolling configuration.
//!
//! Hosts pass these as a plain JS object (camelCase, all fields optional);
//! native callers construct them directly.

use serde::{Deserialize, Serialize};

/// Default row height in pixels when the provider supplies none
/// (non-virtual mode only; virtual mode requires explicit sizes).
pub const DEFAULT_ROW_HEIGHT: f32 = 50.0;

/// Default column width in pixels when the provider supplies none.
pub const DEFAULT_COLUMN_WIDTH: f32 = 200.0;

/// Overflow padding band per axis, as a multiplier of the viewport size.
///
/// A value of 1 materializes one extra viewport worth of items on each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOverflow {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Default for ViewOverflow {
    fn default() -> Self {
        ViewOverflow {
            horizontal: 1.0,
            vertical: 1.0,
        }
    }
}

/// Grid-level virtual scrolling options.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualScrollingOptions {
    /// When false, every row and column is rendered and the body is
    /// sanitized once as a whole; no slot reuse happens.
    pub enabled: bool,
    /// Padding band multipliers.
    pub view_overflow: ViewOverflow,
    /// Spacing added between every pair of items on both axes
    /// (CSS `border-spacing`); contributes to axis positions.
    pub border_spacing: f32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_object() {
        let opts: VirtualScrollingOptions = serde_json::from_str("{}").unwrap();
        assert!(!opts.enabled);
        assert_eq!(opts.view_overflow.horizontal, 1.0);
        assert_eq!(opts.view_overflow.vertical, 1.0);
        assert_eq!(opts.border_spacing, 0.0);
    }

    #[test]
    fn camel_case_fields() {
        let opts: VirtualScrollingOptions = serde_json::from_str(
            r#"{"enabled": true, "viewOverflow": {"vertical": 0.5}, "borderSpacing": 2}"#,
        )
        .unwrap();
        assert!(opts.enabled);
        assert_eq!(opts.view_overflow.vertical, 0.5);
        assert_eq!(opts.view_overflow.horizontal, 1.0);
        assert_eq!(opts.border_spacing, 2.0);
    }
}
