//! Viewport resolution.
//!
//! Converts scroll offsets and container geometry into the set of rows and
//! columns that must be materialized, padded by the configured overflow
//! band on each side.

use crate::axis::{GridAxis, VisibleItems};
use crate::error::Result;
use crate::options::VirtualScrollingOptions;

/// Scroll position and client size of the data surface at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    pub client_width: f32,
    pub client_height: f32,
    pub scroll_left: f32,
    pub scroll_top: f32,
}

/// What must be rendered now, on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub horizontal: VisibleItems,
    pub vertical: VisibleItems,
}

impl Viewport {
    /// Resolve the current scroll state into a viewport.
    ///
    /// With virtual scrolling disabled this is the trivial full-range
    /// viewport regardless of scroll position; enabled, each axis is asked
    /// for the overflow-padded band around the visible range.
    pub fn resolve(
        row_axis: &GridAxis,
        column_axis: &GridAxis,
        metrics: &ViewportMetrics,
        opts: &VirtualScrollingOptions,
    ) -> Result<Viewport> {
        if !opts.enabled {
            return Ok(Viewport {
                horizontal: full_range(column_axis),
                vertical: full_range(row_axis),
            });
        }
        Ok(Viewport {
            horizontal: banded(
                column_axis,
                metrics.scroll_left,
                metrics.client_width,
                opts.view_overflow.horizontal,
            )?,
            vertical: banded(
                row_axis,
                metrics.scroll_top,
                metrics.client_height,
                opts.view_overflow.vertical,
            )?,
        })
    }
}

fn full_range(axis: &GridAxis) -> VisibleItems {
    VisibleItems {
        start_index: 0,
        count: axis.visible_items().len(),
        start_position: 0.0,
        view_start_index: 0,
        view_count: 0,
    }
}

fn banded(axis: &GridAxis, scroll: f32, client: f32, overflow: f32) -> Result<VisibleItems> {
    let band_start = scroll - client * overflow;
    let band_size = client * (1.0 + 2.0 * overflow);
    axis.get_visible_items(band_start, band_size, scroll, client)
}

/// True when the scroll offset has moved past the overflow band committed
/// by the last viewport resolution, on either axis.
///
/// Small scrolls inside the band are free; only a move of more than one
/// overflow band forces a re-render. Always false when virtual scrolling is
/// disabled (the whole grid is already rendered).
pub fn is_outside_safe_view_zone(
    committed: &ViewportMetrics,
    current: &ViewportMetrics,
    opts: &VirtualScrollingOptions,
) -> bool {
    if !opts.enabled {
        return false;
    }
    let safe_y = current.client_height * opts.view_overflow.vertical;
    let safe_x = current.client_width * opts.view_overflow.horizontal;
    (current.scroll_top - committed.scroll_top).abs() > safe_y
        || (current.scroll_left - committed.scroll_left).abs() > safe_x
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::options::ViewOverflow;

    fn axes() -> (GridAxis, GridAxis) {
        let rows = GridAxis::new(1000, 0.0, |_| 20.0);
        let columns = GridAxis::new(20, 0.0, |_| 100.0);
        (rows, columns)
    }

    fn virtual_opts() -> VirtualScrollingOptions {
        VirtualScrollingOptions {
            enabled: true,
            ..VirtualScrollingOptions::default()
        }
    }

    fn metrics(scroll_left: f32, scroll_top: f32) -> ViewportMetrics {
        ViewportMetrics {
            client_width: 500.0,
            client_height: 200.0,
            scroll_left,
            scroll_top,
        }
    }

    #[test]
    fn disabled_covers_everything() {
        let (rows, columns) = axes();
        let opts = VirtualScrollingOptions::default();
        let viewport =
            Viewport::resolve(&rows, &columns, &metrics(9999.0, 9999.0), &opts).unwrap();
        assert_eq!(viewport.vertical.count, 1000);
        assert_eq!(viewport.horizontal.count, 20);
        assert_eq!(viewport.vertical.start_index, 0);
        assert_eq!(viewport.vertical.start_position, 0.0);
        assert_eq!(viewport.vertical.view_count, 0);
    }

    #[test]
    fn top_of_grid_band() {
        let (rows, columns) = axes();
        let viewport =
            Viewport::resolve(&rows, &columns, &metrics(0.0, 0.0), &virtual_opts()).unwrap();
        let v = viewport.vertical;
        assert_eq!(v.start_index, 0);
        assert_eq!(v.count, 30);
        assert_eq!(v.start_position, 0.0);
        assert_eq!(v.view_start_index, 0);
        assert_eq!(v.view_count, 10);
    }

    #[test]
    fn scrolled_band_keeps_overflow_on_both_sides() {
        let (rows, columns) = axes();
        let viewport =
            Viewport::resolve(&rows, &columns, &metrics(0.0, 400.0), &virtual_opts()).unwrap();
        let v = viewport.vertical;
        assert_eq!(v.start_index, 10);
        assert_eq!(v.count, 30);
        assert_eq!(v.start_position, 200.0);
        assert_eq!(v.view_start_index, 10);
        assert_eq!(v.view_count, 10);
    }

    #[test]
    fn band_width_matches_overflow_multiplier() {
        let (rows, columns) = axes();
        let mut opts = virtual_opts();
        opts.view_overflow = ViewOverflow {
            horizontal: 0.0,
            vertical: 2.0,
        };
        let viewport =
            Viewport::resolve(&rows, &columns, &metrics(0.0, 2000.0), &opts).unwrap();
        // band = 200 * (1 + 2*2) = 1000px = 50 rows
        assert_eq!(viewport.vertical.count, 50);
        // horizontal band with no overflow covers exactly the client width
        assert_eq!(viewport.horizontal.count, 5);
        assert!(
            viewport.vertical.view_start_index + viewport.vertical.view_count
                <= viewport.vertical.count
        );
    }

    #[test]
    fn safe_zone_hysteresis() {
        let opts = virtual_opts();
        let committed = metrics(0.0, 0.0);
        assert!(!is_outside_safe_view_zone(&committed, &metrics(0.0, 0.0), &opts));
        assert!(!is_outside_safe_view_zone(&committed, &metrics(0.0, 150.0), &opts));
        assert!(!is_outside_safe_view_zone(&committed, &metrics(0.0, 200.0), &opts));
        assert!(is_outside_safe_view_zone(&committed, &metrics(0.0, 201.0), &opts));
        assert!(is_outside_safe_view_zone(&committed, &metrics(0.0, 400.0), &opts));
        assert!(is_outside_safe_view_zone(&committed, &metrics(501.0, 0.0), &opts));
        assert!(!is_outside_safe_view_zone(&committed, &metrics(500.0, 0.0), &opts));
    }

    #[test]
    fn safe_zone_never_trips_when_disabled() {
        let opts = VirtualScrollingOptions::default();
        assert!(!is_outside_safe_view_zone(
            &metrics(0.0, 0.0),
            &metrics(0.0, 100000.0),
            &opts
        ));
    }
}
