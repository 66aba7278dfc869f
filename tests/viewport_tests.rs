//! Viewport resolution and safe-zone hysteresis.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

mod common;

use common::metrics;
use domgrid::{
    is_outside_safe_view_zone, GridAxis, ViewOverflow, Viewport, VirtualScrollingOptions,
};

fn thousand_row_axes() -> (GridAxis, GridAxis) {
    (
        GridAxis::new(1000, 0.0, |_| 20.0),
        GridAxis::new(40, 0.0, |_| 100.0),
    )
}

fn enabled() -> VirtualScrollingOptions {
    VirtualScrollingOptions {
        enabled: true,
        ..VirtualScrollingOptions::default()
    }
}

#[test]
fn disabled_viewport_covers_everything_at_any_scroll() {
    let (rows, columns) = thousand_row_axes();
    let opts = VirtualScrollingOptions::default();
    for scroll in [0.0, 123.0, 10_000.0] {
        let viewport = Viewport::resolve(&rows, &columns, &metrics(scroll, scroll), &opts).unwrap();
        assert_eq!(viewport.vertical.start_index, 0);
        assert_eq!(viewport.vertical.count, 1000);
        assert_eq!(viewport.horizontal.count, 40);
        assert_eq!(viewport.vertical.view_count, 0);
    }
}

#[test]
fn band_at_origin_pads_only_below() {
    let (rows, columns) = thousand_row_axes();
    let viewport = Viewport::resolve(&rows, &columns, &metrics(0.0, 0.0), &enabled()).unwrap();
    let v = viewport.vertical;
    // 200px view + one viewport of padding clipped at the top: 30 rows.
    assert_eq!(v.start_index, 0);
    assert_eq!(v.count, 30);
    assert_eq!(v.start_position, 0.0);
    assert_eq!(v.view_start_index, 0);
    assert_eq!(v.view_count, 10);
}

#[test]
fn band_mid_grid_pads_both_sides() {
    let (rows, columns) = thousand_row_axes();
    let viewport = Viewport::resolve(&rows, &columns, &metrics(0.0, 400.0), &enabled()).unwrap();
    let v = viewport.vertical;
    assert_eq!(v.start_index, 10);
    assert_eq!(v.count, 30);
    assert_eq!(v.start_position, 200.0);
    assert_eq!(v.view_start_index, 10);
    assert_eq!(v.view_count, 10);
}

#[test]
fn band_extent_scales_with_overflow() {
    let (rows, columns) = thousand_row_axes();
    for overflow in [0.0f32, 0.5, 1.0, 2.0] {
        let opts = VirtualScrollingOptions {
            enabled: true,
            view_overflow: ViewOverflow {
                horizontal: 0.0,
                vertical: overflow,
            },
            border_spacing: 0.0,
        };
        let viewport =
            Viewport::resolve(&rows, &columns, &metrics(0.0, 8_000.0), &opts).unwrap();
        let v = viewport.vertical;
        // Unclipped mid-grid band: clientHeight * (1 + 2o) worth of 20px rows.
        let expected = (200.0 * (1.0 + 2.0 * overflow) / 20.0) as usize;
        assert_eq!(v.count, expected, "overflow {overflow}");
        assert!(v.view_start_index + v.view_count <= v.count);
    }
}

#[test]
fn view_range_never_exceeds_band() {
    let (rows, columns) = thousand_row_axes();
    for scroll in [0.0, 190.0, 400.0, 19_700.0, 19_800.0] {
        let viewport =
            Viewport::resolve(&rows, &columns, &metrics(0.0, scroll), &enabled()).unwrap();
        let v = viewport.vertical;
        assert!(
            v.view_start_index + v.view_count <= v.count,
            "scroll {scroll}: view {}+{} > count {}",
            v.view_start_index,
            v.view_count,
            v.count
        );
    }
}

#[test]
fn safe_zone_trips_only_past_one_overflow_band() {
    let opts = enabled();
    let committed = metrics(0.0, 400.0);
    // Vertical band is clientHeight * overflow = 200px on each side.
    assert!(!is_outside_safe_view_zone(&committed, &metrics(0.0, 400.0), &opts));
    assert!(!is_outside_safe_view_zone(&committed, &metrics(0.0, 599.0), &opts));
    assert!(!is_outside_safe_view_zone(&committed, &metrics(0.0, 201.0), &opts));
    assert!(is_outside_safe_view_zone(&committed, &metrics(0.0, 601.0), &opts));
    assert!(is_outside_safe_view_zone(&committed, &metrics(0.0, 100.0), &opts));
    // Horizontal band is clientWidth * overflow = 500px.
    assert!(!is_outside_safe_view_zone(&committed, &metrics(499.0, 400.0), &opts));
    assert!(is_outside_safe_view_zone(&committed, &metrics(501.0, 400.0), &opts));
}

#[test]
fn safe_zone_is_inert_when_disabled() {
    let opts = VirtualScrollingOptions::default();
    assert!(!is_outside_safe_view_zone(
        &metrics(0.0, 0.0),
        &metrics(99_999.0, 99_999.0),
        &opts
    ));
}
