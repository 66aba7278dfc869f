//! Slot pool discipline: grow-only allocation, hide-on-shrink, and active
//! area bounds.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::MockDom;
use domgrid::TableCache;

#[test]
fn slots_defined_exactly_inside_active_area() {
    let mut cache = TableCache::new(MockDom::new());
    cache.resize(3, 4).unwrap();

    for row in 0..3 {
        assert!(cache.get_row(row).is_some());
        for column in 0..4 {
            assert!(cache.get_cell(row, column).is_some());
        }
        assert!(cache.get_cell(row, 4).is_none());
    }
    assert!(cache.get_row(3).is_none());
    assert!(cache.get_cell(3, 0).is_none());
}

#[test]
fn resize_to_same_shape_is_a_no_op() {
    let mut cache = TableCache::new(MockDom::new());
    cache.resize(5, 3).unwrap();
    let rows_before = cache.dom().created_rows();
    let cells_before = cache.dom().created_cells();

    let changed = cache.resize(5, 3).unwrap();

    assert!(!changed);
    assert_eq!(cache.dom().created_rows(), rows_before);
    assert_eq!(cache.dom().created_cells(), cells_before);
    assert!(cache.dom().rows.iter().take(5).all(|row| !row.hidden));
}

#[test]
fn shrinking_hides_instead_of_detaching() {
    let mut cache = TableCache::new(MockDom::new());
    cache.resize(6, 4).unwrap();
    cache.resize(2, 2).unwrap();

    // Pool keeps every node; rows 2..6 and columns 2..4 are hidden.
    assert_eq!(cache.dom().created_rows(), 6);
    assert_eq!(cache.dom().created_cells(), 24);
    assert_eq!(cache.pool_rows(), 6);
    for row in 0..6 {
        assert_eq!(cache.dom().rows[row].hidden, row >= 2);
    }
    let first_row_cells = &cache.dom().rows[0].cells;
    for (column, &cell) in first_row_cells.iter().enumerate() {
        assert_eq!(cache.dom().cells[cell].hidden, column >= 2);
    }
    assert!(cache.get_row(2).is_none());
    assert!(cache.get_cell(0, 2).is_none());
}

#[test]
fn regrowing_reuses_hidden_slots() {
    let mut cache = TableCache::new(MockDom::new());
    cache.resize(6, 4).unwrap();
    cache.resize(2, 2).unwrap();
    cache.resize(6, 4).unwrap();

    assert_eq!(cache.dom().created_rows(), 6);
    assert_eq!(cache.dom().created_cells(), 24);
    assert!(cache.dom().rows.iter().all(|row| !row.hidden));
    assert!(cache.dom().cells.iter().all(|cell| !cell.hidden));
}

#[test]
fn pool_growth_is_monotone() {
    let mut cache = TableCache::new(MockDom::new());
    let mut max_rows = 0usize;
    for rows in [4usize, 1, 7, 2, 7, 12, 3] {
        cache.resize(rows, 2).unwrap();
        max_rows = max_rows.max(rows);
        assert_eq!(cache.pool_rows(), max_rows);
    }
}

#[test]
fn widening_pads_reused_rows_with_new_cells() {
    let mut cache = TableCache::new(MockDom::new());
    cache.resize(3, 2).unwrap();
    cache.resize(3, 5).unwrap();

    assert_eq!(cache.dom().created_cells(), 15);
    for row in 0..3 {
        assert_eq!(cache.dom().rows[row].cells.len(), 5);
        for &cell in &cache.dom().rows[row].cells {
            assert!(!cache.dom().cells[cell].hidden);
        }
    }
}

#[test]
fn return_value_flags_both_counts_changing() {
    let mut cache = TableCache::new(MockDom::new());
    assert!(cache.resize(3, 3).unwrap());
    assert!(!cache.resize(5, 3).unwrap());
    assert!(!cache.resize(5, 7).unwrap());
    assert!(cache.resize(2, 2).unwrap());
}
