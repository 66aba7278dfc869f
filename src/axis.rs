//! Per-axis grid geometry.
//!
//! An axis owns the item order, the hidden set, and the cumulative start
//! positions of the visible items, enabling O(log n) position-to-index
//! lookups under hiding and reordering.

use std::collections::HashSet;

use crate::error::{GridError, Result};

/// One-dimensional geometry for rows or columns.
///
/// `position_start` has one entry per visible item plus a final edge, so
/// `position_start[i]` is the pixel offset of the i-th visible item and the
/// last entry is the total axis extent.
#[derive(Clone)]
pub struct GridAxis {
    item_order: Vec<usize>,
    hidden_items: HashSet<usize>,
    visible_items: Vec<usize>,
    position_start: Vec<f32>,
    sizes: Vec<f32>,
    border: f32,
}

/// Result of an axis band query.
///
/// `start_index`/`count` describe the materialized band as indices into the
/// visible items; `view_start_index`/`view_count` describe the on-screen
/// sub-range *within the band* (offset from `start_index`), used to
/// prioritize render order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisibleItems {
    pub start_index: usize,
    pub count: usize,
    pub start_position: f32,
    pub view_start_index: usize,
    pub view_count: usize,
}

impl GridAxis {
    /// Create an axis of `size` items in natural order.
    ///
    /// `border` is added after every item (CSS `border-spacing`); `get_size`
    /// is sampled once per item at construction — the model's dimension is
    /// fixed for the lifetime of the grid.
    pub fn new(size: usize, border: f32, get_size: impl Fn(usize) -> f32) -> Self {
        let mut axis = GridAxis {
            item_order: (0..size).collect(),
            hidden_items: HashSet::new(),
            visible_items: Vec::new(),
            position_start: Vec::new(),
            sizes: (0..size).map(get_size).collect(),
            border,
        };
        axis.refresh();
        axis
    }

    /// Rebuild `visible_items` and `position_start` in a single pass.
    ///
    /// Must run after any change to the item order or the hidden set.
    pub fn refresh(&mut self) {
        self.visible_items.clear();
        self.visible_items.extend(
            self.item_order
                .iter()
                .copied()
                .filter(|i| !self.hidden_items.contains(i)),
        );

        self.position_start.clear();
        self.position_start.reserve(self.visible_items.len() + 1);
        let mut pos = 0.0f32;
        self.position_start.push(pos);
        for &item in &self.visible_items {
            pos += self.sizes.get(item).copied().unwrap_or(0.0) + self.border;
            self.position_start.push(pos);
        }
    }

    /// Items in display order with hidden items removed.
    pub fn visible_items(&self) -> &[usize] {
        &self.visible_items
    }

    /// Display order including hidden items.
    pub fn item_order(&self) -> &[usize] {
        &self.item_order
    }

    /// Cumulative start positions (`visible_items().len() + 1` entries).
    pub fn position_start(&self) -> &[f32] {
        &self.position_start
    }

    /// Number of hidden items.
    pub fn hidden_count(&self) -> usize {
        self.hidden_items.len()
    }

    /// Size of the item at the given data index.
    pub fn item_size(&self, index: usize) -> f32 {
        self.sizes.get(index).copied().unwrap_or(0.0)
    }

    /// Total extent of the axis (sum of visible sizes plus borders).
    pub fn total_size(&self) -> f32 {
        self.position_start.last().copied().unwrap_or(0.0)
    }

    /// Replace the display order. The order must be a permutation of the
    /// data indices; callers own that invariant. Runs `refresh()`.
    pub fn set_item_order(&mut self, order: Vec<usize>) {
        self.item_order = order;
        self.refresh();
    }

    /// Exclude an item from display. Runs `refresh()`.
    pub fn hide_item(&mut self, index: usize) {
        self.hidden_items.insert(index);
        self.refresh();
    }

    /// Re-include a hidden item. Runs `refresh()`.
    pub fn show_item(&mut self, index: usize) {
        self.hidden_items.remove(&index);
        self.refresh();
    }

    /// Replace the hidden set wholesale. Runs `refresh()`.
    pub fn set_hidden(&mut self, hidden: HashSet<usize>) {
        self.hidden_items = hidden;
        self.refresh();
    }

    /// Largest visible-item index `i` with `position_start[i] <= p`.
    ///
    /// Out-of-range positions clamp: `p < 0` returns 0, `p >= total_size()`
    /// returns the last item index. In particular `search(total_size())`
    /// returns `visible_items().len() - 1`, never the final edge.
    pub fn search(&self, p: f32) -> usize {
        let items = self.visible_items.len();
        let Some(starts) = self.position_start.get(..items) else {
            return 0;
        };
        match starts.binary_search_by(|pos| {
            pos.partial_cmp(&p).unwrap_or(std::cmp::Ordering::Equal)
        }) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    /// Resolve the band `[start, start + size]` and the on-screen sub-band
    /// `[view_start, view_start + view_size]` into visible-item indices.
    ///
    /// Positions are clamped to `[0, total_size()]`; an item whose start
    /// falls exactly on the clamped band end is excluded. Fails only on a
    /// negative `size` or `view_size`.
    pub fn get_visible_items(
        &self,
        start: f32,
        size: f32,
        view_start: f32,
        view_size: f32,
    ) -> Result<VisibleItems> {
        if size < 0.0 || view_size < 0.0 {
            return Err(GridError::InvalidAxisQuery(format!(
                "negative band size (size: {size}, view size: {view_size})"
            )));
        }
        let items = self.visible_items.len();
        if items == 0 {
            return Ok(VisibleItems::default());
        }

        let total = self.total_size();
        // The band keeps its full extent when it overhangs the axis origin:
        // clamp the start first, then measure the size from the clamped
        // start, so the overflow padding slides inside the axis instead of
        // being cut off.
        let band_start = start.clamp(0.0, total);
        let band_end = (band_start + size).clamp(0.0, total);

        let start_index = self.search(band_start);
        let end_index = self.index_before(band_end, start_index);
        let count = (end_index - start_index + 1).min(items - start_index);

        let band_last = start_index + count - 1;
        let view_band_start = view_start.clamp(0.0, total);
        let view_band_end = (view_band_start + view_size).clamp(0.0, total);
        let view_first = self.search(view_band_start).clamp(start_index, band_last);
        let view_last = self.index_before(view_band_end, view_first).min(band_last);
        let view_start_index = view_first - start_index;
        let view_count = view_last - view_first + 1;

        Ok(VisibleItems {
            start_index,
            count,
            start_position: self.position_start.get(start_index).copied().unwrap_or(0.0),
            view_start_index,
            view_count,
        })
    }

    /// Last item starting strictly before `end`, floored at `floor`.
    fn index_before(&self, end: f32, floor: usize) -> usize {
        let mut index = self.search(end);
        let starts_at_end = self
            .position_start
            .get(index)
            .is_some_and(|&pos| pos >= end);
        if starts_at_end && index > floor {
            index -= 1;
        }
        index.max(floor)
    }
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
    use test_case::test_case;

    fn uniform(size: usize, item: f32) -> GridAxis {
        GridAxis::new(size, 0.0, |_| item)
    }

    #[test]
    fn construction_positions() {
        let axis = uniform(4, 10.0);
        assert_eq!(axis.position_start(), &[0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(axis.visible_items(), &[0, 1, 2, 3]);
        assert_eq!(axis.total_size(), 40.0);
    }

    #[test]
    fn border_contributes_to_positions() {
        let axis = GridAxis::new(3, 2.0, |_| 10.0);
        assert_eq!(axis.position_start(), &[0.0, 12.0, 24.0, 36.0]);
        assert_eq!(axis.total_size(), 36.0);
    }

    #[test_case(20.0, 2; "exact hit returns hit index")]
    #[test_case(21.0, 2; "between positions rounds down")]
    #[test_case(0.0, 0; "start of axis")]
    #[test_case(40.0, 3; "total size clamps to last item")]
    #[test_case(-5.0, 0; "negative clamps to zero")]
    #[test_case(1000.0, 3; "past end clamps to last item")]
    fn search_contract(p: f32, expected: usize) {
        let axis = uniform(4, 10.0);
        assert_eq!(axis.search(p), expected);
    }

    #[test]
    fn search_brackets_every_position() {
        let axis = GridAxis::new(7, 1.0, |i| (i as f32 + 1.0) * 3.0);
        let total = axis.total_size();
        let mut p = 0.0;
        while p <= total {
            let i = axis.search(p);
            assert!(axis.position_start()[i] <= p);
            assert!(p <= axis.position_start()[i + 1]);
            p += 0.5;
        }
    }

    #[test]
    fn hiding_items() {
        let mut axis = uniform(5, 10.0);
        axis.set_hidden([1, 3].into_iter().collect());
        assert_eq!(axis.visible_items(), &[0, 2, 4]);
        assert_eq!(axis.total_size(), 30.0);
        assert_eq!(axis.search(15.0), 1);
        assert_eq!(
            axis.visible_items().len() + axis.hidden_count(),
            axis.item_order().len()
        );
    }

    #[test]
    fn hiding_everything() {
        let mut axis = uniform(3, 10.0);
        axis.set_hidden([0, 1, 2].into_iter().collect());
        assert_eq!(axis.total_size(), 0.0);
        assert!(axis.visible_items().is_empty());
        let band = axis.get_visible_items(0.0, 100.0, 0.0, 10.0).unwrap();
        assert_eq!(band, VisibleItems::default());
    }

    #[test]
    fn reordering_preserves_total() {
        let mut axis = GridAxis::new(4, 1.0, |i| (i as f32 + 1.0) * 5.0);
        let before = axis.total_size();
        axis.set_item_order(vec![3, 1, 0, 2]);
        assert_eq!(axis.total_size(), before);
        assert_eq!(axis.visible_items(), &[3, 1, 0, 2]);
        assert_eq!(axis.position_start()[1], 21.0);
    }

    #[test]
    fn full_band_covers_all_items() {
        let axis = GridAxis::new(9, 2.0, |i| 4.0 + i as f32);
        let band = axis
            .get_visible_items(0.0, axis.total_size(), 0.0, axis.total_size())
            .unwrap();
        assert_eq!(band.start_index, 0);
        assert_eq!(band.count, axis.visible_items().len());
        assert_eq!(band.start_position, 0.0);
    }

    #[test]
    fn band_excludes_item_starting_on_band_end() {
        let axis = uniform(1000, 20.0);
        let band = axis.get_visible_items(-200.0, 600.0, 0.0, 200.0).unwrap();
        assert_eq!(band.start_index, 0);
        assert_eq!(band.count, 30);
        assert_eq!(band.start_position, 0.0);
        assert_eq!(band.view_start_index, 0);
        assert_eq!(band.view_count, 10);
    }

    #[test]
    fn negative_sizes_fail() {
        let axis = uniform(4, 10.0);
        assert!(axis.get_visible_items(0.0, -1.0, 0.0, 0.0).is_err());
        assert!(axis.get_visible_items(0.0, 10.0, 0.0, -2.0).is_err());
    }

    #[test]
    fn out_of_range_band_clamps_instead_of_failing() {
        let axis = uniform(4, 10.0);
        let band = axis.get_visible_items(500.0, 50.0, 500.0, 10.0).unwrap();
        assert_eq!(band.start_index, 3);
        assert_eq!(band.count, 1);
    }

    #[test]
    fn view_range_stays_within_band() {
        let axis = uniform(100, 10.0);
        let band = axis.get_visible_items(100.0, 300.0, 200.0, 100.0).unwrap();
        assert!(band.view_start_index + band.view_count <= band.count);
        assert_eq!(band.view_start_index, 10);
        assert_eq!(band.view_count, 10);
    }
}
