//! Sanitized cell value cache.
//!
//! In virtual mode a cell can be rendered without its row siblings, so each
//! payload must be sanitized individually; results are memoized per row.
//! A background worker may populate rows eagerly; foreground lookups fall
//! back to synchronous sanitization when the cache is cold.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::provider::{console_warn, pad_row_contents};

/// External HTML sanitizer (DOMPurify or equivalent).
///
/// Must be pure: same input, same output, no DOM access needed for the
/// string form. Whole-body in-place sanitization is a wasm-only concern and
/// lives on the concrete JS-backed implementation.
pub trait Sanitizer {
    fn sanitize(&self, html: &str) -> Result<String>;
}

/// Pass-through sanitizer for hosts that sanitize upstream (and for tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSanitizer;

impl Sanitizer for NoopSanitizer {
    fn sanitize(&self, html: &str) -> Result<String> {
        Ok(html.to_string())
    }
}

/// Row-indexed memo of sanitized cell HTML.
///
/// All mutation happens on the UI thread; worker results arrive as events
/// and are inserted through [`CellValueCache::insert_row`].
pub struct CellValueCache<S: Sanitizer> {
    sanitizer: S,
    rows: HashMap<usize, Vec<String>>,
    warned_cells: HashSet<(usize, usize)>,
    warned_row_length: bool,
}

impl<S: Sanitizer> CellValueCache<S> {
    pub fn new(sanitizer: S) -> Self {
        CellValueCache {
            sanitizer,
            rows: HashMap::new(),
            warned_cells: HashSet::new(),
            warned_row_length: false,
        }
    }

    /// Sanitized values for a row, fetching and sanitizing on first visit.
    ///
    /// `fetch` supplies the raw provider row; rows shorter than `columns`
    /// are padded with empty strings (warned once). A sanitizer failure
    /// yields an empty payload for that cell, warned once per `(row, col)`.
    pub fn row(
        &mut self,
        row: usize,
        columns: usize,
        fetch: impl FnOnce() -> Vec<String>,
    ) -> &[String] {
        if !self.rows.contains_key(&row) {
            let mut raw = fetch();
            if pad_row_contents(&mut raw, columns) && !self.warned_row_length {
                self.warned_row_length = true;
                console_warn(&format!(
                    "provider returned a short row for row {row}; padding with empty cells"
                ));
            }
            let sanitized = raw
                .into_iter()
                .enumerate()
                .map(|(column, html)| match self.sanitizer.sanitize(&html) {
                    Ok(clean) => clean,
                    Err(e) => {
                        if self.warned_cells.insert((row, column)) {
                            console_warn(&format!(
                                "sanitizer failed for cell ({row}, {column}): {e}"
                            ));
                        }
                        String::new()
                    }
                })
                .collect();
            self.rows.insert(row, sanitized);
        }
        self.rows.get(&row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a row is already cached (used to decide worker prefetches).
    pub fn contains(&self, row: usize) -> bool {
        self.rows.contains_key(&row)
    }

    /// Store a row sanitized elsewhere (the worker bridge). Applied in
    /// arrival order; an already-cached row is left alone so a foreground
    /// render never observes its values changing mid-cycle.
    pub fn insert_row(&mut self, row: usize, values: Vec<String>) {
        self.rows.entry(row).or_insert(values);
    }

    /// Drop every cached row. Only used when the underlying model is
    /// replaced wholesale.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.warned_cells.clear();
        self.warned_row_length = false;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::unreachable
)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use std::cell::Cell;

    struct UpperSanitizer;
    impl Sanitizer for UpperSanitizer {
        fn sanitize(&self, html: &str) -> Result<String> {
            Ok(html.to_uppercase())
        }
    }

    struct FailingSanitizer;
    impl Sanitizer for FailingSanitizer {
        fn sanitize(&self, _html: &str) -> Result<String> {
            Err(GridError::Sanitizer("boom".into()))
        }
    }

    #[test]
    fn memoizes_by_row() {
        let mut cache = CellValueCache::new(UpperSanitizer);
        let calls = Cell::new(0);
        let fetch = || {
            calls.set(calls.get() + 1);
            vec!["a".to_string(), "b".to_string()]
        };
        assert_eq!(cache.row(3, 2, fetch), ["A", "B"]);
        assert_eq!(cache.row(3, 2, || unreachable!()), ["A", "B"]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn short_rows_are_padded() {
        let mut cache = CellValueCache::new(NoopSanitizer);
        let row = cache.row(0, 4, || vec!["x".to_string()]);
        assert_eq!(row, ["x", "", "", ""]);
    }

    #[test]
    fn sanitizer_failure_yields_empty_cells() {
        let mut cache = CellValueCache::new(FailingSanitizer);
        let row = cache.row(0, 2, || vec!["<script>".to_string(), "y".to_string()]);
        assert_eq!(row, ["", ""]);
    }

    #[test]
    fn worker_rows_do_not_clobber_foreground_rows() {
        let mut cache = CellValueCache::new(NoopSanitizer);
        cache.row(1, 1, || vec!["fg".to_string()]);
        cache.insert_row(1, vec!["worker".to_string()]);
        assert_eq!(cache.row(1, 1, || unreachable!()), ["fg"]);

        cache.insert_row(2, vec!["eager".to_string()]);
        assert!(cache.contains(2));
        assert_eq!(cache.row(2, 1, || unreachable!()), ["eager"]);
    }
}
