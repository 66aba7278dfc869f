//! The render pipeline.
//!
//! `GridEngine` composes the axes, the viewport resolver, the slot pools,
//! and the value cache into a coherent retained view. It is DOM-agnostic:
//! the host supplies a [`SlotDom`] backend per table section and applies
//! the [`Placement`] this module computes (band translation and scroll
//! surface extents).
//!
//! The multi-frame incremental update is an explicit state machine rather
//! than a generator: the host calls [`GridEngine::update_tick`] once per
//! animation frame until it reports [`Tick::Settled`].

use crate::axis::GridAxis;
use crate::cache::{CellBinding, RowBinding, SlotDom, TableCache};
use crate::error::{GridError, Result};
use crate::options::{VirtualScrollingOptions, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
use crate::provider::{console_warn, pad_row_contents, ModelProvider};
use crate::values::{CellValueCache, Sanitizer};
use crate::viewport::{is_outside_safe_view_zone, Viewport, ViewportMetrics};

use std::collections::VecDeque;

/// Columns in the id sub-table: the row index plus one marker cell the
/// host may decorate.
pub const ID_COLUMNS: usize = 2;

/// Rows in the header sub-table (header row plus an auxiliary row, e.g.
/// for upstream filter controls).
pub const HEADER_ROWS: usize = 2;

/// Where the rendered band sits inside the virtual canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    /// Band translation, applied as `translate(offset_x, offset_y)`.
    pub offset_x: f32,
    pub offset_y: f32,
    /// Intrinsic extent of the scrollable surface.
    pub total_width: f32,
    pub total_height: f32,
}

/// Render pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Nothing scheduled; scroll events are being compared against the
    /// committed viewport.
    Idle,
    /// A pass was armed by a scroll or resize; first frame not yet run.
    Scheduled,
    /// Chunks are being rendered, one per frame.
    Rendering,
    /// The scroll ran past the safe zone mid-pass; the body is hidden
    /// while a fresh pass catches up.
    Flickering,
}

/// Outcome of one animation-frame tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// More chunks remain; schedule another frame. `show_body` becomes true
    /// on the tick that finished the visible sub-band.
    Continue { show_body: bool },
    /// The pass completed inside the safe zone; the pipeline is idle.
    Settled,
    /// The pass completed but the scroll had already left the safe zone;
    /// the host should hide the body and keep ticking.
    Restarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkKind {
    Visible,
    Padding,
}

#[derive(Debug, Clone, Copy)]
struct Chunk {
    kind: ChunkKind,
    /// Slot-row range within the band, `start..end`.
    start: usize,
    end: usize,
}

/// The virtualized grid core.
pub struct GridEngine<P, D, S>
where
    P: ModelProvider,
    D: SlotDom,
    S: Sanitizer,
{
    provider: P,
    opts: VirtualScrollingOptions,
    row_axis: GridAxis,
    column_axis: GridAxis,
    data: TableCache<D>,
    ids: TableCache<D>,
    header: TableCache<D>,
    values: CellValueCache<S>,
    viewport: Viewport,
    committed: ViewportMetrics,
    state: RenderState,
    scrolled_down: bool,
    chunks: VecDeque<Chunk>,
    resize_pending: bool,
    warned_row_length: bool,
}

impl<P, D, S> GridEngine<P, D, S>
where
    P: ModelProvider,
    D: SlotDom,
    S: Sanitizer,
{
    /// Build the engine and both axes from the provider's geometry.
    ///
    /// In virtual mode every row height and column width must be present;
    /// the first absent one fails with `MissingGeometry`.
    pub fn new(
        provider: P,
        opts: VirtualScrollingOptions,
        data_dom: D,
        ids_dom: D,
        header_dom: D,
        sanitizer: S,
    ) -> Result<Self> {
        let dimension = provider.dimension();

        let mut row_sizes = Vec::with_capacity(dimension.rows);
        for row in 0..dimension.rows {
            match provider.row_height(row) {
                Some(height) => row_sizes.push(height),
                None if opts.enabled => {
                    return Err(GridError::MissingGeometry {
                        axis: "row",
                        index: row,
                    })
                }
                None => row_sizes.push(DEFAULT_ROW_HEIGHT),
            }
        }
        let mut column_sizes = Vec::with_capacity(dimension.columns);
        for column in 0..dimension.columns {
            match provider.column_width(column) {
                Some(width) => column_sizes.push(width),
                None if opts.enabled => {
                    return Err(GridError::MissingGeometry {
                        axis: "column",
                        index: column,
                    })
                }
                None => column_sizes.push(DEFAULT_COLUMN_WIDTH),
            }
        }

        let border = opts.border_spacing;
        let row_axis = GridAxis::new(dimension.rows, border, |i| {
            row_sizes.get(i).copied().unwrap_or(DEFAULT_ROW_HEIGHT)
        });
        let column_axis = GridAxis::new(dimension.columns, border, |i| {
            column_sizes.get(i).copied().unwrap_or(DEFAULT_COLUMN_WIDTH)
        });

        Ok(GridEngine {
            provider,
            opts,
            row_axis,
            column_axis,
            data: TableCache::new(data_dom),
            ids: TableCache::new(ids_dom),
            header: TableCache::new(header_dom),
            values: CellValueCache::new(sanitizer),
            viewport: Viewport::default(),
            committed: ViewportMetrics::default(),
            state: RenderState::Idle,
            scrolled_down: true,
            chunks: VecDeque::new(),
            resize_pending: false,
            warned_row_length: false,
        })
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn options(&self) -> &VirtualScrollingOptions {
        &self.opts
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn row_axis(&self) -> &GridAxis {
        &self.row_axis
    }

    pub fn column_axis(&self) -> &GridAxis {
        &self.column_axis
    }

    pub fn data_cache(&self) -> &TableCache<D> {
        &self.data
    }

    pub fn id_cache(&self) -> &TableCache<D> {
        &self.ids
    }

    pub fn header_cache(&self) -> &TableCache<D> {
        &self.header
    }

    pub fn values_mut(&mut self) -> &mut CellValueCache<S> {
        &mut self.values
    }

    /// Band translation and surface extents for the committed viewport.
    pub fn placement(&self) -> Placement {
        Placement {
            offset_x: self.viewport.horizontal.start_position,
            offset_y: self.viewport.vertical.start_position,
            total_width: self.column_axis.total_size(),
            total_height: self.row_axis.total_size(),
        }
    }

    /// Data rows of the committed band that the value cache has not seen
    /// yet, in render order. The worker bridge posts these for eager
    /// sanitization.
    pub fn uncached_band_rows(&self) -> Vec<usize> {
        if !self.opts.enabled {
            return Vec::new();
        }
        let v = &self.viewport.vertical;
        self.row_axis
            .visible_items()
            .iter()
            .skip(v.start_index)
            .take(v.count)
            .copied()
            .filter(|row| !self.values.contains(*row))
            .collect()
    }

    // ------------------------------------------------------------------
    // Initial build
    // ------------------------------------------------------------------

    /// Build the table for the current scroll state and bind every slot.
    ///
    /// Returns the placement the host must apply to the scroll surfaces.
    /// In non-virtual mode the caller is expected to sanitize the whole
    /// body once, in place, after this returns.
    pub fn build_table(&mut self, metrics: &ViewportMetrics) -> Result<Placement> {
        self.viewport = Viewport::resolve(&self.row_axis, &self.column_axis, metrics, &self.opts)?;
        self.committed = *metrics;

        let rows = self.viewport.vertical.count;
        let columns = self.viewport.horizontal.count;
        self.data.resize(rows, columns)?;
        self.ids.resize(rows, ID_COLUMNS)?;
        self.header.resize(HEADER_ROWS, columns)?;

        for slot_row in 0..rows {
            self.render_row(slot_row);
        }
        self.render_header();

        Ok(self.placement())
    }

    // ------------------------------------------------------------------
    // Scroll / resize entry points
    // ------------------------------------------------------------------

    /// Scroll gate. Returns true when a render pass was armed; the host
    /// must then drive [`Self::update_tick`] once per animation frame.
    ///
    /// Scrolls during an in-flight pass coalesce (the post-pass safe-zone
    /// check picks them up); scrolls inside the safe zone are free.
    pub fn on_scroll(&mut self, metrics: &ViewportMetrics) -> Result<bool> {
        if self.state != RenderState::Idle {
            return Ok(false);
        }
        if !is_outside_safe_view_zone(&self.committed, metrics, &self.opts) {
            return Ok(false);
        }
        self.arm_pass(metrics)?;
        self.state = RenderState::Scheduled;
        Ok(true)
    }

    /// Resize entry point: recompute unconditionally and arm a pass.
    pub fn on_resize(&mut self, metrics: &ViewportMetrics) -> Result<()> {
        self.arm_pass(metrics)?;
        if self.state == RenderState::Idle {
            self.state = RenderState::Scheduled;
        }
        Ok(())
    }

    /// Capture the viewport eagerly (so subsequent scrolls compare against
    /// it), record the scroll direction, and queue the render chunks.
    fn arm_pass(&mut self, metrics: &ViewportMetrics) -> Result<()> {
        let next = Viewport::resolve(&self.row_axis, &self.column_axis, metrics, &self.opts)?;
        self.scrolled_down = next.vertical.start_index >= self.viewport.vertical.start_index;
        self.viewport = next;
        self.committed = *metrics;
        self.queue_chunks();
        self.resize_pending = true;
        Ok(())
    }

    /// Visible sub-band first, then the padding bands with the one in the
    /// scroll direction first (scrolled down ⇒ upper padding last).
    fn queue_chunks(&mut self) {
        self.chunks.clear();
        let v = &self.viewport.vertical;
        let visible_start = v.view_start_index.min(v.count);
        let visible_end = (v.view_start_index + v.view_count).min(v.count);

        self.chunks.push_back(Chunk {
            kind: ChunkKind::Visible,
            start: visible_start,
            end: visible_end,
        });
        let above = Chunk {
            kind: ChunkKind::Padding,
            start: 0,
            end: visible_start,
        };
        let below = Chunk {
            kind: ChunkKind::Padding,
            start: visible_end,
            end: v.count,
        };
        if self.scrolled_down {
            self.chunks.push_back(below);
            self.chunks.push_back(above);
        } else {
            self.chunks.push_back(above);
            self.chunks.push_back(below);
        }
    }

    /// Advance the pass by one chunk. `current` is the scroll state *now*,
    /// re-read by the host; it drives the post-pass safe-zone check.
    pub fn update_tick(&mut self, current: &ViewportMetrics) -> Result<Tick> {
        if self.state == RenderState::Idle {
            return Ok(Tick::Settled);
        }
        self.state = RenderState::Rendering;

        if self.resize_pending {
            self.resize_pending = false;
            let rows = self.viewport.vertical.count;
            let columns = self.viewport.horizontal.count;
            self.data.resize(rows, columns)?;
            self.ids.resize(rows, ID_COLUMNS)?;
            self.header.resize(HEADER_ROWS, columns)?;
            self.render_header();
        }

        if let Some(chunk) = self.chunks.pop_front() {
            for slot_row in chunk.start..chunk.end {
                self.render_row(slot_row);
            }
            return Ok(Tick::Continue {
                show_body: chunk.kind == ChunkKind::Visible,
            });
        }

        // All chunks rendered; did the scroll outrun us meanwhile?
        if is_outside_safe_view_zone(&self.committed, current, &self.opts) {
            self.arm_pass(current)?;
            self.state = RenderState::Flickering;
            return Ok(Tick::Restarted);
        }
        self.state = RenderState::Idle;
        Ok(Tick::Settled)
    }

    // ------------------------------------------------------------------
    // Axis mutation hooks (upstream sorting/filtering layers)
    // ------------------------------------------------------------------

    /// Replace the hidden row set and re-enter the update pass.
    pub fn set_hidden_rows(&mut self, hidden: std::collections::HashSet<usize>) -> Result<()> {
        self.row_axis.set_hidden(hidden);
        let committed = self.committed;
        self.on_resize(&committed)
    }

    /// Replace the hidden column set and re-enter the update pass.
    pub fn set_hidden_columns(&mut self, hidden: std::collections::HashSet<usize>) -> Result<()> {
        self.column_axis.set_hidden(hidden);
        let committed = self.committed;
        self.on_resize(&committed)
    }

    /// Replace the row display order and re-enter the update pass.
    pub fn set_row_order(&mut self, order: Vec<usize>) -> Result<()> {
        self.row_axis.set_item_order(order);
        let committed = self.committed;
        self.on_resize(&committed)
    }

    // ------------------------------------------------------------------
    // Slot binding
    // ------------------------------------------------------------------

    /// Bind one band row: the data row slot, its cells, and the id slot.
    ///
    /// Slot indices past the band (possible while caches and viewport are
    /// momentarily out of step) are skipped, not errors.
    fn render_row(&mut self, slot_row: usize) {
        let v = self.viewport.vertical;
        let h = self.viewport.horizontal;
        let virtual_mode = self.opts.enabled;

        let Some(&row_index) = self.row_axis.visible_items().get(v.start_index + slot_row) else {
            return;
        };
        let row_height = virtual_mode.then(|| self.row_axis.item_size(row_index));

        let row_style = self.provider.styling_for_row(row_index);
        self.data.bind_row(
            slot_row,
            &RowBinding {
                style: &row_style,
                height: row_height,
            },
        );

        // Fetch the whole data row once; cells index into it by data column.
        let columns = self.provider.dimension().columns;
        let row_values: Vec<String> = if virtual_mode {
            let provider = &self.provider;
            self.values
                .row(row_index, columns, || provider.row_contents(row_index))
                .to_vec()
        } else {
            let mut raw = self.provider.row_contents(row_index);
            if pad_row_contents(&mut raw, columns) && !self.warned_row_length {
                self.warned_row_length = true;
                console_warn(&format!(
                    "provider returned a short row for row {row_index}; padding with empty cells"
                ));
            }
            raw
        };

        for slot_column in 0..h.count {
            let Some(&column_index) = self
                .column_axis
                .visible_items()
                .get(h.start_index + slot_column)
            else {
                continue;
            };
            let class = self.provider.class_for_cell(row_index, column_index);
            let style = self.provider.styling_for_cell(row_index, column_index);
            let html = row_values.get(column_index).map(String::as_str);
            self.data.bind_cell(
                slot_row,
                slot_column,
                &CellBinding {
                    class: &class,
                    style: &style,
                    width: virtual_mode.then(|| self.column_axis.item_size(column_index)),
                    row: row_index,
                    column: column_index,
                },
                html,
            );
        }

        // Id sub-table: cell 0 carries the data row index, cell 1 is left
        // to the host.
        self.ids.bind_row(
            slot_row,
            &RowBinding {
                style: "",
                height: row_height,
            },
        );
        let index_text = row_index.to_string();
        self.ids.bind_cell(
            slot_row,
            0,
            &CellBinding {
                class: "",
                style: "",
                width: None,
                row: row_index,
                column: 0,
            },
            Some(&index_text),
        );
    }

    /// Bind header slots: geometry only, markup belongs to the host.
    fn render_header(&mut self) {
        let h = self.viewport.horizontal;
        let virtual_mode = self.opts.enabled;
        for header_row in 0..HEADER_ROWS {
            self.header
                .bind_row(header_row, &RowBinding { style: "", height: None });
            for slot_column in 0..h.count {
                let Some(&column_index) = self
                    .column_axis
                    .visible_items()
                    .get(h.start_index + slot_column)
                else {
                    continue;
                };
                self.header.bind_cell(
                    header_row,
                    slot_column,
                    &CellBinding {
                        class: "",
                        style: "",
                        width: virtual_mode.then(|| self.column_axis.item_size(column_index)),
                        row: header_row,
                        column: column_index,
                    },
                    None,
                );
            }
        }
    }
}
