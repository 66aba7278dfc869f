//! Host-facing WASM surface.
//!
//! `GridView` owns the three scroll surfaces (header, ids, data), wires the
//! scroll/resize/click listeners, and drives the engine's multi-frame update
//! with one `requestAnimationFrame` per chunk. The engine itself is
//! DOM-agnostic; everything `web-sys` lives here and in [`dom`].

mod dom;
mod provider_js;

pub use dom::DomSection;
pub use provider_js::{JsModelProvider, JsSanitizer};

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Object;
use serde::{Deserialize, Serialize};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, MessageEvent, MouseEvent, ResizeObserver, Worker};

use crate::engine::{GridEngine, Placement, Tick};
use crate::error::{GridError, Result};
use crate::options::VirtualScrollingOptions;
use crate::provider::{console_warn, ModelProvider};
use crate::viewport::ViewportMetrics;

/// Width of the id column surface in pixels.
const ID_COLUMN_WIDTH: f32 = 80.0;

type Engine = GridEngine<JsModelProvider, DomSection, JsSanitizer>;

/// Row payload exchanged with the sanitization worker: raw HTML out,
/// sanitized HTML back, same shape both ways.
#[derive(Serialize, Deserialize)]
struct WorkerRow {
    row: usize,
    data: Vec<String>,
}

/// The retained DOM skeleton built inside the host's root element.
///
/// ```text
/// root (flex column)
/// ├── top (flex row)
/// │   ├── corner (fixed width)
/// │   └── header_container (overflow hidden, width slaved to data)
/// │       └── header_spacer > table > tbody
/// └── main (flex row, flex: 1)
///     ├── ids_container (overflow hidden, height slaved to data)
///     │   └── ids_spacer > table > tbody
///     └── data_container (overflow auto, position relative)
///         ├── data_spacer (absolute, total_width × total_height)
///         └── data_table (absolute, translated to the band) > tbody
/// ```
struct Surfaces {
    header_container: HtmlElement,
    ids_container: HtmlElement,
    data_container: HtmlElement,
    header_spacer: HtmlElement,
    ids_spacer: HtmlElement,
    data_spacer: HtmlElement,
    header_table: HtmlElement,
    ids_table: HtmlElement,
    data_table: HtmlElement,
    data_body: HtmlElement,
}

impl Surfaces {
    #[allow(clippy::cast_precision_loss)]
    fn read_metrics(&self) -> ViewportMetrics {
        ViewportMetrics {
            client_width: self.data_container.client_width() as f32,
            client_height: self.data_container.client_height() as f32,
            scroll_left: self.data_container.scroll_left() as f32,
            scroll_top: self.data_container.scroll_top() as f32,
        }
    }

    /// Mirror the data surface's scroll offsets onto the slaved surfaces.
    fn sync_slaves(&self) {
        self.header_container
            .set_scroll_left(self.data_container.scroll_left());
        self.ids_container
            .set_scroll_top(self.data_container.scroll_top());
    }

    /// Size the header and id containers from the data surface's client
    /// rect. Runs at mount and whenever the container resizes.
    fn fit_to_data(&self) {
        let width = self.data_container.client_width();
        let height = self.data_container.client_height();
        let _ = self
            .header_container
            .style()
            .set_property("width", &format!("{width}px"));
        let _ = self
            .ids_container
            .style()
            .set_property("height", &format!("{height}px"));
    }

    /// Position the rendered band inside the virtual canvas and size the
    /// spacers to the axis extents.
    fn apply_placement(&self, placement: &Placement) {
        let Placement {
            offset_x,
            offset_y,
            total_width,
            total_height,
        } = *placement;

        let _ = self
            .data_spacer
            .style()
            .set_property("width", &format!("{total_width}px"));
        let _ = self
            .data_spacer
            .style()
            .set_property("height", &format!("{total_height}px"));
        let _ = self
            .header_spacer
            .style()
            .set_property("width", &format!("{total_width}px"));
        let _ = self
            .ids_spacer
            .style()
            .set_property("height", &format!("{total_height}px"));

        let _ = self.data_table.style().set_property(
            "transform",
            &format!("translate({offset_x}px, {offset_y}px)"),
        );
        let _ = self
            .header_table
            .style()
            .set_property("transform", &format!("translate({offset_x}px, 0px)"));
        let _ = self
            .ids_table
            .style()
            .set_property("transform", &format!("translate(0px, {offset_y}px)"));
    }

    /// Hide the data body during a fast fling, show it once the visible
    /// chunk of the catching-up pass has rendered.
    fn set_body_visible(&self, visible: bool) {
        let value = if visible { "visible" } else { "hidden" };
        let _ = self.data_table.style().set_property("visibility", value);
    }
}

/// State shared between the viewer and its event closures.
struct SharedState {
    engine: Engine,
    surfaces: Surfaces,
    sanitizer: JsSanitizer,
    worker: Option<Worker>,
    frame_id: Option<i32>,
    frame_closure: Option<Closure<dyn FnMut()>>,
    disposed: bool,
}

/// Virtualized data grid exported to JavaScript.
///
/// Construct with the root element, a model provider object, a sanitizer
/// object (`sanitize(html)`, optional `sanitizeInPlace(node)`), and a plain
/// options object; then call [`GridView::mount`] to build the table and
/// attach listeners.
#[wasm_bindgen]
pub struct GridView {
    state: Rc<RefCell<SharedState>>,
    scroll_closure: Option<Closure<dyn FnMut(web_sys::Event)>>,
    click_closure: Option<Closure<dyn FnMut(MouseEvent)>>,
    worker_closure: Option<Closure<dyn FnMut(MessageEvent)>>,
    resize_closure: Option<Closure<dyn FnMut(js_sys::Array, ResizeObserver)>>,
    resize_observer: Option<ResizeObserver>,
    mounted: bool,
}

fn create_div(document: &Document, class: &str) -> Result<HtmlElement> {
    let element = document
        .create_element("div")
        .map_err(|_| GridError::Dom("failed to create <div>".into()))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| GridError::Dom("<div> is not an HTMLElement".into()))?;
    element.set_class_name(class);
    Ok(element)
}

/// Build one scroll surface: `container > spacer > table > tbody`.
///
/// Returns the pieces the viewer keeps plus the `tbody` the slot pool
/// appends into.
fn build_surface(
    document: &Document,
    class: &str,
    border_spacing: f32,
) -> Result<(HtmlElement, HtmlElement, HtmlElement, HtmlElement)> {
    let container = create_div(document, class)?;
    let spacer = create_div(document, &format!("{class}-spacer"))?;

    let table = document
        .create_element("table")
        .map_err(|_| GridError::Dom("failed to create <table>".into()))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| GridError::Dom("<table> is not an HTMLElement".into()))?;
    let table_style = table.style();
    let _ = table_style.set_property("border-collapse", "separate");
    let _ = table_style.set_property("border-spacing", &format!("{border_spacing}px"));
    let _ = table_style.set_property("table-layout", "fixed");

    let body = document
        .create_element("tbody")
        .map_err(|_| GridError::Dom("failed to create <tbody>".into()))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| GridError::Dom("<tbody> is not an HTMLElement".into()))?;

    table
        .append_child(&body)
        .map_err(|_| GridError::Dom("failed to append tbody".into()))?;
    spacer
        .append_child(&table)
        .map_err(|_| GridError::Dom("failed to append table".into()))?;
    container
        .append_child(&spacer)
        .map_err(|_| GridError::Dom("failed to append spacer".into()))?;

    Ok((container, spacer, table, body))
}

fn build_surfaces(
    document: &Document,
    root: &HtmlElement,
    border_spacing: f32,
) -> Result<(Surfaces, DomSection, DomSection, DomSection)> {
    let root_style = root.style();
    let _ = root_style.set_property("display", "flex");
    let _ = root_style.set_property("flex-direction", "column");
    let _ = root_style.set_property("overflow", "hidden");

    let top = create_div(document, "domgrid-top")?;
    let top_style = top.style();
    let _ = top_style.set_property("display", "flex");
    let _ = top_style.set_property("flex-shrink", "0");

    let corner = create_div(document, "domgrid-corner")?;
    let _ = corner
        .style()
        .set_property("width", &format!("{ID_COLUMN_WIDTH}px"));
    let _ = corner.style().set_property("flex-shrink", "0");

    let main = create_div(document, "domgrid-main")?;
    let main_style = main.style();
    let _ = main_style.set_property("display", "flex");
    let _ = main_style.set_property("flex", "1");
    let _ = main_style.set_property("min-height", "0");

    let (header_container, header_spacer, header_table, header_body) =
        build_surface(document, "domgrid-header", border_spacing)?;
    let _ = header_container.style().set_property("overflow", "hidden");

    let (ids_container, ids_spacer, ids_table, ids_body) =
        build_surface(document, "domgrid-ids", border_spacing)?;
    let ids_style = ids_container.style();
    let _ = ids_style.set_property("overflow", "hidden");
    let _ = ids_style.set_property("width", &format!("{ID_COLUMN_WIDTH}px"));
    let _ = ids_style.set_property("flex-shrink", "0");

    let (data_container, data_spacer, data_table, data_body) =
        build_surface(document, "domgrid-data", border_spacing)?;
    let data_style = data_container.style();
    let _ = data_style.set_property("overflow", "auto");
    let _ = data_style.set_property("position", "relative");
    let _ = data_style.set_property("flex", "1");

    // The spacer establishes the scrollable extent; the table floats on top
    // of it and is translated to the band.
    let spacer_style = data_spacer.style();
    let _ = spacer_style.set_property("position", "absolute");
    let _ = spacer_style.set_property("top", "0");
    let _ = spacer_style.set_property("left", "0");
    let table_style = data_table.style();
    let _ = table_style.set_property("position", "absolute");
    let _ = table_style.set_property("top", "0");
    let _ = table_style.set_property("left", "0");
    let _ = table_style.set_property("will-change", "transform");
    let _ = header_table.style().set_property("will-change", "transform");
    let _ = ids_table.style().set_property("will-change", "transform");

    let _ = top.append_child(&corner);
    let _ = top.append_child(&header_container);
    let _ = main.append_child(&ids_container);
    let _ = main.append_child(&data_container);
    root.append_child(&top)
        .map_err(|_| GridError::Dom("failed to append header band".into()))?;
    root.append_child(&main)
        .map_err(|_| GridError::Dom("failed to append main band".into()))?;

    let data_section = DomSection::new(document.clone(), data_body.clone().into());
    let ids_section = DomSection::new(document.clone(), ids_body.into());
    let header_section = DomSection::new(document.clone(), header_body.into());

    Ok((
        Surfaces {
            header_container,
            ids_container,
            data_container,
            header_spacer,
            ids_spacer,
            data_spacer,
            header_table,
            ids_table,
            data_table,
            data_body,
        },
        data_section,
        ids_section,
        header_section,
    ))
}

#[wasm_bindgen]
impl GridView {
    /// Create a grid inside `root`. Nothing renders until [`Self::mount`].
    #[wasm_bindgen(constructor)]
    pub fn new(
        root: HtmlElement,
        provider: Object,
        sanitizer: Object,
        options: JsValue,
    ) -> std::result::Result<GridView, JsValue> {
        console_error_panic_hook::set_once();

        let opts: VirtualScrollingOptions = if options.is_undefined() || options.is_null() {
            VirtualScrollingOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsValue::from_str(&format!("invalid options: {e}")))?
        };

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| GridError::Dom("no document".into()))?;

        let provider = JsModelProvider::new(provider)?;
        let sanitizer = JsSanitizer::new(sanitizer)?;

        let (surfaces, data_section, ids_section, header_section) =
            build_surfaces(&document, &root, opts.border_spacing)?;

        let engine = Engine::new(
            provider,
            opts,
            data_section,
            ids_section,
            header_section,
            sanitizer.clone(),
        )?;

        Ok(GridView {
            state: Rc::new(RefCell::new(SharedState {
                engine,
                surfaces,
                sanitizer,
                worker: None,
                frame_id: None,
                frame_closure: None,
                disposed: false,
            })),
            scroll_closure: None,
            click_closure: None,
            worker_closure: None,
            resize_closure: None,
            resize_observer: None,
            mounted: false,
        })
    }

    /// Build the initial table and attach scroll, click, and resize
    /// listeners. Idempotent: a second call is a no-op.
    pub fn mount(&mut self) -> std::result::Result<(), JsValue> {
        if self.mounted {
            return Ok(());
        }

        {
            let mut s = self.state.borrow_mut();
            s.surfaces.fit_to_data();
            let metrics = s.surfaces.read_metrics();
            let placement = s.engine.build_table(&metrics)?;
            s.surfaces.apply_placement(&placement);
            if !s.engine.options().enabled {
                // Cells were written raw; one whole-body pass cleans them.
                s.sanitizer.sanitize_in_place(&s.surfaces.data_body);
            }
        }

        // Reusable animation-frame callback for the chunked update pass.
        {
            let weak = Rc::downgrade(&self.state);
            let closure = Closure::wrap(Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    GridView::frame_tick(&state);
                }
            }) as Box<dyn FnMut()>);
            self.state.borrow_mut().frame_closure = Some(closure);
        }

        self.attach_scroll();
        self.attach_click();
        self.attach_resize();

        Self::post_uncached_rows(&self.state);
        self.mounted = true;
        Ok(())
    }

    /// Wire a sanitization worker. It receives `{row, data}` with raw HTML
    /// and must reply with the same shape, sanitized. Replies land in the
    /// value cache; rows rendered before their reply fall back to
    /// synchronous sanitization.
    #[wasm_bindgen(js_name = "setWorker")]
    pub fn set_worker(&mut self, worker: Worker) {
        let weak = Rc::downgrade(&self.state);
        let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let row: WorkerRow = match serde_wasm_bindgen::from_value(event.data()) {
                Ok(row) => row,
                Err(_) => {
                    console_warn("worker posted an unrecognized message");
                    return;
                }
            };
            state
                .borrow_mut()
                .engine
                .values_mut()
                .insert_row(row.row, row.data);
        }) as Box<dyn FnMut(MessageEvent)>);
        worker.set_onmessage(Some(closure.as_ref().unchecked_ref()));
        self.worker_closure = Some(closure);

        self.state.borrow_mut().worker = Some(worker);
        if self.mounted {
            Self::post_uncached_rows(&self.state);
        }
    }

    /// Replace the hidden row set (upstream filter layers).
    #[wasm_bindgen(js_name = "setHiddenRows")]
    pub fn set_hidden_rows(&mut self, rows: Vec<u32>) -> std::result::Result<(), JsValue> {
        self.state
            .borrow_mut()
            .engine
            .set_hidden_rows(rows.into_iter().map(|r| r as usize).collect())?;
        Self::schedule_frame(&self.state);
        Ok(())
    }

    /// Replace the hidden column set.
    #[wasm_bindgen(js_name = "setHiddenColumns")]
    pub fn set_hidden_columns(&mut self, columns: Vec<u32>) -> std::result::Result<(), JsValue> {
        self.state
            .borrow_mut()
            .engine
            .set_hidden_columns(columns.into_iter().map(|c| c as usize).collect())?;
        Self::schedule_frame(&self.state);
        Ok(())
    }

    /// Replace the row display order (upstream sort layers). The order must
    /// be a permutation of the data row indices.
    #[wasm_bindgen(js_name = "setRowOrder")]
    pub fn set_row_order(&mut self, order: Vec<u32>) -> std::result::Result<(), JsValue> {
        self.state
            .borrow_mut()
            .engine
            .set_row_order(order.into_iter().map(|r| r as usize).collect())?;
        Self::schedule_frame(&self.state);
        Ok(())
    }

    /// Detach listeners, cancel the pending frame, and release node
    /// references. The grid cannot be remounted afterwards.
    pub fn dispose(&mut self) {
        let mut s = self.state.borrow_mut();
        s.disposed = true;

        if let Some(id) = s.frame_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        s.frame_closure = None;

        if let Some(closure) = self.scroll_closure.take() {
            let _ = s.surfaces.data_container.remove_event_listener_with_callback(
                "scroll",
                closure.as_ref().unchecked_ref(),
            );
        }
        if let Some(closure) = self.click_closure.take() {
            let _ = s
                .surfaces
                .data_body
                .remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        }
        if let Some(observer) = self.resize_observer.take() {
            observer.disconnect();
        }
        self.resize_closure = None;

        if let Some(worker) = s.worker.take() {
            worker.set_onmessage(None);
        }
        self.worker_closure = None;
    }
}

impl GridView {
    fn attach_scroll(&mut self) {
        let weak = Rc::downgrade(&self.state);
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let armed = {
                let mut s = state.borrow_mut();
                s.surfaces.sync_slaves();
                let metrics = s.surfaces.read_metrics();
                match s.engine.on_scroll(&metrics) {
                    Ok(true) => {
                        // Viewport was captured at event time; translate the
                        // band before the first chunk renders into it.
                        let placement = s.engine.placement();
                        s.surfaces.apply_placement(&placement);
                        true
                    }
                    Ok(false) => false,
                    Err(e) => {
                        console_warn(&format!("scroll handling failed: {e}"));
                        false
                    }
                }
            };
            if armed {
                GridView::schedule_frame(&state);
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        let _ = self
            .state
            .borrow()
            .surfaces
            .data_container
            .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        self.scroll_closure = Some(closure);
    }

    /// One delegated listener instead of an `onclick` per cell; the slot's
    /// `data-row`/`data-col` attributes carry the data indices.
    fn attach_click(&mut self) {
        let weak = Rc::downgrade(&self.state);
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let Some(target) = event.target() else {
                return;
            };
            let Ok(element) = target.dyn_into::<Element>() else {
                return;
            };
            let Ok(Some(cell)) = element.closest("td[data-row]") else {
                return;
            };
            let (Some(row), Some(column)) =
                (cell.get_attribute("data-row"), cell.get_attribute("data-col"))
            else {
                return;
            };
            let (Ok(row), Ok(column)) = (row.parse::<usize>(), column.parse::<usize>()) else {
                return;
            };
            // Clone out of the RefCell: the handler may call back into us.
            let provider = state.borrow().engine.provider().clone();
            provider.handle_click_cell(row, column);
        }) as Box<dyn FnMut(MouseEvent)>);

        let _ = self
            .state
            .borrow()
            .surfaces
            .data_body
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        self.click_closure = Some(closure);
    }

    fn attach_resize(&mut self) {
        let weak = Rc::downgrade(&self.state);
        let closure = Closure::wrap(Box::new(
            move |_entries: js_sys::Array, _observer: ResizeObserver| {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                {
                    let mut s = state.borrow_mut();
                    if s.disposed {
                        return;
                    }
                    s.surfaces.fit_to_data();
                    let metrics = s.surfaces.read_metrics();
                    if let Err(e) = s.engine.on_resize(&metrics) {
                        console_warn(&format!("resize handling failed: {e}"));
                        return;
                    }
                    let placement = s.engine.placement();
                    s.surfaces.apply_placement(&placement);
                }
                GridView::schedule_frame(&state);
            },
        )
            as Box<dyn FnMut(js_sys::Array, ResizeObserver)>);

        if let Ok(observer) = ResizeObserver::new(closure.as_ref().unchecked_ref()) {
            observer.observe(&self.state.borrow().surfaces.data_container);
            self.resize_observer = Some(observer);
        }
        self.resize_closure = Some(closure);
    }

    fn schedule_frame(state: &Rc<RefCell<SharedState>>) {
        let mut s = state.borrow_mut();
        if s.disposed || s.frame_id.is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(closure) = s.frame_closure.as_ref() else {
            return;
        };
        if let Ok(id) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            s.frame_id = Some(id);
        }
    }

    /// One chunk per animation frame until the engine settles.
    fn frame_tick(state: &Rc<RefCell<SharedState>>) {
        let tick = {
            let mut s = state.borrow_mut();
            s.frame_id = None;
            if s.disposed {
                return;
            }
            let metrics = s.surfaces.read_metrics();
            let tick = match s.engine.update_tick(&metrics) {
                Ok(tick) => tick,
                Err(e) => {
                    console_warn(&format!("render pass failed: {e}"));
                    return;
                }
            };
            match tick {
                Tick::Continue { show_body } => {
                    if show_body {
                        s.surfaces.set_body_visible(true);
                    }
                }
                Tick::Restarted => {
                    // Hide the body while the fresh pass catches up with the
                    // fling, and move the band to the recomputed viewport.
                    s.surfaces.set_body_visible(false);
                    let placement = s.engine.placement();
                    s.surfaces.apply_placement(&placement);
                }
                Tick::Settled => {
                    s.surfaces.set_body_visible(true);
                }
            }
            tick
        };

        match tick {
            Tick::Continue { .. } | Tick::Restarted => Self::schedule_frame(state),
            Tick::Settled => Self::post_uncached_rows(state),
        }
    }

    /// Post raw contents of band rows the value cache has not seen to the
    /// sanitization worker, if one is wired.
    fn post_uncached_rows(state: &Rc<RefCell<SharedState>>) {
        let (worker, provider, rows) = {
            let s = state.borrow();
            let Some(worker) = s.worker.clone() else {
                return;
            };
            (
                worker,
                s.engine.provider().clone(),
                s.engine.uncached_band_rows(),
            )
        };
        for row in rows {
            let message = WorkerRow {
                row,
                data: provider.row_contents(row),
            };
            if let Ok(value) = serde_wasm_bindgen::to_value(&message) {
                let _ = worker.post_message(&value);
            }
        }
    }
}

impl Drop for GridView {
    fn drop(&mut self) {
        self.dispose();
    }
}
