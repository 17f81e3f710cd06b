//! Browser shell for the scroll stage.
//!
//! Wires the DOM (scroll/resize events, content element, canvas) to the pure
//! [`stage::ScrollStage`] and hands its per-frame snapshot to the wgpu
//! backend. All exported functions are called from the page script.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use motion::scroll::Viewport;

pub mod stage;
pub mod wgpu;

mod dom;

use crate::dom::DomScrollSurface;
use crate::stage::{ScrollStage, StageConfig};
use crate::wgpu::{GpuContext, init_gpu_from_canvas_id, render_stage, resize_gpu};

const CANVAS_ID: &str = "stage-canvas";
const CONTENT_ID: &str = "scroll-content";

// Guard to prevent double-initialization of global state (relevant during
// hot reload).
static INITIALIZED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

struct App {
    stage: ScrollStage<DomScrollSurface>,
    gpu: GpuContext,
    canvas: web_sys::HtmlCanvasElement,
    /// Cancellation flag for the frame loop; `stop_stage` flips it and the
    /// loop closure stops rescheduling itself.
    running: Rc<Cell<bool>>,
}

thread_local! {
    static STATE: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    // During hot-reload / teardown, JS callbacks can still fire briefly.
    // Avoid panicking on TLS access in that window.
    STATE
        .try_with(|state| state.borrow_mut().as_mut().map(f))
        .ok()
        .flatten()
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            web_sys::console::error_1(&JsValue::from_str(&info.to_string()));
        }));
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Avoid double-initialization (can happen during hot-reload edge cases).
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    init_panic_hook();
    Ok(())
}

/// Build the stage and start the render loop. Called once by the page
/// script after the wasm module loads.
#[wasm_bindgen]
pub fn init_stage() {
    spawn_local(async move {
        if let Err(err) = init_stage_inner().await {
            web_sys::console::error_1(&err);
        }
    });
}

async fn init_stage_inner() -> Result<(), JsValue> {
    if STATE.try_with(|state| state.borrow().is_some()).unwrap_or(true) {
        return Ok(());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("document missing"))?;

    let viewport = read_viewport(&window)?;
    let surface = DomScrollSurface::attach(&window, &document, CONTENT_ID)?;
    let stage = ScrollStage::new(surface, viewport, StageConfig::default());

    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{CANVAS_ID} canvas element")))?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;
    let gpu = init_gpu_from_canvas_id(CANVAS_ID).await?;

    STATE
        .try_with(|state| {
            *state.borrow_mut() = Some(App {
                stage,
                gpu,
                canvas,
                running: Rc::new(Cell::new(true)),
            });
        })
        .map_err(|_| JsValue::from_str("state unavailable"))?;

    add_event_listeners(&window)?;

    // Initial layout pass before the first frame: sizes the body for the
    // native scrollbar and the canvas for the clamped pixel ratio.
    let dpr = window.device_pixel_ratio();
    with_app(|app| apply_resize(app, viewport, dpr));

    start_frame_loop(&window)?;
    web_sys::console::log_1(&JsValue::from_str("scroll stage running"));
    Ok(())
}

/// Stop the frame loop. The stage state stays in place; this is the
/// teardown half of the loop's lifecycle contract.
#[wasm_bindgen]
pub fn stop_stage() {
    with_app(|app| app.running.set(false));
}

/// Opt into the pointer parallax interaction (off by default).
#[wasm_bindgen]
pub fn set_pointer_parallax(enabled: bool) {
    with_app(|app| app.stage.set_pointer_parallax(enabled));
}

/// One-line state summary for the page console.
#[wasm_bindgen]
pub fn stage_debug() -> String {
    with_app(|app| {
        let scroll = *app.stage.scroll();
        format!(
            "frame: {}, hard: {:.1}, soft: {:.1}, limit: {:.0}, normalized: {:.1}, rotation_x: {:.3}",
            app.stage.frame().index,
            scroll.hard,
            scroll.soft,
            scroll.limit,
            scroll.normalized,
            app.stage.transform().rotation_x,
        )
    })
    .unwrap_or_else(|| "stage not initialized".to_string())
}

fn read_viewport(window: &web_sys::Window) -> Result<Viewport, JsValue> {
    let width = window
        .inner_width()?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("inner_width not a number"))?;
    let height = window
        .inner_height()?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("inner_height not a number"))?;
    Ok(Viewport::new(width, height))
}

/// Push a resize through the stage and apply the outcome to the canvas
/// backing store, its CSS size and the GPU surface.
fn apply_resize(app: &mut App, viewport: Viewport, device_pixel_ratio: f64) {
    let outcome = app.stage.on_resize(viewport, device_pixel_ratio);

    app.canvas.set_width(outcome.physical_width);
    app.canvas.set_height(outcome.physical_height);
    let style = app.canvas.style();
    let _ = style.set_property("width", &format!("{}px", viewport.width));
    let _ = style.set_property("height", &format!("{}px", viewport.height));

    resize_gpu(&mut app.gpu, outcome.physical_width, outcome.physical_height);
}

fn add_event_listeners(window: &web_sys::Window) -> Result<(), JsValue> {
    // Scroll: claim the single in-flight token and schedule at most one
    // scroll-animation callback for the next frame.
    {
        let win = window.clone();
        let closure = Closure::wrap(Box::new(move || {
            let schedule = with_app(|app| app.stage.on_scroll()).unwrap_or(false);
            if schedule {
                let cb = Closure::once_into_js(move || {
                    with_app(|app| app.stage.update_scroll_animations());
                });
                let _ = win.request_animation_frame(cb.unchecked_ref());
            }
        }) as Box<dyn FnMut()>);
        window.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Resize: recompute the viewport and push it through the stage.
    {
        let win = window.clone();
        let closure = Closure::wrap(Box::new(move || {
            let Ok(viewport) = read_viewport(&win) else {
                return;
            };
            let dpr = win.device_pixel_ratio();
            with_app(|app| apply_resize(app, viewport, dpr));
        }) as Box<dyn FnMut()>);
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Pointer: always registered, inert unless the parallax flag is set.
    {
        let closure = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
            with_app(|app| {
                app.stage
                    .on_pointer_move(f64::from(event.client_x()), f64::from(event.client_y()));
            });
        }) as Box<dyn FnMut(web_sys::MouseEvent)>);
        window.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

/// Continuous self-rescheduling frame loop.
///
/// `f` holds the animation-frame closure so it can re-register itself each
/// frame. When the running flag clears, the closure simply stops
/// rescheduling; it stays parked until page unload.
fn start_frame_loop(window: &web_sys::Window) -> Result<(), JsValue> {
    let running = with_app(|app| app.running.clone())
        .ok_or_else(|| JsValue::from_str("stage not initialized"))?;

    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let win = window.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if !running.get() {
            return;
        }

        let now = now_seconds();
        let rendered = with_app(|app| {
            app.stage.advance(now);
            let frame = app.stage.render_frame();
            render_stage(&app.gpu, &frame)
        });
        if let Some(Err(err)) = rendered {
            // A dropped frame is non-fatal; surface acquisition can fail
            // transiently during resizes.
            web_sys::console::warn_1(&err);
        }

        if let Some(cb) = f.borrow().as_ref() {
            let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));

    let cb_ref = g.borrow();
    let cb = cb_ref
        .as_ref()
        .ok_or_else(|| JsValue::from_str("frame loop closure missing"))?;
    window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    Ok(())
}

/// Get current time in seconds.
fn now_seconds() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() / 1000.0
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}
