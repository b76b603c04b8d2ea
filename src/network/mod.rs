//! Electric network mode: scattered nodes, faint connection lines, and an
//! activation run that lights each node in turn, arcs a bolt to the next one,
//! and finally shocks the logo and sets its border crackling.
//!
//! Everything animated lives in [`Scene`] and is advanced by a single
//! `requestAnimationFrame` loop. The [`Sequencer`] run is an `async` task
//! (spawned with `wasm_bindgen_futures::spawn_local`) that awaits completions
//! fired from inside those frame ticks.
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, Window, window};

pub mod activator;
pub mod bolt;
pub mod layout;
pub mod logo;
pub mod render;
pub mod scene;
pub mod sequencer;
pub mod signal;
pub mod sparks;
pub mod tween;

pub use scene::{Logo, Node, Scene, SceneStats};
pub use sequencer::{SceneHandle, Sequencer, SequencerState};
pub use signal::Completion;

use crate::config::NetworkConfig;
use crate::error::{NetworkError, Result};
use render::Renderer;

/// Milliseconds per 60 Hz frame; tick deltas are measured in these.
const FRAME_MS: f64 = 1000.0 / 60.0;
const CANVAS_ID: &str = "electric-network-canvas";

/// Runtime state owned by the page once `start_network_mode()` has run.
struct NetworkRuntime {
    scene: SceneHandle,
    sequencer: Sequencer,
    renderer: Renderer,
    last_frame_ms: Option<f64>,
}

thread_local! {
    static NETWORK: RefCell<Option<NetworkRuntime>> = const { RefCell::new(None) };
}

pub fn start_network_mode(mut config: NetworkConfig) -> Result<()> {
    if NETWORK.with(|n| n.borrow().is_some()) {
        return Err(NetworkError::AlreadyStarted);
    }
    config.validate()?;
    let win = window().ok_or(NetworkError::NoWindow)?;
    let doc = win.document().ok_or(NetworkError::NoDocument)?;

    if config.seed.is_none() {
        config.seed = Some(entropy_seed()?);
    }
    let (width, height) = viewport_size(&win)?;
    let stage = stage_element(&doc, &config.stage_element_id)?;

    // Create / reuse the drawing canvas inside the stage, sized to the viewport.
    let canvas: HtmlCanvasElement = match doc.get_element_by_id(CANVAS_ID) {
        Some(el) => el.dyn_into().map_err(|_| NetworkError::Js(format!("#{} is not a canvas", CANVAS_ID)))?,
        None => {
            let c: HtmlCanvasElement = doc
                .create_element("canvas")?
                .dyn_into()
                .map_err(|_| NetworkError::Js("created element is not a canvas".into()))?;
            c.set_id(CANVAS_ID);
            c.set_attribute("style", "position:fixed; inset:0; display:block; pointer-events:none; z-index:0;")?;
            stage.append_child(&c)?;
            c
        }
    };
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);

    log::info!(
        "electric network: {} nodes on {}x{} (seed {:?})",
        config.node_count,
        width,
        height,
        config.seed
    );
    let trigger_id = config.trigger_element_id.clone();
    let mut scene = Scene::new(config, width, height);
    let renderer = Renderer::new(&doc, canvas, &mut scene)?;
    log::info!("{} static connections", scene.connections().len());
    let scene: SceneHandle = Rc::new(RefCell::new(scene));
    let sequencer = Sequencer::new(scene.clone());

    NETWORK.with(|n| {
        n.replace(Some(NetworkRuntime {
            scene,
            sequencer,
            renderer,
            last_frame_ms: None,
        }))
    });

    bind_trigger(&doc, &trigger_id)?;
    bind_resize(&win)?;
    start_network_loop();
    Ok(())
}

/// Start an activation run. Returns false when one is already running.
pub fn trigger_activation() -> Result<bool> {
    let sequencer = NETWORK
        .with(|n| n.borrow().as_ref().map(|rt| rt.sequencer.clone()))
        .ok_or(NetworkError::NotStarted)?;
    let Some(run) = sequencer.trigger() else {
        return Ok(false);
    };
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = run.await {
            log::error!("network activation failed: {}", e);
        }
    });
    Ok(true)
}

pub fn sequencer_state() -> Option<SequencerState> {
    NETWORK.with(|n| n.borrow().as_ref().map(|rt| rt.sequencer.state()))
}

/// Cancel in-flight bolts and tweens; a running activation aborts and the
/// sequencer returns to idle.
pub fn interrupt_activation() -> Result<()> {
    NETWORK.with(|n| {
        let guard = n.borrow();
        let rt = guard.as_ref().ok_or(NetworkError::NotStarted)?;
        rt.scene.borrow_mut().interrupt();
        Ok(())
    })
}

fn entropy_seed() -> Result<u64> {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf).map_err(NetworkError::Entropy)?;
    Ok(u64::from_le_bytes(buf))
}

fn viewport_size(win: &Window) -> Result<(f64, f64)> {
    let w = win.inner_width()?.as_f64().unwrap_or(800.0);
    let h = win.inner_height()?.as_f64().unwrap_or(600.0);
    Ok((w.max(1.0), h.max(1.0)))
}

/// The element the canvas is mounted in; created on `<body>` when missing.
fn stage_element(doc: &Document, id: &str) -> Result<web_sys::Element> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let body: HtmlElement = doc.body().ok_or(NetworkError::NoDocument)?;
    let div = doc.create_element("div")?;
    div.set_id(id);
    body.append_child(&div)?;
    log::debug!("created missing stage element #{}", id);
    Ok(div)
}

fn bind_trigger(doc: &Document, id: &str) -> Result<()> {
    let Some(button) = doc.get_element_by_id(id) else {
        log::warn!("no #{} element; use activate_network() to trigger", id);
        return Ok(());
    };
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        match trigger_activation() {
            Ok(true) => {}
            Ok(false) => log::debug!("activation click ignored; run in progress"),
            Err(e) => log::error!("activation click failed: {}", e),
        }
    }) as Box<dyn FnMut(_)>);
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn bind_resize(win: &Window) -> Result<()> {
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        let Some(win) = window() else { return };
        let Ok((w, h)) = viewport_size(&win) else { return };
        NETWORK.with(|n| {
            if let Some(rt) = n.borrow().as_ref() {
                rt.renderer.canvas().set_width(w as u32);
                rt.renderer.canvas().set_height(h as u32);
                rt.scene.borrow_mut().resize(w, h);
            }
        });
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_network_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        NETWORK.with(|cell| {
            if let Some(rt) = cell.borrow_mut().as_mut() {
                network_tick(rt, ts);
            }
        });
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(cb: &FrameCallback) {
    let (Some(w), Some(closure)) = (window(), cb.borrow().as_ref().map(|c| c.as_ref().clone())) else {
        return;
    };
    if let Err(e) = w.request_animation_frame(closure.unchecked_ref()) {
        log::error!("requestAnimationFrame failed: {:?}", e);
    }
}

fn network_tick(rt: &mut NetworkRuntime, now_ms: f64) {
    let dt = rt
        .last_frame_ms
        .map(|last| (now_ms - last) / FRAME_MS)
        .unwrap_or(1.0);
    rt.last_frame_ms = Some(now_ms);
    rt.scene.borrow_mut().tick(dt);
    if let Err(e) = rt.renderer.draw(&rt.scene.borrow()) {
        log::error!("draw failed: {}", e);
    }
}
