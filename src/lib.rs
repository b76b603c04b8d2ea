//! Electric Network core crate.
//!
//! A decorative canvas animation: a scattered network of nodes that light up one
//! by one when triggered, joined by electric bolts, ending in a bolt into the
//! logo which flickers on and gets a permanently crackling border.
//!
//! The animation model (`network::scene` and friends) is plain Rust and runs on
//! the host for tests; only `network::render` and the wasm entry points below
//! touch browser APIs.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod network;

pub use config::{ActivationWait, NetworkConfig};
pub use error::NetworkError;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init (e.g. hot reload) keeps the existing logger.
    let _ = console_log::init_with_level(log::Level::Info);
}

// -----------------------------------------------------------------------------
// Entry points
// -----------------------------------------------------------------------------

/// Mount the canvas, lay out the network and start the frame loop.
/// `config_json` is an optional partial camelCase `NetworkConfig` object.
#[wasm_bindgen]
pub fn start_network(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(json) if !json.trim().is_empty() => NetworkConfig::from_json(json)?,
        _ => NetworkConfig::default(),
    };
    log::set_max_level(config.log_level_filter());
    network::start_network_mode(config)?;
    Ok(())
}

/// Same as clicking the trigger button. Returns false while a run is active.
#[wasm_bindgen]
pub fn activate_network() -> Result<bool, JsValue> {
    Ok(network::trigger_activation()?)
}

/// `"idle"`, `"running"`, or `"stopped"` before `start_network()`.
#[wasm_bindgen]
pub fn network_state() -> String {
    network::sequencer_state()
        .map(|s| s.as_str())
        .unwrap_or("stopped")
        .to_string()
}

/// Abort the active run (if any) by cancelling its pending bolts and tweens.
#[wasm_bindgen]
pub fn interrupt_network() -> Result<(), JsValue> {
    Ok(network::interrupt_activation()?)
}
