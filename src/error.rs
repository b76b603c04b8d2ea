//! Error type shared by the scene, the sequencer and the browser glue.

use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T, E = NetworkError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("2d canvas context unavailable")]
    NoContext,
    #[error("electric network already started")]
    AlreadyStarted,
    #[error("electric network not started; call start_network() first")]
    NotStarted,
    #[error("invalid network config json: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid network config: {0}")]
    InvalidConfig(&'static str),
    #[error("no entropy source for layout seed: {0}")]
    Entropy(getrandom::Error),
    /// A completion signal was dropped before it fired.
    #[error("animation interrupted before completion")]
    Interrupted,
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for NetworkError {
    fn from(value: JsValue) -> Self {
        let msg = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        NetworkError::Js(msg)
    }
}

impl From<NetworkError> for JsValue {
    fn from(err: NetworkError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
