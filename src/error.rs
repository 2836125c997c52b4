// error.rs - Engine error taxonomy
//
// Only configuration and host failures are errors. The simulation step
// itself is total and never returns one.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No element with the given id exists in the document.
    #[error("surface `#{0}` not found")]
    MissingSurface(String),

    #[error("element `#{0}` is not a canvas")]
    NotACanvas(String),

    #[error("2d drawing context unavailable")]
    ContextUnavailable,

    #[error("invalid effect profile: {0}")]
    InvalidProfile(String),

    #[error("malformed profile json: {0}")]
    Json(#[from] serde_json::Error),

    /// A browser call failed (frame request, listener registration).
    #[error("host error: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl From<EngineError> for JsValue {
    fn from(err: EngineError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
