// web/ - Browser bindings
//
// Exposes `Backdrop` to JavaScript:
//
//   const bg = new Backdrop("tron-canvas", JSON.stringify({ preset: "matrix" }));
//   bg.start();
//   ...
//   bg.stop();

mod canvas;
mod host;

pub use canvas::CanvasSurface;
pub use host::{Shared, WebBackdrop, WebHost};

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use wasm_bindgen::prelude::*;

use crate::error::EngineError;
use crate::profile::EffectProfile;
use crate::runtime::Backdrop;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (e.g. module reloaded) keeps the first logger
    console_log::init_with_level(log::Level::Info).ok();
}

#[wasm_bindgen(js_name = Backdrop)]
pub struct BackdropHandle {
    inner: Shared,
}

#[wasm_bindgen(js_class = Backdrop)]
impl BackdropHandle {
    /// Bind to `<canvas id=canvas_id>`. `profile` is optional JSON; see
    /// `EffectProfile::from_json`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, profile: Option<String>) -> Result<BackdropHandle, JsValue> {
        let window = web_sys::window().ok_or_else(|| EngineError::Host("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| EngineError::Host("no document".into()))?;

        let surface = CanvasSurface::bind(&document, canvas_id)?;
        let profile = match profile {
            Some(json) => EffectProfile::from_json(&json)?,
            None => EffectProfile::default(),
        };
        let power = host::probe_power(&window);
        let seed = js_sys::Date::now().to_bits() ^ (js_sys::Math::random() * u32::MAX as f64) as u64;

        let backdrop = Backdrop::new(profile, power, seed, WebHost::new(window), surface)?;
        let inner = Rc::new(RefCell::new(backdrop));
        inner.borrow_mut().host_mut().bind(&inner);

        info!("backdrop bound to #{canvas_id} ({power:?} power)");
        Ok(Self { inner })
    }

    pub fn start(&self) -> Result<(), JsValue> {
        let mut backdrop = self.inner.borrow_mut();
        let window = backdrop.host().window().clone();
        let (width, height) = host::viewport(&window);
        backdrop.start(width, height, window.device_pixel_ratio())?;
        Ok(())
    }

    /// Cancel the pending frame and detach every listener.
    pub fn stop(&self) {
        self.inner.borrow_mut().stop();
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.inner.borrow().state() == crate::driver::LoopState::Running
    }

    #[wasm_bindgen(js_name = entityCount)]
    pub fn entity_count(&self) -> usize {
        self.inner.borrow().world().pool().active_count()
    }
}

impl Drop for BackdropHandle {
    fn drop(&mut self) {
        if let Ok(mut backdrop) = self.inner.try_borrow_mut() {
            backdrop.stop();
        }
    }
}
