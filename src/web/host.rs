// host.rs - Browser host: requestAnimationFrame and DOM listeners
//
// Every callback holds a Weak pointer back to its backdrop, so dropping
// the backdrop breaks the loop even if stop() was never called.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, MouseEvent, Window};

use super::canvas::CanvasSurface;
use crate::driver::{FrameHandle, Host};
use crate::error::{EngineError, Result};
use crate::input::InputEvent;
use crate::profile::PowerMode;
use crate::runtime::Backdrop;

pub type WebBackdrop = Backdrop<WebHost, CanvasSurface>;
pub type Shared = Rc<RefCell<WebBackdrop>>;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

pub struct WebHost {
    window: Window,
    owner: Weak<RefCell<WebBackdrop>>,
    frame_cb: Option<Closure<dyn FnMut(f64)>>,
    listeners: Vec<Listener>,
}

impl WebHost {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            owner: Weak::new(),
            frame_cb: None,
            listeners: Vec::new(),
        }
    }

    /// Point callbacks at the backdrop that owns this host.
    pub fn bind(&mut self, owner: &Shared) {
        self.owner = Rc::downgrade(owner);
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn listen<F>(&mut self, target: EventTarget, kind: &'static str, translate: F) -> Result<()>
    where
        F: Fn(&Event) -> Option<InputEvent> + 'static,
    {
        let owner = self.owner.clone();
        let callback = Closure::wrap(Box::new(move |event: Event| {
            let Some(input) = translate(&event) else { return };
            let Some(shared) = owner.upgrade() else { return };
            let Ok(mut backdrop) = shared.try_borrow_mut() else { return };
            if let Err(err) = backdrop.handle(input) {
                warn!("{kind} handler failed: {err}");
            }
        }) as Box<dyn FnMut(Event)>);

        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(host_err)?;
        self.listeners.push(Listener { target, kind, callback });
        Ok(())
    }
}

impl Host for WebHost {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        if self.frame_cb.is_none() {
            let owner = self.owner.clone();
            self.frame_cb = Some(Closure::wrap(Box::new(move |now: f64| {
                let Some(shared) = owner.upgrade() else { return };
                let Ok(mut backdrop) = shared.try_borrow_mut() else { return };
                if let Err(err) = backdrop.frame(now) {
                    warn!("frame loop halted: {err}");
                }
            }) as Box<dyn FnMut(f64)>));
        }

        let Some(cb) = self.frame_cb.as_ref() else {
            return Err(EngineError::Host("frame callback missing".into()));
        };
        self.window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .map(FrameHandle)
            .map_err(host_err)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            warn!("cancelAnimationFrame failed: {err:?}");
        }
    }

    fn attach_listeners(&mut self) -> Result<()> {
        let window = self.window.clone();
        let document = window
            .document()
            .ok_or_else(|| EngineError::Host("window has no document".into()))?;
        let root: EventTarget = match document.document_element() {
            Some(el) => el.into(),
            None => document.clone().into(),
        };

        self.listen(window.clone().into(), "mousemove", |event| {
            let m = event.dyn_ref::<MouseEvent>()?;
            Some(InputEvent::PointerMove { x: m.client_x() as f32, y: m.client_y() as f32 })
        })?;

        self.listen(root, "mouseleave", |_| Some(InputEvent::PointerLeave))?;

        let w = window.clone();
        self.listen(window.clone().into(), "resize", move |_| {
            let (width, height) = viewport(&w);
            Some(InputEvent::Resize { width, height, dpr: w.device_pixel_ratio() })
        })?;

        let w = window.clone();
        self.listen(window.clone().into(), "scroll", move |_| {
            let offset = w.scroll_y().ok()? as f32;
            Some(InputEvent::Scroll { offset })
        })?;

        let doc = document.clone();
        self.listen(document.into(), "visibilitychange", move |_| {
            Some(InputEvent::Visibility { hidden: doc.hidden() })
        })?;

        Ok(())
    }

    fn detach_listeners(&mut self) {
        for Listener { target, kind, callback } in self.listeners.drain(..) {
            if let Err(err) = target.remove_event_listener_with_callback(kind, callback.as_ref().unchecked_ref()) {
                warn!("removeEventListener({kind}) failed: {err:?}");
            }
        }
    }
}

/// Logical viewport size in CSS pixels.
pub fn viewport(window: &Window) -> (f64, f64) {
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    (w, h)
}

/// One-time capability probe: few cores or a reduced-motion preference
/// select the low-power profile.
pub fn probe_power(window: &Window) -> PowerMode {
    let cores = window.navigator().hardware_concurrency();
    let reduced_motion = window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|q| q.matches())
        .unwrap_or(false);

    if reduced_motion || (cores > 0.0 && cores <= 4.0) {
        PowerMode::Low
    } else {
        PowerMode::Full
    }
}

fn host_err(err: JsValue) -> EngineError {
    EngineError::Host(format!("{err:?}"))
}
