// ============================================================================
// BACKDROP ENGINE - Pointer-reactive canvas backgrounds
// ============================================================================
//
// One frame-driven simulation behind every animated background on the
// site: a drifting particle field with constellation links, or falling
// character columns. The look is an `EffectProfile`; the browser is a
// `Host` plus a `Surface`, so everything except `web` runs natively.

pub mod driver;
pub mod error;
pub mod input;
pub mod profile;
pub mod render;
pub mod runtime;
pub mod sim;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use driver::{FrameDriver, FrameHandle, FramePacer, Host, LoopState};
pub use error::{EngineError, Result};
pub use input::{InputEvent, InputState};
pub use profile::{BoundaryPolicy, ClearMode, EffectProfile, EntityKind, ForceSign, PowerMode};
pub use render::Painter;
pub use runtime::Backdrop;
pub use sim::{Column, EntityPool, World};
pub use surface::{Rgb, Rgba, Surface, SurfaceConfig};
