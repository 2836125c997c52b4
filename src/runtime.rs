// runtime.rs - One backdrop: world, input, painter and frame loop
//
// Generic over the host and the surface so the whole loop runs in tests
// with a manual clock and a recording surface.

use log::{info, warn};

use crate::driver::{FrameDriver, Host, LoopState};
use crate::error::Result;
use crate::input::{InputEvent, InputState};
use crate::profile::{EffectProfile, PowerMode};
use crate::render::Painter;
use crate::sim::World;
use crate::surface::Surface;

pub struct Backdrop<H: Host, S: Surface> {
    world: World,
    input: InputState,
    painter: Painter,
    driver: FrameDriver,
    host: H,
    surface: S,
}

impl<H: Host, S: Surface> Backdrop<H, S> {
    pub fn new(profile: EffectProfile, power: PowerMode, seed: u64, host: H, surface: S) -> Result<Self> {
        profile.validate()?;
        let driver = FrameDriver::new(profile.frame_rate(power));
        if power == PowerMode::Low {
            info!("low-power mode: {} fps", profile.frame_rate(power));
        }
        Ok(Self {
            world: World::new(profile, power, seed),
            input: InputState::new(),
            painter: Painter::new(),
            driver,
            host,
            surface,
        })
    }

    /// Size the surface, seed the entities, attach listeners and request
    /// the first frame.
    pub fn start(&mut self, width: f64, height: f64, dpr: f64) -> Result<()> {
        if self.driver.state() == LoopState::Idle {
            self.configure(width, height, dpr);
        }
        self.driver.start(&mut self.host)
    }

    /// Surface Manager entry point. Identical inputs change nothing.
    pub fn configure(&mut self, width: f64, height: f64, dpr: f64) {
        if !self.world.configure(width, height, dpr) {
            return;
        }
        if let Some(config) = self.world.config() {
            self.surface.configure(config);
            info!(
                "surface {}x{} (backing {}x{}), {} entities",
                config.width, config.height, config.backing_width, config.backing_height, config.capacity
            );
        }
    }

    /// Host frame callback.
    pub fn frame(&mut self, now_ms: f64) -> Result<()> {
        match self.driver.on_frame(now_ms, &mut self.host) {
            Ok(true) => {
                self.advance();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => {
                warn!("could not schedule next frame: {err}");
                self.stop();
                Err(err)
            }
        }
    }

    /// Advance one tick and draw it, independent of the host clock.
    pub fn advance(&mut self) {
        self.input.smooth(self.world.profile().smoothing);
        self.world.tick(&self.input);
        self.painter.paint(&self.world, &self.input, &mut self.surface);
    }

    /// Apply a host event. Ignored unless the loop is live.
    pub fn handle(&mut self, event: InputEvent) -> Result<()> {
        if !self.driver.listening() {
            return Ok(());
        }
        match event {
            InputEvent::PointerMove { x, y } => self.input.pointer_move(x, y),
            InputEvent::PointerLeave => self.input.pointer_leave(),
            InputEvent::Scroll { offset } => self.input.scroll_to(offset),
            InputEvent::Resize { width, height, dpr } => self.configure(width, height, dpr),
            InputEvent::Visibility { hidden: true } => self.driver.pause(&mut self.host),
            InputEvent::Visibility { hidden: false } => {
                if let Err(err) = self.driver.resume(&mut self.host) {
                    warn!("could not resume frame loop: {err}");
                    self.stop();
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        self.driver.stop(&mut self.host);
    }

    // Accessors
    pub fn state(&self) -> LoopState { self.driver.state() }
    pub fn world(&self) -> &World { &self.world }
    pub fn input(&self) -> &InputState { &self.input }
    pub fn host(&self) -> &H { &self.host }
    pub fn host_mut(&mut self) -> &mut H { &mut self.host }
    pub fn surface(&self) -> &S { &self.surface }
}
