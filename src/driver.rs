// driver.rs - Frame loop lifecycle
//
// The host's "call me before the next repaint" primitive is the only
// scheduler. FrameDriver owns the pending request so it can always be
// cancelled: a stopped driver never reschedules and holds no listeners.

use log::{debug, info};

use crate::error::Result;

/// Opaque id of a pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// What the engine needs from its environment.
pub trait Host {
    fn request_frame(&mut self) -> Result<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
    fn attach_listeners(&mut self) -> Result<()>;
    fn detach_listeners(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Paused,
    Stopped,
}

/// Skips frames that arrive faster than the target rate.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    interval_ms: f64,
    last: Option<f64>,
}

impl FramePacer {
    // rAF timestamps jitter around the display interval
    const SLACK_MS: f64 = 1.0;

    pub fn new(target_fps: f32) -> Self {
        let fps = if target_fps.is_finite() && target_fps > 0.0 { target_fps as f64 } else { 60.0 };
        Self { interval_ms: 1000.0 / fps, last: None }
    }

    pub fn should_tick(&mut self, now_ms: f64) -> bool {
        match self.last {
            Some(last) if now_ms - last < self.interval_ms - Self::SLACK_MS => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }

    /// Forget the last tick, e.g. after a pause.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

pub struct FrameDriver {
    state: LoopState,
    pending: Option<FrameHandle>,
    pacer: FramePacer,
    // Host may hold listeners even if start failed halfway
    attached: bool,
}

impl FrameDriver {
    pub fn new(target_fps: f32) -> Self {
        Self {
            state: LoopState::Idle,
            pending: None,
            pacer: FramePacer::new(target_fps),
            attached: false,
        }
    }

    pub fn state(&self) -> LoopState { self.state }
    pub fn pending(&self) -> Option<FrameHandle> { self.pending }

    /// True while host events should reach the engine.
    pub fn listening(&self) -> bool {
        matches!(self.state, LoopState::Running | LoopState::Paused)
    }

    pub fn start<H: Host>(&mut self, host: &mut H) -> Result<()> {
        if self.state != LoopState::Idle {
            return Ok(());
        }
        // Set before attaching: a partial attach still needs a detach
        self.attached = true;
        if let Err(err) = host.attach_listeners() {
            self.release(host);
            return Err(err);
        }
        match host.request_frame() {
            Ok(handle) => self.pending = Some(handle),
            Err(err) => {
                self.release(host);
                return Err(err);
            }
        }
        self.state = LoopState::Running;
        info!("frame loop started");
        Ok(())
    }

    /// Called from the host's frame callback. Reschedules the next frame
    /// and returns whether the simulation should advance on this one.
    pub fn on_frame<H: Host>(&mut self, now_ms: f64, host: &mut H) -> Result<bool> {
        self.pending = None;
        if self.state != LoopState::Running {
            return Ok(false);
        }
        self.pending = Some(host.request_frame()?);
        Ok(self.pacer.should_tick(now_ms))
    }

    pub fn pause<H: Host>(&mut self, host: &mut H) {
        if self.state != LoopState::Running { return; }
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
        self.state = LoopState::Paused;
        debug!("frame loop paused");
    }

    pub fn resume<H: Host>(&mut self, host: &mut H) -> Result<()> {
        if self.state != LoopState::Paused { return Ok(()); }
        self.pacer.reset();
        self.pending = Some(host.request_frame()?);
        self.state = LoopState::Running;
        debug!("frame loop resumed");
        Ok(())
    }

    /// Cancel the pending frame and detach every listener. Final.
    pub fn stop<H: Host>(&mut self, host: &mut H) {
        if self.state == LoopState::Stopped { return; }
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
        self.release(host);
        self.state = LoopState::Stopped;
        info!("frame loop stopped");
    }

    /// True while the host may still hold listeners for this driver.
    pub fn attached(&self) -> bool { self.attached }

    fn release<H: Host>(&mut self, host: &mut H) {
        if self.attached {
            host.detach_listeners();
            self.attached = false;
        }
    }
}
