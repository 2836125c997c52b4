// input.rs - Pointer and scroll tracking
//
// Raw values are written by host events as they arrive. The smoothed
// values advance once per frame, so the simulation never sees jitter.

/// Host input, already translated to logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    PointerLeave,
    Scroll { offset: f32 },
    Resize { width: f64, height: f64, dpr: f64 },
    Visibility { hidden: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    pub raw: (f32, f32),
    pub previous: (f32, f32),
    pub velocity: (f32, f32),
    pub smoothed: (f32, f32),
    pub present: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scroll {
    pub offset: f32,
    pub velocity: f32,
    pub smoothed: f32,
    moved: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub pointer: Pointer,
    pub scroll: Scroll,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() { return; }
        let p = &mut self.pointer;

        if p.present {
            p.previous = p.raw;
            p.velocity = (x - p.previous.0, y - p.previous.1);
        } else {
            // Re-entry: no velocity spike, no sweep from the old spot
            p.previous = (x, y);
            p.velocity = (0.0, 0.0);
            p.smoothed = (x, y);
            p.present = true;
        }
        p.raw = (x, y);
    }

    pub fn pointer_leave(&mut self) {
        self.pointer.present = false;
        self.pointer.velocity = (0.0, 0.0);
    }

    pub fn scroll_to(&mut self, offset: f32) {
        if !offset.is_finite() { return; }
        let s = &mut self.scroll;
        s.velocity = offset - s.offset;
        s.offset = offset;
        s.moved = true;
    }

    /// Advance the low-pass filters one frame: `smoothed += (raw - smoothed) * alpha`.
    pub fn smooth(&mut self, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);

        let p = &mut self.pointer;
        if p.present {
            p.smoothed.0 += (p.raw.0 - p.smoothed.0) * alpha;
            p.smoothed.1 += (p.raw.1 - p.smoothed.1) * alpha;
        }

        let s = &mut self.scroll;
        s.smoothed += (s.offset - s.smoothed) * alpha;
        if !s.moved {
            s.velocity = 0.0;
        }
        s.moved = false;
    }

    /// Smoothed pointer position, if the pointer is over the page.
    #[inline]
    pub fn target(&self) -> Option<(f32, f32)> {
        self.pointer.present.then_some(self.pointer.smoothed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_is_delta_of_raw_samples() {
        let mut input = InputState::new();
        input.pointer_move(10.0, 10.0);
        assert_eq!(input.pointer.velocity, (0.0, 0.0));
        input.pointer_move(15.0, 7.0);
        assert_eq!(input.pointer.velocity, (5.0, -3.0));
    }

    #[test]
    fn leave_zeroes_velocity_and_hides_target() {
        let mut input = InputState::new();
        input.pointer_move(10.0, 10.0);
        input.pointer_move(20.0, 10.0);
        input.pointer_leave();
        assert_eq!(input.pointer.velocity, (0.0, 0.0));
        assert_eq!(input.target(), None);
    }

    #[test]
    fn smoothing_converges_without_overshoot() {
        let mut input = InputState::new();
        input.pointer_move(0.0, 0.0);
        input.pointer_move(100.0, 0.0);

        let mut last = 0.0;
        for _ in 0..200 {
            input.smooth(0.1);
            let x = input.pointer.smoothed.0;
            assert!(x >= last && x <= 100.0);
            last = x;
        }
        assert!((last - 100.0).abs() < 0.01);
    }

    #[test]
    fn first_step_moves_tenth_of_the_way() {
        let mut input = InputState::new();
        input.pointer_move(0.0, 0.0);
        input.pointer_move(50.0, 20.0);
        input.smooth(0.1);
        let (x, y) = input.pointer.smoothed;
        assert!((x - 5.0).abs() < 1e-5);
        assert!((y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn reentry_snaps_smoothed() {
        let mut input = InputState::new();
        input.pointer_move(0.0, 0.0);
        input.pointer_leave();
        input.pointer_move(400.0, 300.0);
        assert_eq!(input.target(), Some((400.0, 300.0)));
    }

    #[test]
    fn scroll_velocity_decays_when_idle() {
        let mut input = InputState::new();
        input.scroll_to(120.0);
        assert_eq!(input.scroll.velocity, 120.0);
        input.smooth(0.1);
        assert_eq!(input.scroll.velocity, 120.0);
        input.smooth(0.1);
        assert_eq!(input.scroll.velocity, 0.0);
        assert!(input.scroll.smoothed > 0.0 && input.scroll.smoothed < 120.0);
    }

    #[test]
    fn ignores_non_finite_samples() {
        let mut input = InputState::new();
        input.pointer_move(f32::NAN, 1.0);
        assert!(!input.pointer.present);
        input.scroll_to(f32::INFINITY);
        assert_eq!(input.scroll.offset, 0.0);
    }
}
