// render.rs - Turn simulation state into draw calls
//
// Per-frame visuals (alpha, parallax offset) are derived here and never
// written back to the entity store.

use crate::input::InputState;
use crate::profile::{ClearMode, EffectProfile, EntityKind};
use crate::sim::{World, wrap};
use crate::surface::{Rgb, Surface};

const LINK_ALPHA: f32 = 0.1;
const LINK_WIDTH: f32 = 0.5;

/// Alpha for one frame: base opacity scaled by remaining life.
#[inline]
pub fn frame_alpha(opacity: f32, life: f32, max_life: f32) -> f32 {
    if !(max_life > 0.0) {
        return 0.0;
    }
    let a = opacity * (life / max_life);
    if a.is_finite() { a.clamp(0.0, 1.0) } else { 0.0 }
}

/// A particle as drawn this frame.
#[derive(Clone, Copy)]
struct Dot {
    x: f32,
    y: f32,
    size: f32,
    alpha: f32,
    opacity: f32,
    tint: u8,
}

pub struct Painter {
    // Reused across frames
    dots: Vec<Dot>,
}

impl Painter {
    pub fn new() -> Self {
        Self { dots: Vec::new() }
    }

    pub fn paint<S: Surface>(&mut self, world: &World, input: &InputState, surface: &mut S) {
        let profile = world.profile();
        match profile.clear {
            ClearMode::Clear => surface.clear(),
            ClearMode::Fade { alpha } => surface.fade(profile.background, alpha),
        }

        match profile.kind {
            EntityKind::Particles => {
                self.collect_dots(world, input);
                if profile.link_distance > 0.0 {
                    self.paint_links(profile, surface);
                }
                self.paint_dots(profile, surface);
            }
            EntityKind::Rain => self.paint_rain(world, surface),
        }
    }

    fn collect_dots(&mut self, world: &World, input: &InputState) {
        self.dots.clear();
        let Some(config) = world.config() else { return };
        let pool = world.pool();
        let shift = -input.scroll.smoothed * world.profile().parallax;

        for &i in pool.active() {
            let y = if shift != 0.0 { wrap(pool.y[i] + shift, config.height) } else { pool.y[i] };
            self.dots.push(Dot {
                x: pool.x[i],
                y,
                size: pool.size[i],
                alpha: frame_alpha(pool.opacity[i], pool.life[i], pool.max_life[i]),
                opacity: pool.opacity[i],
                tint: pool.tint[i],
            });
        }
    }

    fn paint_dots<S: Surface>(&self, profile: &EffectProfile, surface: &mut S) {
        for dot in &self.dots {
            if dot.alpha <= 0.0 { continue; }
            let color = tint(profile, dot.tint).with_alpha(dot.alpha * profile.tint_alpha);
            surface.circle(dot.x, dot.y, dot.size, color, profile.glow);
        }
    }

    /// Constellation lines between close particles. Quadratic, so the
    /// density constant keeps n small.
    fn paint_links<S: Surface>(&self, profile: &EffectProfile, surface: &mut S) {
        let max = profile.link_distance;
        for (k, a) in self.dots.iter().enumerate() {
            for b in &self.dots[k + 1..] {
                let dx = a.x - b.x;
                let dy = a.y - b.y;
                let d = (dx * dx + dy * dy).sqrt();
                if d >= max { continue; }

                let alpha = (1.0 - d / max) * LINK_ALPHA * a.opacity * profile.tint_alpha;
                if alpha <= 0.0 { continue; }
                let color = tint(profile, a.tint).with_alpha(alpha);
                surface.line((a.x, a.y), (b.x, b.y), color, LINK_WIDTH);
            }
        }
    }

    fn paint_rain<S: Surface>(&self, world: &World, surface: &mut S) {
        let profile = world.profile();
        let pool = world.pool();

        for col in world.columns() {
            let head = col.head();
            for &i in &col.trail {
                let alpha = frame_alpha(pool.opacity[i], pool.life[i], pool.max_life[i]);
                if alpha <= 0.0 { continue; }

                let color = if Some(i) == head {
                    profile.head_color.with_alpha(alpha)
                } else {
                    tint(profile, pool.tint[i]).with_alpha(alpha * profile.tint_alpha)
                };
                let glow = if Some(i) == head { profile.glow } else { 0.0 };
                surface.glyph(pool.glyph[i], pool.x[i], pool.y[i], pool.size[i], color, glow);
            }
        }
    }
}

impl Default for Painter {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn tint(profile: &EffectProfile, idx: u8) -> Rgb {
    profile
        .palette
        .get(idx as usize)
        .copied()
        .unwrap_or(profile.head_color)
}
