// sim/ - Backdrop simulation
//
// Entity management using Structure-of-Arrays for cache efficiency.
// Each entity kind in its own module; World owns the store and steps it.

mod particle;
mod pool;
mod rain;

pub use pool::EntityPool;
pub use rain::Column;

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::input::InputState;
use crate::profile::{EffectProfile, EntityKind, ForceSign, PowerMode};
use crate::surface::SurfaceConfig;

/// The simulated backdrop: one entity store, stepped once per frame.
pub struct World {
    profile: EffectProfile,
    power: PowerMode,
    config: Option<SurfaceConfig>,

    // Entities
    pool: EntityPool,
    columns: Vec<Column>,
    glyphs: Vec<char>,

    rng: SmallRng,
    frame: u64,
}

impl World {
    pub fn new(profile: EffectProfile, power: PowerMode, seed: u64) -> Self {
        let glyphs = profile.glyphs.chars().collect();
        Self {
            profile,
            power,
            config: None,
            pool: EntityPool::allocate(0),
            columns: Vec::new(),
            glyphs,
            rng: SmallRng::seed_from_u64(seed),
            frame: 0,
        }
    }

    /// Recompute the surface configuration. Reallocates and reseeds the
    /// store only when the derived configuration changed; returns whether
    /// it did.
    pub fn configure(&mut self, width: f64, height: f64, dpr: f64) -> bool {
        let next = SurfaceConfig::new(width, height, dpr, &self.profile, self.power);
        if self.config == Some(next) {
            return false;
        }

        self.pool = EntityPool::allocate(next.capacity);
        self.columns.clear();
        match self.profile.kind {
            EntityKind::Particles => {
                particle::seed(&mut self.pool, &next, &self.profile, &mut self.rng);
            }
            EntityKind::Rain => {
                self.columns = rain::columns(&next, &self.profile, &mut self.rng);
            }
        }

        debug!(
            "configured {}x{} @{}x: capacity {}, columns {}",
            next.width, next.height, next.dpr, next.capacity, next.columns
        );
        self.config = Some(next);
        true
    }

    /// Advance every live entity one frame. A no-op before `configure`.
    pub fn tick(&mut self, input: &InputState) {
        let Some(config) = self.config else { return };

        match self.profile.kind {
            EntityKind::Particles => {
                particle::update(&mut self.pool, &config, input, &self.profile, &mut self.rng);
            }
            EntityKind::Rain => {
                rain::update(
                    &mut self.columns,
                    &mut self.pool,
                    &config,
                    input,
                    &self.profile,
                    &self.glyphs,
                    &mut self.rng,
                );
            }
        }
        self.frame += 1;
    }

    // Accessors
    pub fn profile(&self) -> &EffectProfile { &self.profile }
    pub fn power(&self) -> PowerMode { self.power }
    pub fn config(&self) -> Option<&SurfaceConfig> { self.config.as_ref() }
    pub fn pool(&self) -> &EntityPool { &self.pool }
    pub fn pool_mut(&mut self) -> &mut EntityPool { &mut self.pool }
    pub fn columns(&self) -> &[Column] { &self.columns }
    pub fn frame(&self) -> u64 { self.frame }
}

/// Velocity nudge from the pointer force field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Push {
    pub dvx: f32,
    pub dvy: f32,
    /// `(R - d) / R`, in [0, 1]
    pub falloff: f32,
}

/// Linear-falloff force between an entity at (x, y) and `target`.
/// None outside the interaction radius. At zero distance the direction
/// is undefined, so the nudge is zero but the falloff still counts.
pub(crate) fn field_force(
    x: f32,
    y: f32,
    target: (f32, f32),
    radius: f32,
    strength: f32,
    sign: ForceSign,
) -> Option<Push> {
    let dx = target.0 - x;
    let dy = target.1 - y;
    let dist = (dx * dx + dy * dy).sqrt();
    if !(dist < radius) {
        return None;
    }

    let falloff = (radius - dist) / radius;
    if dist <= f32::EPSILON {
        return Some(Push { dvx: 0.0, dvy: 0.0, falloff });
    }

    let k = falloff * strength * sign.factor() / dist;
    Some(Push { dvx: dx * k, dvy: dy * k, falloff })
}

/// Uniform sample from `[lo, hi)`; `lo` when the range is empty.
#[inline]
pub(crate) fn sample(range: [f32; 2], rng: &mut SmallRng) -> f32 {
    let [lo, hi] = range;
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

/// Map `v` into `[0, len)`.
#[inline]
pub fn wrap(v: f32, len: f32) -> f32 {
    let r = v.rem_euclid(len);
    // rem_euclid can round up to `len` for tiny negative inputs
    if r >= len { 0.0 } else { r }
}

#[inline]
pub(crate) fn pick_tint(palette_len: usize, rng: &mut SmallRng) -> u8 {
    let n = palette_len.clamp(1, 256);
    rng.gen_range(0..n) as u8
}
