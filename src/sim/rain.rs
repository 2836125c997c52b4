// rain.rs - Falling character columns
//
// Each column drives a head cursor down the surface and drops a glyph
// every `next_drop_distance` pixels. Dropped glyphs stay put (unless the
// pointer pushes them), dim with age and return to the pool. Columns
// never look at each other.

use rand::Rng;
use rand::rngs::SmallRng;

use super::{EntityPool, field_force, pick_tint, sample};
use crate::input::InputState;
use crate::profile::EffectProfile;
use crate::surface::SurfaceConfig;

pub struct Column {
    pub x: f32,
    pub head_y: f32,
    pub speed: f32,
    pub travelled: f32,
    pub next_drop_distance: f32,
    /// Live glyphs, oldest first. The head is the last element.
    pub trail: Vec<usize>,
}

impl Column {
    #[inline]
    pub fn head(&self) -> Option<usize> {
        self.trail.last().copied()
    }
}

/// One column per `column_spacing`, heads staggered above the top edge.
pub fn columns(config: &SurfaceConfig, profile: &EffectProfile, rng: &mut SmallRng) -> Vec<Column> {
    (0..config.columns)
        .map(|c| Column {
            x: c as f32 * profile.column_spacing,
            head_y: -rng.gen_range(0.0..config.height),
            speed: sample(profile.fall_speed, rng),
            travelled: 0.0,
            next_drop_distance: drop_distance(profile, rng),
            trail: Vec::new(),
        })
        .collect()
}

pub fn update(
    columns: &mut [Column],
    pool: &mut EntityPool,
    config: &SurfaceConfig,
    input: &InputState,
    profile: &EffectProfile,
    glyphs: &[char],
    rng: &mut SmallRng,
) {
    let mutation = profile.glyph_mutation.clamp(0.0, 1.0) as f64;

    for col in columns.iter_mut() {
        // Age the trail; expired glyphs go back to the pool in order
        col.trail.retain(|&i| {
            let alive = step_glyph(pool, i, config, input, profile);
            if alive {
                if mutation > 0.0 && rng.gen_bool(mutation) {
                    pool.glyph[i] = pick_glyph(glyphs, rng);
                }
            } else {
                pool.recycle(i);
            }
            alive
        });

        // Advance the head
        col.head_y += col.speed;
        col.travelled += col.speed;
        if col.head_y >= config.height {
            col.head_y = 0.0;
            col.speed = sample(profile.fall_speed, rng);
            col.travelled = col.next_drop_distance;
        }

        if col.head_y >= 0.0 && col.travelled >= col.next_drop_distance {
            // A busy pool slot drops this glyph; the gap is part of the look
            if let Some(i) = pool.spawn() {
                init_glyph(pool, i, col.x, col.head_y, profile, glyphs, rng);
                col.trail.push(i);
            }
            col.travelled = 0.0;
            col.next_drop_distance = drop_distance(profile, rng);
        }
    }
}

fn init_glyph(
    pool: &mut EntityPool,
    i: usize,
    x: f32,
    y: f32,
    profile: &EffectProfile,
    glyphs: &[char],
    rng: &mut SmallRng,
) {
    pool.x[i] = x;
    pool.y[i] = y;
    pool.vx[i] = 0.0;
    pool.vy[i] = 0.0;
    pool.size[i] = profile.font_size;
    pool.opacity[i] = sample(profile.opacity_range, rng).clamp(0.0, 1.0);
    pool.tint[i] = pick_tint(profile.palette.len(), rng);
    pool.glyph[i] = pick_glyph(glyphs, rng);

    let max_life = sample(profile.life_range, rng);
    pool.max_life[i] = max_life;
    pool.life[i] = max_life;
    pool.age[i] = 0.0;
}

/// Push, integrate, age. Returns false once the glyph has expired.
fn step_glyph(
    pool: &mut EntityPool,
    i: usize,
    config: &SurfaceConfig,
    input: &InputState,
    profile: &EffectProfile,
) -> bool {
    if let Some(p) = input.target().and_then(|t| {
        field_force(
            pool.x[i],
            pool.y[i],
            t,
            profile.interaction_radius,
            profile.force_strength,
            profile.force_sign,
        )
    }) {
        pool.vx[i] += p.dvx;
        pool.vy[i] += p.dvy;
    }

    pool.x[i] += pool.vx[i];
    pool.y[i] += pool.vy[i];
    pool.vx[i] *= profile.friction;
    pool.vy[i] *= profile.friction;

    pool.life[i] -= profile.life_decay;
    pool.age[i] += 1.0;

    let (x, y) = (pool.x[i], pool.y[i]);
    pool.life[i] > 0.0 && x.is_finite() && y.is_finite() && y < config.height
}

#[inline]
fn drop_distance(profile: &EffectProfile, rng: &mut SmallRng) -> f32 {
    profile.font_size * sample(profile.drop_spacing, rng)
}

#[inline]
fn pick_glyph(glyphs: &[char], rng: &mut SmallRng) -> char {
    if glyphs.is_empty() { return ' '; }
    glyphs[rng.gen_range(0..glyphs.len())]
}
