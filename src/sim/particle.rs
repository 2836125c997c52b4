// particle.rs - Free-floating particles
//
// Created in bulk when the surface is configured and never destroyed:
// an expired particle is reset in place with fresh random conditions.

use rand::Rng;
use rand::rngs::SmallRng;

use super::{EntityPool, field_force, pick_tint, sample, wrap};
use crate::input::InputState;
use crate::profile::{BoundaryPolicy, EffectProfile};
use crate::surface::SurfaceConfig;

/// Fill every slot of a freshly allocated pool.
pub fn seed(pool: &mut EntityPool, config: &SurfaceConfig, profile: &EffectProfile, rng: &mut SmallRng) {
    pool.clear();
    while let Some(i) = pool.spawn() {
        reset(pool, i, config, profile, rng);
    }
}

/// Fresh initial conditions; restarts the lifecycle at `max_life`.
pub fn reset(pool: &mut EntityPool, i: usize, config: &SurfaceConfig, profile: &EffectProfile, rng: &mut SmallRng) {
    pool.x[i] = rng.gen_range(0.0..config.width);
    pool.y[i] = rng.gen_range(0.0..config.height);
    pool.vx[i] = rng.gen_range(-0.5f32..0.5) * profile.speed;
    pool.vy[i] = rng.gen_range(-0.5f32..0.5) * profile.speed;
    pool.size[i] = sample(profile.size_range, rng);
    pool.opacity[i] = sample(profile.opacity_range, rng).clamp(0.0, 1.0);
    pool.tint[i] = pick_tint(profile.palette.len(), rng);

    let max_life = sample(profile.life_range, rng);
    pool.max_life[i] = max_life;
    pool.life[i] = max_life;
    pool.age[i] = 0.0;
}

/// Force field, integration, boundary, lifecycle. In that order.
pub fn update(
    pool: &mut EntityPool,
    config: &SurfaceConfig,
    input: &InputState,
    profile: &EffectProfile,
    rng: &mut SmallRng,
) {
    let (w, h) = (config.width, config.height);
    let target = input.target();
    let (pvx, pvy) = input.pointer.velocity;
    let scroll_push = input.scroll.velocity * profile.scroll_coupling;

    for k in 0..pool.active_count() {
        let i = pool.active()[k];

        // Pointer force
        let push = target.and_then(|t| {
            field_force(
                pool.x[i],
                pool.y[i],
                t,
                profile.interaction_radius,
                profile.force_strength,
                profile.force_sign,
            )
        });
        match push {
            Some(p) => {
                pool.vx[i] += p.dvx + pvx * profile.pointer_coupling;
                pool.vy[i] += p.dvy + pvy * profile.pointer_coupling;
                pool.opacity[i] += p.falloff * profile.proximity_boost;
            }
            None => {
                pool.opacity[i] = (pool.opacity[i] - profile.opacity_decay).max(profile.opacity_floor);
            }
        }
        pool.opacity[i] = pool.opacity[i].clamp(0.0, 1.0);
        pool.vy[i] += scroll_push;

        // Integrate, then damp
        pool.x[i] += pool.vx[i];
        pool.y[i] += pool.vy[i];
        pool.vx[i] *= profile.friction;
        pool.vy[i] *= profile.friction;

        if !(pool.x[i].is_finite() && pool.y[i].is_finite()) {
            reset(pool, i, config, profile, rng);
            continue;
        }

        // Boundary
        match profile.boundary {
            BoundaryPolicy::Wrap => {
                pool.x[i] = wrap(pool.x[i], w);
                pool.y[i] = wrap(pool.y[i], h);
            }
            BoundaryPolicy::Respawn => {
                let (x, y) = (pool.x[i], pool.y[i]);
                if x < 0.0 || x >= w || y < 0.0 || y >= h {
                    reset(pool, i, config, profile, rng);
                    continue;
                }
            }
        }

        // Lifecycle
        pool.life[i] -= profile.life_decay;
        pool.age[i] += 1.0;
        if pool.life[i] <= 0.0 {
            reset(pool, i, config, profile, rng);
        }
    }
}
