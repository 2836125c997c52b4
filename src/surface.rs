// surface.rs - Drawable surface and its configuration
//
// SurfaceConfig is pure math: logical size, device pixel ratio, backing
// size and the entity counts derived from them. Surface is the drawing
// seam; the browser canvas implements it in `web`, tests record calls.

use serde::{Deserialize, Serialize};

use crate::profile::{EffectProfile, EntityKind, PowerMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    #[inline]
    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba { rgb: self, a: a.clamp(0.0, 1.0) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f32,
}

impl Rgba {
    /// CSS color string, e.g. `rgba(0, 122, 255, 0.6)`.
    pub fn css(&self) -> String {
        let Rgb(r, g, b) = self.rgb;
        format!("rgba({r}, {g}, {b}, {:.3})", self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    // Logical size (CSS pixels)
    pub width: f32,
    pub height: f32,
    pub dpr: f64,

    // Backing store (device pixels)
    pub backing_width: u32,
    pub backing_height: u32,

    // Derived counts
    pub capacity: usize,
    pub columns: usize,
}

impl SurfaceConfig {
    pub fn new(width: f64, height: f64, dpr: f64, profile: &EffectProfile, power: PowerMode) -> Self {
        let width = sanitize_len(width);
        let height = sanitize_len(height);
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let scale = profile.count_scale(power);

        let (capacity, columns) = match profile.kind {
            EntityKind::Particles => {
                let count = (width * height / profile.density * scale).floor();
                (count as usize, 0)
            }
            EntityKind::Rain => {
                let columns = (width / profile.column_spacing as f64).ceil() as usize;
                let rows = (height / profile.font_size as f64).ceil() as usize;
                let capacity = ((columns * rows) as f64 * scale).ceil() as usize;
                (capacity, columns)
            }
        };

        Self {
            width: width as f32,
            height: height as f32,
            dpr,
            backing_width: (width * dpr).round() as u32,
            backing_height: (height * dpr).round() as u32,
            capacity,
            columns,
        }
    }
}

#[inline]
fn sanitize_len(v: f64) -> f64 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}

/// Drawing operations in logical coordinates. Out-of-range coordinates
/// clip silently.
pub trait Surface {
    /// Resize the backing store and apply the logical-to-device scale.
    fn configure(&mut self, config: &SurfaceConfig);

    fn clear(&mut self);

    /// Overlay the background at low alpha, leaving trails.
    fn fade(&mut self, background: Rgb, alpha: f32);

    fn circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba, glow: f32);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba, width: f32);

    fn glyph(&mut self, glyph: char, x: f32, y: f32, size: f32, color: Rgba, glow: f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_capacity_from_area() {
        let profile = EffectProfile::constellation();
        let config = SurfaceConfig::new(1920.0, 1080.0, 1.0, &profile, PowerMode::Full);
        assert_eq!(config.capacity, 138);
        assert_eq!(config.columns, 0);
    }

    #[test]
    fn low_power_halves_particles() {
        let profile = EffectProfile::constellation();
        let config = SurfaceConfig::new(1920.0, 1080.0, 1.0, &profile, PowerMode::Low);
        assert_eq!(config.capacity, 69);
    }

    #[test]
    fn rain_columns_round_up() {
        let profile = EffectProfile::matrix();
        let config = SurfaceConfig::new(1910.0, 1080.0, 1.0, &profile, PowerMode::Full);
        assert_eq!(config.columns, 96);
        assert_eq!(config.capacity, 96 * 68);
    }

    #[test]
    fn backing_scales_with_dpr() {
        let profile = EffectProfile::constellation();
        let config = SurfaceConfig::new(800.0, 600.0, 2.0, &profile, PowerMode::Full);
        assert_eq!((config.backing_width, config.backing_height), (1600, 1200));
        assert_eq!((config.width, config.height), (800.0, 600.0));
    }

    #[test]
    fn identical_inputs_identical_config() {
        let profile = EffectProfile::constellation();
        let a = SurfaceConfig::new(1280.0, 720.0, 1.5, &profile, PowerMode::Full);
        let b = SurfaceConfig::new(1280.0, 720.0, 1.5, &profile, PowerMode::Full);
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_inputs_are_clamped() {
        let profile = EffectProfile::constellation();
        let config = SurfaceConfig::new(f64::NAN, -5.0, 0.0, &profile, PowerMode::Full);
        assert_eq!((config.width, config.height, config.dpr), (1.0, 1.0, 1.0));
        assert_eq!(config.capacity, 0);
    }

    #[test]
    fn css_color() {
        assert_eq!(Rgb(0, 122, 255).with_alpha(0.6).css(), "rgba(0, 122, 255, 0.600)");
        assert_eq!(Rgb(1, 2, 3).with_alpha(4.0).a, 1.0);
    }
}
