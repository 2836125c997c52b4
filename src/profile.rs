// profile.rs - Effect configuration
//
// One engine, many looks. Everything that used to differ between the
// background variants (entity kind, force sign, boundary, palette) is a
// field here. Profiles load from JSON on top of a named preset.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, Result};
use crate::surface::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Particles,
    Rain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceSign {
    Attract,
    Repel,
}

impl ForceSign {
    #[inline]
    pub fn factor(self) -> f32 {
        match self {
            ForceSign::Attract => 1.0,
            ForceSign::Repel => -1.0,
        }
    }
}

/// What happens when an entity leaves the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Reappear on the opposite edge.
    Wrap,
    /// Expire and restart from fresh initial conditions.
    Respawn,
}

/// How the previous frame is removed before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClearMode {
    Clear,
    /// Low-alpha background overlay; leaves motion trails.
    Fade { alpha: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowPower {
    pub count_scale: f32,
    pub target_fps: f32,
}

impl Default for LowPower {
    fn default() -> Self {
        Self { count_scale: 0.5, target_fps: 30.0 }
    }
}

/// Selected once at start-up by the host's capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerMode {
    #[default]
    Full,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectProfile {
    pub kind: EntityKind,

    // Capacity
    pub density: f64,
    pub column_spacing: f32,
    pub font_size: f32,

    // Force field
    pub interaction_radius: f32,
    pub force_sign: ForceSign,
    pub force_strength: f32,
    pub pointer_coupling: f32,
    pub scroll_coupling: f32,
    pub friction: f32,
    pub boundary: BoundaryPolicy,

    // Lifecycle
    pub life_range: [f32; 2],
    pub life_decay: f32,
    pub speed: f32,
    pub size_range: [f32; 2],
    pub opacity_range: [f32; 2],
    pub opacity_floor: f32,
    pub opacity_decay: f32,
    pub proximity_boost: f32,

    // Rain
    pub glyphs: String,
    pub drop_spacing: [f32; 2],
    pub fall_speed: [f32; 2],
    pub glyph_mutation: f32,

    // Look
    pub palette: Vec<Rgb>,
    /// Multiplies every palette color's alpha.
    pub tint_alpha: f32,
    pub head_color: Rgb,
    pub background: Rgb,
    pub clear: ClearMode,
    pub glow: f32,
    pub link_distance: f32,
    pub parallax: f32,

    // Timing
    pub smoothing: f32,
    pub target_fps: f32,
    pub low_power: LowPower,
}

impl Default for EffectProfile {
    fn default() -> Self {
        Self::constellation()
    }
}

impl EffectProfile {
    /// Mouse-reactive particle field with constellation links.
    pub fn constellation() -> Self {
        Self {
            kind: EntityKind::Particles,
            density: 15_000.0,
            column_spacing: 20.0,
            font_size: 16.0,
            interaction_radius: 150.0,
            force_sign: ForceSign::Attract,
            force_strength: 0.02,
            pointer_coupling: 0.001,
            scroll_coupling: 0.0,
            friction: 0.98,
            boundary: BoundaryPolicy::Wrap,
            life_range: [200.0, 500.0],
            life_decay: 0.5,
            speed: 0.5,
            size_range: [1.0, 3.0],
            opacity_range: [0.2, 0.8],
            opacity_floor: 0.2,
            opacity_decay: 0.005,
            proximity_boost: 0.1,
            glyphs: String::new(),
            drop_spacing: [1.0, 1.0],
            fall_speed: [0.0, 0.0],
            glyph_mutation: 0.0,
            palette: vec![
                Rgb(0, 122, 255),
                Rgb(52, 199, 89),
                Rgb(255, 149, 0),
                Rgb(255, 59, 48),
                Rgb(175, 82, 222),
                Rgb(255, 45, 146),
                Rgb(255, 204, 0),
            ],
            tint_alpha: 0.6,
            head_color: Rgb(255, 255, 255),
            background: Rgb(0, 0, 0),
            clear: ClearMode::Clear,
            glow: 10.0,
            link_distance: 100.0,
            parallax: 0.3,
            smoothing: 0.1,
            target_fps: 60.0,
            low_power: LowPower::default(),
        }
    }

    /// Falling character columns over a fading backdrop.
    pub fn matrix() -> Self {
        Self {
            kind: EntityKind::Rain,
            interaction_radius: 120.0,
            force_sign: ForceSign::Repel,
            force_strength: 0.6,
            pointer_coupling: 0.0,
            friction: 0.9,
            boundary: BoundaryPolicy::Respawn,
            life_range: [60.0, 140.0],
            life_decay: 1.0,
            speed: 0.0,
            size_range: [16.0, 16.0],
            opacity_range: [1.0, 1.0],
            opacity_floor: 1.0,
            opacity_decay: 0.0,
            proximity_boost: 0.0,
            glyphs: "ｱｲｳｴｵｶｷｸｹｺｻｼｽｾｿﾀﾁﾂﾃﾄﾅﾆﾇﾈﾉﾊﾋﾌﾍﾎﾏﾐﾑﾒﾓﾔﾕﾖﾗﾘﾙﾚﾛﾜﾝ0123456789".into(),
            drop_spacing: [1.0, 1.6],
            fall_speed: [2.0, 6.0],
            glyph_mutation: 0.02,
            palette: vec![Rgb(0, 255, 65), Rgb(0, 200, 50), Rgb(0, 143, 17)],
            tint_alpha: 1.0,
            head_color: Rgb(200, 255, 200),
            background: Rgb(0, 0, 0),
            clear: ClearMode::Fade { alpha: 0.05 },
            glow: 8.0,
            link_distance: 0.0,
            parallax: 0.0,
            ..Self::constellation()
        }
    }

    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "constellation" => Ok(Self::constellation()),
            "matrix" => Ok(Self::matrix()),
            other => Err(EngineError::InvalidProfile(format!("unknown preset `{other}`"))),
        }
    }

    /// Parse a JSON object. An optional `"preset"` key picks the base
    /// profile; every other key overrides that base.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut overrides: Value = serde_json::from_str(json)?;
        let Value::Object(fields) = &mut overrides else {
            return Err(EngineError::InvalidProfile("profile must be a json object".into()));
        };

        let base = match fields.remove("preset") {
            None => Self::constellation(),
            Some(Value::String(name)) => Self::preset(&name)?,
            Some(_) => return Err(EngineError::InvalidProfile("`preset` must be a string".into())),
        };

        let mut merged = serde_json::to_value(base)?;
        if let Value::Object(target) = &mut merged {
            target.extend(std::mem::take(fields));
        }

        let profile: Self = serde_json::from_value(merged)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(EngineError::InvalidProfile(msg.into()));

        // Out-of-range JSON numbers arrive as inf; rand panics on those
        let scalars = [
            ("column_spacing", self.column_spacing),
            ("font_size", self.font_size),
            ("interaction_radius", self.interaction_radius),
            ("force_strength", self.force_strength),
            ("pointer_coupling", self.pointer_coupling),
            ("scroll_coupling", self.scroll_coupling),
            ("friction", self.friction),
            ("life_decay", self.life_decay),
            ("speed", self.speed),
            ("opacity_floor", self.opacity_floor),
            ("opacity_decay", self.opacity_decay),
            ("proximity_boost", self.proximity_boost),
            ("glyph_mutation", self.glyph_mutation),
            ("tint_alpha", self.tint_alpha),
            ("glow", self.glow),
            ("link_distance", self.link_distance),
            ("parallax", self.parallax),
            ("smoothing", self.smoothing),
            ("target_fps", self.target_fps),
            ("low_power.count_scale", self.low_power.count_scale),
            ("low_power.target_fps", self.low_power.target_fps),
        ];
        let ranges = [
            ("life_range", self.life_range),
            ("size_range", self.size_range),
            ("opacity_range", self.opacity_range),
            ("drop_spacing", self.drop_spacing),
            ("fall_speed", self.fall_speed),
        ];
        if !self.density.is_finite() {
            return fail("density must be finite");
        }
        for (name, v) in scalars.into_iter().chain(ranges.iter().flat_map(|&(n, [lo, hi])| [(n, lo), (n, hi)])) {
            if !v.is_finite() {
                return fail(&format!("{name} must be finite"));
            }
        }

        if !(self.density > 0.0) {
            return fail("density must be positive");
        }
        if !(self.column_spacing > 0.0) || !(self.font_size > 0.0) {
            return fail("column_spacing and font_size must be positive");
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return fail("friction must be in (0, 1]");
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return fail("smoothing must be in (0, 1]");
        }
        if !(self.interaction_radius >= 0.0) {
            return fail("interaction_radius must not be negative");
        }
        if !(self.target_fps > 0.0) || !(self.low_power.target_fps > 0.0) {
            return fail("target_fps must be positive");
        }
        if !(self.low_power.count_scale > 0.0 && self.low_power.count_scale <= 1.0) {
            return fail("low_power.count_scale must be in (0, 1]");
        }
        for (name, [lo, hi]) in ranges {
            if !(lo <= hi) {
                return fail(&format!("{name} must be ordered low to high"));
            }
        }
        if !(self.life_range[0] > 0.0) {
            return fail("life_range must be positive");
        }
        if self.life_decay < 0.0 || self.opacity_decay < 0.0 {
            return fail("life_decay and opacity_decay must not be negative");
        }
        if !(0.0..=1.0).contains(&self.tint_alpha) {
            return fail("tint_alpha must lie within [0, 1]");
        }
        if !(self.opacity_range[0] >= 0.0 && self.opacity_range[1] <= 1.0) {
            return fail("opacity_range must lie within [0, 1]");
        }
        if let ClearMode::Fade { alpha } = self.clear {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return fail("fade alpha must be in (0, 1]");
            }
        }
        if self.palette.is_empty() {
            return fail("palette must not be empty");
        }
        if self.kind == EntityKind::Rain {
            if self.glyphs.is_empty() {
                return fail("rain needs at least one glyph");
            }
            if !(self.drop_spacing[0] > 0.0) {
                return fail("drop_spacing must be positive");
            }
        }
        Ok(())
    }

    #[inline]
    pub fn count_scale(&self, power: PowerMode) -> f64 {
        match power {
            PowerMode::Full => 1.0,
            PowerMode::Low => self.low_power.count_scale as f64,
        }
    }

    #[inline]
    pub fn frame_rate(&self, power: PowerMode) -> f32 {
        match power {
            PowerMode::Full => self.target_fps,
            PowerMode::Low => self.low_power.target_fps.min(self.target_fps),
        }
    }
}
