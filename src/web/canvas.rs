// canvas.rs - Canvas 2D surface
//
// The backing store is sized in device pixels, the context is scaled by
// the device pixel ratio, and everything above draws in CSS pixels.

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::error::{EngineError, Result};
use crate::surface::{Rgb, Rgba, Surface, SurfaceConfig};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    font_px: f32,
}

impl CanvasSurface {
    /// Attach to an existing `<canvas id=...>`. Fatal if it is missing.
    pub fn bind(document: &Document, id: &str) -> Result<Self> {
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| EngineError::MissingSurface(id.into()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| EngineError::NotACanvas(id.into()))?;

        let ctx = canvas
            .get_context("2d")
            .map_err(|_| EngineError::ContextUnavailable)?
            .ok_or(EngineError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::ContextUnavailable)?;

        Ok(Self {
            width: canvas.width() as f64,
            height: canvas.height() as f64,
            canvas,
            ctx,
            font_px: 0.0,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn set_font(&mut self, size: f32) {
        if size != self.font_px {
            self.ctx.set_font(&format!("{size}px monospace"));
            self.font_px = size;
        }
    }
}

impl Surface for CanvasSurface {
    fn configure(&mut self, config: &SurfaceConfig) {
        // Resizing the backing store resets all context state
        self.canvas.set_width(config.backing_width);
        self.canvas.set_height(config.backing_height);

        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", config.width));
        let _ = style.set_property("height", &format!("{}px", config.height));

        let _ = self.ctx.set_transform(config.dpr, 0.0, 0.0, config.dpr, 0.0, 0.0);
        self.ctx.set_text_baseline("top");
        self.font_px = 0.0;
        self.width = config.width as f64;
        self.height = config.height as f64;
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn fade(&mut self, background: Rgb, alpha: f32) {
        self.ctx.set_shadow_blur(0.0);
        self.ctx.set_fill_style_str(&background.with_alpha(alpha).css());
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
    }

    fn circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba, glow: f32) {
        let css = color.css();
        self.ctx.set_fill_style_str(&css);
        self.ctx.set_shadow_blur(glow as f64);
        self.ctx.set_shadow_color(&css);
        self.ctx.begin_path();
        let _ = self.ctx.arc(x as f64, y as f64, radius.max(0.0) as f64, 0.0, TAU);
        self.ctx.fill();
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba, width: f32) {
        self.ctx.set_shadow_blur(0.0);
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.0 as f64, from.1 as f64);
        self.ctx.line_to(to.0 as f64, to.1 as f64);
        self.ctx.stroke();
    }

    fn glyph(&mut self, glyph: char, x: f32, y: f32, size: f32, color: Rgba, glow: f32) {
        self.set_font(size);
        let css = color.css();
        self.ctx.set_fill_style_str(&css);
        self.ctx.set_shadow_blur(glow as f64);
        self.ctx.set_shadow_color(&css);
        let mut buf = [0u8; 4];
        let _ = self.ctx.fill_text(glyph.encode_utf8(&mut buf), x as f64, y as f64);
    }
}
