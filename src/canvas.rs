// src/canvas.rs
//! CPU raster surface and 2D drawing context for the LCD texture.
//!
//! A small canvas-style API over an RGBA8 pixel buffer: filled rectangles,
//! stroked rectangles and baseline-positioned text runs. The glyph renderer
//! draws through the [`Surface2d`] trait so tests can substitute a recording
//! surface and assert on draw calls instead of pixels.

use std::path::Path;
use std::sync::Arc;

use crate::font::{FontKind, FontLibrary};
use crate::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// sRGB color with a separate coverage/alpha factor in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// `0xRRGGBB` (CSS hex without the alpha byte).
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub const fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }

    /// CSS-style `hsl(hue_deg, sat%, light%)`.
    pub fn hsl(hue_deg: f32, sat_pct: f32, light_pct: f32) -> Self {
        let h = hue_deg.rem_euclid(360.0) / 360.0;
        let s = (sat_pct / 100.0).clamp(0.0, 1.0);
        let l = (light_pct / 100.0).clamp(0.0, 1.0);

        let channel = |t: f32| -> u8 {
            let t = t.rem_euclid(1.0);
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v * 255.0).round() as u8
        };

        Self::rgb(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text styling
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    /// `y` is the alphabetic baseline.
    #[default]
    Alphabetic,
    /// `y` is the vertical midpoint of the em box.
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub px: f32,
    pub font: FontKind,
    pub align: TextAlign,
    pub baseline: Baseline,
}

impl TextStyle {
    pub fn display(px: f32) -> Self {
        Self {
            px,
            font: FontKind::Display,
            align: TextAlign::Left,
            baseline: Baseline::Alphabetic,
        }
    }

    pub fn label(px: f32) -> Self {
        Self {
            px,
            font: FontKind::Label,
            align: TextAlign::Left,
            baseline: Baseline::Alphabetic,
        }
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Drawing trait
// ─────────────────────────────────────────────────────────────────────────────

/// The drawing operations the glyph renderer needs. Implemented by
/// [`RasterSurface`] for real pixels and by the test recording surface.
pub trait Surface2d {
    fn size(&self) -> (u32, u32);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, line_width: f32, color: Color);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle, color: Color);
    fn measure_text(&self, text: &str, style: TextStyle) -> f32;
}

// ─────────────────────────────────────────────────────────────────────────────
// Pixel-backed surface
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-size RGBA8 pixel buffer with a drawing context. Never resized after
/// construction; the screen store owns exactly one for the process lifetime.
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    fonts: Arc<FontLibrary>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, fonts: Arc<FontLibrary>) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width * height * 4) as usize],
            fonts,
        }
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Export the current frame as PNG (debug screenshots).
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let img: image::RgbaImage =
            image::ImageBuffer::from_raw(self.width, self.height, self.pixels.clone())
                .expect("pixel buffer matches surface dimensions");
        img.save(path.as_ref())?;
        Ok(())
    }

    #[inline]
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let alpha = (color.a * coverage).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        let blend = |dst: u8, src: u8| -> u8 {
            (dst as f32 * (1.0 - alpha) + src as f32 * alpha).round() as u8
        };
        self.pixels[idx] = blend(self.pixels[idx], color.r);
        self.pixels[idx + 1] = blend(self.pixels[idx + 1], color.g);
        self.pixels[idx + 2] = blend(self.pixels[idx + 2], color.b);
        self.pixels[idx + 3] = self.pixels[idx + 3].max((alpha * 255.0) as u8);
    }

    fn aligned_x(&self, text: &str, x: f32, style: TextStyle) -> f32 {
        match style.align {
            TextAlign::Left => x,
            TextAlign::Center => x - self.measure_text(text, style) / 2.0,
            TextAlign::Right => x - self.measure_text(text, style),
        }
    }

    fn baseline_y(&self, y: f32, style: TextStyle) -> f32 {
        match style.baseline {
            Baseline::Alphabetic => y,
            // Canvas 'middle' centers the em box on y; approximate with the
            // face metrics when present, else a fixed fraction of the size.
            Baseline::Middle => match self.fonts.v_metrics(style.px, style.font) {
                Some((ascent, descent)) => y + (ascent + descent) / 2.0,
                None => y + style.px * 0.35,
            },
        }
    }
}

impl Surface2d for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let x0 = x.floor().max(0.0) as i32;
        let y0 = y.floor().max(0.0) as i32;
        let x1 = ((x + w).ceil() as i32).min(self.width as i32);
        let y1 = ((y + h).ceil() as i32).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color, 1.0);
            }
        }
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, line_width: f32, color: Color) {
        let half = line_width / 2.0;
        // Four bars centered on the rectangle edges.
        self.fill_rect(x - half, y - half, w + line_width, line_width, color);
        self.fill_rect(x - half, y + h - half, w + line_width, line_width, color);
        self.fill_rect(x - half, y + half, line_width, h - line_width, color);
        self.fill_rect(x + w - half, y + half, line_width, h - line_width, color);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle, color: Color) {
        let left = self.aligned_x(text, x, style);
        let baseline = self.baseline_y(y, style);
        let fonts = Arc::clone(&self.fonts);
        fonts.draw(text, style.px, style.font, left, baseline, |px, py, cov| {
            self.blend_pixel(px, py, color, cov);
        });
    }

    fn measure_text(&self, text: &str, style: TextStyle) -> f32 {
        self.fonts.measure(text, style.px, style.font)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test recording surface
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod recording {
    //! Draw-call recorder used by the glyph renderer and store tests.

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawOp {
        FillRect {
            x: f32,
            y: f32,
            w: f32,
            h: f32,
            color: Color,
        },
        StrokeRect {
            x: f32,
            y: f32,
            w: f32,
            h: f32,
            color: Color,
        },
        Text {
            text: String,
            x: f32,
            y: f32,
            style: TextStyle,
        },
    }

    pub struct RecordingSurface {
        width: u32,
        height: u32,
        pub ops: Vec<DrawOp>,
    }

    impl RecordingSurface {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                ops: Vec::new(),
            }
        }

        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn has_text(&self, needle: &str) -> bool {
            self.texts().iter().any(|t| *t == needle)
        }

        pub fn cell_fills(&self) -> Vec<&DrawOp> {
            self.ops
                .iter()
                .filter(|op| matches!(op, DrawOp::FillRect { .. }))
                .collect()
        }
    }

    impl Surface2d for RecordingSurface {
        fn size(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
            self.ops.push(DrawOp::FillRect { x, y, w, h, color });
        }

        fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, _lw: f32, color: Color) {
            self.ops.push(DrawOp::StrokeRect { x, y, w, h, color });
        }

        fn fill_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle, _color: Color) {
            self.ops.push(DrawOp::Text {
                text: text.to_string(),
                x,
                y,
                style,
            });
        }

        fn measure_text(&self, text: &str, style: TextStyle) -> f32 {
            // Deterministic monospace estimate so centering math is stable.
            text.chars().count() as f32 * style.px * 0.6
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_primaries() {
        assert_eq!(Color::hsl(0.0, 100.0, 50.0), Color::rgb(255, 0, 0));
        assert_eq!(Color::hsl(120.0, 100.0, 50.0), Color::rgb(0, 255, 0));
        assert_eq!(Color::hsl(240.0, 100.0, 50.0), Color::rgb(0, 0, 255));
    }

    #[test]
    fn hex_unpacks_channels() {
        let c = Color::from_hex(0xd7d4b4);
        assert_eq!((c.r, c.g, c.b), (0xd7, 0xd4, 0xb4));
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn fill_rect_writes_pixels() {
        let fonts = Arc::new(crate::font::FontLibrary::empty());
        let mut surface = RasterSurface::new(8, 8, fonts);
        surface.fill_rect(0.0, 0.0, 8.0, 8.0, Color::from_hex(0xd7d4b4));
        let px = surface.pixels();
        assert_eq!(&px[0..3], &[0xd7, 0xd4, 0xb4]);
        let last = (8 * 8 - 1) * 4;
        assert_eq!(&px[last..last + 3], &[0xd7, 0xd4, 0xb4]);
    }

    #[test]
    fn alpha_blend_darkens_partially() {
        let fonts = Arc::new(crate::font::FontLibrary::empty());
        let mut surface = RasterSurface::new(4, 4, fonts);
        surface.fill_rect(0.0, 0.0, 4.0, 4.0, Color::rgb(200, 200, 200));
        surface.fill_rect(0.0, 0.0, 4.0, 4.0, Color::rgb(0, 0, 0).with_alpha(0.5));
        let px = surface.pixels();
        assert_eq!(px[0], 100);
    }

    #[test]
    fn fill_rect_clips_to_surface() {
        let fonts = Arc::new(crate::font::FontLibrary::empty());
        let mut surface = RasterSurface::new(4, 4, fonts);
        // Out-of-bounds rect must not panic or wrap.
        surface.fill_rect(-10.0, -10.0, 100.0, 100.0, Color::rgb(10, 20, 30));
        assert_eq!(surface.pixels()[0], 10);
    }
}
