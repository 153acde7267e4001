// src/screen.rs
//! The LCD screen store: owns the raster surface, the synthesized texture
//! state and the repaint driver, and implements the material-binding
//! protocol.
//!
//! One store per logical screen, owned by the caller (no module-level
//! global). `bind` is idempotent: feeding it the material it previously
//! produced mutates that material in place and hands the same instance back.
//! The GPU half lives in `texture.rs`; this module never touches wgpu, which
//! keeps the whole protocol testable without a device.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::canvas::RasterSurface;
use crate::font::FontLibrary;
use crate::glyphs::{self, Moment};
use crate::material::{DisplayMaterial, ScreenSource};
use crate::mode::DisplayMode;
use crate::tick::{TickDriver, TickHandle};
use crate::transform::TextureTransform;
use crate::Result;

/// Fixed LCD resolution; the surface is never resized.
pub const SCREEN_SIZE: u32 = 512;

/// Renderer capabilities sampled once at first bind.
#[derive(Debug, Clone, Copy)]
pub struct RendererCaps {
    pub max_anisotropy: u16,
}

impl Default for RendererCaps {
    fn default() -> Self {
        // wgpu samplers clamp anisotropy at 16 on every backend.
        Self { max_anisotropy: 16 }
    }
}

/// CPU-side state of the GPU texture derived from the raster surface.
/// Constructed once at first bind and mutated ever after, never recreated.
#[derive(Debug, Clone)]
pub struct SynthesizedTexture {
    /// Vertical flip stays off; the model's screen UVs are authored top-down.
    pub flip_y: bool,
    /// Standard-dynamic-range sRGB, matching the renderer's output space.
    pub srgb: bool,
    /// Renderer capability maximum, captured at creation.
    pub anisotropy: u16,
    pub transform: TextureTransform,
    dirty: bool,
}

impl SynthesizedTexture {
    fn new(caps: RendererCaps) -> Self {
        Self {
            flip_y: false,
            srgb: true,
            anisotropy: caps.max_anisotropy,
            transform: TextureTransform::identity(),
            dirty: false,
        }
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Per-screen state store. See the module docs for the ownership story.
pub struct ScreenDisplay {
    mode: DisplayMode,
    caps: RendererCaps,
    fonts: Arc<FontLibrary>,
    surface: Option<RasterSurface>,
    texture: Option<SynthesizedTexture>,
    timer: Option<TickDriver>,
}

impl ScreenDisplay {
    pub fn new(mode: DisplayMode, caps: RendererCaps, fonts: Arc<FontLibrary>) -> Self {
        Self {
            mode,
            caps,
            fonts,
            surface: None,
            texture: None,
            timer: None,
        }
    }

    #[inline]
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn texture(&self) -> Option<&SynthesizedTexture> {
        self.texture.as_ref()
    }

    /// Liveness handle of the current repaint driver (tests, diagnostics).
    pub fn tick_handle(&self) -> Option<TickHandle> {
        self.timer.as_ref().map(TickDriver::handle)
    }

    /// Convert `source` into the screen material and (re)start the repaint
    /// driver. The caller assigns the returned material back onto the mesh.
    pub fn bind(&mut self, source: ScreenSource) -> DisplayMaterial {
        self.bind_at(source, Instant::now())
    }

    /// `bind` with an explicit clock, so rebind timing is testable.
    pub fn bind_at(&mut self, source: ScreenSource, now: Instant) -> DisplayMaterial {
        // Lazy allocation on first bind; the surface and texture then live
        // for the rest of the process and are only mutated.
        if self.surface.is_none() {
            self.surface = Some(RasterSurface::new(
                SCREEN_SIZE,
                SCREEN_SIZE,
                Arc::clone(&self.fonts),
            ));
        }
        if self.texture.is_none() {
            self.texture = Some(SynthesizedTexture::new(self.caps));
        }

        // Resolve the UV transform before touching the material: a raw
        // material donates its map transform, a map-less raw material resets
        // to identity, and a rebound display material keeps what it has (its
        // map *is* the synthesized texture).
        let resolved = match &source {
            ScreenSource::Raw(raw) => Some(
                raw.map
                    .as_ref()
                    .map(|m| m.transform.clone())
                    .unwrap_or_else(TextureTransform::identity),
            ),
            ScreenSource::Display(_) => None,
        };

        let material = match source {
            ScreenSource::Raw(raw) => {
                debug!("converting material {:?} into screen material", raw.name);
                DisplayMaterial::new(raw.name)
            }
            ScreenSource::Display(existing) => existing,
        };

        let texture = self.texture.as_mut().expect("texture allocated above");
        if let Some(mut transform) = resolved {
            transform.update_matrix();
            texture.transform = transform;
        }

        // The synthesized texture becomes the material's color map; the base
        // color must stay tint-neutral so the LCD pixels come through as-is.
        material.update(|state| {
            state.screen_map = true;
            state.base_color = [1.0, 1.0, 1.0, 1.0];
            state.opacity = 1.0;
        });

        // First frame is available synchronously.
        self.repaint();

        // At most one live driver per store: replacing always cancels the
        // previous one before the new one is installed.
        if let Some(old) = self.timer.take() {
            old.cancel();
        }
        self.timer = Some(TickDriver::start(self.mode.repaint_interval(), now));

        material
    }

    /// Poll the repaint driver; repaints once per elapsed interval. Returns
    /// the number of repaints performed. Call once per rendered frame.
    pub fn pump(&mut self, now: Instant) -> u32 {
        let fires = match self.timer.as_mut() {
            Some(timer) => timer.poll(now),
            None => 0,
        };
        for _ in 0..fires {
            self.repaint();
        }
        fires
    }

    /// Dirty-flag handoff to the uploader: returns the pixel buffer exactly
    /// once per repaint, clearing the flag.
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        let texture = self.texture.as_mut()?;
        if !texture.dirty {
            return None;
        }
        texture.dirty = false;
        self.surface.as_ref().map(|s| s.pixels())
    }

    /// Export the current LCD frame as a PNG (debug screenshot).
    pub fn save_frame(&self, path: impl AsRef<Path>) -> Result<()> {
        match &self.surface {
            Some(surface) => surface.save_png(path),
            None => Err(crate::Error::custom("screen has not been bound yet")),
        }
    }

    /// Repaint the LCD. With no drawing surface this is a silent no-op: the
    /// texture simply stops updating, which is degraded but not an error.
    fn repaint(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        glyphs::paint(surface, self.mode, Moment::now());
        if let Some(texture) = self.texture.as_mut() {
            texture.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MapSettings, RawMaterial};
    use glam::Vec2;
    use std::time::Duration;

    fn store(mode: DisplayMode) -> ScreenDisplay {
        ScreenDisplay::new(mode, RendererCaps::default(), Arc::new(FontLibrary::empty()))
    }

    fn offset_map(offset: Vec2) -> MapSettings {
        MapSettings {
            transform: TextureTransform {
                offset,
                rotation: 0.5,
                ..TextureTransform::identity()
            },
        }
    }

    #[test]
    fn first_bind_allocates_and_paints_synchronously() {
        let mut screen = store(DisplayMode::Time);
        assert!(screen.texture().is_none());

        screen.bind(ScreenSource::Raw(RawMaterial::new("watch_screen")));

        let texture = screen.texture().expect("allocated on first bind");
        assert!(!texture.flip_y);
        assert!(texture.srgb);
        assert_eq!(texture.anisotropy, 16);
        // The synchronous first paint left the texture dirty.
        assert!(screen.take_dirty().is_some());
        assert!(screen.take_dirty().is_none());
    }

    #[test]
    fn raw_map_transform_is_captured() {
        let mut screen = store(DisplayMode::Time);
        let raw = RawMaterial::new("screen").with_map(offset_map(Vec2::new(0.25, 0.75)));

        screen.bind(ScreenSource::Raw(raw));

        let t = &screen.texture().unwrap().transform;
        assert_eq!(t.offset, Vec2::new(0.25, 0.75));
        assert_eq!(t.rotation, 0.5);
    }

    #[test]
    fn rebind_without_map_resets_to_identity() {
        let mut screen = store(DisplayMode::Time);
        screen.bind(ScreenSource::Raw(
            RawMaterial::new("screen").with_map(offset_map(Vec2::new(0.25, 0.75))),
        ));

        // New incoming material without its own texture: identity, not the
        // previously captured transform.
        screen.bind(ScreenSource::Raw(RawMaterial::new("screen")));

        let t = &screen.texture().unwrap().transform;
        assert!(t.is_identity());
        assert_eq!(t.repeat, Vec2::ONE);
    }

    #[test]
    fn rebinding_display_material_preserves_transform() {
        let mut screen = store(DisplayMode::Time);
        let material = screen.bind(ScreenSource::Raw(
            RawMaterial::new("screen").with_map(offset_map(Vec2::new(0.1, 0.2))),
        ));

        screen.bind(ScreenSource::Display(material));

        let t = &screen.texture().unwrap().transform;
        assert_eq!(t.offset, Vec2::new(0.1, 0.2));
    }

    #[test]
    fn rebind_returns_the_same_material_instance() {
        let mut screen = store(DisplayMode::Time);
        let first = screen.bind(ScreenSource::Raw(RawMaterial::new("screen")));
        let second = screen.bind(ScreenSource::Display(first.clone()));
        assert!(DisplayMaterial::same_instance(&first, &second));
    }

    #[test]
    fn bind_forces_white_opaque_material() {
        let mut screen = store(DisplayMode::Time);
        let material = screen.bind(ScreenSource::Raw(RawMaterial::new("screen")));
        material.update(|s| {
            s.base_color = [0.2, 0.2, 0.2, 0.5];
            s.opacity = 0.5;
        });

        screen.bind(ScreenSource::Display(material.clone()));

        let state = material.state();
        assert_eq!(state.base_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(state.opacity, 1.0);
        assert!(state.screen_map);
        assert!(state.double_sided);
        assert!(!state.tone_mapped);
        assert!(state.depth_write);
    }

    #[test]
    fn rebind_cancels_the_previous_driver() {
        let start = Instant::now();
        let mut screen = store(DisplayMode::Time);

        let material = screen.bind_at(ScreenSource::Raw(RawMaterial::new("screen")), start);
        let first_handle = screen.tick_handle().unwrap();
        assert!(!first_handle.is_cancelled());

        screen.bind_at(ScreenSource::Display(material), start);
        assert!(first_handle.is_cancelled());

        let second_handle = screen.tick_handle().unwrap();
        assert!(!second_handle.is_cancelled());

        // Exactly one live driver: one interval elapsed fires exactly once.
        assert_eq!(screen.pump(start + Duration::from_millis(1000)), 1);
        assert_eq!(screen.pump(start + Duration::from_millis(1000)), 0);
    }

    #[test]
    fn time_mode_repaints_every_second() {
        let start = Instant::now();
        let mut screen = store(DisplayMode::Time);
        screen.bind_at(ScreenSource::Raw(RawMaterial::new("screen")), start);

        let mut repaints = 0;
        for step in 1..=55 {
            repaints += screen.pump(start + Duration::from_millis(step * 100));
        }
        // 5.5 simulated seconds at a 1000 ms cadence.
        assert_eq!(repaints, 5);
    }

    #[test]
    fn uv_mode_repaints_every_two_seconds() {
        let start = Instant::now();
        let mut screen = store(DisplayMode::Uv);
        screen.bind_at(ScreenSource::Raw(RawMaterial::new("screen")), start);

        let mut repaints = 0;
        for step in 1..=55 {
            repaints += screen.pump(start + Duration::from_millis(step * 100));
        }
        assert_eq!(repaints, 2);
    }

    #[test]
    fn pump_before_bind_is_a_noop() {
        let mut screen = store(DisplayMode::Time);
        assert_eq!(screen.pump(Instant::now() + Duration::from_secs(10)), 0);
        assert!(screen.take_dirty().is_none());
    }

    #[test]
    fn repaint_marks_dirty_again_after_handoff() {
        let start = Instant::now();
        let mut screen = store(DisplayMode::Time);
        screen.bind_at(ScreenSource::Raw(RawMaterial::new("screen")), start);
        assert!(screen.take_dirty().is_some());

        screen.pump(start + Duration::from_millis(1000));
        assert!(screen.take_dirty().is_some());
        assert!(screen.take_dirty().is_none());
    }
}
