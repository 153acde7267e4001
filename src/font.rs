// src/font.rs
//! Font provider for the LCD glyph renderer.
//!
//! Two faces: the DSEG 7-segment display face for the digits, and a plain
//! monospace label face for the "PM" tag and the UV-debug labels. Either can
//! be missing — the display face falls back to the label face, and with no
//! face at all, measurement degrades to a fixed-advance estimate and
//! rasterization is skipped. The screen keeps updating either way; this
//! mirrors the browser substituting a system font while a web font loads.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use log::{info, warn};

/// Which face a run of text wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// 7-segment style display face (clock digits, weekday, date).
    Display,
    /// Monospace label face ("PM", UV grid labels).
    Label,
}

/// Per-character advance estimate, as a fraction of the font size, used when
/// no face could be loaded. Close enough for centering a monospace layout.
const FALLBACK_ADVANCE: f32 = 0.6;

/// File names probed for the display face inside the assets directory.
const DISPLAY_FACE_CANDIDATES: &[&str] = &[
    "fonts/DSEG7ClassicMini-Bold.ttf",
    "fonts/DSEG7ClassicMini-Bold.otf",
];

/// System locations probed for a monospace label face.
const LABEL_FACE_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

pub struct FontLibrary {
    display: Option<FontArc>,
    label: Option<FontArc>,
}

impl FontLibrary {
    /// Load both faces, tolerating absence of either.
    pub fn load(assets_dir: &Path) -> Self {
        let display = DISPLAY_FACE_CANDIDATES
            .iter()
            .map(|rel| assets_dir.join(rel))
            .find_map(load_face);
        match &display {
            Some(_) => info!("DSEG display font loaded"),
            None => warn!("DSEG display font unavailable; the LCD will use the label face instead"),
        }

        let label = LABEL_FACE_CANDIDATES
            .iter()
            .map(|p| PathBuf::from(*p))
            .find_map(load_face);
        if label.is_none() {
            warn!("no monospace label face found; text will be measured but not rasterized");
        }

        Self { display, label }
    }

    /// A library with no faces at all. Measurement still works via the
    /// fixed-advance estimate; rasterization is a no-op.
    pub fn empty() -> Self {
        Self {
            display: None,
            label: None,
        }
    }

    fn face(&self, kind: FontKind) -> Option<&FontArc> {
        match kind {
            FontKind::Display => self.display.as_ref().or(self.label.as_ref()),
            FontKind::Label => self.label.as_ref(),
        }
    }

    /// Advance width of `text` at `px`, including inter-glyph kerning.
    pub fn measure(&self, text: &str, px: f32, kind: FontKind) -> f32 {
        let Some(font) = self.face(kind) else {
            return text.chars().count() as f32 * px * FALLBACK_ADVANCE;
        };
        let scaled = font.as_scaled(PxScale::from(px));
        let mut width = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    /// Rasterize `text` with its left edge at `x` and baseline at `y`,
    /// invoking `plot(px, py, coverage)` per covered pixel. Returns false
    /// (doing nothing) when no face is available.
    pub fn draw(
        &self,
        text: &str,
        px: f32,
        kind: FontKind,
        x: f32,
        y: f32,
        mut plot: impl FnMut(i32, i32, f32),
    ) -> bool {
        let Some(font) = self.face(kind) else {
            return false;
        };
        let scaled = font.as_scaled(PxScale::from(px));
        let mut cursor = x;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                cursor += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(PxScale::from(px), point(cursor, y));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    plot(
                        bounds.min.x as i32 + gx as i32,
                        bounds.min.y as i32 + gy as i32,
                        coverage,
                    );
                });
            }
            cursor += scaled.h_advance(id);
            prev = Some(id);
        }
        true
    }

    /// `(ascent, descent)` of the face at `px`; descent is negative.
    pub fn v_metrics(&self, px: f32, kind: FontKind) -> Option<(f32, f32)> {
        let scaled = self.face(kind)?.as_scaled(PxScale::from(px));
        Some((scaled.ascent(), scaled.descent()))
    }

    #[inline]
    pub fn has_display_face(&self) -> bool {
        self.display.is_some()
    }
}

fn load_face(path: PathBuf) -> Option<FontArc> {
    let bytes = std::fs::read(&path).ok()?;
    match FontArc::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(err) => {
            warn!("failed to parse font {}: {err}", path.display());
            None
        }
    }
}
