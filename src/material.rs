// src/material.rs
//! Material model for the LCD screen binding protocol.
//!
//! The original viewer tagged converted materials with a runtime marker flag
//! and probed for it on every bind. Here binding is total over a sum type:
//! a `ScreenSource` is either a `RawMaterial` fresh from the asset loader or
//! a `DisplayMaterial` that has already been converted. No property probing.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::transform::TextureTransform;

/// Settings captured from a material's existing color map at bind time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapSettings {
    pub transform: TextureTransform,
}

/// A material as decoded from the model file, before screen conversion.
/// `map` carries the base-color texture settings when the material has one.
#[derive(Debug, Clone, Default)]
pub struct RawMaterial {
    pub name: String,
    pub map: Option<MapSettings>,
}

impl RawMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map: None,
        }
    }

    pub fn with_map(mut self, settings: MapSettings) -> Self {
        self.map = Some(settings);
        self
    }
}

/// Mutable state behind a [`DisplayMaterial`] handle.
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub name: String,
    /// Linear RGBA base color; forced to tint-neutral white on every bind.
    pub base_color: [f32; 4],
    pub opacity: f32,
    pub double_sided: bool,
    pub tone_mapped: bool,
    pub depth_write: bool,
    /// True once the synthesized screen texture is assigned as the color map.
    pub screen_map: bool,
}

/// Shared, reference-stable handle to a screen material. Cloning the handle
/// clones the reference, not the material: rebinding must hand back the same
/// instance, and meshes referencing it observe in-place mutation.
#[derive(Debug, Clone)]
pub struct DisplayMaterial {
    inner: Arc<RwLock<DisplayState>>,
}

impl DisplayMaterial {
    /// Construct the screen material: opaque-capable, double-sided,
    /// non-tone-mapped, depth-writing, carrying the donor's display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(DisplayState {
                name: name.into(),
                base_color: [1.0, 1.0, 1.0, 1.0],
                opacity: 1.0,
                double_sided: true,
                tone_mapped: false,
                depth_write: true,
                screen_map: false,
            })),
        }
    }

    /// In-place mutation of the shared state.
    pub fn update<R>(&self, f: impl FnOnce(&mut DisplayState) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Snapshot of the current state (cheap, for rendering and tests).
    pub fn state(&self) -> DisplayState {
        self.inner.read().clone()
    }

    pub fn name(&self) -> String {
        self.inner.read().name.clone()
    }

    /// Two handles are the same material iff they share the same allocation.
    #[inline]
    pub fn same_instance(a: &DisplayMaterial, b: &DisplayMaterial) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

/// Input to [`crate::screen::ScreenDisplay::bind`].
#[derive(Debug, Clone)]
pub enum ScreenSource {
    /// A material straight from the loader; it will be replaced by a new
    /// `DisplayMaterial` and its map transform (if any) preserved.
    Raw(RawMaterial),
    /// An already-converted screen material; it is mutated in place and
    /// handed back, never reallocated.
    Display(DisplayMaterial),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_display_material_defaults() {
        let mat = DisplayMaterial::new("watch_screen");
        let state = mat.state();
        assert_eq!(state.name, "watch_screen");
        assert_eq!(state.base_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(state.opacity, 1.0);
        assert!(state.double_sided);
        assert!(!state.tone_mapped);
        assert!(state.depth_write);
        assert!(!state.screen_map);
    }

    #[test]
    fn clone_is_same_instance() {
        let mat = DisplayMaterial::new("screen");
        let alias = mat.clone();
        assert!(DisplayMaterial::same_instance(&mat, &alias));

        alias.update(|s| s.base_color = [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(mat.state().base_color, [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn distinct_materials_are_not_same_instance() {
        let a = DisplayMaterial::new("screen");
        let b = DisplayMaterial::new("screen");
        assert!(!DisplayMaterial::same_instance(&a, &b));
    }
}
