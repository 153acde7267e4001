// src/theme.rs
//! Light/dark theme for the viewer shell.
//!
//! The theme drives the backdrop color and exposure of the preview pass and
//! persists across runs in a small JSON file (the native analog of the
//! original localStorage key). Persistence failures are cosmetic: a warning,
//! never an error.

use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

pub const THEME_FILE: &str = "a158w-theme.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Backdrop clear color (the photo-sphere tint of the original rig).
    pub fn clear_color(self) -> wgpu::Color {
        match self {
            Theme::Light => wgpu::Color {
                r: 0.93,
                g: 0.94,
                b: 0.96,
                a: 1.0,
            },
            Theme::Dark => wgpu::Color {
                r: 0.047,
                g: 0.066,
                b: 0.106,
                a: 1.0,
            },
        }
    }

    /// Tone-mapping exposure for the lit scene.
    #[inline]
    pub fn exposure(self) -> f32 {
        match self {
            Theme::Light => 1.45,
            Theme::Dark => 1.2,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredTheme {
    theme: Theme,
}

/// Owns the current theme and its persistence file.
pub struct ThemeController {
    theme: Theme,
    path: PathBuf,
}

impl ThemeController {
    /// Restore the persisted theme, falling back to dark on anything
    /// missing or malformed.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let theme = read_stored(&path).unwrap_or_default();
        Self { theme, path }
    }

    #[inline]
    pub fn current(&self) -> Theme {
        self.theme
    }

    /// Flip the theme and persist the choice.
    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.toggled());
        self.theme
    }

    pub fn set(&mut self, theme: Theme) {
        self.theme = theme;
        let stored = StoredTheme { theme };
        let write = serde_json::to_string(&stored)
            .map_err(crate::Error::from)
            .and_then(|json| std::fs::write(&self.path, json).map_err(crate::Error::from));
        if let Err(err) = write {
            warn!("unable to persist theme preference: {err}");
        }
    }
}

fn read_stored(path: &Path) -> Option<Theme> {
    let bytes = std::fs::read(path).ok()?;
    match serde_json::from_slice::<StoredTheme>(&bytes) {
        Ok(stored) => Some(stored.theme),
        Err(err) => {
            warn!("ignoring malformed theme file {}: {err}", path.display());
            None
        }
    }
}
