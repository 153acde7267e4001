// src/mode.rs
//! Screen display mode, resolved once at startup.

use std::time::Duration;

/// What the LCD shows: a live clock or a UV-debug grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    #[default]
    Time,
    Uv,
}

impl DisplayMode {
    /// Resolve a mode from an external string parameter (CLI flag or env var,
    /// the native analog of the original `?screen=` query parameter).
    /// Case-insensitive; absent or unrecognized values fall back to `Time`.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(p) if p.trim().eq_ignore_ascii_case("uv") => DisplayMode::Uv,
            _ => DisplayMode::Time,
        }
    }

    /// Repaint cadence for this mode. The clock advances once a second; the
    /// UV grid is static and only repaints to stay alive under rebinds.
    #[inline]
    pub fn repaint_interval(self) -> Duration {
        match self {
            DisplayMode::Time => Duration::from_millis(1000),
            DisplayMode::Uv => Duration::from_millis(2000),
        }
    }
}
