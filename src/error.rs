// src/error.rs
//! Error handling for the viewer.
//!
//! Fallible paths are the edges: asset decoding, font loading, PNG export and
//! GPU surface setup. The screen-texture core never errors — repaint failures
//! degrade to no-ops in the store, not through this type.

use thiserror::Error;

/// Main error type — lightweight, `Send + Sync + 'static`, works with `?`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O errors (asset files, theme persistence).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model decoding failures.
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    /// PNG encode/decode failures.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Font data that `ab_glyph` refuses to parse.
    #[error("font error: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    /// Theme file (de)serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Simple custom message (allocation only on the error path).
    #[error("{0}")]
    Custom(String),

    /// Context chaining for the loader paths.
    #[error("{message}: {source}")]
    WithContext {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    #[inline]
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Self::Custom(msg.into())
    }

    /// Add context to any error (chainable).
    #[inline]
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext {
            message: context.into(),
            source: Box::new(self),
        }
    }

    #[inline]
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    #[inline]
    pub fn is_custom(&self) -> bool {
        matches!(self, Error::Custom(_))
    }
}

/// Convenient `Result` alias — use `crate::Result<T>` everywhere.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_chains_messages() {
        let err = Error::custom("decode failed").context("loading watch model");
        let text = err.to_string();
        assert!(text.contains("loading watch model"));
        assert!(text.contains("decode failed"));
    }

    #[test]
    fn kind_checks() {
        assert!(Error::custom("x").is_custom());
        let io: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(io.is_io());
    }
}
