// src/transform.rs
//! UV-space texture transform carried by a material's color map.
//!
//! Mirrors the full set of parameters a glTF base-color map can carry
//! (KHR_texture_transform plus the sampling channel). The bind protocol in
//! `screen.rs` captures these from the incoming material and reapplies them to
//! the synthesized LCD texture so the screen stays aligned with the watch
//! model's UV layout across rebinds.

use glam::{Mat3, Vec2};

/// Offset/repeat/center/rotation of a sampled texture, plus the UV channel
/// and the composed 3×3 affine matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureTransform {
    /// UV set index (TEXCOORD_n).
    pub channel: u32,
    pub offset: Vec2,
    pub repeat: Vec2,
    pub center: Vec2,
    /// Radians, counter-clockwise around `center`.
    pub rotation: f32,
    /// When true, `matrix` is recomposed from the scalar fields before use.
    pub matrix_auto_update: bool,
    pub matrix: Mat3,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl TextureTransform {
    /// Identity defaults: offset (0,0), repeat (1,1), center (0,0),
    /// rotation 0, channel 0, identity matrix.
    pub fn identity() -> Self {
        Self {
            channel: 0,
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
            center: Vec2::ZERO,
            rotation: 0.0,
            matrix_auto_update: true,
            matrix: Mat3::IDENTITY,
        }
    }

    /// Compose the UV matrix from the scalar fields:
    /// translate(offset) * translate(center) * rotate(rotation)
    /// * scale(repeat) * translate(-center).
    pub fn compose_matrix(&self) -> Mat3 {
        Mat3::from_translation(self.offset + self.center)
            * Mat3::from_angle(self.rotation)
            * Mat3::from_scale(self.repeat)
            * Mat3::from_translation(-self.center)
    }

    /// Recompose `matrix` from the scalar fields when auto-update is on.
    pub fn update_matrix(&mut self) {
        if self.matrix_auto_update {
            self.matrix = self.compose_matrix();
        }
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.channel == 0
            && self.offset == Vec2::ZERO
            && self.repeat == Vec2::ONE
            && self.center == Vec2::ZERO
            && self.rotation == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_defaults() {
        let t = TextureTransform::identity();
        assert_eq!(t.offset, Vec2::ZERO);
        assert_eq!(t.repeat, Vec2::ONE);
        assert_eq!(t.center, Vec2::ZERO);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.channel, 0);
        assert_eq!(t.matrix, Mat3::IDENTITY);
        assert!(t.is_identity());
    }

    #[test]
    fn compose_identity_is_identity() {
        let t = TextureTransform::identity();
        assert_eq!(t.compose_matrix(), Mat3::IDENTITY);
    }

    #[test]
    fn compose_offset_translates_uv() {
        let t = TextureTransform {
            offset: Vec2::new(0.25, -0.5),
            ..TextureTransform::identity()
        };
        let m = t.compose_matrix();
        let uv = m.transform_point2(Vec2::new(0.0, 0.0));
        assert!((uv - Vec2::new(0.25, -0.5)).length() < 1e-6);
    }

    #[test]
    fn update_matrix_respects_auto_update_flag() {
        let mut t = TextureTransform {
            repeat: Vec2::new(2.0, 2.0),
            matrix_auto_update: false,
            ..TextureTransform::identity()
        };
        t.update_matrix();
        assert_eq!(t.matrix, Mat3::IDENTITY);

        t.matrix_auto_update = true;
        t.update_matrix();
        assert_ne!(t.matrix, Mat3::IDENTITY);
    }
}
