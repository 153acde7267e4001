// src/assets.rs
//! Watch model loading.
//!
//! The viewer only needs one thing from the asset: the set of materials that
//! belong to the LCD screen, together with any UV transform their base-color
//! map carries (KHR_texture_transform), so the screen store can preserve the
//! model's alignment when it swaps in the synthesized texture. A material is
//! a screen material when its name contains "screen", case-insensitively —
//! the naming convention of the source model.

use std::path::Path;

use glam::Vec2;
use log::info;

use crate::material::{MapSettings, RawMaterial};
use crate::transform::TextureTransform;
use crate::Result;

const SCREEN_NAME_FRAGMENT: &str = "screen";

/// The decoded model, reduced to what the screen subsystem consumes.
pub struct WatchModel {
    pub screen_materials: Vec<RawMaterial>,
    pub material_count: usize,
    pub mesh_count: usize,
}

/// Does this material name mark the LCD screen?
pub fn is_screen_material(name: Option<&str>) -> bool {
    name.is_some_and(|n| n.to_lowercase().contains(SCREEN_NAME_FRAGMENT))
}

/// Load a `.glb`/`.gltf` watch model and collect its screen materials.
pub fn load_watch_model(path: impl AsRef<Path>) -> Result<WatchModel> {
    let path = path.as_ref();
    let (document, _buffers, _images) = gltf::import(path)?;

    let mut screen_materials = Vec::new();
    for material in document.materials() {
        if !is_screen_material(material.name()) {
            continue;
        }
        let name = material.name().unwrap_or_default().to_string();
        let map = material
            .pbr_metallic_roughness()
            .base_color_texture()
            .map(|info| {
                let mut transform = TextureTransform {
                    channel: info.tex_coord(),
                    ..TextureTransform::identity()
                };
                if let Some(ext) = info.texture_transform() {
                    transform.offset = Vec2::from(ext.offset());
                    transform.repeat = Vec2::from(ext.scale());
                    transform.rotation = ext.rotation();
                    if let Some(channel) = ext.tex_coord() {
                        transform.channel = channel;
                    }
                }
                transform.update_matrix();
                MapSettings { transform }
            });

        screen_materials.push(RawMaterial { name, map });
    }

    let model = WatchModel {
        screen_materials,
        material_count: document.materials().len(),
        mesh_count: document.meshes().len(),
    };

    info!(
        "loaded {}: {} materials ({} screen), {} meshes",
        path.display(),
        model.material_count,
        model.screen_materials.len(),
        model.mesh_count
    );

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_name_matching_is_case_insensitive_substring() {
        assert!(is_screen_material(Some("screen")));
        assert!(is_screen_material(Some("Watch_Screen_Mat")));
        assert!(is_screen_material(Some("LCD-SCREEN")));
        assert!(!is_screen_material(Some("bezel")));
        assert!(!is_screen_material(Some("strap")));
        assert!(!is_screen_material(None));
    }

    #[test]
    fn missing_model_file_is_an_error() {
        assert!(load_watch_model("does/not/exist.glb").is_err());
    }
}
