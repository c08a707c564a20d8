/// CPU-side model description produced by the loader and consumed by upload
///
/// Nothing in here touches the device. A `ModelAsset` is self-contained:
/// node ids, mesh indices, skin indices and material indices all refer into
/// its own vectors.

use glam::Vec4;

use crate::resource::{Mesh, Primitive, Vertex};
use crate::scene::{Animation, NodeTree, SkinData};

/// Decoded RGBA8 texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAsset {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

impl TextureAsset {
    /// 1x1 opaque white texture bound to materials without a base-color map
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![0xFF; 4],
        }
    }
}

/// Metallic-roughness material parameters
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialAsset {
    pub name: Option<String>,
    pub base_color_factor: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    pub base_color_texture: Option<TextureAsset>,
}

impl Default for MaterialAsset {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: Vec4::ONE,
            metallic: 1.0,
            roughness: 1.0,
            base_color_texture: None,
        }
    }
}

/// Everything needed to upload one model
#[derive(Debug, Clone, Default)]
pub struct ModelAsset {
    pub name: String,
    pub nodes: NodeTree,
    /// Shared vertex buffer contents of every primitive
    pub vertices: Vec<Vertex>,
    /// Shared index buffer contents, already rebased to `vertices`
    pub indices: Vec<u32>,
    pub meshes: Vec<Mesh>,
    pub primitives: Vec<Primitive>,
    pub materials: Vec<MaterialAsset>,
    pub skins: Vec<SkinData>,
    pub animations: Vec<Animation>,
}

impl ModelAsset {
    /// Whether any material lacks a base-color texture
    pub fn needs_default_texture(&self) -> bool {
        self.materials.iter().any(|m| m.base_color_texture.is_none())
    }
}
