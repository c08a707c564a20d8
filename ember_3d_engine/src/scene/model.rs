/// Model - a loaded asset living on the device
///
/// A `Model<D>` owns the GPU copies of its geometry, materials and per-slot
/// joint buffers together with the CPU scene graph, animations and playback
/// state. It is created by [`Model::upload`] and mutated every frame by the
/// renderer.

use glam::Vec4;

use crate::error::{Error, Result};
use crate::graphics_device::{
    BufferDesc, BufferUsage, DescriptorResource, DescriptorSetKind, GraphicsDevice, ImageDesc,
    ImageFormat,
};
use crate::resource::{MaterialAsset, MaterialUniforms, Mesh, ModelAsset, Primitive, TextureAsset};
use crate::scene::{Animation, NodeTree, Playback, Skin};
use crate::{engine_debug, engine_error, engine_info};

/// Format textures are uploaded with
pub const TEXTURE_FORMAT: ImageFormat = ImageFormat::R8G8B8A8_SRGB;

// ============================================================================
// Material
// ============================================================================

/// Material with its descriptor set (set 2)
pub struct Material<D: GraphicsDevice> {
    pub name: Option<String>,
    pub base_color_factor: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    /// Own base-color texture; `None` when the model's white texture is bound
    pub texture: Option<D::Image>,
    pub factors: D::Buffer,
    pub descriptor_set: D::DescriptorSet,
}

impl<D: GraphicsDevice> Material<D> {
    fn uniforms(&self) -> MaterialUniforms {
        MaterialUniforms {
            base_color_factor: self.base_color_factor,
            metallic: self.metallic,
            roughness: self.roughness,
            _padding: [0.0; 2],
        }
    }
}

fn upload_texture<D: GraphicsDevice>(device: &mut D, texture: &TextureAsset) -> Result<D::Image> {
    let image = device.create_image(&ImageDesc::texture_2d(
        texture.width,
        texture.height,
        TEXTURE_FORMAT,
    ))?;
    device.set_image_data(&image, &texture.pixels)?;
    Ok(image)
}

// ============================================================================
// Upload
// ============================================================================

/// Resources created so far by an upload
///
/// Kept outside the fallible part so that a failed upload can drain the
/// pending transfers before anything is released.
struct UploadParts<D: GraphicsDevice> {
    vertex_buffer: Option<D::Buffer>,
    index_buffer: Option<D::Buffer>,
    default_texture: Option<D::Image>,
    materials: Vec<Material<D>>,
    skins: Vec<Skin<D>>,
}

impl<D: GraphicsDevice> UploadParts<D> {
    fn new() -> Self {
        Self {
            vertex_buffer: None,
            index_buffer: None,
            default_texture: None,
            materials: Vec::new(),
            skins: Vec::new(),
        }
    }

    fn fill(&mut self, device: &mut D, asset: &ModelAsset, frames_in_flight: usize) -> Result<()> {
        if !asset.vertices.is_empty() {
            let bytes: &[u8] = bytemuck::cast_slice(&asset.vertices);
            let buffer = device.create_buffer(&BufferDesc::device_local(
                bytes.len() as u64,
                BufferUsage::VERTEX,
            ))?;
            device.set_buffer_data(&buffer, 0, bytes)?;
            self.vertex_buffer = Some(buffer);
        }

        if !asset.indices.is_empty() {
            let bytes: &[u8] = bytemuck::cast_slice(&asset.indices);
            let buffer = device.create_buffer(&BufferDesc::device_local(
                bytes.len() as u64,
                BufferUsage::INDEX,
            ))?;
            device.set_buffer_data(&buffer, 0, bytes)?;
            self.index_buffer = Some(buffer);
        }

        if asset.needs_default_texture() {
            self.default_texture = Some(upload_texture(device, &TextureAsset::white())?);
        }

        for material in &asset.materials {
            let uploaded = self.upload_material(device, material)?;
            self.materials.push(uploaded);
        }

        for skin in &asset.skins {
            self.skins.push(Skin::new(device, skin.clone(), frames_in_flight)?);
        }

        Ok(())
    }

    fn upload_material(&self, device: &mut D, asset: &MaterialAsset) -> Result<Material<D>> {
        let texture = match &asset.base_color_texture {
            Some(texture) => Some(upload_texture(device, texture)?),
            None => None,
        };

        let factors = device.create_buffer(&BufferDesc::host_visible(
            std::mem::size_of::<MaterialUniforms>() as u64,
            BufferUsage::UNIFORM,
        ))?;
        let descriptor_set = device.allocate_descriptor_set(DescriptorSetKind::Material)?;

        let material = Material {
            name: asset.name.clone(),
            base_color_factor: asset.base_color_factor,
            metallic: asset.metallic,
            roughness: asset.roughness,
            texture,
            factors,
            descriptor_set,
        };
        device.set_buffer_data(&material.factors, 0, bytemuck::bytes_of(&material.uniforms()))?;

        let image = match (&material.texture, &self.default_texture) {
            (Some(image), _) | (None, Some(image)) => image,
            (None, None) => {
                return Err(Error::InvalidResource(
                    "material has neither a texture nor a default texture".to_string(),
                ))
            }
        };
        device.update_descriptor_set(descriptor_set, 0, DescriptorResource::SampledImage(image));
        device.update_descriptor_set(
            descriptor_set,
            1,
            DescriptorResource::UniformBuffer(&material.factors),
        );

        Ok(material)
    }
}

// ============================================================================
// Model
// ============================================================================

pub struct Model<D: GraphicsDevice> {
    pub name: String,
    pub nodes: NodeTree,
    pub meshes: Vec<Mesh>,
    pub primitives: Vec<Primitive>,
    pub materials: Vec<Material<D>>,
    pub skins: Vec<Skin<D>>,
    pub animations: Vec<Animation>,
    playback: Playback,
    vertex_buffer: Option<D::Buffer>,
    index_buffer: Option<D::Buffer>,
    default_texture: Option<D::Image>,
}

impl<D: GraphicsDevice> Model<D> {
    /// Create the device resources of `asset`
    ///
    /// Geometry and textures go through the staged path and complete by the
    /// next `wait_for_transfers`. Material factors and joint buffers are
    /// host-visible. When a step fails, pending transfers are drained before
    /// the resources created so far are released.
    ///
    /// # Arguments
    ///
    /// * `device` - Device to create the resources on
    /// * `asset` - Loaded model
    /// * `frames_in_flight` - Number of joint buffers per skin
    pub fn upload(device: &mut D, asset: ModelAsset, frames_in_flight: usize) -> Result<Self> {
        let mut parts = UploadParts::new();
        if let Err(error) = parts.fill(device, &asset, frames_in_flight) {
            engine_error!("ember3d::Model", "Failed to upload model '{}': {}", asset.name, error);
            if let Err(drain_error) = device.wait_for_transfers() {
                engine_error!(
                    "ember3d::Model",
                    "Failed to drain transfers after failed upload: {}",
                    drain_error
                );
            }
            return Err(error);
        }

        engine_info!(
            "ember3d::Model",
            "Uploaded model '{}' ({} vertices, {} indices, {} materials, {} skins, {} animations)",
            asset.name,
            asset.vertices.len(),
            asset.indices.len(),
            parts.materials.len(),
            parts.skins.len(),
            asset.animations.len()
        );

        Ok(Self {
            name: asset.name,
            nodes: asset.nodes,
            meshes: asset.meshes,
            primitives: asset.primitives,
            materials: parts.materials,
            skins: parts.skins,
            animations: asset.animations,
            playback: Playback::default(),
            vertex_buffer: parts.vertex_buffer,
            index_buffer: parts.index_buffer,
            default_texture: parts.default_texture,
        })
    }

    pub fn vertex_buffer(&self) -> Option<&D::Buffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn index_buffer(&self) -> Option<&D::Buffer> {
        self.index_buffer.as_ref()
    }

    pub fn default_texture(&self) -> Option<&D::Image> {
        self.default_texture.as_ref()
    }

    // ===== PLAYBACK =====

    /// Start `index` from time zero
    pub fn play_animation(&mut self, index: usize) -> Result<()> {
        let Some(animation) = self.animations.get(index) else {
            return Err(Error::InvalidResource(format!(
                "model '{}' has no animation {} ({} available)",
                self.name,
                index,
                self.animations.len()
            )));
        };
        engine_debug!(
            "ember3d::Model",
            "Playing animation {} ({}) of '{}', {:.3}s",
            index,
            animation.name.as_deref().unwrap_or("unnamed"),
            self.name,
            animation.end_time
        );
        self.playback = Playback { animation: Some(index), time: 0.0 };
        Ok(())
    }

    pub fn stop_animation(&mut self) {
        self.playback = Playback::default();
    }

    pub fn playing_animation(&self) -> Option<usize> {
        self.playback.animation
    }

    /// Elapsed time of the playing animation
    pub fn animation_time(&self) -> f32 {
        self.playback.time
    }

    /// Advance the playing animation by `dt` and write it into the nodes
    pub fn update_animations(&mut self, dt: f32) {
        let Some(animation) = self.playback.animation.and_then(|i| self.animations.get(i)) else {
            return;
        };
        let time = self.playback.advance(dt, animation.end_time);
        animation.apply(time, &mut self.nodes);
    }

    /// Recompute every world matrix
    pub fn update_transforms(&mut self) {
        self.nodes.update_transforms();
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
