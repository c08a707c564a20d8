/// Skins: joint lists and joint-matrix computation
///
/// `SkinData` is what the loader produces. `Skin<D>` adds, per frame slot, the
/// CPU joint array and the GPU buffer + descriptor set mirroring it. A slot's
/// buffer is only rewritten after that slot's fence has signaled, so a frame
/// in flight never sees its joints change.

use glam::Mat4;

use crate::error::Result;
use crate::graphics_device::{
    BufferDesc, BufferUsage, DescriptorResource, DescriptorSetKind, GraphicsDevice,
};
use crate::scene::{NodeId, NodeTree};

/// CPU-side skin description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinData {
    pub name: Option<String>,
    /// One inverse bind matrix per joint
    pub inverse_bind_matrices: Vec<Mat4>,
    /// Joint nodes, in the order the vertex joint indices refer to
    pub joints: Vec<NodeId>,
}

impl SkinData {
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Size of one joint buffer
    pub fn buffer_size(&self) -> u64 {
        (self.joint_count().max(1) * std::mem::size_of::<Mat4>()) as u64
    }
}

/// Compute `inverse(skinned_world) * joint_world * inverse_bind` for every joint
///
/// # Arguments
///
/// * `nodes` - Tree holding up-to-date world matrices
/// * `skinned_world` - World matrix of the node the skin is attached to
/// * `skin` - Joints and inverse bind matrices
/// * `out` - Destination, one matrix per joint
pub fn compute_joint_matrices(
    nodes: &NodeTree,
    skinned_world: Mat4,
    skin: &SkinData,
    out: &mut Vec<Mat4>,
) {
    let inverse_root = skinned_world.inverse();
    out.clear();
    out.extend(skin.joints.iter().enumerate().map(|(index, &joint)| {
        let inverse_bind = skin
            .inverse_bind_matrices
            .get(index)
            .copied()
            .unwrap_or(Mat4::IDENTITY);
        inverse_root * nodes.world_matrix(joint) * inverse_bind
    }));
}

/// GPU mirror of one frame slot
pub struct SkinFrame<D: GraphicsDevice> {
    pub joint_matrices: Vec<Mat4>,
    pub buffer: D::Buffer,
    pub descriptor_set: D::DescriptorSet,
}

/// Skin with one joint buffer per frame slot
pub struct Skin<D: GraphicsDevice> {
    pub data: SkinData,
    pub frames: Vec<SkinFrame<D>>,
}

impl<D: GraphicsDevice> Skin<D> {
    /// Allocate the per-slot storage buffers and descriptor sets
    pub fn new(device: &mut D, data: SkinData, frames_in_flight: usize) -> Result<Self> {
        let mut frames = Vec::with_capacity(frames_in_flight);
        for _ in 0..frames_in_flight {
            let buffer = device.create_buffer(&BufferDesc::host_visible(
                data.buffer_size(),
                BufferUsage::STORAGE,
            ))?;
            let descriptor_set = device.allocate_descriptor_set(DescriptorSetKind::Joints)?;
            device.update_descriptor_set(descriptor_set, 0, DescriptorResource::StorageBuffer(&buffer));
            frames.push(SkinFrame {
                joint_matrices: Vec::with_capacity(data.joint_count()),
                buffer,
                descriptor_set,
            });
        }
        Ok(Self { data, frames })
    }

    /// Recompute the joint matrices of `slot` and write them to its buffer
    ///
    /// Uses the direct path; the slot's fence must have signaled.
    ///
    /// # Returns
    ///
    /// The descriptor set to bind for the draw
    pub fn update(
        &mut self,
        device: &mut D,
        slot: usize,
        nodes: &NodeTree,
        skinned_world: Mat4,
    ) -> Result<D::DescriptorSet> {
        let frame = &mut self.frames[slot];
        compute_joint_matrices(nodes, skinned_world, &self.data, &mut frame.joint_matrices);
        if !frame.joint_matrices.is_empty() {
            device.set_buffer_data(&frame.buffer, 0, bytemuck::cast_slice(&frame.joint_matrices))?;
        }
        Ok(frame.descriptor_set)
    }
}

#[cfg(test)]
#[path = "skin_tests.rs"]
mod tests;
