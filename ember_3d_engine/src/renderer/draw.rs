/// Draw recording for one model
///
/// Walks the model's node tree in pre-order (`NodeTree::depth_first`, an
/// explicit stack). Skinned nodes get
/// their joint matrices recomputed and written into the current slot's joint
/// buffer right before the draws that consume them.

use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, JOINT_SET, MATERIAL_SET};
use crate::resource::{DrawConstants, Primitive};
use crate::scene::{Model, NodeTree};

/// Per-frame state shared by every model's draws
pub struct DrawContext<'a, D: GraphicsDevice> {
    pub command_buffer: D::CommandBuffer,
    pub pipeline: &'a D::Pipeline,
    /// Frame slot whose joint buffers may be written
    pub slot: usize,
    /// Joint set holding one identity matrix, bound for unskinned meshes
    pub identity_joints: D::DescriptorSet,
}

/// Draw calls and triangles recorded for a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub triangles: u32,
}

impl std::ops::AddAssign for FrameStats {
    fn add_assign(&mut self, other: Self) {
        self.draw_calls += other.draw_calls;
        self.triangles += other.triangles;
    }
}

/// Record the draws of `model` into the context's command buffer
pub fn record_model<D: GraphicsDevice>(
    device: &mut D,
    context: &DrawContext<'_, D>,
    model: &mut Model<D>,
) -> Result<FrameStats> {
    let mut stats = FrameStats::default();
    let (Some(vertex_buffer), Some(index_buffer)) = (model.vertex_buffer(), model.index_buffer()) else {
        return Ok(stats);
    };
    device.cmd_bind_vertex_buffer(context.command_buffer, vertex_buffer);
    device.cmd_bind_index_buffer(context.command_buffer, index_buffer);

    let Model { nodes, meshes, primitives, materials, skins, .. } = model;
    let nodes: &NodeTree = nodes;
    let primitives: &[Primitive] = primitives;

    for (id, node) in nodes.depth_first() {
        match node.skin {
            Some(skin_index) => {
                let skin = skins.get_mut(skin_index).ok_or_else(|| {
                    Error::InvalidResource(format!("node {} references missing skin {}", id.0, skin_index))
                })?;
                let joint_set = skin.update(device, context.slot, nodes, node.world_matrix)?;
                device.cmd_bind_descriptor_set(context.command_buffer, context.pipeline, JOINT_SET, joint_set);
            }
            None if node.mesh.is_some() => {
                device.cmd_bind_descriptor_set(
                    context.command_buffer,
                    context.pipeline,
                    JOINT_SET,
                    context.identity_joints,
                );
            }
            None => {}
        }

        if let Some(mesh_index) = node.mesh {
            let mesh = meshes.get(mesh_index).ok_or_else(|| {
                Error::InvalidResource(format!("node {} references missing mesh {}", id.0, mesh_index))
            })?;
            let constants = DrawConstants { model: node.world_matrix };
            for primitive in mesh.primitives(primitives) {
                if let Some(material) = primitive.material.and_then(|m| materials.get(m)) {
                    device.cmd_bind_descriptor_set(
                        context.command_buffer,
                        context.pipeline,
                        MATERIAL_SET,
                        material.descriptor_set,
                    );
                }
                device.cmd_push_constants(context.command_buffer, context.pipeline, bytemuck::bytes_of(&constants));
                device.cmd_draw_indexed(context.command_buffer, primitive.index_count, primitive.first_index, 0);
                stats.draw_calls += 1;
                stats.triangles += primitive.index_count / 3;
            }
        }
    }

    Ok(stats)
}
