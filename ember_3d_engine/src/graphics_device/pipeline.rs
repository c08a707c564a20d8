/// Pipeline and descriptor-set parameter types
///
/// The renderer uses a single skinned pipeline with three descriptor sets:
///
/// | Set | Kind | Bindings |
/// |---|---|---|
/// | 0 | [`DescriptorSetKind::Global`] | 0: uniform buffer (view-projection) |
/// | 1 | [`DescriptorSetKind::Joints`] | 0: storage buffer (joint matrices) |
/// | 2 | [`DescriptorSetKind::Material`] | 0: combined image sampler, 1: uniform buffer (factors) |

use crate::graphics_device::{GraphicsDevice, ImageFormat};

/// Set index of the per-frame global uniforms
pub const GLOBAL_SET: u32 = 0;
/// Set index of the per-skin joint matrices
pub const JOINT_SET: u32 = 1;
/// Set index of the per-material texture and factors
pub const MATERIAL_SET: u32 = 2;

/// Layout a descriptor set is allocated with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorSetKind {
    Global,
    Joints,
    Material,
}

impl DescriptorSetKind {
    /// Set index the layout occupies in the pipeline layout
    pub fn set_index(self) -> u32 {
        match self {
            DescriptorSetKind::Global => GLOBAL_SET,
            DescriptorSetKind::Joints => JOINT_SET,
            DescriptorSetKind::Material => MATERIAL_SET,
        }
    }
}

/// Resource written into a descriptor binding
pub enum DescriptorResource<'a, D: GraphicsDevice + ?Sized> {
    UniformBuffer(&'a D::Buffer),
    StorageBuffer(&'a D::Buffer),
    /// Image sampled through the device's default sampler
    SampledImage(&'a D::Image),
}

/// Vertex attribute format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
    Uint32x4,
}

/// One vertex attribute of the interleaved vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: u32,
}

/// Interleaved vertex buffer layout (binding 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout<'a> {
    pub stride: u32,
    pub attributes: &'a [VertexAttribute],
}

/// Descriptor for the graphics pipeline
#[derive(Debug, Clone, Copy)]
pub struct PipelineDesc<'a> {
    /// Vertex shader SPIR-V words
    pub vertex_spirv: &'a [u32],
    /// Fragment shader SPIR-V words
    pub fragment_spirv: &'a [u32],
    pub vertex_layout: VertexLayout<'a>,
    pub color_format: ImageFormat,
    pub depth_format: ImageFormat,
    /// Bytes of push constants visible to the vertex stage
    pub push_constant_size: u32,
}
