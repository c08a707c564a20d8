/// GPU-facing data layouts: vertices, uniforms, push constants, mesh ranges

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::graphics_device::{VertexAttribute, VertexFormat, VertexLayout};

/// Interleaved skinned vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
    pub joints: [u32; 4],
    pub weights: [f32; 4],
}

const VERTEX_ATTRIBUTES: [VertexAttribute; 5] = [
    VertexAttribute { location: 0, format: VertexFormat::Float32x3, offset: offset_of!(Vertex, position) as u32 },
    VertexAttribute { location: 1, format: VertexFormat::Float32x3, offset: offset_of!(Vertex, normal) as u32 },
    VertexAttribute { location: 2, format: VertexFormat::Float32x2, offset: offset_of!(Vertex, tex_coord) as u32 },
    VertexAttribute { location: 3, format: VertexFormat::Uint32x4, offset: offset_of!(Vertex, joints) as u32 },
    VertexAttribute { location: 4, format: VertexFormat::Float32x4, offset: offset_of!(Vertex, weights) as u32 },
];

impl Vertex {
    /// Vertex buffer layout consumed by the skinned pipeline
    pub fn layout() -> VertexLayout<'static> {
        VertexLayout {
            stride: size_of::<Vertex>() as u32,
            attributes: &VERTEX_ATTRIBUTES,
        }
    }
}

/// Per-frame uniforms (set 0, binding 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view_projection: Mat4,
}

/// Per-draw push constants
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawConstants {
    pub model: Mat4,
}

/// Per-material factors (set 2, binding 1)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub base_color_factor: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    pub _padding: [f32; 2],
}

/// Index range of one draw call, indices already rebased to the shared vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub first_index: u32,
    pub index_count: u32,
    pub material: Option<usize>,
}

/// Range of primitives making up one mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mesh {
    pub first_primitive: usize,
    pub primitive_count: usize,
}

impl Mesh {
    pub fn primitives<'a>(&self, primitives: &'a [Primitive]) -> &'a [Primitive] {
        &primitives[self.first_primitive..self.first_primitive + self.primitive_count]
    }
}
