//! GPU mesh model and interleaved vertex definition.

use bytemuck::{Pod, Zeroable};

/// Number of floats packed per vertex: position.xyz, color.rgb, normal.xyz.
pub const FLOATS_PER_VERTEX: usize = 9;

/// One interleaved vertex as it lives in the vertex buffer.
///
/// The layout is fixed for every mesh this crate renders. Attributes absent
/// from the source asset are filled with defaults during decoding, so the
/// stride never varies.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x3,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A mesh resident on the GPU: one vertex buffer, one 16-bit index buffer.
///
/// Immutable after upload; draw calls cover `index_count` indices.
#[derive(Debug)]
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}
