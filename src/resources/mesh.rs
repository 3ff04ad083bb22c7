//! GLB decoding into the fixed interleaved vertex format.
//!
//! The viewer consumes exactly the first mesh definition's first geometric
//! primitive. Decoding is pure CPU work on the raw container bytes and is
//! kept separate from the GPU upload so it can be tested without a device.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::model::{Mesh, MeshVertex},
    resources::AssetError,
};

const DEFAULT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// A decoded primitive, ready for upload: interleaved vertices in source
/// vertex order plus the 16-bit index list.
#[derive(Debug)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    /// Parse a GLB container and pack its first primitive.
    ///
    /// `COLOR_0` and `NORMAL` are optional and default to white and +Z per
    /// vertex. `POSITION` and the index list are required. Indices are
    /// narrowed to 16 bits; sources with wider index values are outside
    /// what this viewer supports and are not detected here.
    pub fn decode(bytes: &[u8]) -> Result<Self, AssetError> {
        let gltf = gltf::Gltf::from_slice(bytes)?;

        let mut buffer_data: Vec<&[u8]> = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                    Some(blob) => buffer_data.push(blob),
                    None => {
                        return Err(AssetError::DecodeFailed(
                            "container references a binary chunk it does not carry".to_string(),
                        ));
                    }
                },
                gltf::buffer::Source::Uri(uri) => {
                    return Err(AssetError::DecodeFailed(format!(
                        "external buffer uri {uri:?} is not supported, pack buffers into the GLB"
                    )));
                }
            }
        }

        let mesh = gltf
            .meshes()
            .next()
            .ok_or_else(|| AssetError::DecodeFailed("container holds no mesh".to_string()))?;
        let primitive = mesh.primitives().next().ok_or_else(|| {
            AssetError::DecodeFailed("first mesh has no primitive".to_string())
        })?;
        if mesh.primitives().len() > 1 {
            log::warn!(
                "mesh {:?} has {} primitives, only the first one renders",
                mesh.name().unwrap_or("unnamed"),
                mesh.primitives().len()
            );
        }
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(AssetError::UnsupportedTopology(primitive.mode()));
        }

        let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).copied());

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or(AssetError::MissingPositionAttribute)?
            .collect();
        let colors: Option<Vec<[f32; 3]>> = reader
            .read_colors(0)
            .map(|c| c.into_rgb_f32().collect());
        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
        let indices: Vec<u16> = reader
            .read_indices()
            .ok_or(AssetError::MissingIndices)?
            .into_u32()
            .map(|i| i as u16)
            .collect();

        for (name, attribute) in [("COLOR_0", &colors), ("NORMAL", &normals)] {
            if let Some(values) = attribute
                && values.len() != positions.len()
            {
                return Err(AssetError::DecodeFailed(format!(
                    "{name} holds {} values for {} vertices",
                    values.len(),
                    positions.len()
                )));
            }
        }

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| MeshVertex {
                position,
                color: colors.as_ref().map_or(DEFAULT_COLOR, |c| c[i]),
                normal: normals.as_ref().map_or(DEFAULT_NORMAL, |n| n[i]),
            })
            .collect();

        Ok(Self { vertices, indices })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Upload decoded mesh data as two immutable GPU buffers.
pub fn upload(device: &wgpu::Device, data: &MeshData, label: &str) -> Mesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Vertex Buffer", label)),
        contents: bytemuck::cast_slice(&data.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Index Buffer", label)),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    Mesh {
        vertex_buffer,
        index_buffer,
        index_count: data.indices.len() as u32,
    }
}
