//! Loading of mesh assets from external bytes into GPU resources.

use thiserror::Error;

use crate::data_structures::model::Mesh;

pub mod mesh;

/// Errors produced while fetching or decoding a mesh asset.
///
/// All variants are fatal to the load call that produced them; a failed load
/// constructs no [`Mesh`] and the caller must not render with one.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset bytes: {0}")]
    FetchFailed(String),
    #[error("malformed mesh container: {0}")]
    DecodeFailed(String),
    #[error("primitive has no POSITION attribute")]
    MissingPositionAttribute,
    #[error("primitive has no index list")]
    MissingIndices,
    #[error("unsupported primitive topology {0:?}, only indexed triangle lists render")]
    UnsupportedTopology(gltf::mesh::Mode),
}

impl From<gltf::Error> for AssetError {
    fn from(err: gltf::Error) -> Self {
        AssetError::DecodeFailed(err.to_string())
    }
}

/// Fetch raw asset bytes by name: from the filesystem natively, relative to
/// the page origin on the web.
pub async fn load_binary(file_name: &str) -> Result<Vec<u8>, AssetError> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let window = web_sys::window().ok_or_else(|| {
            AssetError::FetchFailed("no window object available".to_string())
        })?;
        let origin = window
            .location()
            .origin()
            .map_err(|_| AssetError::FetchFailed("could not read page origin".to_string()))?;
        let url = format!("{}/{}", origin, file_name);
        let map_err = |e: reqwest::Error| AssetError::FetchFailed(e.to_string());
        reqwest::get(url)
            .await
            .map_err(map_err)?
            .bytes()
            .await
            .map_err(map_err)?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data =
        std::fs::read(file_name).map_err(|e| AssetError::FetchFailed(e.to_string()))?;

    Ok(data)
}

/// Decode a GLB container and upload its first primitive to the GPU.
pub fn load_mesh(device: &wgpu::Device, bytes: &[u8], label: &str) -> Result<Mesh, AssetError> {
    let data = mesh::MeshData::decode(bytes)?;
    log::info!(
        "loaded mesh {:?}: {} vertices, {} indices",
        label,
        data.vertex_count(),
        data.indices.len()
    );
    Ok(mesh::upload(device, &data, label))
}
