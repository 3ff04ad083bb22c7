//! Render pipeline construction.

pub mod mesh;

pub use mesh::{mk_mesh_pipeline, uniform_bind_group_layout};
