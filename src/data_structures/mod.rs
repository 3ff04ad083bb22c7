//! Engine data structures: mesh models and render-target textures.
//!
//! - `model` contains the GPU mesh and its interleaved vertex definition
//! - `texture` contains depth and multisampled color attachment creation

pub mod model;
pub mod texture;
