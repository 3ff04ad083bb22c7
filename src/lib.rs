//! glbview
//!
//! A small, cross-platform viewer for a single glTF-binary mesh with an
//! orbit camera. The crate exposes just enough surface to acquire a GPU
//! context for a window, decode one GLB primitive into an interleaved
//! vertex/index buffer pair, and drive a fixed-size multisampled render
//! loop from pointer and wheel input. It runs natively and on the web.
//!
//! High-level modules
//! - `context`: central GPU context owning device/queue/surface
//! - `camera`: orbit camera, input-event queue and view-projection math
//! - `data_structures`: mesh/vertex data models and render-target textures
//! - `resources`: helpers to fetch and decode GLB assets into GPU buffers
//! - `pipelines`: render-pipeline construction
//! - `renderer`: per-frame uniforms, pass recording and submission
//! - `app`: renderable capability, frame loop and winit event plumbing
//!

pub mod app;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod renderer;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::WindowEvent;
