//! Minimal viewer: load one .glb from the command line and orbit around it.
//!
//!     cargo run --example viewer -- path/to/model.glb

use std::f32::consts::FRAC_PI_4;

use anyhow::Context as _;
use cgmath::Rad;
use glbview::{
    app::{self, FrameLoop, Renderable},
    camera::{Camera, CameraRig},
    context::Context,
    data_structures::model::Mesh,
    renderer::{DEFAULT_FRAGMENT_SHADER, DEFAULT_VERTEX_SHADER, Renderer},
    resources,
};
use winit::event::WindowEvent;

struct Viewer {
    asset_bytes: Vec<u8>,
    rig: CameraRig,
    mesh: Option<Mesh>,
    renderer: Option<Renderer>,
}

impl Viewer {
    fn new(asset_bytes: Vec<u8>) -> Self {
        Self {
            asset_bytes,
            rig: CameraRig::new(Camera::new(Rad(FRAC_PI_4), 1280.0 / 720.0, 0.1, 100.0)),
            mesh: None,
            renderer: None,
        }
    }
}

impl Renderable for Viewer {
    fn init(&mut self, ctx: &Context) -> anyhow::Result<()> {
        let (width, height) = ctx.size();
        self.renderer = Some(Renderer::new(
            ctx,
            DEFAULT_VERTEX_SHADER,
            DEFAULT_FRAGMENT_SHADER,
            [width, height],
        ));
        self.mesh = Some(resources::load_mesh(
            &ctx.device,
            &self.asset_bytes,
            "viewer mesh",
        )?);
        Ok(())
    }

    fn window_event(&mut self, _ctx: &Context, event: &WindowEvent) {
        self.rig.handle_window_event(event);
    }

    fn render(&mut self, ctx: &Context) -> Result<(), wgpu::SurfaceError> {
        match (&self.renderer, &self.mesh) {
            (Some(renderer), Some(mesh)) => renderer.render(ctx, mesh, &mut self.rig),
            _ => Ok(()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .context("usage: viewer <model.glb>")?;
    let bytes = tokio::runtime::Runtime::new()?
        .block_on(resources::load_binary(&path))
        .with_context(|| format!("could not read {path}"))?;

    app::run(Viewer::new(bytes), FrameLoop::new())
}
