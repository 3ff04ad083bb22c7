//! Central GPU context: adapter/device acquisition and surface configuration.
//!
//! [`Context`] is created exactly once per window at application startup and
//! then passed by reference to everything that records GPU work. There is no
//! hidden global instance; constructing a second context for the same window
//! is inexpressible because the context takes ownership of its surface.

use std::sync::Arc;

use thiserror::Error;
use winit::window::Window;

/// Errors that can occur while bringing up the GPU context.
///
/// All variants are fatal to startup. Nothing may be rendered after a failed
/// construction and no retry is attempted; callers may re-invoke
/// [`Context::new`] themselves if they want one.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("no compatible GPU adapter available: {0}")]
    NoAdapterAvailable(#[from] wgpu::RequestAdapterError),
    #[error("adapter refused to create a device: {0}")]
    NoDeviceAvailable(#[from] wgpu::RequestDeviceError),
    #[error("could not create a surface for the window: {0}")]
    SurfaceUnavailable(#[from] wgpu::CreateSurfaceError),
}

/// Owner of the GPU device, queue and the configured window surface.
///
/// The surface is configured once, at the window's initial size, with the
/// adapter's preferred (sRGB where available) format. Resizing is not
/// handled: every render target in this crate is sized against
/// `config.width`/`config.height` as captured here.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> Result<Self, InitError> {
        let size = window.inner_size();

        log::info!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                experimental_features: Default::default(),
            })
            .await?;

        log::info!("surface configuration");
        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface; fall back to whatever the
        // adapter offers first when none is available.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
        })
    }

    /// Width/height the surface was configured with. Render targets are
    /// allocated once against this size and never revalidated.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
