//! Application plumbing: the renderable capability, the frame loop and the
//! winit event loop that drives both.
//!
//! A [`Renderable`] is composed into the driving loop at construction
//! instead of being subclassed into it: the loop owns window creation, the
//! one-shot async context bring-up and per-frame scheduling, while the
//! renderable owns what gets drawn. Termination is first-class: a
//! [`StopToken`] cloned off the [`FrameLoop`] ends the loop at the next
//! frame boundary.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::context::Context;

/// A self-contained drawable unit: resource setup, input intake, one frame.
///
/// `init` runs exactly once, after the GPU context exists and before the
/// first frame. `window_event` sees every window event so implementors can
/// feed their input queues. `render` produces one frame; a surface error is
/// terminal and stops the loop.
pub trait Renderable {
    fn init(&mut self, ctx: &Context) -> anyhow::Result<()>;
    fn window_event(&mut self, ctx: &Context, event: &WindowEvent);
    fn render(&mut self, ctx: &Context) -> Result<(), wgpu::SurfaceError>;
}

/// Cloneable handle that stops a running [`FrameLoop`].
#[derive(Clone, Debug)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Request termination. The loop exits at the next frame boundary; a
    /// frame already being recorded still completes and presents.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Per-display-refresh scheduler for a [`Renderable`].
///
/// The loop reschedules itself via `request_redraw` after every frame until
/// a token stops it or the host window closes.
#[derive(Debug, Default)]
pub struct FrameLoop {
    stopped: Arc<AtomicBool>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> StopToken {
        StopToken(self.stopped.clone())
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Frames slower than this get logged.
const SLOW_FRAME: Duration = Duration::from_millis(50);

pub(crate) enum LoopEvent {
    #[allow(dead_code)]
    Initialized(Context),
}

struct App<R: Renderable> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    // Only the wasm init path sends events through the proxy.
    #[allow(unused)]
    proxy: winit::event_loop::EventLoopProxy<LoopEvent>,
    frame_loop: FrameLoop,
    renderable: R,
    ctx: Option<Context>,
    last_time: Instant,
}

impl<R: Renderable> App<R> {
    fn new(
        event_loop: &EventLoop<LoopEvent>,
        renderable: R,
        frame_loop: FrameLoop,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            frame_loop,
            renderable,
            ctx: None,
            last_time: Instant::now(),
        })
    }

    fn initialized(&mut self, ctx: Context) {
        if let Err(e) = self.renderable.init(&ctx) {
            log::error!("renderable initialization failed: {e:#}");
            return;
        }
        ctx.window.request_redraw();
        self.ctx = Some(ctx);
        self.last_time = Instant::now();
    }
}

impl<R: Renderable> ApplicationHandler<LoopEvent> for App<R> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.ctx.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{JsCast, UnwrapThrowExt};
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = self.async_runtime.block_on(Context::new(window));
            match ctx {
                Ok(ctx) => self.initialized(ctx),
                Err(e) => {
                    log::error!("GPU context initialization failed: {e}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::UnwrapThrowExt;

            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = Context::new(window)
                    .await
                    .expect_throw("GPU context initialization failed");
                assert!(proxy.send_event(LoopEvent::Initialized(ctx)).is_ok());
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: LoopEvent) {
        match event {
            LoopEvent::Initialized(ctx) => self.initialized(ctx),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let ctx = match &self.ctx {
            Some(ctx) => ctx,
            None => return,
        };

        self.renderable.window_event(ctx, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                // Targets are sized once at init; late size changes are out
                // of contract for this viewer.
                log::debug!(
                    "ignoring resize to {}x{}, targets stay at the initial size",
                    size.width,
                    size.height
                );
            }
            WindowEvent::RedrawRequested => {
                if self.frame_loop.is_stopped() {
                    log::info!("frame loop stopped");
                    event_loop.exit();
                    return;
                }

                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                if dt > SLOW_FRAME {
                    log::debug!("slow frame: {} ms", dt.as_millis());
                }

                match self.renderable.render(ctx) {
                    Ok(()) => ctx.window.request_redraw(),
                    Err(e) => {
                        // Surface loss is terminal for this viewer.
                        log::error!("surface unusable, stopping: {e}");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }
}

/// Drive a renderable with its frame loop until a stop token fires or the
/// window closes. Blocks on native; on the web this parks into the browser
/// frame callback and never returns.
pub fn run<R: Renderable + 'static>(renderable: R, frame_loop: FrameLoop) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::UnwrapThrowExt;
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<LoopEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, renderable, frame_loop)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
