//! Orbit camera and its input-event queue.
//!
//! The camera orbits a fixed look-at target at the origin, parameterized by
//! yaw/pitch/zoom. Pointer and wheel input is not applied from callbacks;
//! events are enqueued on the [`CameraRig`] and drained synchronously once
//! per frame at the start of [`CameraRig::update`], which keeps the order in
//! which input mutates view parameters deterministic with respect to frames.

use std::collections::VecDeque;

use cgmath::{Matrix4, Point3, Rad, Vector3, perspective};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// wgpu clip space is 0..1 in z while cgmath produces OpenGL's -1..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const ROTATE_SENSITIVITY: f32 = 0.005;
const ZOOM_SENSITIVITY: f32 = 0.5;
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const MIN_ZOOM: f32 = 0.5;
const MAX_ZOOM: f32 = 10.0;

/// An orbit camera around the origin with up vector (0, 1, 0).
///
/// `yaw`, `pitch` and `zoom` are the only mutable parameters; projection
/// settings are fixed at construction.
#[derive(Debug)]
pub struct Camera {
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    projection: Matrix4<f32>,
}

impl Camera {
    pub fn new(fovy: Rad<f32>, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: std::f32::consts::FRAC_PI_8,
            zoom: 5.0,
            projection: OPENGL_TO_WGPU_MATRIX * perspective(fovy, aspect, near, far),
        }
    }

    /// World-space camera position derived from the spherical parameters.
    pub fn position(&self) -> Point3<f32> {
        Point3::new(
            self.zoom * self.pitch.cos() * self.yaw.sin(),
            self.zoom * self.pitch.sin(),
            self.zoom * self.pitch.cos() * self.yaw.cos(),
        )
    }

    /// Recompute the view-projection matrix from the current yaw/pitch/zoom.
    ///
    /// Nothing is cached: the result is a pure function of the three scalars,
    /// so unchanged state yields a bit-identical matrix.
    pub fn view_projection(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(
            self.position(),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );
        self.projection * view
    }
}

/// A pointer or wheel event in screen-space coordinates.
///
/// `Scroll` carries the vertical wheel delta in browser-style units, where
/// one detent of a conventional mouse wheel is about 100.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Scroll { delta_y: f64 },
}

/// Owns one [`Camera`] plus the transient drag state and the event queue.
#[derive(Debug)]
pub struct CameraRig {
    camera: Camera,
    dragging: bool,
    last_x: f64,
    last_y: f64,
    cursor: (f64, f64),
    queue: VecDeque<PointerEvent>,
}

impl CameraRig {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            dragging: false,
            last_x: 0.0,
            last_y: 0.0,
            cursor: (0.0, 0.0),
            queue: VecDeque::new(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Enqueue an input event. Nothing is applied until the next
    /// [`update`](Self::update) drains the queue.
    pub fn push(&mut self, event: PointerEvent) {
        self.queue.push_back(event);
    }

    /// Translate winit window events into pointer events on the queue.
    ///
    /// One wheel detent (a `LineDelta` of 1) maps to a vertical delta of
    /// 100, matching browser wheel units; winit's scroll sign is the
    /// opposite of the browser's, hence the negation.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                self.push(PointerEvent::Move {
                    x: position.x,
                    y: position.y,
                });
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.push(PointerEvent::Down {
                    x: self.cursor.0,
                    y: self.cursor.1,
                }),
                ElementState::Released => self.push(PointerEvent::Up),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y as f64 * 100.0,
                    MouseScrollDelta::PixelDelta(position) => -position.y,
                };
                self.push(PointerEvent::Scroll { delta_y });
            }
            _ => {}
        }
    }

    /// Drain all pending input events, then recompute the view-projection
    /// matrix. With an empty queue this leaves the camera untouched.
    pub fn update(&mut self) -> Matrix4<f32> {
        while let Some(event) = self.queue.pop_front() {
            self.apply(event);
        }
        self.camera.view_projection()
    }

    fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, y } => {
                self.dragging = true;
                self.last_x = x;
                self.last_y = y;
            }
            PointerEvent::Move { x, y } => {
                if !self.dragging {
                    return;
                }
                let dx = (x - self.last_x) as f32;
                let dy = (y - self.last_y) as f32;

                self.camera.yaw -= dx * ROTATE_SENSITIVITY;
                self.camera.pitch += dy * ROTATE_SENSITIVITY;
                self.camera.pitch = self.camera.pitch.clamp(-MAX_PITCH, MAX_PITCH);

                self.last_x = x;
                self.last_y = y;
            }
            PointerEvent::Up => {
                self.dragging = false;
            }
            PointerEvent::Scroll { delta_y } => {
                self.camera.zoom += delta_y as f32 * ZOOM_SENSITIVITY * 0.01;
                self.camera.zoom = self.camera.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
            }
        }
    }
}
