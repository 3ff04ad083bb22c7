//! Per-frame rendering: uniform upload, pass recording and submission.
//!
//! One [`Renderer::render`] call is one fully self-contained frame. The only
//! state that outlives a call is the latest contents of the two uniform
//! buffers; the queue processes submissions in FIFO order, so the writes
//! issued here are visible to the draw submitted in the same call.

use std::iter;

use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix};

use crate::{
    camera::CameraRig,
    context::Context,
    data_structures::{model::Mesh, texture::Texture},
    pipelines,
};

pub const DEFAULT_VERTEX_SHADER: &str = include_str!("shaders/vertex.wgsl");
pub const DEFAULT_FRAGMENT_SHADER: &str = include_str!("shaders/fragment.wgsl");

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.3,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

/// The frame's model-view-projection matrix, as written to binding 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MvpUniform {
    matrix: [[f32; 4]; 4],
}

impl MvpUniform {
    pub fn new(mvp: Matrix4<f32>) -> Self {
        Self { matrix: mvp.into() }
    }
}

/// The frame's normal matrix, as written to binding 1.
///
/// The 3x3 matrix is stored in the first three columns of a mat4x4 to honor
/// the uniform buffer's 16-byte column alignment. Padding lanes and the
/// fourth column are always zero-filled, never stale.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct NormalUniform {
    matrix: [[f32; 4]; 4],
}

impl NormalUniform {
    /// Derive the normal matrix from a model transform: the transpose of the
    /// inverse of its upper-left 3x3 block. A non-invertible model transform
    /// falls back to the identity.
    pub fn from_model(model: Matrix4<f32>) -> Self {
        let linear = Matrix3::from_cols(
            model.x.truncate(),
            model.y.truncate(),
            model.z.truncate(),
        );
        let normal = match linear.invert() {
            Some(inverse) => inverse.transpose(),
            None => Matrix3::identity(),
        };

        let mut matrix = [[0.0; 4]; 4];
        for (column, padded) in Into::<[[f32; 3]; 3]>::into(normal).iter().zip(&mut matrix) {
            padded[..3].copy_from_slice(column);
        }
        Self { matrix }
    }
}

/// Owner of the compiled pipeline, the per-frame uniform buffers and the
/// fixed-size multisampled color/depth targets.
#[derive(Debug)]
pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    depth_texture: Texture,
    msaa_texture: Texture,
    mvp_buffer: wgpu::Buffer,
    normal_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl Renderer {
    /// Compile the pipeline and allocate every GPU resource the render loop
    /// needs, sized once to `size` and never resized.
    pub fn new(ctx: &Context, vertex_source: &str, fragment_source: &str, size: [u32; 2]) -> Self {
        let device = &ctx.device;

        let depth_texture = Texture::create_depth_texture(device, size, "depth_texture");
        let msaa_texture =
            Texture::create_msaa_texture(device, size, ctx.config.format, "msaa_colour_texture");

        let mvp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MVP Buffer"),
            size: std::mem::size_of::<MvpUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let normal_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Normal Matrix Buffer"),
            size: std::mem::size_of::<NormalUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = pipelines::uniform_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: mvp_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: normal_buffer.as_entire_binding(),
                },
            ],
            label: Some("uniform_bind_group"),
        });

        let pipeline = pipelines::mk_mesh_pipeline(
            device,
            ctx.config.format,
            &bind_group_layout,
            vertex_source,
            fragment_source,
        );

        Self {
            pipeline,
            depth_texture,
            msaa_texture,
            mvp_buffer,
            normal_buffer,
            bind_group,
        }
    }

    /// Record and submit one frame.
    ///
    /// Surface loss is propagated, not recovered: the caller decides whether
    /// that ends the loop (it does, in this crate).
    pub fn render(
        &self,
        ctx: &Context,
        mesh: &Mesh,
        rig: &mut CameraRig,
    ) -> Result<(), wgpu::SurfaceError> {
        let view_projection = rig.update();
        let model = Matrix4::identity();
        let mvp = MvpUniform::new(view_projection * model);
        let normal = NormalUniform::from_model(model);

        ctx.queue
            .write_buffer(&self.mvp_buffer, 0, bytemuck::cast_slice(&[mvp]));
        ctx.queue
            .write_buffer(&self.normal_buffer, 0, bytemuck::cast_slice(&[normal]));

        let output = ctx.surface.get_current_texture()?;
        let resolve_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.msaa_texture.view,
                    resolve_target: Some(&resolve_view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
