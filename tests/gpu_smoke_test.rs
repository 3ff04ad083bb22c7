//! Headless GPU smoke test: acquires a real adapter/device, uploads a
//! decoded GLB quad and renders one multisampled frame offscreen,
//! reading the resolve target back to check that geometry actually landed.
//!
//! Needs a working GPU, so it only runs with `--features integration-tests`.
#![cfg(feature = "integration-tests")]

mod common;

use std::f32::consts::FRAC_PI_4;
use std::time::Duration;

use cgmath::{Matrix4, Rad, SquareMatrix};
use glbview::{
    camera::{Camera, CameraRig},
    data_structures::texture::Texture,
    pipelines,
    renderer::{DEFAULT_FRAGMENT_SHADER, DEFAULT_VERTEX_SHADER, MvpUniform, NormalUniform},
    resources,
};
use wgpu::util::DeviceExt;

use crate::common::glb::GlbBuilder;

const SIZE: u32 = 64;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn acquire_device(runtime: &tokio::runtime::Runtime) -> (wgpu::Device, wgpu::Queue) {
    runtime.block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .expect("no adapter available");
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                experimental_features: Default::default(),
            })
            .await
            .expect("no device available")
    })
}

#[test]
fn renders_a_decoded_quad_offscreen() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (device, queue) = acquire_device(&runtime);

    let bytes = GlbBuilder::quad().build();
    let mesh = resources::load_mesh(&device, &bytes, "quad").unwrap();
    assert_eq!(mesh.index_count, 6);
    assert_eq!(mesh.vertex_buffer.size(), 4 * 9 * 4);

    let msaa = Texture::create_msaa_texture(&device, [SIZE, SIZE], FORMAT, "test msaa");
    let depth = Texture::create_depth_texture(&device, [SIZE, SIZE], "test depth");
    let resolve = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test resolve"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    let mut rig = CameraRig::new(Camera::new(Rad(FRAC_PI_4), 1.0, 0.1, 100.0));
    let model = Matrix4::identity();
    let mvp = MvpUniform::new(rig.update() * model);
    let normal = NormalUniform::from_model(model);

    let mvp_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("test mvp"),
        contents: bytemuck::bytes_of(&mvp),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let normal_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("test normal"),
        contents: bytemuck::bytes_of(&normal),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let layout = pipelines::uniform_bind_group_layout(&device);
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layout,
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
        label: Some("test bind group"),
    });
    let pipeline = pipelines::mk_mesh_pipeline(
        &device,
        FORMAT,
        &layout,
        DEFAULT_VERTEX_SHADER,
        DEFAULT_FRAGMENT_SHADER,
    );

    let mut encoder =
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
        let resolve_view = resolve.create_view(&wgpu::TextureViewDescriptor::default());
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("test pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &msaa.view,
                resolve_target: Some(&resolve_view),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.3,
                        g: 0.3,
                        b: 0.3,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("test readback"),
        size: (SIZE * SIZE * 4) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &resolve,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(SIZE * 4),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let pixels = {
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })
            .unwrap();
        runtime.block_on(rx.receive()).unwrap().unwrap();
        let data = buffer_slice.get_mapped_range();
        data.to_vec()
    };

    let pixel = |x: u32, y: u32| {
        let i = ((y * SIZE + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2]]
    };

    // The corner stays at the clear gray; the quad covers the center.
    let corner = pixel(0, 0);
    let center = pixel(SIZE / 2, SIZE / 2);
    assert_eq!(corner[0], corner[1]);
    assert_eq!(corner[1], corner[2]);
    assert_ne!(center, corner, "quad did not rasterize into the frame");
}
