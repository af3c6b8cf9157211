// src/rendering_lib/renderer.rs

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use super::vertex::Vertex;
use crate::engine_lib::camera::Camera;
use crate::engine_lib::portal::portal_rotation;
use crate::engine_lib::scene_types::{Brush, Portal, Scene};

// Enough for a few hundred brushes plus cubes and both portal quads.
const RENDERER_MAX_VERTICES: usize = 24 * 1024;
const RENDERER_MAX_INDICES: usize = 36 * 1024;

/// Seconds a freshly placed portal takes to fade in.
const PORTAL_FADE_TIME: f64 = 0.3;
const PORTAL_MAX_ALPHA: f32 = 0.85;

const PORTAL1_COLOR: [f32; 3] = [0.25, 0.55, 1.0];
const PORTAL2_COLOR: [f32; 3] = [1.0, 0.6, 0.15];

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
}

pub struct Renderer {
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,

    frame_vertices: Vec<Vertex>,
    frame_indices: Vec<u16>,

    camera_uniform_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    depth_view: wgpu::TextureView,

    fov_y_degrees: f32,
    znear: f32,
    zfar: f32,
}

impl Renderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shader_source: &str,
        initial_width: u32,
        initial_height: u32,
    ) -> Self {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Renderer Shader Module"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let camera_uniform_data = CameraUniform {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            light_dir: [0.0, 1.0, 0.0, 0.0],
        };
        let camera_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::bytes_of(&camera_uniform_data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_uniform_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Renderer Pipeline Layout"),
                bind_group_layouts: &[&camera_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Renderer Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Vertex Buffer"),
            size: (RENDERER_MAX_VERTICES * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Index Buffer"),
            size: (RENDERER_MAX_INDICES * std::mem::size_of::<u16>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_view = create_depth_view(device, initial_width, initial_height);

        Self {
            render_pipeline,
            vertex_buffer,
            index_buffer,
            frame_vertices: Vec::with_capacity(RENDERER_MAX_VERTICES),
            frame_indices: Vec::with_capacity(RENDERER_MAX_INDICES),
            camera_uniform_buffer,
            camera_bind_group,
            depth_view,
            fov_y_degrees: 75.0,
            znear: 0.1,
            zfar: 200.0,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = create_depth_view(device, width, height);
    }

    fn add_quad(&mut self, corners: [Vec3; 4], normal: Vec3, color: [f32; 4]) {
        let start = self.frame_vertices.len() as u16;
        for corner in corners {
            self.frame_vertices
                .push(Vertex::new(corner.to_array(), normal.to_array(), color));
        }
        for i in [0u16, 1, 2, 0, 2, 3] {
            self.frame_indices.push(start + i);
        }
    }

    fn add_box(&mut self, min: Vec3, max: Vec3, color: [f32; 4]) {
        let (a, b) = (min, max);
        // One quad per face, wound to face outward.
        self.add_quad(
            [
                Vec3::new(a.x, a.y, b.z),
                Vec3::new(b.x, a.y, b.z),
                Vec3::new(b.x, b.y, b.z),
                Vec3::new(a.x, b.y, b.z),
            ],
            Vec3::Z,
            color,
        );
        self.add_quad(
            [
                Vec3::new(b.x, a.y, a.z),
                Vec3::new(a.x, a.y, a.z),
                Vec3::new(a.x, b.y, a.z),
                Vec3::new(b.x, b.y, a.z),
            ],
            Vec3::NEG_Z,
            color,
        );
        self.add_quad(
            [
                Vec3::new(b.x, a.y, b.z),
                Vec3::new(b.x, a.y, a.z),
                Vec3::new(b.x, b.y, a.z),
                Vec3::new(b.x, b.y, b.z),
            ],
            Vec3::X,
            color,
        );
        self.add_quad(
            [
                Vec3::new(a.x, a.y, a.z),
                Vec3::new(a.x, a.y, b.z),
                Vec3::new(a.x, b.y, b.z),
                Vec3::new(a.x, b.y, a.z),
            ],
            Vec3::NEG_X,
            color,
        );
        self.add_quad(
            [
                Vec3::new(a.x, b.y, b.z),
                Vec3::new(b.x, b.y, b.z),
                Vec3::new(b.x, b.y, a.z),
                Vec3::new(a.x, b.y, a.z),
            ],
            Vec3::Y,
            color,
        );
        self.add_quad(
            [
                Vec3::new(a.x, a.y, a.z),
                Vec3::new(b.x, a.y, a.z),
                Vec3::new(b.x, a.y, b.z),
                Vec3::new(a.x, a.y, b.z),
            ],
            Vec3::NEG_Y,
            color,
        );
    }

    fn add_brush(&mut self, brush: &Brush) {
        let color = [brush.color.x, brush.color.y, brush.color.z, 1.0];
        self.add_box(brush.min, brush.max, color);
    }

    fn add_portal(&mut self, portal: &Portal, rgb: [f32; 3], time: f64) {
        if !portal.open {
            return;
        }
        let fade = ((time - portal.spawn_time) / PORTAL_FADE_TIME).clamp(0.0, 1.0) as f32;
        let color = [rgb[0], rgb[1], rgb[2], fade * PORTAL_MAX_ALPHA];

        let rotation = portal_rotation(portal);
        let u = rotation.x_axis.truncate() * portal.width;
        let v = rotation.y_axis.truncate() * portal.height;
        let center = portal.position;
        self.add_quad(
            [
                center - u - v,
                center + u - v,
                center + u + v,
                center - u + v,
            ],
            portal.normal,
            color,
        );
    }

    pub fn render_scene(
        &mut self,
        _device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        output_view: &wgpu::TextureView,
        scene: &Scene,
        camera: &Camera,
        screen_width: f32,
        screen_height: f32,
        clear_color: wgpu::Color,
    ) {
        let aspect = screen_width / screen_height.max(1.0);
        let proj = Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.znear, self.zfar);
        let view_proj = proj * camera.view();
        let camera_uniform_data = CameraUniform {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir: [scene.light_dir.x, scene.light_dir.y, scene.light_dir.z, 0.0],
        };
        queue.write_buffer(
            &self.camera_uniform_buffer,
            0,
            bytemuck::bytes_of(&camera_uniform_data),
        );

        self.frame_vertices.clear();
        self.frame_indices.clear();

        for brush in &scene.brushes {
            self.add_brush(brush);
        }
        for cube in &scene.cubes {
            let half = Vec3::splat(cube.size);
            let mut color = [cube.color.x, cube.color.y, cube.color.z, 1.0];
            if cube.grabbed {
                color = [
                    (color[0] + 0.3).min(1.0),
                    (color[1] + 0.3).min(1.0),
                    (color[2] + 0.3).min(1.0),
                    1.0,
                ];
            }
            self.add_box(cube.position - half, cube.position + half, color);
        }
        // Translucent quads last so the depth buffer is already populated.
        self.add_portal(&scene.portal1, PORTAL1_COLOR, scene.time);
        self.add_portal(&scene.portal2, PORTAL2_COLOR, scene.time);

        if !self.frame_vertices.is_empty() && !self.frame_indices.is_empty() {
            if (self.frame_vertices.len() * std::mem::size_of::<Vertex>()) as u64
                > self.vertex_buffer.size()
                || (self.frame_indices.len() * std::mem::size_of::<u16>()) as u64
                    > self.index_buffer.size()
            {
                log::warn!("frame data exceeds pre-allocated buffer capacity");
            }

            queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&self.frame_vertices),
            );
            let mut padded_indices_data = self.frame_indices.clone();
            // Keep index writes 4-byte aligned for webgl.
            if padded_indices_data.len() % 2 == 1 {
                padded_indices_data.push(0);
            }
            queue.write_buffer(
                &self.index_buffer,
                0,
                bytemuck::cast_slice(&padded_indices_data),
            );
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass (Renderer)"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: output_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if !self.frame_vertices.is_empty() && !self.frame_indices.is_empty() {
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

                let vertex_buffer_slice_size =
                    (self.frame_vertices.len() * std::mem::size_of::<Vertex>()) as u64;
                let effective_indices_count = self.frame_indices.len();
                let index_buffer_slice_size = if self.frame_indices.len() % 2 == 1 {
                    ((self.frame_indices.len() + 1) * std::mem::size_of::<u16>()) as u64
                } else {
                    (self.frame_indices.len() * std::mem::size_of::<u16>()) as u64
                };

                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..vertex_buffer_slice_size));
                render_pass.set_index_buffer(
                    self.index_buffer.slice(..index_buffer_slice_size),
                    wgpu::IndexFormat::Uint16,
                );
                render_pass.draw_indexed(0..effective_indices_count as u32, 0, 0..1);
            }
        }
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
