use crate::lighting::Lighting;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use cavern_assets::{Material, Mesh};
use cavern_common::Color;
use cavern_kernel::Population;
use cavern_populate::SceneryPiece;
use cavern_render::RenderView;
use glam::{Mat3, Mat4, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    torch_pos: [f32; 4],
    torch_dir: [f32; 4],
    torch_color: [f32; 4],
    sky: [f32; 4],
    ground: [f32; 4],
    fog: [f32; 4],
}

/// World-space vertex. Meshes are flattened every frame, so no instance data.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 4],
    emissive: [f32; 3],
}

/// Append `mesh` transformed by `matrix` as a flat triangle list.
fn push_mesh(out: &mut Vec<Vertex>, mesh: &Mesh, matrix: &Mat4, material: &Material) {
    let linear = Mat3::from_mat4(*matrix);
    let normal_matrix = if linear.determinant().abs() > f32::EPSILON {
        linear.inverse().transpose()
    } else {
        linear
    };
    let base = material.base_color.to_array();
    let color = [base[0], base[1], base[2], material.roughness];
    let emissive = material.emitted().to_array();
    for &index in &mesh.indices {
        let i = index as usize;
        let (Some(p), Some(n)) = (mesh.positions.get(i), mesh.normals.get(i)) else {
            continue;
        };
        out.push(Vertex {
            position: matrix.transform_point3(*p).to_array(),
            normal: (normal_matrix * *n).normalize_or_zero().to_array(),
            color,
            emissive,
        });
    }
}

fn population_vertices(population: &Population, out: &mut Vec<Vertex>) {
    for (id, _, visual) in population.visuals() {
        push_mesh(out, &visual.mesh, &population.world_matrix(id), &visual.material);
    }
}

fn scenery_vertices(scenery: &[SceneryPiece]) -> Vec<Vertex> {
    let mut out = Vec::new();
    for piece in scenery {
        push_mesh(&mut out, &piece.visual.mesh, &piece.transform.matrix(), &piece.visual.material);
    }
    out
}

fn rgba(color: Color, w: f32) -> [f32; 4] {
    [color.r, color.g, color.b, w]
}

/// wgpu-based cave renderer.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    scenery_buffer: Option<wgpu::Buffer>,
    scenery_vertex_count: u32,
    dynamic_buffer: wgpu::Buffer,
    dynamic_capacity: u64,
    marker: Mesh,
    lighting: Lighting,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    scratch: Vec<Vertex>,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cave_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CAVE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cave_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x4,
                        3 => Float32x3,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Deformed and inverted meshes are drawn two-sided.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let dynamic_capacity = 64 * 1024;
        let dynamic_buffer = Self::create_dynamic_buffer(device, dynamic_capacity);
        let depth_texture = Self::create_depth_texture(device, width, height);
        let lighting = Lighting::default();

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            scenery_buffer: None,
            scenery_vertex_count: 0,
            dynamic_buffer,
            dynamic_capacity,
            marker: Mesh::sphere(lighting.marker_radius, 8, 8),
            lighting,
            depth_texture,
            surface_format,
            scratch: Vec::new(),
        }
    }

    /// Upload the static scenery once.
    pub fn set_scenery(&mut self, device: &wgpu::Device, scenery: &[SceneryPiece]) {
        let vertices = scenery_vertices(scenery);
        self.scenery_vertex_count = vertices.len() as u32;
        self.scenery_buffer = (!vertices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("scenery_vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });
        tracing::debug!(vertices = self.scenery_vertex_count, "scenery uploaded");
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    /// Render one frame: scenery, population and the torch marker.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        population: &Population,
        view: &RenderView,
    ) {
        let l = &self.lighting;
        let cam = &view.camera;
        let (cos_inner, cos_outer) = l.cone_cosines();
        let torch_dir = (view.torch_target - view.torch_position).normalize_or(Vec3::NEG_Z);
        let uniforms = Uniforms {
            view_proj: cam.view_projection().to_cols_array_2d(),
            camera_pos: cam.position.extend(1.0).to_array(),
            torch_pos: view.torch_position.extend(l.torch_range).to_array(),
            torch_dir: torch_dir.extend(cos_outer).to_array(),
            torch_color: rgba(l.torch_color.scaled(l.torch_intensity), cos_inner),
            sky: rgba(l.sky.scaled(l.hemisphere_intensity), 0.0),
            ground: rgba(l.ground.scaled(l.hemisphere_intensity), 0.0),
            fog: rgba(l.fog_color, l.fog_density),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        self.scratch.clear();
        population_vertices(population, &mut self.scratch);
        let marker_material = Material {
            base_color: Color::BLACK,
            emissive: l.marker_color,
            ..Material::default()
        };
        push_mesh(
            &mut self.scratch,
            &self.marker,
            &Mat4::from_translation(view.torch_target),
            &marker_material,
        );

        let bytes: &[u8] = bytemuck::cast_slice(&self.scratch);
        if bytes.len() as u64 > self.dynamic_capacity {
            self.dynamic_capacity = (bytes.len() as u64).next_power_of_two();
            self.dynamic_buffer = Self::create_dynamic_buffer(device, self.dynamic_capacity);
            tracing::debug!(bytes = self.dynamic_capacity, "grew dynamic vertex buffer");
        }
        queue.write_buffer(&self.dynamic_buffer, 0, bytes);
        let dynamic_count = self.scratch.len() as u32;

        let bg = self.lighting.background;
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(bg.r),
                            g: f64::from(bg.g),
                            b: f64::from(bg.b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            if let Some(scenery) = &self.scenery_buffer {
                pass.set_vertex_buffer(0, scenery.slice(..));
                pass.draw(0..self.scenery_vertex_count, 0..1);
            }

            if dynamic_count > 0 {
                pass.set_vertex_buffer(0, self.dynamic_buffer.slice(..));
                pass.draw(0..dynamic_count, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_dynamic_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dynamic_vertex_buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
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
        texture.create_view(&Default::default())
    }
}
