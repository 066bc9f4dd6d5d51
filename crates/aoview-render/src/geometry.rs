//! Forward/deferred geometry pass with Phong shading.

use glam::Mat4;
use wgpu::util::DeviceExt;

use aoview_core::{Light, Material, MeshBuffer, Vertex, ViewerSettings};

use crate::targets::{DEPTH_FORMAT, GBUFFER_FORMAT};

/// Per-frame scene uniforms shared by every geometry draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct SceneUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub normal_mat: [[f32; 4]; 4],
    pub light_position: [f32; 3],
    pub _pad0: f32,
    pub light_ambient: [f32; 3],
    pub _pad1: f32,
    pub light_diffuse: [f32; 3],
    pub _pad2: f32,
    pub light_specular: [f32; 3],
    pub _pad3: f32,
}

impl SceneUniforms {
    fn new(view: Mat4, proj: Mat4, normal_mat: Mat4, light: &Light) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            normal_mat: normal_mat.to_cols_array_2d(),
            light_position: light.position.to_array(),
            _pad0: 0.0,
            light_ambient: light.ambient.to_array(),
            _pad1: 0.0,
            light_diffuse: light.diffuse.to_array(),
            _pad2: 0.0,
            light_specular: light.specular.to_array(),
            _pad3: 0.0,
        }
    }
}

/// Per-surface Phong coefficients.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct MaterialUniforms {
    pub ambient: [f32; 3],
    pub _pad0: f32,
    pub diffuse: [f32; 3],
    pub _pad1: f32,
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl From<&Material> for MaterialUniforms {
    fn from(material: &Material) -> Self {
        Self {
            ambient: material.ambient.to_array(),
            _pad0: 0.0,
            diffuse: material.diffuse.to_array(),
            _pad1: 0.0,
            specular: material.specular.to_array(),
            shininess: material.shininess,
        }
    }
}

/// Ground plane: a large quad below the model.
fn floor_vertices() -> Vec<Vertex> {
    const Y: f32 = -0.4;
    const EXTENT: f32 = 10.0;
    const NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

    let corners = [
        [-EXTENT, Y, -EXTENT],
        [-EXTENT, Y, EXTENT],
        [EXTENT, Y, EXTENT],
        [EXTENT, Y, -EXTENT],
    ];
    [0usize, 1, 2, 0, 2, 3]
        .into_iter()
        .map(|i| Vertex {
            position: corners[i],
            normal: NORMAL,
        })
        .collect()
}

/// Geometry pass resources: the two Phong pipelines plus the scene
/// geometry they draw.
pub struct GeometryPass {
    direct_pipeline: wgpu::RenderPipeline,
    deferred_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    model_bind_group: wgpu::BindGroup,
    floor_bind_group: wgpu::BindGroup,
    floor_buffer: wgpu::Buffer,
    floor_vertex_count: u32,
    model_buffer: Option<wgpu::Buffer>,
    model_vertex_count: u32,
}

impl GeometryPass {
    /// Creates the pass.
    ///
    /// The direct pipeline renders straight to the swapchain; the deferred
    /// pipeline writes color and view-space normals to the offscreen
    /// G-buffer. Both share the vertex stage and depth state.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        settings: &ViewerSettings,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("phong shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/phong.wgsl").into()),
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scene bind group layout"),
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

        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("material bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("phong pipeline layout"),
            bind_group_layouts: &[&scene_bind_group_layout, &material_bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
        };

        let depth_state = wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let direct_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("phong direct pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout.clone()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_direct"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_state.clone()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let deferred_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("phong deferred pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_deferred"),
                targets: &[
                    Some(wgpu::ColorTargetState {
                        format: GBUFFER_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    }),
                    Some(wgpu::ColorTargetState {
                        format: GBUFFER_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    }),
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_state),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene uniforms"),
            contents: bytemuck::cast_slice(&[SceneUniforms::new(
                Mat4::IDENTITY,
                Mat4::IDENTITY,
                Mat4::IDENTITY,
                &settings.light,
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let model_material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("model material uniforms"),
            contents: bytemuck::cast_slice(&[MaterialUniforms::from(&settings.model_material)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let floor_material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("floor material uniforms"),
            contents: bytemuck::cast_slice(&[MaterialUniforms::from(&settings.floor_material)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene bind group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("model material bind group"),
            layout: &material_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_material_buffer.as_entire_binding(),
            }],
        });

        let floor_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("floor material bind group"),
            layout: &material_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: floor_material_buffer.as_entire_binding(),
            }],
        });

        let floor = floor_vertices();
        let floor_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("floor vertex buffer"),
            contents: bytemuck::cast_slice(&floor),
            usage: wgpu::BufferUsages::VERTEX,
        });
        #[allow(clippy::cast_possible_truncation)]
        let floor_vertex_count = floor.len() as u32;

        Self {
            direct_pipeline,
            deferred_pipeline,
            scene_buffer,
            scene_bind_group,
            model_bind_group,
            floor_bind_group,
            floor_buffer,
            floor_vertex_count,
            model_buffer: None,
            model_vertex_count: 0,
        }
    }

    /// Uploads a prepared mesh, consuming the CPU-side buffer. An empty
    /// mesh clears the current model.
    pub fn set_model(&mut self, device: &wgpu::Device, mesh: MeshBuffer) {
        if mesh.is_empty() {
            self.model_buffer = None;
            self.model_vertex_count = 0;
            return;
        }
        self.model_buffer = Some(device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("model vertex buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        #[allow(clippy::cast_possible_truncation)]
        let count = mesh.vertices.len() as u32;
        self.model_vertex_count = count;
    }

    /// Writes this frame's view/projection/light uniforms.
    pub fn update_scene(
        &self,
        queue: &wgpu::Queue,
        view: Mat4,
        proj: Mat4,
        normal_mat: Mat4,
        light: &Light,
    ) {
        queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::cast_slice(&[SceneUniforms::new(view, proj, normal_mat, light)]),
        );
    }

    /// Forward path: one pass straight to the swapchain.
    pub fn render_direct(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("direct geometry pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        pass.set_pipeline(&self.direct_pipeline);
        self.draw_scene(&mut pass);
    }

    /// Deferred path: color and view-space normals into the G-buffer.
    pub fn render_deferred(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        normal_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("deferred geometry pass"),
            color_attachments: &[
                Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }),
                Some(wgpu::RenderPassColorAttachment {
                    view: normal_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        pass.set_pipeline(&self.deferred_pipeline);
        self.draw_scene(&mut pass);
    }

    fn draw_scene(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.scene_bind_group, &[]);

        if let Some(model) = &self.model_buffer {
            pass.set_bind_group(1, &self.model_bind_group, &[]);
            pass.set_vertex_buffer(0, model.slice(..));
            pass.draw(0..self.model_vertex_count, 0..1);
        }

        pass.set_bind_group(1, &self.floor_bind_group, &[]);
        pass.set_vertex_buffer(0, self.floor_buffer.slice(..));
        pass.draw(0..self.floor_vertex_count, 0..1);
    }
}
