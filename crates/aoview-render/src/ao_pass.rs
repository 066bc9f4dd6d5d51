//! Ambient occlusion estimation and blur/composite passes.

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::targets::{SceneTargets, AO_FORMAT};

/// View-space sample offsets for the occlusion estimate, four per row with
/// an unused w. Precomputed offline with progressively growing magnitude.
const SAMPLE_OFFSETS: [[f32; 4]; 16] = [
    [-0.030_026, -0.091_874, 0.025_644, 0.0],
    [0.005_745, -0.060_426, 0.083_852, 0.0],
    [0.110_698, -0.025_912, 0.009_211, 0.0],
    [-0.066_202, 0.109_803, 0.029_828, 0.0],
    [0.005_172, 0.112_933, 0.107_859, 0.0],
    [0.098_871, -0.094_032, 0.129_172, 0.0],
    [-0.116_010, -0.168_980, 0.096_531, 0.0],
    [0.232_979, 0.061_169, 0.126_916, 0.0],
    [-0.243_828, -0.177_320, 0.121_368, 0.0],
    [0.079_705, -0.237_290, 0.292_208, 0.0],
    [-0.333_035, 0.151_770, 0.264_504, 0.0],
    [-0.027_741, -0.338_065, 0.401_220, 0.0],
    [0.421_871, -0.422_317, 0.105_886, 0.0],
    [-0.619_888, -0.288_012, 0.120_912, 0.0],
    [-0.485_098, 0.605_901, 0.142_069, 0.0],
    [-0.783_585, 0.276_209, 0.321_887, 0.0],
];

/// GPU uniforms for the occlusion estimate.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct AoUniforms {
    pub proj: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    pub sample_offsets: [[f32; 4]; 16],
    /// Scales screen UVs so the 4x4 noise tile repeats every four pixels.
    pub noise_scale: [f32; 2],
    pub radius: f32,
    pub _padding: f32,
}

impl Default for AoUniforms {
    fn default() -> Self {
        Self {
            proj: Mat4::IDENTITY.to_cols_array_2d(),
            inv_proj: Mat4::IDENTITY.to_cols_array_2d(),
            sample_offsets: SAMPLE_OFFSETS,
            noise_scale: [1024.0 / 4.0, 768.0 / 4.0],
            radius: 0.01,
            _padding: 0.0,
        }
    }
}

/// GPU uniforms for the blur/composite stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct CompositeUniforms {
    pub inv_resolution: [f32; 2],
    pub _padding: [f32; 2],
}

/// Resources for the two post-process passes of the deferred path.
pub struct AoPass {
    ao_pipeline: wgpu::RenderPipeline,
    ao_bind_group_layout: wgpu::BindGroupLayout,
    ao_uniform_buffer: wgpu::Buffer,
    composite_pipeline: wgpu::RenderPipeline,
    composite_bind_group_layout: wgpu::BindGroupLayout,
    composite_uniform_buffer: wgpu::Buffer,
}

impl AoPass {
    /// Creates both pipelines.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let ao_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ssao shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/ssao.wgsl").into()),
        });

        let composite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("composite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/composite.wgsl").into()),
        });

        let ao_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ssao bind group layout"),
                entries: &[
                    // Depth target
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // Normal target
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // Noise tile
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // Depth sampler (non-filtering)
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                        count: None,
                    },
                    // Noise sampler (repeating)
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    // Uniforms
                    wgpu::BindGroupLayoutEntry {
                        binding: 5,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let ao_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ssao pipeline layout"),
            bind_group_layouts: &[&ao_bind_group_layout],
            push_constant_ranges: &[],
        });

        let ao_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ssao pipeline"),
            layout: Some(&ao_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &ao_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &ao_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: AO_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let composite_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("composite bind group layout"),
                entries: &[
                    // Occlusion target
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // Color target
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // Sampler
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    // Uniforms
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let composite_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("composite pipeline layout"),
                bind_group_layouts: &[&composite_bind_group_layout],
                push_constant_ranges: &[],
            });

        let composite_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("composite pipeline"),
            layout: Some(&composite_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &composite_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &composite_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let ao_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ssao uniforms"),
            contents: bytemuck::cast_slice(&[AoUniforms {
                noise_scale: [width as f32 / 4.0, height as f32 / 4.0],
                ..AoUniforms::default()
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let composite_uniform_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("composite uniforms"),
                contents: bytemuck::cast_slice(&[CompositeUniforms {
                    inv_resolution: [1.0 / width as f32, 1.0 / height as f32],
                    _padding: [0.0; 2],
                }]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        Self {
            ao_pipeline,
            ao_bind_group_layout,
            ao_uniform_buffer,
            composite_pipeline,
            composite_bind_group_layout,
            composite_uniform_buffer,
        }
    }

    /// Updates the per-frame occlusion uniforms.
    pub fn update_uniforms(
        &self,
        queue: &wgpu::Queue,
        proj: Mat4,
        inv_proj: Mat4,
        radius: f32,
        width: u32,
        height: u32,
    ) {
        let uniforms = AoUniforms {
            proj: proj.to_cols_array_2d(),
            inv_proj: inv_proj.to_cols_array_2d(),
            sample_offsets: SAMPLE_OFFSETS,
            noise_scale: [width as f32 / 4.0, height as f32 / 4.0],
            radius,
            _padding: 0.0,
        };
        queue.write_buffer(&self.ao_uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Refreshes the composite texel size after a resize.
    pub fn resize(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        queue.write_buffer(
            &self.composite_uniform_buffer,
            0,
            bytemuck::cast_slice(&[CompositeUniforms {
                inv_resolution: [1.0 / width as f32, 1.0 / height as f32],
                _padding: [0.0; 2],
            }]),
        );
    }

    /// Creates the bind group for the occlusion estimate.
    #[must_use]
    pub fn create_ao_bind_group(
        &self,
        device: &wgpu::Device,
        targets: &SceneTargets,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ssao bind group"),
            layout: &self.ao_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.depth_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&targets.normal_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&targets.noise_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&targets.depth_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&targets.noise_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: self.ao_uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Creates the bind group for the blur/composite stage.
    #[must_use]
    pub fn create_composite_bind_group(
        &self,
        device: &wgpu::Device,
        targets: &SceneTargets,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("composite bind group"),
            layout: &self.composite_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.ao_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&targets.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&targets.screen_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.composite_uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Renders the occlusion estimate into the AO target.
    pub fn render_ao(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        ao_view: &wgpu::TextureView,
        bind_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ssao pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ao_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
        pass.set_pipeline(&self.ao_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    /// Blurs the occlusion buffer and multiplies it into the color buffer,
    /// writing the swapchain.
    pub fn render_composite(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        bind_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
        pass.set_pipeline(&self.composite_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
