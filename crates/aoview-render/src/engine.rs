//! The wgpu render engine: device setup and per-frame orchestration.

use std::sync::Arc;

use log::{error, info, warn};

use aoview_core::{MeshBuffer, ViewerSettings};

use crate::ao_pass::AoPass;
use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::frame::FramePath;
use crate::geometry::GeometryPass;
use crate::targets::SceneTargets;

/// Owns the GPU device, the render targets, and the frame passes.
pub struct RenderEngine {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    targets: SceneTargets,
    geometry: GeometryPass,
    ao: AoPass,
    ao_bind_group: wgpu::BindGroup,
    composite_bind_group: wgpu::BindGroup,
    /// Main camera.
    pub camera: Camera,
    width: u32,
    height: u32,
}

impl RenderEngine {
    /// Creates a windowed engine on the given window.
    pub async fn new(
        window: Arc<winit::window::Window>,
        settings: &ViewerSettings,
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        info!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("aoview device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        // Device errors are logged, not fatal.
        device.on_uncaptured_error(Arc::new(|err| {
            error!("uncaptured device error: {err}");
        }));

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let targets = SceneTargets::new(&device, &queue, width, height);
        let geometry = GeometryPass::new(&device, surface_format, settings);
        let ao = AoPass::new(&device, surface_format, width, height);
        let ao_bind_group = ao.create_ao_bind_group(&device, &targets);
        let composite_bind_group = ao.create_composite_bind_group(&device, &targets);

        let camera = Camera::new(width as f32 / height as f32);

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            targets,
            geometry,
            ao,
            ao_bind_group,
            composite_bind_group,
            camera,
            width,
            height,
        })
    }

    /// Uploads a prepared mesh as the scene model.
    pub fn set_model(&mut self, mesh: MeshBuffer) {
        self.geometry.set_model(&self.device, mesh);
    }

    /// Resizes the surface and every screen-sized target.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        self.width = width;
        self.height = height;

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);

        self.targets.resize(&self.device, width, height);
        self.ao.resize(&self.queue, width, height);
        // Targets were recreated, so the post-process bind groups must be too.
        self.ao_bind_group = self.ao.create_ao_bind_group(&self.device, &self.targets);
        self.composite_bind_group = self
            .ao
            .create_composite_bind_group(&self.device, &self.targets);

        self.camera.set_aspect(width as f32 / height as f32);
    }

    /// Renders one frame along the path selected by the settings.
    pub fn render(&mut self, settings: &ViewerSettings) -> RenderResult<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(err) => {
                warn!("skipping frame: {err}");
                return Ok(());
            }
        };
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (view, normal_mat) = self.camera.view_matrices();
        let proj = self.camera.clip_projection();
        self.geometry
            .update_scene(&self.queue, view, proj, normal_mat, &settings.light);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        match FramePath::from_settings(settings.ao) {
            FramePath::Direct => {
                self.geometry
                    .render_direct(&mut encoder, &surface_view, &self.targets.depth_view);
            }
            FramePath::DeferredAo => {
                self.ao.update_uniforms(
                    &self.queue,
                    proj,
                    self.camera.clip_projection_inverse(),
                    settings.ao.radius,
                    self.width,
                    self.height,
                );
                self.geometry.render_deferred(
                    &mut encoder,
                    &self.targets.color_view,
                    &self.targets.normal_view,
                    &self.targets.depth_view,
                );
                self.ao
                    .render_ao(&mut encoder, &self.targets.ao_view, &self.ao_bind_group);
                self.ao
                    .render_composite(&mut encoder, &surface_view, &self.composite_bind_group);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
