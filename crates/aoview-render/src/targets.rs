//! Offscreen render targets shared by the frame passes.

/// Depth format used by both frame paths.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Color and normal G-buffer format.
pub const GBUFFER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Single-channel occlusion format.
pub const AO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// Fixed 4x4 tile of rotation directions for the occlusion pass, row major,
/// three components per texel. Precomputed offline; the values are already
/// scaled and biased from [-1, 1] into [0, 1].
const NOISE_DIRECTIONS: [f32; 48] = [
    0.682909, 0.965344, 0.500000, 0.164830, 0.871026, 0.500000, //
    0.896964, 0.804005, 0.500000, 0.127030, 0.833006, 0.500000, //
    0.960280, 0.695300, 0.500000, 0.198356, 0.898761, 0.500000, //
    0.245320, 0.069723, 0.500000, 0.928136, 0.241738, 0.500000, //
    0.704112, 0.956441, 0.500000, 0.984019, 0.374598, 0.500000, //
    0.171691, 0.122888, 0.500000, 0.806018, 0.895415, 0.500000, //
    0.951012, 0.715844, 0.500000, 0.633597, 0.981822, 0.500000, //
    0.173631, 0.878791, 0.500000, 0.338373, 0.973156, 0.500000,
];

/// Every texture the deferred path renders into or samples from, plus the
/// samplers shared across passes.
///
/// All targets match the surface size and are recreated on resize. The
/// noise tile is 4x4 and repeats across the screen.
pub struct SceneTargets {
    pub depth_view: wgpu::TextureView,
    pub color_view: wgpu::TextureView,
    pub normal_view: wgpu::TextureView,
    pub ao_view: wgpu::TextureView,
    pub noise_view: wgpu::TextureView,
    /// Linear, clamping sampler for screen-sized targets.
    pub screen_sampler: wgpu::Sampler,
    /// Nearest sampler for the (unfilterable) depth target.
    pub depth_sampler: wgpu::Sampler,
    /// Linear, repeating sampler so the 4x4 noise tile covers the screen.
    pub noise_sampler: wgpu::Sampler,
}

impl SceneTargets {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) -> Self {
        let depth_view = create_target(device, width, height, DEPTH_FORMAT, "depth target");
        let color_view = create_target(device, width, height, GBUFFER_FORMAT, "color target");
        let normal_view = create_target(device, width, height, GBUFFER_FORMAT, "normal target");
        let ao_view = create_target(device, width, height, AO_FORMAT, "occlusion target");
        let noise_view = create_noise_texture(device, queue);

        let screen_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("screen sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let depth_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("depth sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let noise_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("noise sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            ..Default::default()
        });

        Self {
            depth_view,
            color_view,
            normal_view,
            ao_view,
            noise_view,
            screen_sampler,
            depth_sampler,
            noise_sampler,
        }
    }

    /// Recreates the screen-sized targets. The noise tile and samplers are
    /// size independent and survive.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = create_target(device, width, height, DEPTH_FORMAT, "depth target");
        self.color_view = create_target(device, width, height, GBUFFER_FORMAT, "color target");
        self.normal_view = create_target(device, width, height, GBUFFER_FORMAT, "normal target");
        self.ao_view = create_target(device, width, height, AO_FORMAT, "occlusion target");
    }
}

fn create_target(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn create_noise_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
    let mut data = Vec::with_capacity(4 * 4 * 4);
    for direction in NOISE_DIRECTIONS.chunks_exact(3) {
        for &component in direction {
            data.push((component * 255.0).round() as u8);
        }
        data.push(255u8);
    }

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("noise texture"),
        size: wgpu::Extent3d {
            width: 4,
            height: 4,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * 4),
            rows_per_image: Some(4),
        },
        wgpu::Extent3d {
            width: 4,
            height: 4,
            depth_or_array_layers: 1,
        },
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
