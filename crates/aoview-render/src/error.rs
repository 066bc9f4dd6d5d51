//! Render engine error types.

use thiserror::Error;

/// Errors raised while setting up or driving the GPU.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create rendering surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable graphics adapter found")]
    AdapterCreationFailed,

    #[error("failed to acquire graphics device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),

    #[error("graphics device is out of memory")]
    OutOfMemory,
}

/// Result alias for render operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
