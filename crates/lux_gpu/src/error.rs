//! GPU backend errors.

use lux_renderer::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("path tracing shader failed to compile: {0}")]
    ShaderCompilation(String),

    #[error("scene cannot be flattened for the GPU: {0}")]
    Unsupported(String),

    #[error("failed to read back the output buffer: {0}")]
    Readback(String),

    #[error(transparent)]
    Scene(#[from] RenderError),
}

pub type GpuResult<T> = Result<T, GpuError>;
