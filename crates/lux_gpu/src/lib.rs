//! lux GPU backend - wgpu compute path tracing
//!
//! The scene is flattened into plain-old-data tables ([`flatten_scene`]),
//! uploaded as storage buffers and rendered by a single compute dispatch.
//! Results are linear colors, same as the CPU backend.

mod compute;
mod context;
mod error;
mod flatten;
pub mod layout;

pub use compute::{GpuRenderer, PATH_TRACE_WGSL, WG_SIZE};
pub use context::GpuContext;
pub use error::{GpuError, GpuResult};
pub use flatten::{flatten_scene, GpuScene};

use lux_renderer::{Camera, ImageBuffer, RenderConfig, Scene};

/// Flatten, compile and render in one call.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> GpuResult<ImageBuffer> {
    let gpu_scene = flatten_scene(scene)?;
    let renderer = GpuRenderer::new(GpuContext::new()?)?;
    renderer.render(camera, &gpu_scene, config)
}
