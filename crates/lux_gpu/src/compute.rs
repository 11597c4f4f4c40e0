//! Compute pipeline for the path tracing kernel.
//!
//! One dispatch renders the whole image: every invocation owns one pixel,
//! loops over its samples and writes the averaged linear color into a
//! storage buffer that is copied back to the host.

use std::borrow::Cow;
use std::time::Instant;

use lux_renderer::{Camera, Color, ImageBuffer, RenderConfig};
use wgpu::util::DeviceExt;

use crate::context::GpuContext;
use crate::error::{GpuError, GpuResult};
use crate::flatten::GpuScene;
use crate::layout::*;

/// Path tracing kernel source.
pub const PATH_TRACE_WGSL: &str = include_str!("shaders/path_trace.wgsl");

/// Workgroup edge length (must match @workgroup_size in WGSL).
pub const WG_SIZE: u32 = 8;

/// Bytes per output pixel (`vec4<f32>`).
const PIXEL_BYTES: u64 = 16;

/// Compiled path tracing pipeline bound to a device.
pub struct GpuRenderer {
    context: GpuContext,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl GpuRenderer {
    /// Compile the built-in kernel.
    pub fn new(context: GpuContext) -> GpuResult<Self> {
        Self::with_source(context, PATH_TRACE_WGSL)
    }

    /// Compile a kernel from WGSL source. Validation errors are captured
    /// and returned instead of reaching the device's error handler.
    pub fn with_source(context: GpuContext, source: &str) -> GpuResult<Self> {
        let device = &context.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("path_trace_shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
        });

        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }];
        // @binding(1..=7) read-only scene tables, @binding(8) output
        for binding in 1..=8 {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage {
                        read_only: binding != 8,
                    },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("path_trace_bind_group_layout"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("path_trace_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("path_trace_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
            compilation_options: Default::default(),
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::ShaderCompilation(error.to_string()));
        }

        Ok(Self {
            context,
            pipeline,
            bind_group_layout,
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// Render `scene` and read the linear image back.
    pub fn render(
        &self,
        camera: &Camera,
        scene: &GpuScene,
        config: &RenderConfig,
    ) -> GpuResult<ImageBuffer> {
        let device = &self.context.device;
        let queue = &self.context.queue;
        let width = camera.image_width();
        let height = camera.image_height();

        log::info!(
            "GPU render: {}x{}, {} spp, max depth {}",
            width,
            height,
            camera.samples_per_pixel(),
            camera.max_depth()
        );
        let start = Instant::now();

        let uniforms = GpuUniforms::new(camera, config, scene.light_offset, scene.light_count);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pt_uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let tables = [
            ("pt_primitives", padded(scene.primitive_bytes(), std::mem::size_of::<GpuPrimitive>())),
            ("pt_transforms", padded(scene.transform_bytes(), std::mem::size_of::<GpuTransform>())),
            ("pt_materials", padded(scene.material_bytes(), std::mem::size_of::<GpuMaterial>())),
            ("pt_textures", padded(scene.texture_bytes(), std::mem::size_of::<GpuTexture>())),
            ("pt_texels", padded(scene.texel_bytes(), PIXEL_BYTES as usize)),
            ("pt_perlins", padded(scene.perlin_bytes(), std::mem::size_of::<GpuPerlin>())),
            ("pt_nodes", padded(scene.node_bytes(), std::mem::size_of::<GpuBvhNode>())),
        ];
        let table_buffers: Vec<wgpu::Buffer> = tables
            .iter()
            .map(|(label, bytes)| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(*label),
                    contents: &bytes[..],
                    usage: wgpu::BufferUsages::STORAGE,
                })
            })
            .collect();

        let output_size = width as u64 * height as u64 * PIXEL_BYTES;
        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pt_output"),
            size: output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pt_staging"),
            size: output_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut bind_entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }];
        for (i, buffer) in table_buffers.iter().enumerate() {
            bind_entries.push(wgpu::BindGroupEntry {
                binding: i as u32 + 1,
                resource: buffer.as_entire_binding(),
            });
        }
        bind_entries.push(wgpu::BindGroupEntry {
            binding: 8,
            resource: output_buffer.as_entire_binding(),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("path_trace_bind_group"),
            layout: &self.bind_group_layout,
            entries: &bind_entries,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("path_trace_encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("path_trace_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(
                (width + WG_SIZE - 1) / WG_SIZE,
                (height + WG_SIZE - 1) / WG_SIZE,
                1,
            );
        }
        encoder.copy_buffer_to_buffer(&output_buffer, 0, &staging_buffer, 0, output_size);
        queue.submit(Some(encoder.finish()));

        let pixels = read_back(device, &staging_buffer)?;
        log::info!("GPU render completed in {:.2?}", start.elapsed());

        Ok(ImageBuffer {
            width,
            height,
            pixels,
        })
    }
}

/// Storage bindings must hold at least one element.
fn padded(bytes: &[u8], stride: usize) -> Cow<'_, [u8]> {
    if bytes.is_empty() {
        Cow::Owned(vec![0u8; stride])
    } else {
        Cow::Borrowed(bytes)
    }
}

/// Map the staging buffer and convert it to linear colors.
fn read_back(device: &wgpu::Device, staging: &wgpu::Buffer) -> GpuResult<Vec<Color>> {
    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);

    rx.recv()
        .map_err(|_| GpuError::Readback("map_async channel closed".into()))?
        .map_err(|e| GpuError::Readback(e.to_string()))?;

    let pixels = {
        let data = slice.get_mapped_range();
        let texels: &[[f32; 4]] = bytemuck::cast_slice(&data);
        texels
            .iter()
            .map(|t| Color::new(t[0], t[1], t[2]))
            .collect()
    };
    staging.unmap();

    Ok(pixels)
}
