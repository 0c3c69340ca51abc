use crate::cursor::backend::CursorSurface;
use crate::cursor::shader::CURSOR_WGSL;
use crate::cursor::state::CursorUniforms;
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};

/// Two triangles covering clip space.
const QUAD: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

struct Resources {
    device: wgpu::Device,
    queue: wgpu::Queue,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    quad: wgpu::Buffer,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    readback: wgpu::Buffer,
    bytes_per_row: u32,
}

/// `wgpu` cursor surface: owns device, queue, target texture, quad and render pipeline.
pub struct GpuCursorSurface {
    size: u32,
    res: Option<Resources>,
}

impl std::fmt::Debug for GpuCursorSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuCursorSurface")
            .field("size", &self.size)
            .field("released", &self.res.is_none())
            .finish()
    }
}

impl GpuCursorSurface {
    /// Request an adapter and device and build every cursor resource.
    #[tracing::instrument(skip_all, fields(size = size))]
    pub fn new(size: u32) -> ScrollweaveResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                ScrollweaveError::gpu("no gpu adapter available")
            }
            other => ScrollweaveError::gpu(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("scrollweave_cursor_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| ScrollweaveError::gpu(format!("wgpu request_device failed: {e:?}")))?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scrollweave_cursor_target"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut quad_bytes = Vec::with_capacity(QUAD.len() * 8);
        for [x, y] in QUAD {
            quad_bytes.extend_from_slice(&x.to_le_bytes());
            quad_bytes.extend_from_slice(&y.to_le_bytes());
        }
        let quad = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scrollweave_cursor_quad"),
            size: quad_bytes.len() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&quad, 0, &quad_bytes);

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scrollweave_cursor_uniforms"),
            size: CursorUniforms::BYTES as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scrollweave_cursor_bgl"),
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
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scrollweave_cursor_bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scrollweave_cursor_shader"),
            source: wgpu::ShaderSource::Wgsl(CURSOR_WGSL.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scrollweave_cursor_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scrollweave_cursor_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: 8,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x2,
                        offset: 0,
                        shader_location: 0,
                    }],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let row_bytes = size
            .checked_mul(4)
            .ok_or_else(|| ScrollweaveError::gpu("cursor surface width overflow"))?;
        let bytes_per_row = align_to(row_bytes, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scrollweave_cursor_readback"),
            size: u64::from(bytes_per_row) * u64::from(size),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        tracing::debug!(size, "gpu cursor surface allocated");
        Ok(Self {
            size,
            res: Some(Resources {
                device,
                queue,
                texture,
                view,
                quad,
                uniforms,
                bind_group,
                pipeline,
                readback,
                bytes_per_row,
            }),
        })
    }

    fn resources(&self) -> ScrollweaveResult<&Resources> {
        self.res
            .as_ref()
            .ok_or_else(|| ScrollweaveError::gpu("cursor surface was released"))
    }
}

impl CursorSurface for GpuCursorSurface {
    fn size(&self) -> u32 {
        self.size
    }

    fn draw(&mut self, uniforms: &CursorUniforms) -> ScrollweaveResult<()> {
        let res = self.resources()?;
        res.queue
            .write_buffer(&res.uniforms, 0, &uniforms.to_le_bytes());

        let mut encoder = res
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scrollweave_cursor_encoder"),
            });
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scrollweave_cursor_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &res.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_pipeline(&res.pipeline);
            rp.set_bind_group(0, &res.bind_group, &[]);
            rp.set_vertex_buffer(0, res.quad.slice(..));
            rp.draw(0..QUAD.len() as u32, 0..1);
        }
        res.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn read_frame(&mut self) -> ScrollweaveResult<image::RgbaImage> {
        let res = self.resources()?;
        let mut encoder = res
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scrollweave_cursor_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &res.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &res.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(res.bytes_per_row),
                    rows_per_image: Some(self.size),
                },
            },
            wgpu::Extent3d {
                width: self.size,
                height: self.size,
                depth_or_array_layers: 1,
            },
        );
        res.queue.submit(Some(encoder.finish()));

        let slice = res.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        res.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| ScrollweaveError::gpu(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| ScrollweaveError::gpu("readback channel closed"))?
            .map_err(|e| ScrollweaveError::gpu(format!("readback map failed: {e:?}")))?;

        let mapped = slice.get_mapped_range();
        let row_bytes = self.size as usize * 4;
        let mut out = Vec::with_capacity(row_bytes * self.size as usize);
        for row in 0..self.size as usize {
            let start = row * res.bytes_per_row as usize;
            out.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        res.readback.unmap();

        image::RgbaImage::from_raw(self.size, self.size, out)
            .ok_or_else(|| ScrollweaveError::gpu("readback size mismatch"))
    }

    fn release(&mut self) {
        if let Some(res) = self.res.take() {
            res.texture.destroy();
            res.quad.destroy();
            res.uniforms.destroy();
            res.readback.destroy();
            tracing::debug!(size = self.size, "gpu cursor surface released");
        }
    }

    fn is_released(&self) -> bool {
        self.res.is_none()
    }
}

impl Drop for GpuCursorSurface {
    fn drop(&mut self) {
        self.release();
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}
