//! GPU canvas for the windowed host.
//!
//! [`GpuCanvas`] records a frame through the [`Canvas`] trait into a
//! [`DrawList`], then [`present`](GpuCanvas::present) uploads the lines and
//! discs as instance buffers and draws them in a single render pass.

#[cfg(feature = "egui")]
pub mod egui_integration;
mod shader;

use std::sync::Arc;

use glam::Vec2;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::render::{Canvas, DrawList, Rgba};
use shader::{
    srgb_to_linear, DiscInstance, LineInstance, Uniforms, DISC_ATTRIBUTES, LINE_ATTRIBUTES,
    SHADER_SOURCE,
};

/// Vertices per instanced quad.
const QUAD_VERTICES: u32 = 6;
/// Smallest instance buffer, in instances.
const MIN_INSTANCE_CAPACITY: usize = 256;

/// Growable instance buffer.
struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    len: u32,
    label: &'static str,
    stride: usize,
}

impl InstanceBuffer {
    fn new(device: &wgpu::Device, label: &'static str, stride: usize) -> Self {
        Self {
            buffer: create_instance_buffer(device, label, MIN_INSTANCE_CAPACITY * stride),
            capacity: MIN_INSTANCE_CAPACITY,
            len: 0,
            label,
            stride,
        }
    }

    /// Upload `data`, growing to the next power of two when it does not fit.
    fn write<T: bytemuck::Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        if data.len() > self.capacity {
            self.capacity = data.len().next_power_of_two();
            self.buffer = create_instance_buffer(device, self.label, self.capacity * self.stride);
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
        self.len = data.len() as u32;
    }
}

fn create_instance_buffer(device: &wgpu::Device, label: &'static str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// What an overlay callback gets to draw with after the field pass.
pub struct OverlayTarget<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a wgpu::TextureView,
    pub size_in_pixels: [u32; 2],
}

/// wgpu-backed [`Canvas`] drawing onto a window surface.
pub struct GpuCanvas {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    line_pipeline: wgpu::RenderPipeline,
    disc_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    lines: InstanceBuffer,
    discs: InstanceBuffer,
    frame: DrawList,
    clear_color: wgpu::Color,
    linear_output: bool,
    scale_factor: f32,
}

impl GpuCanvas {
    /// Bring up wgpu on `window`. `background` is the sRGB clear colour.
    pub async fn new(window: Arc<Window>, background: [u8; 3]) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor() as f32;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using GPU: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniforms = Uniforms {
            viewport: [
                config.width as f32 / scale_factor,
                config.height as f32 / scale_factor,
            ],
            scale: scale_factor,
            _pad: 0.0,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
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
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Field Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Field Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            "Line Pipeline",
            ("vs_line", "fs_line"),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineInstance>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &LINE_ATTRIBUTES,
            },
        );
        let disc_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            "Disc Pipeline",
            ("vs_disc", "fs_disc"),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<DiscInstance>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &DISC_ATTRIBUTES,
            },
        );

        let lines = InstanceBuffer::new(&device, "Line Instances", std::mem::size_of::<LineInstance>());
        let discs = InstanceBuffer::new(&device, "Disc Instances", std::mem::size_of::<DiscInstance>());

        let linear_output = surface_format.is_srgb();
        let bg = Rgba::from_srgb8(background, 1.0);
        let channel = |c: f32| {
            let c = if linear_output { srgb_to_linear(c) } else { c };
            c as f64
        };
        let clear_color = wgpu::Color {
            r: channel(bg.r),
            g: channel(bg.g),
            b: channel(bg.b),
            a: 1.0,
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            line_pipeline,
            disc_pipeline,
            uniform_buffer,
            uniform_bind_group,
            lines,
            discs,
            frame: DrawList::new(),
            clear_color,
            linear_output,
            scale_factor,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Reconfigure the surface. Zero-sized requests are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.scale_factor = scale_factor as f32;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapply the current configuration after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Draw the recorded frame.
    pub fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.present_with(|_| {})
    }

    /// Draw the recorded frame, then let `overlay` encode extra passes on
    /// top before the frame is submitted.
    pub fn present_with<F>(&mut self, overlay: F) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(OverlayTarget<'_>),
    {
        self.upload();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Field Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            if self.lines.len > 0 {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.lines.buffer.slice(..));
                render_pass.draw(0..QUAD_VERTICES, 0..self.lines.len);
            }
            if self.discs.len > 0 {
                render_pass.set_pipeline(&self.disc_pipeline);
                render_pass.set_vertex_buffer(0, self.discs.buffer.slice(..));
                render_pass.draw(0..QUAD_VERTICES, 0..self.discs.len);
            }
        }

        overlay(OverlayTarget {
            device: &self.device,
            queue: &self.queue,
            encoder: &mut encoder,
            view: &view,
            size_in_pixels: [self.config.width, self.config.height],
        });

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Convert the recorded frame into instance data and upload it.
    fn upload(&mut self) {
        let to_gpu = |c: Rgba| -> [f32; 4] {
            if self.linear_output {
                [srgb_to_linear(c.r), srgb_to_linear(c.g), srgb_to_linear(c.b), c.a]
            } else {
                c.to_array()
            }
        };

        let lines: Vec<LineInstance> = self
            .frame
            .lines()
            .map(|(start, end, color)| LineInstance {
                start: start.to_array(),
                end: end.to_array(),
                color: to_gpu(color),
            })
            .collect();
        let discs: Vec<DiscInstance> = self
            .frame
            .discs()
            .map(|(center, radius, color)| DiscInstance {
                center: center.to_array(),
                radius,
                _pad: 0.0,
                color: to_gpu(color),
            })
            .collect();

        self.lines.write(&self.device, &self.queue, &lines);
        self.discs.write(&self.device, &self.queue, &discs);

        let uniforms = Uniforms {
            viewport: [
                self.config.width as f32 / self.scale_factor,
                self.config.height as f32 / self.scale_factor,
            ],
            scale: self.scale_factor,
            _pad: 0.0,
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }
}

impl Canvas for GpuCanvas {
    fn clear(&mut self) {
        self.frame.clear();
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba) {
        self.frame.line(from, to, color);
    }

    fn disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.frame.disc(center, radius, color);
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &'static str,
    (vs_entry, fs_entry): (&'static str, &'static str),
    instance_layout: wgpu::VertexBufferLayout<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs_entry),
            buffers: &[instance_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
