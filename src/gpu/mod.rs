//! GPU state management
//!
//! Device setup, the catalog's render pipelines and per-unit render targets.

mod channels;
mod pipeline;
mod targets;

use std::sync::Arc;

use anyhow::Context;
use winit::window::Window;

pub use channels::ChannelTextures;
pub use pipeline::{load_shader_module, ShaderPipelines};
pub use targets::{GpuTexture, UnitTargets};

use crate::graph::{Binding, FramePlan};
use shared::meta::{BufferFormat, PassTarget};
use shared::{ShaderConstants, CHANNEL_COUNT};

/// Size of [`ShaderConstants`] as pushed to every pass.
pub const PUSH_CONSTANT_SIZE: u32 = std::mem::size_of::<ShaderConstants>() as u32;

/// Device, queue and the window surface they present to.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Format the pipelines render into: the surface format without sRGB
    /// encoding, so shader output reaches the screen unchanged.
    pub render_format: wgpu::TextureFormat,
}

impl GpuContext {
    pub fn new(window: Arc<Window>, vsync: bool) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .context("Failed to create window surface")?;

        let adapter = futures::executor::block_on(instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            },
        ))
        .context("Failed to find suitable GPU adapter")?;
        log::info!("Using adapter {:?}", adapter.get_info());

        let (device, queue) = futures::executor::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("catalog device"),
                required_features: wgpu::Features::PUSH_CONSTANTS,
                required_limits: wgpu::Limits {
                    max_push_constant_size: PUSH_CONSTANT_SIZE,
                    ..wgpu::Limits::default()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            },
        ))
        .context("Failed to create device (push constants are required)")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .first()
            .copied()
            .context("Surface reports no supported formats")?;
        let render_format = format.remove_srgb_suffix();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: if render_format == format {
                vec![]
            } else {
                vec![render_format]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            render_format,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// The next swapchain image, reconfiguring once if the surface went stale.
    pub fn acquire(&mut self) -> anyhow::Result<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .context("Failed to acquire next swapchain texture")
            }
            Err(e) => Err(e).context("Failed to acquire next swapchain texture"),
        }
    }
}

/// Everything one frame needs beyond the GPU objects.
pub struct FrameRequest<'a> {
    pub plan: &'a FramePlan,
    pub buffer_format: BufferFormat,
    pub constants: ShaderConstants,
    pub time: f32,
    /// When false only the image pass runs, so feedback units hold still.
    pub run_buffers: bool,
}

/// Records every planned pass into `encoder`, presenting into `output`.
pub fn encode_frame(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    encoder: &mut wgpu::CommandEncoder,
    pipelines: &ShaderPipelines,
    targets: &mut UnitTargets,
    output: &wgpu::TextureView,
    request: &FrameRequest<'_>,
) {
    targets.channels.update(queue, request.time);

    for pass in &request.plan.passes {
        if matches!(pass.target, PassTarget::Buffer(_)) && !request.run_buffers {
            continue;
        }

        let mut constants = request.constants;
        constants.pass = pass.index;

        let mut views: [&wgpu::TextureView; CHANNEL_COUNT] =
            [&pipelines.placeholder.view; CHANNEL_COUNT];
        for (channel, binding) in pass.bindings.iter().enumerate() {
            let bound = match *binding {
                Binding::Empty => None,
                Binding::Texture(source) => targets.channels.get(source),
                Binding::Buffer { slot, .. } => targets.buffers.front(slot),
            };
            if let Some(texture) = bound {
                views[channel] = &texture.view;
                let (w, h) = texture.size;
                constants.set_channel_resolution(channel, w as f32, h as f32);
            }
        }
        let bind_group = pipelines.bind_group(device, views);

        let (target_view, pipeline) = match pass.target {
            PassTarget::Buffer(slot) => match targets.buffers.get(slot) {
                Some(pair) => (
                    &pair.back().view,
                    pipelines.buffer_pipeline(request.buffer_format),
                ),
                None => continue,
            },
            PassTarget::Image => (output, &pipelines.surface_pipeline),
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("catalog pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.set_push_constants(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                0,
                bytemuck::bytes_of(&constants),
            );
            render_pass.draw(0..3, 0..1);
        }

        if let PassTarget::Buffer(slot) = pass.target {
            targets.buffers.swap(slot);
        }
    }
}
