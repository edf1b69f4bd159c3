use shared::meta::BufferFormat;

use super::channels::ChannelTextures;
use super::pipeline::buffer_texture_format;
use crate::graph::{BufferTargets, FramePlan};
use crate::textures::TextureLibrary;

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: (u32, u32),
}

impl GpuTexture {
    /// A buffer-pass target: rendered into and sampled by later passes.
    /// New textures read as transparent black.
    pub fn render_target(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
    ) -> Self {
        Self::create(
            device,
            label,
            (width, height),
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        )
    }

    /// An 8-bit texture filled from top-down RGBA rows.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Self {
        let texture = Self::create(
            device,
            label,
            (width, height),
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        texture.write_rgba8(queue, rgba);
        texture
    }

    pub fn write_rgba8(&self, queue: &wgpu::Queue, rgba: &[u8]) {
        let (width, height) = self.size;
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn create(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
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
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size: (width, height),
        }
    }
}

/// Render targets and uploaded channel textures for the active unit.
pub struct UnitTargets {
    pub buffers: BufferTargets<GpuTexture>,
    pub channels: ChannelTextures,
    plan: FramePlan,
    format: BufferFormat,
}

impl UnitTargets {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        plan: &FramePlan,
        format: BufferFormat,
        size: (u32, u32),
        library: &mut TextureLibrary,
    ) -> Self {
        Self {
            buffers: create_buffers(device, plan, format, size),
            channels: ChannelTextures::upload(device, queue, plan, library),
            plan: plan.clone(),
            format,
        }
    }

    /// Recreates every buffer at the new size, which also clears them.
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        self.buffers = create_buffers(device, &self.plan, self.format, size);
    }

    pub fn reset(&mut self, device: &wgpu::Device) {
        let size = self
            .plan
            .buffers
            .first()
            .and_then(|&slot| self.buffers.front(slot))
            .map(|texture| texture.size);
        if let Some(size) = size {
            self.resize(device, size);
        }
    }
}

fn create_buffers(
    device: &wgpu::Device,
    plan: &FramePlan,
    format: BufferFormat,
    (width, height): (u32, u32),
) -> BufferTargets<GpuTexture> {
    let size = (width.max(1), height.max(1));
    let texture_format = buffer_texture_format(format);
    if plan.has_buffers() {
        log::debug!(
            "Allocating {} buffer pair(s) at {}x{} ({:?})",
            plan.buffers.len(),
            size.0,
            size.1,
            texture_format
        );
    }
    BufferTargets::new(plan, |slot| {
        GpuTexture::render_target(device, slot.name(), size, texture_format)
    })
}
