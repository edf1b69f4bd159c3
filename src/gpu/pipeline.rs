use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context};
use shared::meta::BufferFormat;
use shared::CHANNEL_COUNT;

use super::targets::GpuTexture;
use super::PUSH_CONSTANT_SIZE;

#[cfg(feature = "spirv-build")]
const EMBEDDED_SPIRV: Option<&[u8]> = Some(include_bytes!(env!("catalog_shaders.spv")));
#[cfg(not(feature = "spirv-build"))]
const EMBEDDED_SPIRV: Option<&[u8]> = None;

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Loads the catalog's SPIR-V: `binary` when given, otherwise the module
/// embedded at build time.
pub fn load_shader_module(
    device: &wgpu::Device,
    binary: Option<&Path>,
) -> anyhow::Result<wgpu::ShaderModule> {
    let bytes: Cow<'static, [u8]> = match binary {
        Some(path) => {
            log::info!("Loading shaders from {:?}", path);
            Cow::Owned(
                std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?,
            )
        }
        None => Cow::Borrowed(EMBEDDED_SPIRV.context(
            "No embedded shaders: build with `--features spirv-build` or set `shaders.binary`",
        )?),
    };
    check_spirv(&bytes)?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("catalog shaders"),
        source: wgpu::util::make_spirv(&bytes),
    });
    if let Some(error) = futures::executor::block_on(device.pop_error_scope()) {
        bail!("Shader module failed validation: {error}");
    }
    Ok(module)
}

fn check_spirv(bytes: &[u8]) -> anyhow::Result<()> {
    if bytes.len() < 4 || bytes.len() % 4 != 0 {
        bail!("SPIR-V module has invalid length {}", bytes.len());
    }
    let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if magic != SPIRV_MAGIC {
        bail!("Not a SPIR-V module (magic {magic:#010x})");
    }
    Ok(())
}

pub fn buffer_texture_format(format: BufferFormat) -> wgpu::TextureFormat {
    match format {
        BufferFormat::Float16 => wgpu::TextureFormat::Rgba16Float,
        BufferFormat::Unorm8 => wgpu::TextureFormat::Rgba8Unorm,
    }
}

/// Pipelines for the image pass and for each buffer format, sharing one
/// layout: a sampler at binding 0 and the four channels at 1..=4.
pub struct ShaderPipelines {
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Bound to channels with nothing attached.
    pub placeholder: GpuTexture,
    pub surface_pipeline: wgpu::RenderPipeline,
    float16_pipeline: wgpu::RenderPipeline,
    unorm8_pipeline: wgpu::RenderPipeline,
}

impl ShaderPipelines {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        module: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
    ) -> anyhow::Result<Self> {
        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        }];
        entries.extend((0..CHANNEL_COUNT as u32).map(|channel| wgpu::BindGroupLayoutEntry {
            binding: 1 + channel,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }));
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("channels"),
            entries: &entries,
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("catalog layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::VERTEX_FRAGMENT,
                range: 0..PUSH_CONSTANT_SIZE,
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("channel sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let surface_pipeline = create_pipeline(device, &layout, module, surface_format, "image");
        let float16_pipeline = create_pipeline(
            device,
            &layout,
            module,
            buffer_texture_format(BufferFormat::Float16),
            "float16 buffers",
        );
        let unorm8_pipeline = create_pipeline(
            device,
            &layout,
            module,
            buffer_texture_format(BufferFormat::Unorm8),
            "unorm8 buffers",
        );
        if let Some(error) = futures::executor::block_on(device.pop_error_scope()) {
            bail!("Failed to create render pipelines: {error}");
        }

        let placeholder = GpuTexture::from_rgba8(device, queue, "empty channel", 1, 1, &[0; 4]);

        Ok(Self {
            bind_group_layout,
            sampler,
            placeholder,
            surface_pipeline,
            float16_pipeline,
            unorm8_pipeline,
        })
    }

    pub fn buffer_pipeline(&self, format: BufferFormat) -> &wgpu::RenderPipeline {
        match format {
            BufferFormat::Float16 => &self.float16_pipeline,
            BufferFormat::Unorm8 => &self.unorm8_pipeline,
        }
    }

    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        views: [&wgpu::TextureView; CHANNEL_COUNT],
    ) -> wgpu::BindGroup {
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        }];
        entries.extend(views.iter().enumerate().map(|(channel, view)| wgpu::BindGroupEntry {
            binding: 1 + channel as u32,
            resource: wgpu::BindingResource::TextureView(view),
        }));
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("channels"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("main_vs"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("main_fs"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_spirv_bytes() {
        assert!(check_spirv(b"abc").is_err());
        assert!(check_spirv(b"\x89PNG").is_err());
        assert!(check_spirv(&SPIRV_MAGIC.to_le_bytes()).is_ok());
    }

    #[test]
    fn buffer_formats_map_to_texture_formats() {
        assert_eq!(
            buffer_texture_format(BufferFormat::Float16),
            wgpu::TextureFormat::Rgba16Float
        );
        assert_eq!(
            buffer_texture_format(BufferFormat::Unorm8),
            wgpu::TextureFormat::Rgba8Unorm
        );
    }
}
