//! CPU reference renderer.
//!
//! Runs the same shader code the GPU runs, one pixel at a time, with the same
//! frame plan and ping-pong buffers. Used by `shadertoys render` and by tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use catalog_shaders::SHADER_DEFINITIONS;
use rayon::prelude::*;
use shared::glam::{vec2, IVec2, Vec2, Vec4};
use shared::meta::{BufferFormat, PassTarget, ShaderDefinition};
use shared::{Channel, Channels, ShaderConstants, CHANNEL_COUNT, MAX_PARAMS};
use thiserror::Error;

use crate::graph::{Binding, BufferTargets, FramePlan, PlanError};
use crate::params::ParamPanel;
use crate::textures::{ChannelTexture, TextureData, TextureLibrary};
use crate::uniforms::{DateStamp, StandardUniforms};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no shader at index {0}")]
    UnknownIndex(usize),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("failed to write {path:?}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A channel as the CPU sees it. Unbound channels read as transparent black.
#[derive(Copy, Clone, Debug)]
pub enum CpuTexture<'a> {
    Empty,
    Bound(&'a TextureData),
}

impl CpuTexture<'_> {
    pub fn size(&self) -> (u32, u32) {
        match self {
            CpuTexture::Empty => (0, 0),
            CpuTexture::Bound(data) => data.size(),
        }
    }
}

impl Channel for CpuTexture<'_> {
    fn sample(&self, uv: Vec2) -> Vec4 {
        let data = match self {
            CpuTexture::Bound(data) if data.width > 0 && data.height > 0 => data,
            _ => return Vec4::ZERO,
        };
        let x = uv.x * data.width as f32 - 0.5;
        let y = uv.y * data.height as f32 - 0.5;
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);

        let max_x = data.width as i32 - 1;
        let max_y = data.height as i32 - 1;
        let texel = |dx: i32, dy: i32| {
            let tx = (x0 as i32 + dx).clamp(0, max_x);
            let ty = (y0 as i32 + dy).clamp(0, max_y);
            Vec4::from(data.pixels[ty as usize * data.width as usize + tx as usize])
        };

        let bottom = texel(0, 0).lerp(texel(1, 0), fx);
        let top = texel(0, 1).lerp(texel(1, 1), fx);
        bottom.lerp(top, fy)
    }

    fn fetch(&self, texel: IVec2) -> Vec4 {
        match self {
            CpuTexture::Bound(data) => data
                .texel(texel.x, texel.y)
                .map(Vec4::from)
                .unwrap_or(Vec4::ZERO),
            CpuTexture::Empty => Vec4::ZERO,
        }
    }
}

/// Per-frame inputs that don't come from the renderer itself.
#[derive(Clone, Debug)]
pub struct FrameInputs {
    pub time: f32,
    pub time_delta: f32,
    pub frame: u32,
    pub frame_rate: f32,
    pub mouse: [f32; 4],
    pub date: DateStamp,
    pub params: [f32; MAX_PARAMS],
}

impl FrameInputs {
    /// Frame `frame` of a fixed-rate render, with the panel's current values.
    pub fn fixed_rate(frame: u32, fps: f32, date: DateStamp, panel: &ParamPanel) -> Self {
        let mut constants = ShaderConstants::default();
        panel.write_into(&mut constants);
        Self {
            time: frame as f32 / fps,
            time_delta: 1.0 / fps,
            frame,
            frame_rate: fps,
            mouse: [0.0; 4],
            date,
            params: constants.params,
        }
    }

    fn constants(&self, shader: u32, width: u32, height: u32) -> ShaderConstants {
        let uniforms = StandardUniforms {
            width,
            height,
            shader,
            time: self.time,
            time_delta: self.time_delta,
            frame: self.frame,
            frame_rate: self.frame_rate,
            mouse: self.mouse,
            date: self.date,
        };
        ShaderConstants {
            params: self.params,
            ..uniforms.constants()
        }
    }
}

pub struct CpuRenderer {
    shader: u32,
    definition: &'static ShaderDefinition,
    plan: FramePlan,
    textures: Vec<[Option<Arc<ChannelTexture>>; CHANNEL_COUNT]>,
    buffers: BufferTargets<TextureData>,
    scratch: TextureData,
    image: TextureData,
}

impl CpuRenderer {
    /// `index` is a position in the catalog's definitions table.
    pub fn new(
        index: usize,
        width: u32,
        height: u32,
        library: &mut TextureLibrary,
    ) -> Result<Self, RenderError> {
        let definition = SHADER_DEFINITIONS
            .get(index)
            .ok_or(RenderError::UnknownIndex(index))?;
        let plan = FramePlan::build(definition)?;
        let (width, height) = (width.max(1), height.max(1));

        let textures = plan
            .passes
            .iter()
            .map(|pass| {
                pass.bindings.map(|binding| match binding {
                    Binding::Texture(source) => Some(library.resolve(source)),
                    _ => None,
                })
            })
            .collect();
        let buffers = BufferTargets::new(&plan, |_| TextureData::new(width, height));

        Ok(Self {
            shader: index as u32,
            definition,
            plan,
            textures,
            buffers,
            scratch: TextureData::new(width, height),
            image: TextureData::new(width, height),
        })
    }

    pub fn definition(&self) -> &'static ShaderDefinition {
        self.definition
    }

    pub fn size(&self) -> (u32, u32) {
        self.image.size()
    }

    /// Clears every buffer back to transparent black.
    pub fn reset(&mut self) {
        self.buffers.for_each_mut(|target| target.pixels.fill([0.0; 4]));
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        self.buffers = BufferTargets::new(&self.plan, |_| TextureData::new(width, height));
        self.scratch = TextureData::new(width, height);
        self.image = TextureData::new(width, height);
    }

    /// Runs every pass of the plan in order and returns the image pass output.
    pub fn render_frame(&mut self, inputs: &FrameInputs) -> &TextureData {
        let (width, height) = self.image.size();
        let base = inputs.constants(self.shader, width, height);
        let Self {
            definition,
            plan,
            textures,
            buffers,
            scratch,
            image,
            ..
        } = self;

        for (pass, pass_textures) in plan.passes.iter().zip(textures.iter()) {
            let mut constants = base;
            constants.pass = pass.index;

            let mut bound = [CpuTexture::Empty; CHANNEL_COUNT];
            for (channel, binding) in pass.bindings.iter().enumerate() {
                bound[channel] = match *binding {
                    Binding::Empty => CpuTexture::Empty,
                    Binding::Texture(_) => pass_textures[channel]
                        .as_ref()
                        .map_or(CpuTexture::Empty, |texture| {
                            CpuTexture::Bound(texture.frame_at(inputs.time))
                        }),
                    Binding::Buffer { slot, .. } => buffers
                        .front(slot)
                        .map_or(CpuTexture::Empty, CpuTexture::Bound),
                };
                let (w, h) = bound[channel].size();
                constants.set_channel_resolution(channel, w as f32, h as f32);
            }
            let [channel0, channel1, channel2, channel3] = bound;
            let channels = Channels {
                channel0,
                channel1,
                channel2,
                channel3,
            };

            match pass.target {
                PassTarget::Buffer(slot) => {
                    shade(&constants, &channels, scratch, Some(definition.buffer_format));
                    if let Some(pair) = buffers.get_mut(slot) {
                        std::mem::swap(pair.back_mut(), scratch);
                        pair.swap();
                    }
                }
                PassTarget::Image => shade(&constants, &channels, image, None),
            }
        }

        &self.image
    }
}

fn shade(
    constants: &ShaderConstants,
    channels: &Channels<CpuTexture<'_>>,
    target: &mut TextureData,
    format: Option<BufferFormat>,
) {
    let width = target.width as usize;
    target
        .pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                let frag_coord = vec2(x as f32 + 0.5, y as f32 + 0.5);
                let color = catalog_shaders::fs(constants, frag_coord, channels);
                *pixel = store(color, format);
            }
        });
}

/// What a render target of `format` keeps of `color`.
fn store(color: Vec4, format: Option<BufferFormat>) -> [f32; 4] {
    match format {
        Some(BufferFormat::Unorm8) => {
            let quantized = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round() / 255.0;
            quantized.to_array()
        }
        Some(BufferFormat::Float16) | None => color.to_array(),
    }
}

pub fn save_png(data: &TextureData, path: &Path) -> Result<(), RenderError> {
    let save_error = |source| RenderError::Save {
        path: path.to_path_buf(),
        source,
    };
    let image = data.to_image().ok_or_else(|| {
        save_error(image::ImageError::Parameter(
            image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ),
        ))
    })?;
    image.save(path).map_err(save_error)?;
    log::info!("Wrote {}x{} image to {:?}", data.width, data.height, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::Config;
    use shared::glam::ivec2;

    fn date() -> DateStamp {
        DateStamp {
            year: 2024.0,
            month: 0.0,
            day: 1.0,
            seconds: 0.0,
        }
    }

    fn checker() -> TextureData {
        let mut data = TextureData::new(2, 2);
        data.set_texel(0, 0, [1.0, 0.0, 0.0, 1.0]);
        data.set_texel(1, 1, [0.0, 0.0, 1.0, 1.0]);
        data
    }

    #[test]
    fn texel_fetch_is_exact_and_bounded() {
        let data = checker();
        let texture = CpuTexture::Bound(&data);
        assert_eq!(texture.fetch(ivec2(0, 0)), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(texture.fetch(ivec2(2, 0)), Vec4::ZERO);
        assert_eq!(CpuTexture::Empty.fetch(ivec2(0, 0)), Vec4::ZERO);
    }

    #[test]
    fn sampling_is_bilinear_and_clamped() {
        let data = checker();
        let texture = CpuTexture::Bound(&data);
        // texel centres hit exactly
        assert_eq!(texture.sample(vec2(0.25, 0.25)), Vec4::new(1.0, 0.0, 0.0, 1.0));
        // edges clamp instead of wrapping
        assert_eq!(texture.sample(vec2(0.0, 0.0)), Vec4::new(1.0, 0.0, 0.0, 1.0));
        let centre = texture.sample(vec2(0.5, 0.5));
        assert!((centre - Vec4::new(0.25, 0.0, 0.25, 0.5)).abs().max_element() < 1e-6);
        assert_eq!(CpuTexture::Empty.sample(vec2(0.5, 0.5)), Vec4::ZERO);
    }

    #[test]
    fn unorm_buffers_quantize() {
        let stored = store(Vec4::new(-1.0, 0.5, 2.0, 0.1), Some(BufferFormat::Unorm8));
        assert_eq!(stored, [0.0, 128.0 / 255.0, 1.0, 26.0 / 255.0]);
        let kept = store(Vec4::new(-1.0, 0.5, 2.0, 0.1), Some(BufferFormat::Float16));
        assert_eq!(kept, [-1.0, 0.5, 2.0, 0.1]);
    }

    #[test]
    fn renders_a_single_pass_unit() {
        let catalog = Catalog::builtin();
        let index = catalog.index_of("hue-wheel").unwrap();
        let mut library = TextureLibrary::new(&Config::default());
        let mut renderer = CpuRenderer::new(index, 16, 8, &mut library).unwrap();
        let panel = ParamPanel::new(renderer.definition());

        let image = renderer.render_frame(&FrameInputs::fixed_rate(0, 30.0, date(), &panel));
        assert_eq!(image.size(), (16, 8));
        assert!(image.pixels.iter().all(|p| p[3] == 1.0));
    }

    #[test]
    fn feedback_buffers_persist_between_frames() {
        let catalog = Catalog::builtin();
        let index = catalog.index_of("game-of-life").unwrap();
        let mut library = TextureLibrary::new(&Config::default());
        let mut renderer = CpuRenderer::new(index, 24, 24, &mut library).unwrap();
        let panel = ParamPanel::new(renderer.definition());

        let first = renderer
            .render_frame(&FrameInputs::fixed_rate(0, 30.0, date(), &panel))
            .clone();
        let second = renderer
            .render_frame(&FrameInputs::fixed_rate(1, 30.0, date(), &panel))
            .clone();
        assert_ne!(first, second, "the board should evolve");

        renderer.reset();
        let reseeded = renderer.render_frame(&FrameInputs::fixed_rate(0, 30.0, date(), &panel));
        assert_eq!(&first, reseeded);
    }

    #[test]
    fn resize_replaces_buffers_with_cleared_ones() {
        let catalog = Catalog::builtin();
        let index = catalog.index_of("game-of-life").unwrap();
        let mut library = TextureLibrary::new(&Config::default());
        let panel = ParamPanel::new(catalog.definition(index));

        let mut renderer = CpuRenderer::new(index, 24, 24, &mut library).unwrap();
        for frame in 0..3 {
            renderer.render_frame(&FrameInputs::fixed_rate(frame, 30.0, date(), &panel));
        }
        renderer.resize(12, 10);
        assert_eq!(renderer.size(), (12, 10));
        let resized = renderer
            .render_frame(&FrameInputs::fixed_rate(1, 30.0, date(), &panel))
            .clone();

        let mut fresh = CpuRenderer::new(index, 12, 10, &mut library).unwrap();
        let expected = fresh.render_frame(&FrameInputs::fixed_rate(1, 30.0, date(), &panel));
        assert_eq!(&resized, expected);

        renderer.resize(0, 0);
        assert_eq!(renderer.size(), (1, 1));
    }

    #[test]
    fn unknown_index_is_an_error() {
        let mut library = TextureLibrary::new(&Config::default());
        assert!(matches!(
            CpuRenderer::new(SHADER_DEFINITIONS.len(), 4, 4, &mut library),
            Err(RenderError::UnknownIndex(_))
        ));
    }

    #[test]
    fn writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_png(&checker(), &path).unwrap();
        let decoded = TextureData::load(&path).unwrap();
        assert_eq!(decoded, checker());
    }
}
