//! Channel textures: decoded images, generated noise and image sequences.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::meta::TextureSource;
use thiserror::Error;

use crate::config::{Config, TextureEntry};

/// Side length of the generated noise texture.
pub const NOISE_SIZE: u32 = 256;
const NOISE_SEED: u64 = 0x5eed;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load image {path:?}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to list frames in {path:?}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no image frames in {path:?}")]
    EmptySequence { path: PathBuf },
    #[error("sequence {path:?} needs a positive frame rate, got {fps}")]
    InvalidFrameRate { path: PathBuf, fps: f32 },
    #[error("frame {frame:?} is {actual:?}, expected {expected:?} like the first frame")]
    MismatchedFrame {
        frame: PathBuf,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("no texture named `{name}` in the config")]
    Unknown { name: String },
}

/// RGBA pixels in `0..1`, rows stored bottom-up to match `fragCoord`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl TextureData {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0.0; 4])
    }

    pub fn filled(width: u32, height: u32, color: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; texel_count(width, height)],
        }
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba32f();
        let (width, height) = rgba.dimensions();
        let mut pixels = Vec::with_capacity(texel_count(width, height));
        for y in (0..height).rev() {
            for x in 0..width {
                pixels.push(rgba.get_pixel(x, y).0);
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let image = image::open(path).map_err(|source| TextureError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded {:?} ({}x{})", path, image.width(), image.height());
        Ok(Self::from_image(&image))
    }

    /// Deterministic per-channel white noise, the stand-in for Shadertoy's
    /// "RGBA Noise" input.
    pub fn noise(size: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let pixels = (0..texel_count(size, size))
            .map(|_| [rng.gen(), rng.gen(), rng.gen(), rng.gen()])
            .collect();
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Texel at `(x, y)` counted from the bottom-left; `None` outside.
    pub fn texel(&self, x: i32, y: i32) -> Option<[f32; 4]> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    pub fn set_texel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        let index = y as usize * self.width as usize + x as usize;
        self.pixels[index] = color;
    }

    /// 8-bit RGBA with the first row at the top, as image files and GPU
    /// uploads expect.
    pub fn to_rgba8_top_down(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for row in self.pixels.chunks(self.width.max(1) as usize).rev() {
            for pixel in row {
                bytes.extend(pixel.iter().map(|&c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
            }
        }
        bytes
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.to_rgba8_top_down())
    }
}

/// What a named channel is bound to.
#[derive(Debug)]
pub enum ChannelTexture {
    Still(TextureData),
    /// Frames played back at `fps`, looping; used where Shadertoy binds video.
    Sequence { frames: Vec<TextureData>, fps: f32 },
}

impl ChannelTexture {
    pub fn load_sequence(dir: &Path, fps: f32) -> Result<Self, TextureError> {
        if !(fps > 0.0) {
            return Err(TextureError::InvalidFrameRate {
                path: dir.to_path_buf(),
                fps,
            });
        }
        let entries = std::fs::read_dir(dir).map_err(|source| TextureError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_image_path(path))
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(TextureError::EmptySequence {
                path: dir.to_path_buf(),
            });
        }

        let frames = paths
            .iter()
            .map(|path| TextureData::load(path))
            .collect::<Result<Vec<_>, _>>()?;
        let expected = frames[0].size();
        for (frame, path) in frames.iter().zip(&paths) {
            if frame.size() != expected {
                return Err(TextureError::MismatchedFrame {
                    frame: path.clone(),
                    expected,
                    actual: frame.size(),
                });
            }
        }
        log::info!("Loaded {} frame(s) from {:?}", frames.len(), dir);
        Ok(ChannelTexture::Sequence { frames, fps })
    }

    /// Index of the frame shown at `time`; always 0 for stills.
    pub fn frame_index(&self, time: f32) -> usize {
        match self {
            ChannelTexture::Still(_) => 0,
            ChannelTexture::Sequence { frames, fps } => {
                let frame = (time.max(0.0) * fps).floor() as usize;
                frame % frames.len()
            }
        }
    }

    pub fn frame_at(&self, time: f32) -> &TextureData {
        match self {
            ChannelTexture::Still(data) => data,
            ChannelTexture::Sequence { frames, .. } => &frames[self.frame_index(time)],
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, ChannelTexture::Sequence { frames, .. } if frames.len() > 1)
    }
}

/// Texel count in `usize`, so large targets can't overflow `u32`.
fn texel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or(false)
}

/// Resolves texture sources against the config, loading each name once.
#[derive(Debug)]
pub struct TextureLibrary {
    entries: HashMap<String, TextureEntry>,
    cache: HashMap<TextureSource, Arc<ChannelTexture>>,
}

impl TextureLibrary {
    pub fn new(config: &Config) -> Self {
        let entries = config
            .textures
            .iter()
            .map(|(name, entry)| {
                let entry = match entry {
                    TextureEntry::Image(path) => TextureEntry::Image(config.resolve_path(path)),
                    TextureEntry::Sequence { frames, fps } => TextureEntry::Sequence {
                        frames: config.resolve_path(frames),
                        fps: *fps,
                    },
                };
                (name.clone(), entry)
            })
            .collect();
        Self {
            entries,
            cache: HashMap::new(),
        }
    }

    /// Always yields a texture: anything that fails to load falls back to
    /// noise, with a warning.
    pub fn resolve(&mut self, source: TextureSource) -> Arc<ChannelTexture> {
        if let Some(texture) = self.cache.get(&source) {
            return texture.clone();
        }

        let texture = match self.load(source) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{}; using noise instead", e);
                noise()
            }
        };
        let texture = Arc::new(texture);
        self.cache.insert(source, texture.clone());
        texture
    }

    fn load(&self, source: TextureSource) -> Result<ChannelTexture, TextureError> {
        let name = match source {
            TextureSource::Noise => return Ok(noise()),
            TextureSource::Named(name) => name,
        };
        let entry = self.entries.get(name).ok_or_else(|| TextureError::Unknown {
            name: name.to_string(),
        })?;
        match entry {
            TextureEntry::Image(path) => TextureData::load(path).map(ChannelTexture::Still),
            TextureEntry::Sequence { frames, fps } => ChannelTexture::load_sequence(frames, *fps),
        }
    }
}

fn noise() -> ChannelTexture {
    ChannelTexture::Still(TextureData::noise(NOISE_SIZE, NOISE_SEED))
}
