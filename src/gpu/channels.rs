use std::collections::HashMap;
use std::sync::Arc;

use shared::meta::TextureSource;

use super::targets::GpuTexture;
use crate::graph::{Binding, FramePlan};
use crate::textures::{ChannelTexture, TextureLibrary};

struct Uploaded {
    source: Arc<ChannelTexture>,
    gpu: GpuTexture,
    shown: usize,
}

/// GPU copies of every texture a unit's passes sample.
pub struct ChannelTextures {
    textures: HashMap<TextureSource, Uploaded>,
}

impl ChannelTextures {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        plan: &FramePlan,
        library: &mut TextureLibrary,
    ) -> Self {
        let mut textures = HashMap::new();
        for pass in &plan.passes {
            for binding in pass.bindings {
                let Binding::Texture(source) = binding else {
                    continue;
                };
                if textures.contains_key(&source) {
                    continue;
                }
                let texture = library.resolve(source);
                let first = texture.frame_at(0.0);
                let gpu = GpuTexture::from_rgba8(
                    device,
                    queue,
                    &format!("{source:?}"),
                    first.width,
                    first.height,
                    &first.to_rgba8_top_down(),
                );
                textures.insert(
                    source,
                    Uploaded {
                        source: texture,
                        gpu,
                        shown: 0,
                    },
                );
            }
        }
        Self { textures }
    }

    pub fn get(&self, source: TextureSource) -> Option<&GpuTexture> {
        self.textures.get(&source).map(|uploaded| &uploaded.gpu)
    }

    /// Uploads the current frame of any image sequence that moved on.
    pub fn update(&mut self, queue: &wgpu::Queue, time: f32) {
        for uploaded in self.textures.values_mut() {
            if !uploaded.source.is_animated() {
                continue;
            }
            let index = uploaded.source.frame_index(time);
            if index != uploaded.shown {
                let frame = uploaded.source.frame_at(time);
                uploaded.gpu.write_rgba8(queue, &frame.to_rgba8_top_down());
                uploaded.shown = index;
            }
        }
    }
}
