//! Swirl distortion over a static channel texture. The swirl follows the mouse
//! while the button is held.

use crate::prelude::*;

const STRENGTH: usize = 0;
const RADIUS: usize = 1;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "texture-warp",
    name: "Texture Swirl",
    sort: 80,
    buffer_format: BufferFormat::Unorm8,
    passes: &[PassDefinition::image([
        ChannelInput::Texture(TextureSource::Named("swirl-source")),
        ChannelInput::Empty,
        ChannelInput::Empty,
        ChannelInput::Empty,
    ])],
    params: &[
        ParamDefinition::float(STRENGTH as u32, "strength", "Strength", 3.0, -10.0, 10.0, 0.25),
        ParamDefinition::float(RADIUS as u32, "radius", "Radius", 0.4, 0.05, 1.0, 0.05),
    ],
};

pub fn render<C: Channel>(
    _pass: u32,
    input: &ShaderInput,
    channels: &Channels<C>,
    frag_coord: Vec2,
) -> Vec4 {
    let mut color = Vec4::ZERO;
    Inputs {
        resolution: input.resolution,
        time: input.time,
        mouse: input.mouse,
        strength: input.param(STRENGTH),
        radius: input.param(RADIUS),
        channel0: &channels.channel0,
    }
    .main_image(&mut color, frag_coord);
    color
}

struct Inputs<'a, C0> {
    resolution: Vec3,
    time: f32,
    mouse: Vec4,
    strength: f32,
    radius: f32,
    channel0: &'a C0,
}

impl<C0: Channel> Inputs<'_, C0> {
    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let aspect = self.resolution.x / self.resolution.y;
        let uv = frag_coord / self.resolution.xy();

        let center = if self.mouse.z > 0.0 {
            self.mouse.xy() / self.resolution.xy()
        } else {
            Vec2::splat(0.5) + 0.25 * vec2((0.3 * self.time).cos(), (0.4 * self.time).sin())
        };

        let mut d = uv - center;
        d.x *= aspect;
        let r = d.length();
        let falloff = saturate(1.0 - r / self.radius);
        let angle = self.strength * falloff * falloff * (0.5 * self.time).sin();
        d = common::rot(angle) * d;
        d.x /= aspect;

        let col = self.channel0.sample_repeat(center + d).truncate();
        let vignette = 0.6 + 0.4 * (16.0 * uv.x * uv.y * (1.0 - uv.x) * (1.0 - uv.y)).powf(0.2);

        *frag_color = (col * vignette).extend(1.0);
    }
}
