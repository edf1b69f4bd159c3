//! Wave equation on a feedback buffer: raindrops and mouse clicks disturb the
//! surface, the image pass refracts a noise texture through it.

use crate::prelude::*;

const DAMPING: usize = 0;
const RAIN: usize = 1;
const REFRACTION: usize = 2;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "ripple-tank",
    name: "Ripple Tank",
    sort: 110,
    buffer_format: BufferFormat::Float16,
    passes: &[
        PassDefinition::buffer(
            BufferSlot::A,
            [
                ChannelInput::Buffer(BufferSlot::A),
                ChannelInput::Empty,
                ChannelInput::Empty,
                ChannelInput::Empty,
            ],
        ),
        PassDefinition::image([
            ChannelInput::Buffer(BufferSlot::A),
            ChannelInput::Texture(TextureSource::Noise),
            ChannelInput::Empty,
            ChannelInput::Empty,
        ]),
    ],
    params: &[
        ParamDefinition::float(DAMPING as u32, "damping", "Damping", 0.99, 0.9, 1.0, 0.002),
        ParamDefinition::toggle(RAIN as u32, "rain", "Rain", true),
        ParamDefinition::float(REFRACTION as u32, "refraction", "Refraction", 0.05, 0.0, 0.2, 0.01),
    ],
};

/// Squared wave speed in texels per frame; stable below 0.5.
const WAVE_SPEED2: f32 = 0.25;
const DROP_RADIUS: f32 = 4.0;

pub fn render<C: Channel>(
    pass: u32,
    input: &ShaderInput,
    channels: &Channels<C>,
    frag_coord: Vec2,
) -> Vec4 {
    let mut color = Vec4::ZERO;
    match pass {
        0 => Simulation {
            resolution: input.resolution,
            time: input.time,
            time_delta: input.time_delta,
            frame: input.frame,
            mouse: input.mouse,
            damping: input.param(DAMPING),
            rain: input.param_bool(RAIN),
            channel0: &channels.channel0,
        }
        .buffer_a(&mut color, frag_coord),
        _ => Shading {
            resolution: input.resolution,
            refraction: input.param(REFRACTION),
            channel0: &channels.channel0,
            channel1: &channels.channel1,
        }
        .main_image(&mut color, frag_coord),
    }
    color
}

fn height<C: Channel>(channel: &C, resolution: Vec3, p: IVec2) -> Vec2 {
    let max = ivec2(resolution.x as i32 - 1, resolution.y as i32 - 1);
    channel.fetch(p.clamp(IVec2::ZERO, max)).xy()
}

struct Simulation<'a, C0> {
    resolution: Vec3,
    time: f32,
    time_delta: f32,
    frame: i32,
    mouse: Vec4,
    damping: f32,
    rain: bool,
    channel0: &'a C0,
}

impl<C0: Channel> Simulation<'_, C0> {
    /// Writes the position of the raindrop landing this frame, if there is one.
    fn raindrop(&self, position: &mut Vec2) -> bool {
        let tick = (self.time * 4.0).floor();
        let previous = ((self.time - self.time_delta) * 4.0).floor();
        if !self.rain || tick == previous {
            return false;
        }
        *position = common::hash22(vec2(tick, 1.7)) * self.resolution.xy();
        true
    }

    fn buffer_a(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        if self.frame == 0 {
            *frag_color = vec4(0.0, 0.0, 0.0, 1.0);
            return;
        }

        let p = ivec2(frag_coord.x as i32, frag_coord.y as i32);
        let state = height(self.channel0, self.resolution, p);
        let (current, previous) = (state.x, state.y);

        let laplacian = height(self.channel0, self.resolution, p + ivec2(1, 0)).x
            + height(self.channel0, self.resolution, p + ivec2(-1, 0)).x
            + height(self.channel0, self.resolution, p + ivec2(0, 1)).x
            + height(self.channel0, self.resolution, p + ivec2(0, -1)).x
            - 4.0 * current;

        let mut next = (2.0 * current - previous + WAVE_SPEED2 * laplacian) * self.damping;

        if self.mouse.w > 0.0 && frag_coord.distance(self.mouse.zw()) < DROP_RADIUS {
            next += 1.0;
        }
        let mut drop = Vec2::ZERO;
        if self.raindrop(&mut drop) && frag_coord.distance(drop) < DROP_RADIUS {
            next += 0.6;
        }

        *frag_color = vec4(next, current, 0.0, 1.0);
    }
}

struct Shading<'a, C0, C1> {
    resolution: Vec3,
    refraction: f32,
    channel0: &'a C0,
    channel1: &'a C1,
}

impl<C0: Channel, C1: Channel> Shading<'_, C0, C1> {
    fn height_at(&self, p: IVec2) -> f32 {
        height(self.channel0, self.resolution, p).x
    }

    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = ivec2(frag_coord.x as i32, frag_coord.y as i32);
        let normal = vec3(
            self.height_at(p + ivec2(-1, 0)) - self.height_at(p + ivec2(1, 0)),
            self.height_at(p + ivec2(0, -1)) - self.height_at(p + ivec2(0, 1)),
            1.0,
        )
        .normalize();

        let uv = frag_coord / self.resolution.xy();
        let bed_uv = 2.0 * (uv + normal.xy() * self.refraction);
        let bed = self.channel1.sample_repeat(bed_uv).truncate();
        let mut col = mix(vec3(0.05, 0.25, 0.3), vec3(0.3, 0.6, 0.55), bed.x) * (0.7 + 0.3 * bed.y);

        let light = vec3(0.4, 0.5, 1.0).normalize();
        let view = vec3(0.0, 0.0, 1.0);
        let reflected = (-light).reflect(normal);
        let specular = saturate(reflected.dot(view)).powf(60.0);
        col += Vec3::splat(0.8 * specular);

        *frag_color = col.extend(1.0);
    }
}
