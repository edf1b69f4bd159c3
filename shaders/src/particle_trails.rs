//! Glowing particles on Lissajous orbits. Buffer A draws this frame's
//! particles, Buffer B blends them over its own decayed previous frame.

use crate::prelude::*;

const DECAY: usize = 0;
const COUNT: usize = 1;
const SIZE: usize = 2;

const MAX_PARTICLES: i32 = 16;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "particle-trails",
    name: "Particle Trails",
    sort: 120,
    buffer_format: BufferFormat::Float16,
    passes: &[
        PassDefinition::buffer(BufferSlot::A, NO_CHANNELS),
        PassDefinition::buffer(
            BufferSlot::B,
            [
                ChannelInput::Buffer(BufferSlot::A),
                ChannelInput::Buffer(BufferSlot::B),
                ChannelInput::Empty,
                ChannelInput::Empty,
            ],
        ),
        PassDefinition::image([
            ChannelInput::Buffer(BufferSlot::B),
            ChannelInput::Buffer(BufferSlot::A),
            ChannelInput::Empty,
            ChannelInput::Empty,
        ]),
    ],
    params: &[
        ParamDefinition::float(DECAY as u32, "decay", "Trail decay", 0.96, 0.8, 0.995, 0.005),
        ParamDefinition::int(COUNT as u32, "count", "Particles", 8, 1, MAX_PARTICLES),
        ParamDefinition::float(SIZE as u32, "size", "Particle size", 0.015, 0.002, 0.05, 0.001),
    ],
};

pub fn render<C: Channel>(
    pass: u32,
    input: &ShaderInput,
    channels: &Channels<C>,
    frag_coord: Vec2,
) -> Vec4 {
    let mut color = Vec4::ZERO;
    let inputs = Inputs {
        resolution: input.resolution,
        time: input.time,
        decay: input.param(DECAY),
        count: input.param_int(COUNT),
        size: input.param(SIZE),
        channel0: &channels.channel0,
        channel1: &channels.channel1,
    };
    match pass {
        0 => inputs.buffer_a(&mut color, frag_coord),
        1 => inputs.buffer_b(&mut color, frag_coord),
        _ => inputs.main_image(&mut color, frag_coord),
    }
    color
}

struct Inputs<'a, C> {
    resolution: Vec3,
    time: f32,
    decay: f32,
    count: i32,
    size: f32,
    channel0: &'a C,
    channel1: &'a C,
}

impl<C: Channel> Inputs<'_, C> {
    fn particle(&self, i: i32) -> Vec2 {
        let k = i as f32;
        let t = self.time * (0.4 + 0.05 * k);
        vec2(
            (t * (1.0 + 0.13 * k) + k).sin(),
            (t * (1.3 + 0.07 * k) + 2.0 * k).cos(),
        ) * 0.8
    }

    fn buffer_a(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = common::centered_uv(frag_coord, self.resolution);
        let mut col = Vec3::ZERO;
        let mut i = 0;
        while i < self.count.min(MAX_PARTICLES) {
            let d = p - self.particle(i);
            let glow = (-d.dot(d) / (self.size * self.size)).exp();
            let tint = common::palette(
                i as f32 / MAX_PARTICLES as f32,
                Vec3::splat(0.6),
                Vec3::splat(0.4),
                Vec3::ONE,
                vec3(0.0, 0.33, 0.67),
            );
            col += glow * tint;
            i += 1;
        }
        *frag_color = col.extend(1.0);
    }

    fn buffer_b(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = ivec2(frag_coord.x as i32, frag_coord.y as i32);
        let fresh = self.channel0.fetch(p).truncate();
        let history = self.channel1.fetch(p).truncate() * self.decay;
        *frag_color = fresh.max(history).extend(1.0);
    }

    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = ivec2(frag_coord.x as i32, frag_coord.y as i32);
        let trails = self.channel0.fetch(p).truncate();
        let heads = self.channel1.fetch(p).truncate();
        let col = trails + 0.5 * heads;
        // Reinhard tone map
        *frag_color = (col / (Vec3::ONE + col)).extend(1.0);
    }
}
