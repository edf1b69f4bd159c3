//! Domain-warped fbm: noise fed back into its own coordinates twice, coloured
//! by the intermediate warp vectors.

use crate::prelude::*;

const OCTAVES: usize = 0;
const WARP: usize = 1;
const SPEED: usize = 2;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "warped-clouds",
    name: "Warped Clouds",
    sort: 50,
    buffer_format: BufferFormat::Unorm8,
    passes: IMAGE_ONLY,
    params: &[
        ParamDefinition::int(OCTAVES as u32, "octaves", "Octaves", 5, 1, 8),
        ParamDefinition::float(WARP as u32, "warp", "Warp amount", 4.0, 0.0, 8.0, 0.25),
        ParamDefinition::float(SPEED as u32, "speed", "Drift speed", 0.1, 0.0, 1.0, 0.02),
    ],
};

pub fn render<C: Channel>(
    _pass: u32,
    input: &ShaderInput,
    _channels: &Channels<C>,
    frag_coord: Vec2,
) -> Vec4 {
    let mut color = Vec4::ZERO;
    Inputs {
        resolution: input.resolution,
        time: input.time,
        octaves: input.param_int(OCTAVES),
        warp: input.param(WARP),
        speed: input.param(SPEED),
    }
    .main_image(&mut color, frag_coord);
    color
}

struct Inputs {
    resolution: Vec3,
    time: f32,
    octaves: i32,
    warp: f32,
    speed: f32,
}

impl Inputs {
    fn pattern(&self, p: Vec2, q: &mut Vec2, r: &mut Vec2) -> f32 {
        let t = self.time * self.speed;
        *q = vec2(
            common::fbm(p + vec2(0.0, 0.0) + Vec2::splat(t), self.octaves),
            common::fbm(p + vec2(5.2, 1.3), self.octaves),
        );
        *r = vec2(
            common::fbm(p + self.warp * *q + vec2(1.7, 9.2), self.octaves),
            common::fbm(p + self.warp * *q + vec2(8.3, 2.8) + Vec2::splat(0.5 * t), self.octaves),
        );
        common::fbm(p + self.warp * *r, self.octaves)
    }

    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = 3.0 * frag_coord / self.resolution.y;

        let mut q = Vec2::ZERO;
        let mut r = Vec2::ZERO;
        let f = self.pattern(p, &mut q, &mut r);

        let mut col = mix(
            vec3(0.1, 0.35, 0.45),
            vec3(0.95, 0.85, 0.6),
            saturate(f * f * 3.0),
        );
        col = mix(col, vec3(0.0, 0.05, 0.25), saturate(q.length_squared()));
        col = mix(col, vec3(0.7, 0.2, 0.1), saturate(r.x * r.x));
        col *= 0.6 + 0.8 * f;

        *frag_color = col.clamp(Vec3::ZERO, Vec3::ONE).extend(1.0);
    }
}
