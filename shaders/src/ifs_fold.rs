//! Kaleidoscopic IFS: the plane is folded, rotated and scaled repeatedly and
//! coloured by an orbit trap.

use crate::prelude::*;

const ITERATIONS: usize = 0;
const ANGLE: usize = 1;
const SCALE: usize = 2;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "ifs-fold",
    name: "Kaleidoscopic Fold",
    sort: 130,
    buffer_format: BufferFormat::Unorm8,
    passes: IMAGE_ONLY,
    params: &[
        ParamDefinition::int(ITERATIONS as u32, "iterations", "Folds", 8, 1, 16),
        ParamDefinition::float(ANGLE as u32, "angle", "Fold angle", 0.6, 0.0, 3.14, 0.02),
        ParamDefinition::float(SCALE as u32, "scale", "Scale", 1.35, 1.05, 2.0, 0.01),
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
        iterations: input.param_int(ITERATIONS),
        angle: input.param(ANGLE),
        scale: input.param(SCALE),
    }
    .main_image(&mut color, frag_coord);
    color
}

struct Inputs {
    resolution: Vec3,
    time: f32,
    iterations: i32,
    angle: f32,
    scale: f32,
}

impl Inputs {
    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let mut p = common::centered_uv(frag_coord, self.resolution) * 1.6;
        let offset = vec2(0.55 + 0.15 * (0.31 * self.time).sin(), 0.35);
        let m = common::rot(self.angle + 0.1 * self.time);

        let mut trap: f32 = 1e10;
        let mut line_trap: f32 = 1e10;
        let mut factor = 1.0;
        let mut i = 0;
        while i < self.iterations {
            p = p.abs() - offset;
            p = m * p * self.scale;
            factor *= self.scale;
            trap = trap.min(p.length());
            line_trap = line_trap.min(p.x.abs());
            i += 1;
        }

        let distance = p.length() / factor;
        let col = common::palette(
            0.2 * trap + 0.1 * self.time,
            Vec3::splat(0.5),
            Vec3::splat(0.5),
            vec3(1.0, 1.0, 0.5),
            vec3(0.8, 0.9, 0.3),
        ) * (1.0 - (-4.0 * line_trap).exp() * 0.7)
            + Vec3::splat(0.02 / (distance + 0.02));

        *frag_color = col.clamp(Vec3::ZERO, Vec3::ONE).extend(1.0);
    }
}
