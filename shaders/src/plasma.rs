//! Classic sum-of-sines plasma with adjustable speed and scale.

use crate::prelude::*;
use core::f32::consts::PI;

const SPEED: usize = 0;
const SCALE: usize = 1;
const MONOCHROME: usize = 2;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "plasma",
    name: "Plasma",
    sort: 20,
    buffer_format: BufferFormat::Unorm8,
    passes: IMAGE_ONLY,
    params: &[
        ParamDefinition::float(SPEED as u32, "speed", "Speed", 1.0, 0.0, 4.0, 0.1),
        ParamDefinition::float(SCALE as u32, "scale", "Scale", 3.0, 0.5, 10.0, 0.25),
        ParamDefinition::toggle(MONOCHROME as u32, "monochrome", "Monochrome", false),
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
        speed: input.param(SPEED),
        scale: input.param(SCALE),
        monochrome: input.param_bool(MONOCHROME),
    }
    .main_image(&mut color, frag_coord);
    color
}

struct Inputs {
    resolution: Vec3,
    time: f32,
    speed: f32,
    scale: f32,
    monochrome: bool,
}

impl Inputs {
    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let uv = frag_coord / self.resolution.y * self.scale;
        let t = self.time * self.speed;

        let mut v = (uv.x + t).sin();
        v += ((uv.y + t) * 0.5).sin();
        v += ((uv.x + uv.y + t) * 0.5).sin();
        let c = uv + 0.5 * self.scale * vec2((t / 5.0).sin(), (t / 3.0).cos());
        v += ((c.dot(c) + 1.0).sqrt() + t).sin();
        v *= 0.5;

        let col = if self.monochrome {
            Vec3::splat(0.5 + 0.5 * (PI * v).sin())
        } else {
            Vec3::splat(0.5)
                + 0.5
                    * vec3(
                        (PI * v).sin(),
                        (PI * v + 2.0 * PI / 3.0).sin(),
                        (PI * v + 4.0 * PI / 3.0).sin(),
                    )
        };

        *frag_color = col.extend(1.0);
    }
}
