//! A slowly turning hue wheel over Shadertoy's default gradient.

use crate::prelude::*;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "hue-wheel",
    name: "Hue Wheel",
    sort: 10,
    buffer_format: BufferFormat::Unorm8,
    passes: IMAGE_ONLY,
    params: &[],
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
    }
    .main_image(&mut color, frag_coord);
    color
}

struct Inputs {
    resolution: Vec3,
    time: f32,
}

impl Inputs {
    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let uv = frag_coord / self.resolution.xy();
        let background = Vec3::splat(0.5)
            + 0.5 * (Vec3::splat(self.time) + uv.xyx() + vec3(0.0, 2.0, 4.0)).cos();

        let p = common::centered_uv(frag_coord, self.resolution);
        let r = p.length();
        let angle = p.y.atan2(p.x) / common::TAU + 0.5;
        let hue = (angle + 0.1 * self.time).gl_fract();
        let wheel = common::hsv_to_rgb(vec3(hue, saturate(r / 0.9), 1.0));

        // soft rim so the disc doesn't alias against the background
        let inside = smoothstep(0.91, 0.89, r);
        let col = mix(background * 0.35, wheel, inside);

        *frag_color = col.extend(1.0);
    }
}
