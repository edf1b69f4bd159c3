//! Endless zoom into the Mandelbrot set's seahorse valley, smooth iteration
//! count colouring.

use crate::prelude::*;

const ITERATIONS: usize = 0;
const ZOOM_SPEED: usize = 1;

const CENTER: Vec2 = Vec2::new(-0.743_643_9, 0.131_825_9);
/// Single precision runs out of detail past roughly this many e-folds.
const MAX_DEPTH: f32 = 9.0;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "mandelbrot-zoom",
    name: "Mandelbrot Zoom",
    sort: 30,
    buffer_format: BufferFormat::Unorm8,
    passes: IMAGE_ONLY,
    params: &[
        ParamDefinition::int(ITERATIONS as u32, "iterations", "Iterations", 128, 16, 512),
        ParamDefinition::float(ZOOM_SPEED as u32, "zoom_speed", "Zoom speed", 0.4, 0.0, 2.0, 0.05),
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
        zoom_speed: input.param(ZOOM_SPEED),
    }
    .main_image(&mut color, frag_coord);
    color
}

struct Inputs {
    resolution: Vec3,
    time: f32,
    iterations: i32,
    zoom_speed: f32,
}

impl Inputs {
    /// Smooth iteration count, or a negative value for points inside the set.
    fn escape(&self, c: Vec2) -> f32 {
        let mut z = Vec2::ZERO;
        let mut n = 0;
        while n < self.iterations {
            z = vec2(z.x * z.x - z.y * z.y, 2.0 * z.x * z.y) + c;
            if z.dot(z) > 256.0 {
                break;
            }
            n += 1;
        }
        if n >= self.iterations {
            return -1.0;
        }
        n as f32 - z.dot(z).log2().log2() + 4.0
    }

    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = common::centered_uv(frag_coord, self.resolution);
        let depth = (self.time * self.zoom_speed).gl_mod(MAX_DEPTH);
        let zoom = 1.5 * (-depth).exp();

        let sl = self.escape(CENTER + p * zoom);
        let col = if sl < 0.0 {
            Vec3::ZERO
        } else {
            Vec3::splat(0.5) + 0.5 * (Vec3::splat(3.0 + sl * 0.15) + vec3(0.0, 0.6, 1.0)).cos()
        };

        *frag_color = col.extend(1.0);
    }
}
