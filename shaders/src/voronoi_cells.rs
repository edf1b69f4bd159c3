//! Animated Voronoi diagram with optional cell borders.

use crate::prelude::*;

const CELLS: usize = 0;
const JITTER: usize = 1;
const BORDERS: usize = 2;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "voronoi-cells",
    name: "Voronoi Cells",
    sort: 60,
    buffer_format: BufferFormat::Unorm8,
    passes: IMAGE_ONLY,
    params: &[
        ParamDefinition::float(CELLS as u32, "cells", "Cells across", 8.0, 2.0, 32.0, 1.0),
        ParamDefinition::float(JITTER as u32, "jitter", "Jitter", 1.0, 0.0, 1.0, 0.05),
        ParamDefinition::toggle(BORDERS as u32, "borders", "Show borders", true),
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
        cells: input.param(CELLS),
        jitter: input.param(JITTER),
        borders: input.param_bool(BORDERS),
    }
    .main_image(&mut color, frag_coord);
    color
}

struct Inputs {
    resolution: Vec3,
    time: f32,
    cells: f32,
    jitter: f32,
    borders: bool,
}

impl Inputs {
    fn feature_point(&self, cell: Vec2) -> Vec2 {
        let h = common::hash22(cell);
        let wobble = Vec2::splat(0.5) + 0.5 * (Vec2::splat(self.time) + common::TAU * h).sin();
        Vec2::splat(0.5) + self.jitter * (wobble - Vec2::splat(0.5))
    }

    /// Returns (F1, F2) distances and the id of the closest cell.
    fn voronoi(&self, x: Vec2, closest: &mut Vec2) -> Vec2 {
        let n = x.floor();
        let f = x.gl_fract();
        let mut f1 = 8.0;
        let mut f2 = 8.0;
        let mut j = -1;
        while j <= 1 {
            let mut i = -1;
            while i <= 1 {
                let g = vec2(i as f32, j as f32);
                let r = g + self.feature_point(n + g) - f;
                let d = r.dot(r);
                if d < f1 {
                    f2 = f1;
                    f1 = d;
                    *closest = n + g;
                } else if d < f2 {
                    f2 = d;
                }
                i += 1;
            }
            j += 1;
        }
        vec2(f1.sqrt(), f2.sqrt())
    }

    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = frag_coord / self.resolution.x * self.cells;

        let mut cell = Vec2::ZERO;
        let d = self.voronoi(p, &mut cell);

        let hue = common::hash12(cell);
        let mut col = common::palette(
            hue,
            Vec3::splat(0.5),
            Vec3::splat(0.5),
            Vec3::ONE,
            vec3(0.0, 0.33, 0.67),
        );
        col *= 0.75 + 0.25 * (1.0 - d.x);

        if self.borders {
            let edge = smoothstep(0.0, 0.05, d.y - d.x);
            col *= edge;
        }

        *frag_color = col.extend(1.0);
    }
}
