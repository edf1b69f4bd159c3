//! Wall clock driven by `iDate`.

use crate::prelude::*;

const SMOOTH_SECONDS: usize = 0;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "analog-clock",
    name: "Analog Clock",
    sort: 70,
    buffer_format: BufferFormat::Unorm8,
    passes: IMAGE_ONLY,
    params: &[ParamDefinition::toggle(
        SMOOTH_SECONDS as u32,
        "smooth_seconds",
        "Sweeping second hand",
        false,
    )],
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
        date: input.date,
        smooth_seconds: input.param_bool(SMOOTH_SECONDS),
    }
    .main_image(&mut color, frag_coord);
    color
}

struct Inputs {
    resolution: Vec3,
    date: Vec4,
    smooth_seconds: bool,
}

fn sd_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let pa = p - a;
    let ba = b - a;
    let h = saturate(pa.dot(ba) / ba.dot(ba));
    (pa - ba * h).length()
}

/// Unit vector for a clockwise angle measured from twelve o'clock.
fn dial(turns: f32) -> Vec2 {
    let a = turns * common::TAU;
    vec2(a.sin(), a.cos())
}

impl Inputs {
    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = common::centered_uv(frag_coord, self.resolution) * 1.1;
        let px = 2.2 / self.resolution.y;
        let r = p.length();

        let mut col = vec3(0.12, 0.13, 0.15);

        // face
        let face = smoothstep(px, -px, r - 0.9);
        col = mix(col, vec3(0.93, 0.92, 0.88), face);
        let rim = smoothstep(px, -px, (r - 0.9).abs() - 0.02);
        col = mix(col, vec3(0.2, 0.2, 0.22), rim);

        // ticks
        let a = (p.x.atan2(p.y) / common::TAU).gl_fract();
        let sector = (a * 60.0 + 0.5).floor() / 60.0;
        let tick_dir = dial(sector);
        let is_hour = ((sector * 60.0 + 0.5).floor() as i32) % 5 == 0;
        let inner = if is_hour { 0.72 } else { 0.8 };
        let width = if is_hour { 0.018 } else { 0.007 };
        let tick = sd_segment(p, tick_dir * inner, tick_dir * 0.86) - width;
        col = mix(col, Vec3::splat(0.1), smoothstep(px, -px, tick) * face);

        // hands
        let seconds = self.date.w;
        let second = if self.smooth_seconds {
            seconds
        } else {
            seconds.floor()
        };
        let hours_turn = (seconds / 43200.0).gl_fract();
        let minutes_turn = (seconds / 3600.0).gl_fract();
        let seconds_turn = (second / 60.0).gl_fract();

        let hour = sd_segment(p, Vec2::ZERO, dial(hours_turn) * 0.45) - 0.03;
        let minute = sd_segment(p, Vec2::ZERO, dial(minutes_turn) * 0.7) - 0.02;
        let sweep = sd_segment(p, -dial(seconds_turn) * 0.12, dial(seconds_turn) * 0.8) - 0.006;

        col = mix(col, Vec3::splat(0.08), smoothstep(px, -px, hour));
        col = mix(col, Vec3::splat(0.08), smoothstep(px, -px, minute));
        col = mix(col, vec3(0.85, 0.1, 0.1), smoothstep(px, -px, sweep));
        col = mix(col, vec3(0.85, 0.1, 0.1), smoothstep(px, -px, r - 0.035));

        *frag_color = col.extend(1.0);
    }
}
