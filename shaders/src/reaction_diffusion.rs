//! Gray-Scott reaction diffusion. Buffer A holds the two chemical
//! concentrations, the image pass shades the second one like a relief.

use crate::prelude::*;

const FEED: usize = 0;
const KILL: usize = 1;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "reaction-diffusion",
    name: "Reaction Diffusion",
    sort: 100,
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
            ChannelInput::Empty,
            ChannelInput::Empty,
            ChannelInput::Empty,
        ]),
    ],
    params: &[
        ParamDefinition::float(FEED as u32, "feed", "Feed rate", 0.0367, 0.01, 0.1, 0.001),
        ParamDefinition::float(KILL as u32, "kill", "Kill rate", 0.0649, 0.03, 0.08, 0.001),
    ],
};

const DIFFUSION_U: f32 = 1.0;
const DIFFUSION_V: f32 = 0.5;

pub fn render<C: Channel>(
    pass: u32,
    input: &ShaderInput,
    channels: &Channels<C>,
    frag_coord: Vec2,
) -> Vec4 {
    let mut color = Vec4::ZERO;
    let inputs = Inputs {
        resolution: input.resolution,
        frame: input.frame,
        mouse: input.mouse,
        feed: input.param(FEED),
        kill: input.param(KILL),
        channel0: &channels.channel0,
    };
    match pass {
        0 => inputs.buffer_a(&mut color, frag_coord),
        _ => inputs.main_image(&mut color, frag_coord),
    }
    color
}

struct Inputs<'a, C0> {
    resolution: Vec3,
    frame: i32,
    mouse: Vec4,
    feed: f32,
    kill: f32,
    channel0: &'a C0,
}

impl<C0: Channel> Inputs<'_, C0> {
    fn state(&self, p: IVec2) -> Vec2 {
        let max = ivec2(self.resolution.x as i32 - 1, self.resolution.y as i32 - 1);
        self.channel0.fetch(p.clamp(IVec2::ZERO, max)).xy()
    }

    fn laplacian(&self, p: IVec2) -> Vec2 {
        let edges = self.state(p + ivec2(1, 0))
            + self.state(p + ivec2(-1, 0))
            + self.state(p + ivec2(0, 1))
            + self.state(p + ivec2(0, -1));
        let corners = self.state(p + ivec2(1, 1))
            + self.state(p + ivec2(-1, 1))
            + self.state(p + ivec2(1, -1))
            + self.state(p + ivec2(-1, -1));
        0.2 * edges + 0.05 * corners - self.state(p)
    }

    fn seeded(&self, frag_coord: Vec2) -> bool {
        let center = self.resolution.xy() * 0.5;
        let d = (frag_coord - center).abs();
        if d.x < 6.0 && d.y < 6.0 {
            return true;
        }
        let cell = (frag_coord / 24.0).floor();
        let local = (frag_coord / 24.0).gl_fract() - Vec2::splat(0.5);
        common::hash12(cell) > 0.93 && local.length() < 0.2
    }

    fn buffer_a(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = ivec2(frag_coord.x as i32, frag_coord.y as i32);

        let mut uv;
        if self.frame == 0 {
            uv = vec2(1.0, if self.seeded(frag_coord) { 1.0 } else { 0.0 });
        } else {
            uv = self.state(p);
            let lap = self.laplacian(p);
            let reaction = uv.x * uv.y * uv.y;
            let du = DIFFUSION_U * lap.x - reaction + self.feed * (1.0 - uv.x);
            let dv = DIFFUSION_V * lap.y + reaction - (self.kill + self.feed) * uv.y;
            uv += vec2(du, dv);
        }

        if self.mouse.z > 0.0 && frag_coord.distance(self.mouse.xy()) < 8.0 {
            uv.y = 0.9;
        }

        *frag_color = uv.clamp(Vec2::ZERO, Vec2::ONE).extend(0.0).extend(1.0);
    }

    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = ivec2(frag_coord.x as i32, frag_coord.y as i32);
        let v = self.state(p).y;

        let gx = self.state(p + ivec2(1, 0)).y - self.state(p + ivec2(-1, 0)).y;
        let gy = self.state(p + ivec2(0, 1)).y - self.state(p + ivec2(0, -1)).y;
        let normal = vec3(-gx, -gy, 0.15).normalize();
        let light = vec3(-0.5, 0.6, 0.6).normalize();
        let diffuse = saturate(normal.dot(light));

        let base = common::palette(
            0.6 + 0.8 * v,
            Vec3::splat(0.5),
            Vec3::splat(0.5),
            vec3(1.0, 0.7, 0.4),
            vec3(0.0, 0.15, 0.2),
        );
        let col = mix(vec3(0.95, 0.93, 0.88), base, smoothstep(0.1, 0.35, v)) * (0.55 + 0.45 * diffuse);

        *frag_color = col.extend(1.0);
    }
}
