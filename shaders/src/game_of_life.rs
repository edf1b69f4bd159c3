//! Conway's Game of Life on a wrapping feedback buffer. Hold the mouse button
//! to paint live cells; dead cells keep a fading trail.

use crate::prelude::*;

const DENSITY: usize = 0;
const BRUSH: usize = 1;

pub const DEFINITION: ShaderDefinition = ShaderDefinition {
    key: "game-of-life",
    name: "Game of Life",
    sort: 90,
    buffer_format: BufferFormat::Unorm8,
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
        ParamDefinition::float(DENSITY as u32, "density", "Initial density", 0.3, 0.05, 0.95, 0.05),
        ParamDefinition::float(BRUSH as u32, "brush", "Brush radius", 6.0, 1.0, 40.0, 1.0),
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
        frame: input.frame,
        mouse: input.mouse,
        density: input.param(DENSITY),
        brush: input.param(BRUSH),
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
    density: f32,
    brush: f32,
    channel0: &'a C0,
}

fn wrap(p: IVec2, size: IVec2) -> IVec2 {
    ivec2(
        ((p.x % size.x) + size.x) % size.x,
        ((p.y % size.y) + size.y) % size.y,
    )
}

impl<C0: Channel> Inputs<'_, C0> {
    fn size(&self) -> IVec2 {
        ivec2(self.resolution.x as i32, self.resolution.y as i32)
    }

    fn alive(&self, p: IVec2) -> i32 {
        if self.channel0.fetch(wrap(p, self.size())).x > 0.5 {
            1
        } else {
            0
        }
    }

    fn buffer_a(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let p = ivec2(frag_coord.x as i32, frag_coord.y as i32);

        let mut alive;
        let mut trail = 0.0;
        if self.frame == 0 {
            alive = common::hash12(frag_coord * 1.37) < self.density;
        } else {
            let mut neighbours = 0;
            let mut j = -1;
            while j <= 1 {
                let mut i = -1;
                while i <= 1 {
                    if i != 0 || j != 0 {
                        neighbours += self.alive(p + ivec2(i, j));
                    }
                    i += 1;
                }
                j += 1;
            }
            let current = self.channel0.fetch(p);
            let was_alive = current.x > 0.5;
            alive = neighbours == 3 || (was_alive && neighbours == 2);
            trail = current.y * 0.92;
        }

        if self.mouse.z > 0.0 && frag_coord.distance(self.mouse.xy()) < self.brush {
            alive = true;
        }
        if alive {
            trail = 1.0;
        }

        *frag_color = vec4(if alive { 1.0 } else { 0.0 }, trail, 0.0, 1.0);
    }

    fn main_image(&self, frag_color: &mut Vec4, frag_coord: Vec2) {
        let state = self.channel0.fetch(ivec2(frag_coord.x as i32, frag_coord.y as i32));

        let background = vec3(0.03, 0.03, 0.06);
        let glow = vec3(0.1, 0.35, 0.6);
        let live = vec3(0.85, 1.0, 0.7);

        let mut col = mix(background, glow, state.y * state.y);
        col = mix(col, live, state.x);

        *frag_color = col.extend(1.0);
    }
}
