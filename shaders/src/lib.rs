#![cfg_attr(target_arch = "spirv", no_std)]

pub mod common;
pub mod prelude;

pub mod analog_clock;
pub mod game_of_life;
pub mod hue_wheel;
pub mod ifs_fold;
pub mod mandelbrot_zoom;
pub mod particle_trails;
pub mod plasma;
pub mod reaction_diffusion;
pub mod ripple_tank;
pub mod sdf_scene;
pub mod texture_warp;
pub mod voronoi_cells;
pub mod warped_clouds;

use prelude::*;
use shared::{frag_coord_from_target, ShaderConstants};
use spirv_std::{spirv, Image, Sampler};

/// Every unit in the catalog. The position in this table is the `shader`
/// index the host pushes and [`render_pass`] dispatches on.
pub const SHADER_DEFINITIONS: &[ShaderDefinition] = &[
    hue_wheel::DEFINITION,
    plasma::DEFINITION,
    mandelbrot_zoom::DEFINITION,
    sdf_scene::DEFINITION,
    warped_clouds::DEFINITION,
    voronoi_cells::DEFINITION,
    analog_clock::DEFINITION,
    texture_warp::DEFINITION,
    game_of_life::DEFINITION,
    reaction_diffusion::DEFINITION,
    ripple_tank::DEFINITION,
    particle_trails::DEFINITION,
    ifs_fold::DEFINITION,
];

/// Runs pass `pass` of unit `shader` for one pixel.
pub fn render_pass<C: Channel>(
    shader: u32,
    pass: u32,
    input: &ShaderInput,
    channels: &Channels<C>,
    frag_coord: Vec2,
) -> Vec4 {
    match shader {
        0 => hue_wheel::render(pass, input, channels, frag_coord),
        1 => plasma::render(pass, input, channels, frag_coord),
        2 => mandelbrot_zoom::render(pass, input, channels, frag_coord),
        3 => sdf_scene::render(pass, input, channels, frag_coord),
        4 => warped_clouds::render(pass, input, channels, frag_coord),
        5 => voronoi_cells::render(pass, input, channels, frag_coord),
        6 => analog_clock::render(pass, input, channels, frag_coord),
        7 => texture_warp::render(pass, input, channels, frag_coord),
        8 => game_of_life::render(pass, input, channels, frag_coord),
        9 => reaction_diffusion::render(pass, input, channels, frag_coord),
        10 => ripple_tank::render(pass, input, channels, frag_coord),
        11 => particle_trails::render(pass, input, channels, frag_coord),
        12 => ifs_fold::render(pass, input, channels, frag_coord),
        _ => vec4(0.0, 0.0, 0.0, 1.0),
    }
}

/// `frag_coord` is in Shadertoy's bottom-left convention.
pub fn fs<C: Channel>(constants: &ShaderConstants, frag_coord: Vec2, channels: &Channels<C>) -> Vec4 {
    let input = ShaderInput::from_constants(constants);
    render_pass(constants.shader, constants.pass, &input, channels, frag_coord)
}

pub type ChannelImage = Image!(2D, type = f32, sampled);

/// A bound texture plus the shared sampler. Render targets have their origin
/// at the top-left, so both lookups flip `y`.
#[derive(Copy, Clone)]
pub struct GpuChannel<'a> {
    image: &'a ChannelImage,
    sampler: Sampler,
    size: Vec2,
}

impl Channel for GpuChannel<'_> {
    fn sample(&self, uv: Vec2) -> Vec4 {
        self.image
            .sample_by_lod(self.sampler, vec2(uv.x, 1.0 - uv.y), 0.0)
    }

    fn fetch(&self, texel: IVec2) -> Vec4 {
        let flipped = ivec2(texel.x, self.size.y as i32 - 1 - texel.y);
        self.image.fetch(flipped)
    }
}

#[allow(unused_attributes, clippy::too_many_arguments)]
#[spirv(fragment)]
pub fn main_fs(
    #[spirv(frag_coord)] in_frag_coord: Vec4,
    #[spirv(push_constant)] constants: &ShaderConstants,
    #[spirv(descriptor_set = 0, binding = 0)] sampler: &Sampler,
    #[spirv(descriptor_set = 0, binding = 1)] image0: &ChannelImage,
    #[spirv(descriptor_set = 0, binding = 2)] image1: &ChannelImage,
    #[spirv(descriptor_set = 0, binding = 3)] image2: &ChannelImage,
    #[spirv(descriptor_set = 0, binding = 4)] image3: &ChannelImage,
    output: &mut Vec4,
) {
    let res = &constants.channel_resolution;
    let channels = Channels {
        channel0: GpuChannel {
            image: image0,
            sampler: *sampler,
            size: vec2(res[0], res[1]),
        },
        channel1: GpuChannel {
            image: image1,
            sampler: *sampler,
            size: vec2(res[2], res[3]),
        },
        channel2: GpuChannel {
            image: image2,
            sampler: *sampler,
            size: vec2(res[4], res[5]),
        },
        channel3: GpuChannel {
            image: image3,
            sampler: *sampler,
            size: vec2(res[6], res[7]),
        },
    };

    let frag_coord = frag_coord_from_target(constants, vec2(in_frag_coord.x, in_frag_coord.y));
    *output = fs(constants, frag_coord, &channels);
}

#[allow(unused_attributes)]
#[spirv(vertex)]
pub fn main_vs(#[spirv(vertex_index)] vert_idx: i32, #[spirv(position)] builtin_pos: &mut Vec4) {
    // Create a "full screen triangle" by mapping the vertex index.
    // ported from https://www.saschawillems.de/blog/2016/08/13/vulkan-tutorial-on-rendering-a-fullscreen-quad-without-buffers/
    let uv = vec2(((vert_idx << 1) & 2) as f32, (vert_idx & 2) as f32);
    let pos = 2.0 * uv - Vec2::ONE;

    *builtin_pos = pos.extend(0.0).extend(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat(Vec4);

    impl Channel for Flat {
        fn sample(&self, _uv: Vec2) -> Vec4 {
            self.0
        }

        fn fetch(&self, _texel: IVec2) -> Vec4 {
            self.0
        }
    }

    fn channels() -> Channels<Flat> {
        Channels {
            channel0: Flat(vec4(0.5, 0.25, 0.0, 1.0)),
            channel1: Flat(Vec4::splat(0.5)),
            channel2: Flat(Vec4::ZERO),
            channel3: Flat(Vec4::ZERO),
        }
    }

    fn constants_for(shader: usize, pass: usize) -> ShaderConstants {
        let definition = &SHADER_DEFINITIONS[shader];
        let mut constants = ShaderConstants {
            width: 32,
            height: 18,
            time: 1.25,
            time_delta: 1.0 / 60.0,
            frame: 3,
            shader: shader as u32,
            pass: pass as u32,
            frame_rate: 60.0,
            date_year: 2024.0,
            date_month: 4.0,
            date_day: 12.0,
            date_seconds: 45_296.5,
            ..Default::default()
        };
        for channel in 0..4 {
            constants.set_channel_resolution(channel, 32.0, 18.0);
        }
        for param in definition.params {
            constants.params[param.slot as usize] = param.default;
        }
        constants
    }

    #[test]
    fn every_pass_of_every_unit_produces_finite_colors() {
        let channels = channels();
        for (shader, definition) in SHADER_DEFINITIONS.iter().enumerate() {
            for pass in 0..definition.passes.len() {
                let constants = constants_for(shader, pass);
                for y in (0..18).step_by(5) {
                    for x in (0..32).step_by(7) {
                        let color = fs(&constants, vec2(x as f32 + 0.5, y as f32 + 0.5), &channels);
                        assert!(
                            color.is_finite(),
                            "{} pass {pass} at ({x}, {y}) gave {color}",
                            definition.key
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn image_passes_are_opaque() {
        let channels = channels();
        for (shader, definition) in SHADER_DEFINITIONS.iter().enumerate() {
            let constants = constants_for(shader, definition.passes.len() - 1);
            let color = fs(&constants, vec2(16.5, 9.5), &channels);
            assert_eq!(color.w, 1.0, "{}", definition.key);
        }
    }

    #[test]
    fn unknown_unit_renders_black() {
        let constants = ShaderConstants {
            width: 4,
            height: 4,
            shader: SHADER_DEFINITIONS.len() as u32,
            ..Default::default()
        };
        assert_eq!(fs(&constants, vec2(0.5, 0.5), &channels()), vec4(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn game_of_life_kills_overcrowded_cells() {
        // every neighbour reads as alive, including the cell itself
        let crowded = Channels {
            channel0: Flat(vec4(1.0, 1.0, 0.0, 1.0)),
            channel1: Flat(Vec4::ZERO),
            channel2: Flat(Vec4::ZERO),
            channel3: Flat(Vec4::ZERO),
        };
        let constants = constants_for(8, 0);
        let color = fs(&constants, vec2(10.5, 10.5), &crowded);
        assert_eq!(color.x, 0.0);
    }

    #[test]
    fn clock_hands_follow_date() {
        let channels = channels();
        let mut noon = constants_for(6, 0);
        // half a minute past, so the second hand points away from the pixel
        noon.date_seconds = 12.0 * 3600.0 + 30.0;
        let mut quarter_past = noon;
        quarter_past.date_seconds += 15.0 * 60.0;

        // a pixel on the twelve o'clock axis, inside the minute hand's reach
        let pixel = vec2(16.0, 9.0 + 5.0);
        let at_noon = fs(&noon, pixel, &channels);
        let later = fs(&quarter_past, pixel, &channels);
        assert_ne!(at_noon, later);
    }
}
