//! Types shared between the shader catalog and the host: the standard uniform
//! block, the per-pixel shader input, channel sampling, catalog metadata and
//! GLSL-flavoured math helpers.

#![cfg_attr(target_arch = "spirv", no_std)]

pub mod math;
pub mod meta;

pub use math::*;
pub use spirv_std::glam;

use bytemuck::{Pod, Zeroable};
use glam::{vec2, vec3, vec4, IVec2, Vec2, Vec3, Vec4};

/// Number of `iChannel` sampler slots.
pub const CHANNEL_COUNT: usize = 4;

/// Number of GUI parameter slots carried in [`ShaderConstants::params`].
pub const MAX_PARAMS: usize = 8;

/// Standard uniforms, pushed as push constants for every pass.
///
/// Mouse and date fields follow the Shadertoy `iMouse` / `iDate` layout. The
/// mouse is already in bottom-left pixel coordinates when it gets here.
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ShaderConstants {
    pub width: u32,
    pub height: u32,
    pub time: f32,
    pub time_delta: f32,

    pub frame: u32,
    /// Index into the catalog's definition table.
    pub shader: u32,
    /// Index of the pass being rendered, in plan order.
    pub pass: u32,
    pub frame_rate: f32,

    pub mouse_x: f32,
    pub mouse_y: f32,
    pub click_x: f32,
    pub click_y: f32,

    pub date_year: f32,
    pub date_month: f32,
    pub date_day: f32,
    pub date_seconds: f32,

    /// Width and height of each bound channel, interleaved.
    pub channel_resolution: [f32; 2 * CHANNEL_COUNT],
    pub params: [f32; MAX_PARAMS],
}

impl ShaderConstants {
    pub fn set_channel_resolution(&mut self, channel: usize, width: f32, height: f32) {
        self.channel_resolution[2 * channel] = width;
        self.channel_resolution[2 * channel + 1] = height;
    }
}

/// Everything a catalog unit can read for the current pixel.
#[derive(Copy, Clone)]
pub struct ShaderInput {
    pub resolution: Vec3,
    pub time: f32,
    pub time_delta: f32,
    pub frame: i32,
    pub frame_rate: f32,
    pub mouse: Vec4,
    pub date: Vec4,
    pub channel_resolution: [Vec3; CHANNEL_COUNT],
    pub params: [f32; MAX_PARAMS],
}

impl ShaderInput {
    pub fn from_constants(constants: &ShaderConstants) -> ShaderInput {
        let res = &constants.channel_resolution;
        ShaderInput {
            resolution: vec3(constants.width as f32, constants.height as f32, 1.0),
            time: constants.time,
            time_delta: constants.time_delta,
            frame: constants.frame as i32,
            frame_rate: constants.frame_rate,
            mouse: vec4(
                constants.mouse_x,
                constants.mouse_y,
                constants.click_x,
                constants.click_y,
            ),
            date: vec4(
                constants.date_year,
                constants.date_month,
                constants.date_day,
                constants.date_seconds,
            ),
            channel_resolution: [
                vec3(res[0], res[1], 1.0),
                vec3(res[2], res[3], 1.0),
                vec3(res[4], res[5], 1.0),
                vec3(res[6], res[7], 1.0),
            ],
            params: constants.params,
        }
    }

    pub fn param(&self, slot: usize) -> f32 {
        self.params[slot]
    }

    pub fn param_int(&self, slot: usize) -> i32 {
        self.params[slot] as i32
    }

    pub fn param_bool(&self, slot: usize) -> bool {
        self.params[slot] > 0.5
    }

    /// True while the left button is held.
    pub fn mouse_down(&self) -> bool {
        self.mouse.z > 0.0
    }
}

/// Converts a render-target pixel (origin top-left) into Shadertoy's
/// `fragCoord` (origin bottom-left).
pub fn frag_coord_from_target(constants: &ShaderConstants, raw: Vec2) -> Vec2 {
    vec2(raw.x, constants.height as f32 - raw.y)
}

/// An `iChannel` sampler. Coordinates use Shadertoy's convention: `uv` in
/// `0..1` with the origin at the bottom-left, texels counted from the bottom row.
pub trait Channel {
    /// Bilinear sample, clamped to edge.
    fn sample(&self, uv: Vec2) -> Vec4;

    /// Unfiltered read of a single texel (`texelFetch`).
    fn fetch(&self, texel: IVec2) -> Vec4;

    fn sample_repeat(&self, uv: Vec2) -> Vec4 {
        self.sample(uv.gl_fract())
    }
}

/// The four channel slots bound to a pass.
pub struct Channels<C> {
    pub channel0: C,
    pub channel1: C,
    pub channel2: C,
    pub channel3: C,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_fit_push_constant_limit() {
        assert_eq!(core::mem::size_of::<ShaderConstants>(), 128);
    }

    #[test]
    fn input_mirrors_constants() {
        let mut constants = ShaderConstants {
            width: 640,
            height: 360,
            time: 2.5,
            frame: 7,
            mouse_x: 10.0,
            mouse_y: 20.0,
            click_x: 10.0,
            click_y: -20.0,
            date_year: 2024.0,
            ..Default::default()
        };
        constants.set_channel_resolution(2, 256.0, 128.0);
        constants.params[3] = 1.0;

        let input = ShaderInput::from_constants(&constants);
        assert_eq!(input.resolution, vec3(640.0, 360.0, 1.0));
        assert_eq!(input.frame, 7);
        assert!(input.mouse_down());
        assert_eq!(input.date.x, 2024.0);
        assert_eq!(input.channel_resolution[2], vec3(256.0, 128.0, 1.0));
        assert!(input.param_bool(3));
        assert!(!input.param_bool(4));
    }

    #[test]
    fn frag_coord_flips_vertically() {
        let constants = ShaderConstants {
            width: 4,
            height: 4,
            ..Default::default()
        };
        let coord = frag_coord_from_target(&constants, vec2(0.5, 0.5));
        assert_eq!(coord, vec2(0.5, 3.5));
    }
}
